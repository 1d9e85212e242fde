/// Canonicalizes a display string for alias matching.
///
/// Returns `None` for absent or whitespace-only input; otherwise the input is
/// trimmed, lowercased, and stripped of exactly one leading `@`. Index build
/// and pairing-row resolution share this function, which keeps matching
/// symmetric: any alias that produced a key resolves back to its entry.
pub fn normalize_alias(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let folded = trimmed.to_lowercase();
    let key = folded.strip_prefix('@').unwrap_or(&folded);
    if key.is_empty() {
        return None;
    }
    Some(key.to_string())
}

/// Splits rendered text into chunks of at most `limit` characters.
///
/// Cuts prefer the last line break before the limit so paragraphs survive
/// transmission intact; a single line longer than the limit is hard-cut at
/// the limit. Leading line breaks are stripped from each remainder, so
/// rejoining the chunks with a line break at every cut point reconstructs
/// the input when cut points carry a single break. Lengths are counted in
/// characters, not bytes.
pub fn chunk_message(text: &str, limit: usize) -> Vec<String> {
    if limit == 0 {
        return Vec::new();
    }
    let mut rest: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    while !rest.is_empty() {
        if rest.len() <= limit {
            chunks.push(rest.iter().collect());
            break;
        }
        let cut = rest[..limit]
            .iter()
            .rposition(|&ch| ch == '\n')
            .unwrap_or(limit);
        chunks.push(rest[..cut].iter().collect());
        let mut resume = cut;
        while resume < rest.len() && rest[resume] == '\n' {
            resume += 1;
        }
        rest.drain(..resume);
    }
    chunks
}

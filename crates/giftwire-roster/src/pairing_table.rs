use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use tracing::warn;

use giftwire_core::normalize_alias;

use crate::alias_index::AliasIndex;
use crate::roster_contract::RosterMember;

pub const GIVER_COLUMN: &str = "username";
pub const TARGET_COLUMN: &str = "target";

/// One raw pairing-table row, untouched beyond column addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingRow {
    pub giver: String,
    pub target: String,
}

/// One resolved exchange assignment: the giver's roster entry and the
/// giftee's display text exactly as it appeared in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAssignment {
    pub giver: RosterMember,
    pub target_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairingLoadStats {
    pub rows_read: usize,
    pub rows_resolved: usize,
    pub rows_skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PairingLoadReport {
    pub assignments: Vec<ResolvedAssignment>,
    pub stats: PairingLoadStats,
}

/// Reads the pairing table from disk and validates its header.
///
/// A missing file or a header without the required `username`/`target`
/// columns is a fatal configuration error; both are reported before any
/// network activity happens.
pub fn read_pairing_rows(path: &Path) -> Result<Vec<PairingRow>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read pairing table {}", path.display()))?;
    parse_pairing_rows(&raw)
        .with_context(|| format!("invalid pairing table {}", path.display()))
}

/// Parses pairing-table text: a header row addressed case-insensitively,
/// then one data row per assignment. Tolerates a UTF-8 byte-order mark.
pub fn parse_pairing_rows(raw: &str) -> Result<Vec<PairingRow>> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = text.lines();
    let header_line = lines
        .next()
        .ok_or_else(|| anyhow!("pairing table is empty; expected a header row"))?;
    let headers: Vec<String> = split_csv_record(header_line)
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect();
    let giver_column = headers.iter().position(|header| header == GIVER_COLUMN);
    let target_column = headers.iter().position(|header| header == TARGET_COLUMN);
    let (Some(giver_column), Some(target_column)) = (giver_column, target_column) else {
        bail!(
            "pairing table must have '{GIVER_COLUMN}' and '{TARGET_COLUMN}' columns; found: {}",
            headers.join(", ")
        );
    };

    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let record = split_csv_record(line);
        rows.push(PairingRow {
            giver: record.get(giver_column).cloned().unwrap_or_default(),
            target: record.get(target_column).cloned().unwrap_or_default(),
        });
    }
    Ok(rows)
}

/// Resolves raw rows against the alias index, preserving row order.
///
/// Rows with an empty giver or target, or a giver absent from the roster,
/// are skipped with a diagnostic; roster drift between the spreadsheet and
/// the platform is expected and never fatal.
pub fn resolve_assignments(rows: &[PairingRow], index: &AliasIndex) -> PairingLoadReport {
    let mut report = PairingLoadReport::default();
    for (position, row) in rows.iter().enumerate() {
        let row_number = position + 1;
        report.stats.rows_read += 1;
        let Some(giver_alias) = normalize_alias(Some(&row.giver)) else {
            warn!(row = row_number, "skipping pairing row with empty giver");
            report.stats.rows_skipped += 1;
            continue;
        };
        let target_name = row.target.trim();
        if target_name.is_empty() {
            warn!(
                row = row_number,
                giver = %giver_alias,
                "skipping pairing row with empty target"
            );
            report.stats.rows_skipped += 1;
            continue;
        }
        let Some(member) = index.resolve(&giver_alias) else {
            warn!(
                row = row_number,
                giver = %giver_alias,
                "giver not found in roster"
            );
            report.stats.rows_skipped += 1;
            continue;
        };
        report.assignments.push(ResolvedAssignment {
            giver: member.clone(),
            target_name: target_name.to_string(),
        });
        report.stats.rows_resolved += 1;
    }
    report
}

// Minimal single-line CSV record splitter: double-quoted fields with ""
// escapes, comma separators. The input format never carries embedded
// newlines, so multi-line fields are out of scope.
fn split_csv_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::{
        parse_pairing_rows, read_pairing_rows, resolve_assignments, split_csv_record, PairingRow,
    };
    use crate::alias_index::AliasIndex;
    use crate::roster_contract::RosterMember;

    fn member(
        user_id: &str,
        username: &str,
        global_name: Option<&str>,
        nick: Option<&str>,
    ) -> RosterMember {
        RosterMember {
            user_id: user_id.to_string(),
            username: username.to_string(),
            global_name: global_name.map(str::to_string),
            nick: nick.map(str::to_string),
        }
    }

    fn row(giver: &str, target: &str) -> PairingRow {
        PairingRow {
            giver: giver.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn unit_split_csv_record_handles_quotes_and_escapes() {
        assert_eq!(split_csv_record("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(
            split_csv_record("\"smith, jane\",\"say \"\"hi\"\"\""),
            vec!["smith, jane", "say \"hi\""]
        );
        assert_eq!(split_csv_record("a,,c"), vec!["a", "", "c"]);
    }

    #[test]
    fn unit_parse_accepts_bom_and_case_insensitive_headers() {
        let rows = parse_pairing_rows("\u{feff} UserName , TARGET \nalice,Bob\n")
            .expect("parse should succeed");
        assert_eq!(rows, vec![row("alice", "Bob")]);
    }

    #[test]
    fn unit_parse_rejects_missing_required_columns() {
        let error = parse_pairing_rows("name,giftee\nalice,Bob\n")
            .expect_err("wrong headers should fail");
        assert!(error.to_string().contains("username"));
        assert!(error.to_string().contains("target"));
    }

    #[test]
    fn unit_parse_rejects_empty_table() {
        assert!(parse_pairing_rows("").is_err());
    }

    #[test]
    fn unit_read_reports_a_missing_file_as_fatal() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let error = read_pairing_rows(&tempdir.path().join("absent.csv"))
            .expect_err("missing file must be fatal");
        assert!(error.to_string().contains("failed to read pairing table"));
    }

    #[test]
    fn unit_read_loads_rows_from_disk() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("secret_santa.csv");
        std::fs::write(&path, "username,target\nalice,Bob\n").expect("write");
        let rows = read_pairing_rows(&path).expect("read");
        assert_eq!(rows, vec![row("alice", "Bob")]);
    }

    #[test]
    fn unit_parse_skips_blank_lines() {
        let rows =
            parse_pairing_rows("username,target\nalice,Bob\n\n\nbob,Alice\n").expect("parse");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn functional_resolution_skips_bad_rows_and_preserves_order() {
        let index = AliasIndex::build(&[
            member("1", "alice", None, None),
            member("2", "bob", None, Some("Bobby")),
        ]);
        let rows = vec![
            row("alice", "Bob"),
            row("bob", ""),
            row("carol", "Dave"),
            row("   ", "Eve"),
            row("@Bobby", "Alice"),
        ];
        let report = resolve_assignments(&rows, &index);
        assert_eq!(report.stats.rows_read, 5);
        assert_eq!(report.stats.rows_resolved, 2);
        assert_eq!(report.stats.rows_skipped, 3);
        assert_eq!(report.assignments.len(), 2);
        assert_eq!(report.assignments[0].giver.user_id, "1");
        assert_eq!(report.assignments[0].target_name, "Bob");
        assert_eq!(report.assignments[1].giver.user_id, "2");
        assert_eq!(report.assignments[1].target_name, "Alice");
    }

    #[test]
    fn functional_duplicate_giver_rows_resolve_twice() {
        let index = AliasIndex::build(&[member("1", "alice", None, None)]);
        let rows = vec![row("alice", "Bob"), row("ALICE", "Carol")];
        let report = resolve_assignments(&rows, &index);
        assert_eq!(report.assignments.len(), 2);
        assert_eq!(report.assignments[1].target_name, "Carol");
    }

    #[test]
    fn functional_target_text_is_used_verbatim_after_trim() {
        let index = AliasIndex::build(&[member("1", "alice", None, None)]);
        let report = resolve_assignments(&[row("alice", "  Bob The Builder  ")], &index);
        assert_eq!(report.assignments[0].target_name, "Bob The Builder");
    }
}

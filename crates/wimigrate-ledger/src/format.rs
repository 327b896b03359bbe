//! Text encoding of the ledger.
//!
//! ```text
//! Source ID|Target ID
//! 101 | 9001
//! 102 | 9002
//! ```
//!
//! Readers trim both columns, so files written with tab padding around the
//! pipe parse the same way.

use wimigrate_types::WorkItemId;

use crate::backend::LedgerEntries;

/// Literal first line of every ledger file.
pub const HEADER: &str = "Source ID|Target ID";

/// Parse ledger text. Header, blank and malformed lines are skipped; when a
/// source id repeats, the first mapping is kept.
#[must_use]
pub fn parse(text: &str) -> LedgerEntries {
    let mut entries = LedgerEntries::new();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.contains(HEADER) {
            continue;
        }
        let Some((source_id, destination_id)) = parse_line(line) else {
            tracing::warn!(line = index + 1, content = line, "Ignoring malformed ledger line");
            continue;
        };
        if let Some(existing) = entries.get(&source_id) {
            tracing::warn!(
                source_id = %source_id,
                kept = %existing,
                ignored = %destination_id,
                "Duplicate source id in ledger, keeping first mapping"
            );
            continue;
        }
        entries.insert(source_id, destination_id);
    }

    entries
}

fn parse_line(line: &str) -> Option<(WorkItemId, WorkItemId)> {
    let mut columns = line.split('|');
    let source = columns.next()?.trim();
    let destination = columns.next()?.trim();
    if source.is_empty() || destination.is_empty() {
        return None;
    }
    Some((source.parse().ok()?, destination.parse().ok()?))
}

/// Render the full ledger text, header first, one newline-terminated line per
/// entry in ascending source-id order.
#[must_use]
pub fn render(entries: &LedgerEntries) -> String {
    let mut out = String::with_capacity(HEADER.len() + 1 + entries.len() * 16);
    out.push_str(HEADER);
    out.push('\n');
    for (source_id, destination_id) in entries {
        out.push_str(&format!("{source_id} | {destination_id}\n"));
    }
    out
}

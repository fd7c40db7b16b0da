use super::{ParseError, fields, parse_count};

/// What a `forget` run kept and removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupSummary {
    /// Snapshots kept across all groups.
    pub kept: u64,

    /// Snapshots removed across all groups.
    pub removed: u64,
}

/// Parse the output of `restic forget`.
///
/// restic prints a `keep N snapshots:` and a `remove N snapshots:` line per snapshot group,
/// the counts are summed over all groups.
pub fn parse_cleanup_output(output: &[u8]) -> Result<CleanupSummary, ParseError> {
    let mut summary = CleanupSummary::default();
    let output = String::from_utf8_lossy(output);

    for line in output.lines() {
        let line = line.trim();
        let info = fields(line);

        let [action @ ("keep" | "remove"), count, noun, ..] = info.as_slice() else {
            continue;
        };
        if !noun.starts_with("snapshot") || !line.ends_with(':') {
            continue;
        }

        let count = parse_count(line, count)?;
        if *action == "keep" {
            summary.kept += count;
        } else {
            summary.removed += count;
        }
    }

    Ok(summary)
}

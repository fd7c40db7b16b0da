use super::{ParseError, convert_size_to_bytes, parse_count};
use crate::result::RepositoryStatistics;

/// Parse the output of `restic stats --mode=raw-data`.
///
/// Only the `Total Size:` and `Snapshots processed:` lines are read, missing lines leave
/// the matching statistic empty.
pub fn parse_stats_output(output: &[u8]) -> Result<RepositoryStatistics, ParseError> {
    let mut statistics = RepositoryStatistics::default();
    let output = String::from_utf8_lossy(output);

    for line in output.lines() {
        let line = line.trim();

        if let Some(size) = line.strip_prefix("Total Size:") {
            let size = size.split_whitespace().collect::<Vec<_>>().join(" ");
            convert_size_to_bytes(&size)?;
            statistics.size = Some(size);
        } else if let Some(count) = line.strip_prefix("Snapshots processed:") {
            statistics.snapshot_count = Some(parse_count(line, count.trim())?);
        }
    }

    Ok(statistics)
}

use super::{FormatVersion, ParseError, convert_size_to_bytes, fields, parse_count};
use crate::result::BackupResult;

/// Parse the output of `restic backup`.
///
/// Recognised lines:
/// * `Files:  1 new,  0 changed,  0 unmodified`
/// * `Added to the repo: 10 B`
/// * `processed 1 files, 10 B in 0:05`
/// * `snapshot abc123 saved`
pub fn parse_backup_output(
    output: &[u8],
    version: FormatVersion,
) -> Result<BackupResult, ParseError> {
    let mut result = BackupResult::default();
    let output = String::from_utf8_lossy(output);

    for line in output.lines() {
        if line.starts_with("Files:") {
            let info = fields(line);
            let [_, new, _, modified, _, unmodified, _, ..] = info.as_slice() else {
                return Err(ParseError::TooFewFields(line.to_string(), "files statistics"));
            };

            result.file_stats.new_files = Some(parse_count(line, new)?);
            result.file_stats.modified_files = Some(parse_count(line, modified)?);
            result.file_stats.unmodified_files = Some(parse_count(line, unmodified)?);
        } else if line.starts_with("Added to the repo:") {
            let info = fields(line);
            let [_, _, _, _, .., value, unit] = info.as_slice() else {
                return Err(ParseError::TooFewFields(line.to_string(), "upload statistics"));
            };

            let uploaded = format!("{value} {unit}");
            convert_size_to_bytes(&uploaded)?;
            result.uploaded = Some(uploaded);
        } else if line.starts_with("processed") {
            let info = fields(line);
            let [_, total, _, value, unit, _, time, ..] = info.as_slice() else {
                return Err(ParseError::TooFewFields(
                    line.to_string(),
                    "file processing statistics",
                ));
            };

            result.file_stats.total_files = Some(parse_count(line, total)?);

            let size = format!("{value} {unit}");
            convert_size_to_bytes(&size)?;
            result.size = Some(size);

            result.processing_time = Some(version.parse_processing_time(time)?);
        } else if line.starts_with("snapshot") && line.ends_with("saved") {
            let info = fields(line);
            let [_, snapshot, _, ..] = info.as_slice() else {
                return Err(ParseError::TooFewFields(line.to_string(), "snapshot statistics"));
            };

            result.snapshot = Some((*snapshot).to_string());
        }
    }

    Ok(result)
}

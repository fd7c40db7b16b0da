//! Turns restic's human oriented output into typed records.
//!
//! restic only offers a stable machine readable format for some subcommands, so the
//! remaining output is parsed line by line. Lines that are not recognised are ignored,
//! which keeps the parser working when restic adds more chatter.
//!

use core::num::{ParseFloatError, ParseIntError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::result::{BackupResult, RepositoryStatistics};

pub mod backup;
pub mod check;
pub mod cleanup;
pub mod duration;
pub mod size;
pub mod snapshots;
pub mod stats;

pub use backup::parse_backup_output;
pub use check::parse_check_output;
pub use cleanup::{CleanupSummary, parse_cleanup_output};
pub use duration::ProcessingTime;
pub use size::convert_size_to_bytes;
pub use stats::parse_stats_output;

/// The restic output dialects understood by the parser.
///
/// The dialects only differ in how the elapsed time of a backup is printed.
#[derive(Hash, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatVersion {
    /// `MM:SS` where `SS` is hundredths of a minute.
    #[default]
    Legacy,

    /// A clock reading, `M:SS` or `H:MM:SS`.
    Clock,
}

impl FormatVersion {
    /// Parse the elapsed time token of a `processed` line.
    pub fn parse_processing_time(&self, time: &str) -> Result<ProcessingTime, ParseError> {
        match self {
            Self::Legacy => ProcessingTime::from_fractional_minutes(time),
            Self::Clock => ProcessingTime::from_clock(time),
        }
    }
}

/// Adapter from restic output to typed records.
pub trait OutputParser {
    /// Parse the output of `backup`.
    fn parse_backup(&self, output: &[u8]) -> Result<BackupResult, ParseError>;

    /// `true` only if the output of `check` confirms the repository has no errors.
    fn parse_check(&self, output: &[u8]) -> bool;

    /// Parse the output of `forget`.
    fn parse_cleanup(&self, output: &[u8]) -> Result<CleanupSummary, ParseError>;

    /// Parse the output of `stats`.
    fn parse_stats(&self, output: &[u8]) -> Result<RepositoryStatistics, ParseError>;
}

impl OutputParser for FormatVersion {
    fn parse_backup(&self, output: &[u8]) -> Result<BackupResult, ParseError> {
        parse_backup_output(output, *self)
    }

    fn parse_check(&self, output: &[u8]) -> bool {
        parse_check_output(output)
    }

    fn parse_cleanup(&self, output: &[u8]) -> Result<CleanupSummary, ParseError> {
        parse_cleanup_output(output)
    }

    fn parse_stats(&self, output: &[u8]) -> Result<RepositoryStatistics, ParseError> {
        parse_stats_output(output)
    }
}

/// Split a line on spaces, tabs and commas, dropping empty fields.
pub(crate) fn fields(line: &str) -> Vec<&str> {
    line.split([' ', '\t', ','])
        .filter(|field| !field.is_empty())
        .collect()
}

/// Parse a count from `line`.
pub(crate) fn parse_count(line: &str, field: &str) -> Result<u64, ParseError> {
    field
        .parse()
        .map_err(|e| ParseError::InvalidNumber(line.to_string(), field.to_string(), e))
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse {1}, too few fields in '{0}'")]
    TooFewFields(String, &'static str),

    #[error("Invalid number '{1}' in '{0}': {2}")]
    InvalidNumber(String, String, #[source] ParseIntError),

    #[error("Invalid data size format '{0}'")]
    InvalidSize(String),

    #[error("Invalid data size value '{0}': {1}")]
    InvalidSizeValue(String, #[source] ParseFloatError),

    #[error("Unknown unit '{0}' for data size")]
    UnknownUnit(String),

    #[error("Invalid processing time '{0}'")]
    InvalidDuration(String),
}

//! The structured result of a backup run.
//!

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::duration::ProcessingTime;

/// Name of the result file inside the output directory.
pub const OUTPUT_FILE: &str = "output.json";

/// Everything learned about a backup run, filled in step by step.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupResult {
    /// The id of the new snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,

    /// Size of the backed up data before deduplication, e.g. `10.5 MiB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Data uploaded to the repository in this run, e.g. `1.2 KiB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<String>,

    /// Time restic spent on the backup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<ProcessingTime>,

    /// File counts.
    #[serde(default, skip_serializing_if = "FileStatistics::is_empty")]
    pub file_stats: FileStatistics,

    /// The verdict of the integrity check.
    #[serde(default, skip_serializing_if = "Integrity::is_unknown")]
    pub integrity: Integrity,

    /// Repository wide statistics collected after cleanup.
    #[serde(default, skip_serializing_if = "RepositoryStatistics::is_empty")]
    pub repository: RepositoryStatistics,
}

/// File counts reported by a backup.
///
/// The counts are reported as is, `new + modified + unmodified` does not have to equal `total`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatistics {
    /// Files processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_files: Option<u64>,

    /// Files that did not exist in the parent snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_files: Option<u64>,

    /// Files changed since the parent snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_files: Option<u64>,

    /// Files unchanged since the parent snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unmodified_files: Option<u64>,
}

impl FileStatistics {
    /// No count has been reported.
    pub fn is_empty(&self) -> bool {
        self.total_files.is_none()
            && self.new_files.is_none()
            && self.modified_files.is_none()
            && self.unmodified_files.is_none()
    }
}

/// Result of the repository integrity check.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Integrity {
    /// The check has not run.
    #[default]
    Unknown,

    /// The check found no errors.
    Pass,

    /// The check did not confirm the repository is healthy.
    Fail,
}

impl Integrity {
    /// The check has not run.
    pub fn is_unknown(&self) -> bool {
        *self == Self::Unknown
    }
}

impl From<bool> for Integrity {
    fn from(value: bool) -> Self {
        if value { Self::Pass } else { Self::Fail }
    }
}

impl From<Option<bool>> for Integrity {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Unknown, Self::from)
    }
}

impl From<Integrity> for Option<bool> {
    fn from(value: Integrity) -> Self {
        match value {
            Integrity::Unknown => None,
            Integrity::Pass => Some(true),
            Integrity::Fail => Some(false),
        }
    }
}

/// Repository wide statistics.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStatistics {
    /// Size of the raw data stored in the repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Number of snapshots in the repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_count: Option<u64>,

    /// Snapshots forgotten by the last cleanup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshots_removed_on_last_cleanup: Option<u64>,
}

impl RepositoryStatistics {
    /// No statistic has been collected.
    pub fn is_empty(&self) -> bool {
        self.size.is_none()
            && self.snapshot_count.is_none()
            && self.snapshots_removed_on_last_cleanup.is_none()
    }
}

impl BackupResult {
    /// Write the result as pretty JSON to `output.json` in `output_dir`.
    pub fn write_output(&self, output_dir: &Path) -> Result<PathBuf, WriteOutputError> {
        fs::create_dir_all(output_dir).map_err(WriteOutputError::CreateDirectory)?;

        let contents = serde_json::to_string_pretty(self)?;
        let path = output_dir.join(OUTPUT_FILE);
        fs::write(&path, contents).map_err(WriteOutputError::WriteFile)?;

        Ok(path)
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum WriteOutputError {
    #[error("Failed to create output directory: {0}")]
    CreateDirectory(#[source] io::Error),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write output file: {0}")]
    WriteFile(#[source] io::Error),
}

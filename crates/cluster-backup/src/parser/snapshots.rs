use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A snapshot as listed by `restic snapshots --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Full snapshot id.
    pub id: String,

    /// When the snapshot was taken.
    pub time: DateTime<FixedOffset>,

    /// Id of the snapshot's root tree.
    pub tree: String,

    /// Paths that were backed up.
    pub paths: Vec<String>,

    /// The host recorded in the snapshot.
    pub hostname: String,

    /// The user that ran the backup.
    #[serde(default)]
    pub username: String,

    /// User id of the user that ran the backup.
    #[serde(default)]
    pub uid: u32,

    /// Group id of the user that ran the backup.
    #[serde(default)]
    pub gid: u32,

    /// Tags applied to the snapshot.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Parse the output of `restic snapshots --json`.
///
/// restic prints `null` rather than `[]` for an empty repository.
pub fn parse_snapshots(output: &[u8]) -> Result<Vec<Snapshot>, serde_json::Error> {
    let snapshots: Option<Vec<Snapshot>> = serde_json::from_slice(output)?;
    Ok(snapshots.unwrap_or_default())
}

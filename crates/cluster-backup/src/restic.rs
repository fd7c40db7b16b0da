//! A restic wrapper tying the command builder to a runner.
//!

use std::path::Path;

use thiserror::Error;

use crate::{
    command::CommandBuilder,
    config::ResticConfig,
    parser::snapshots::{Snapshot, parse_snapshots},
    runner::{RunError, Runner},
};

/// Runs restic subcommands built from a shared config.
#[derive(Debug)]
pub struct Restic<R> {
    config: ResticConfig,
    runner: R,
}

impl<R: Runner> Restic<R> {
    /// Create a new wrapper.
    pub fn new(config: ResticConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// The config the wrapper was created with.
    pub fn config(&self) -> &ResticConfig {
        &self.config
    }

    /// The runner used to invoke restic.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// A command builder for the wrapper's config.
    pub fn command(&self) -> CommandBuilder<'_> {
        CommandBuilder::new(&self.config)
    }

    /// Create a new repository.
    pub fn init(&self) -> Result<Vec<u8>, RunError> {
        self.runner.run(&self.command().init())
    }

    /// Back up a directory.
    pub fn backup(&self, path: &Path, tags: &[String]) -> Result<Vec<u8>, RunError> {
        self.runner.run(&self.command().backup(path, tags))
    }

    /// Check the repository's integrity.
    pub fn check(&self) -> Result<Vec<u8>, RunError> {
        self.runner.run(&self.command().check())
    }

    /// Read the repository's usage statistics.
    pub fn stats(&self) -> Result<Vec<u8>, RunError> {
        self.runner.run(&self.command().stats())
    }

    /// List snapshots, all of them when `snapshot_ids` is empty.
    pub fn list_snapshots(
        &self,
        snapshot_ids: &[String],
    ) -> Result<Vec<Snapshot>, ListSnapshotsError> {
        let output = self.runner.run(&self.command().list_snapshots(snapshot_ids))?;
        let snapshots = parse_snapshots(&output)?;
        Ok(snapshots)
    }

    /// Forget and prune the given snapshots. Does nothing when no ids are given.
    pub fn delete_snapshots(&self, snapshot_ids: &[String]) -> Result<Option<Vec<u8>>, RunError> {
        match self.command().delete_snapshots(snapshot_ids) {
            Some(arguments) => self.runner.run(&arguments).map(Some),
            None => Ok(None),
        }
    }

    /// Restore a backed up path from a snapshot, the latest one when `snapshot_id` is `None`.
    pub fn restore(
        &self,
        path: &Path,
        host: &str,
        snapshot_id: Option<&str>,
    ) -> Result<Vec<u8>, RunError> {
        self.runner.run(&self.command().restore(path, host, snapshot_id))
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ListSnapshotsError {
    #[error("Failed to list snapshots: {0}")]
    Run(#[from] RunError),

    #[error("Failed to deserialize snapshots: {0}")]
    Deserialize(#[from] serde_json::Error),
}

//! The backup workflow.
//!

use core::fmt;
use std::{fs, io, path::PathBuf};

use thiserror::Error;
use tracing::{error, info};

use crate::{
    config::BackupConfig,
    context::Context,
    parser::{OutputParser, ParseError},
    repository::RepositoryError,
    restic::Restic,
    result::{BackupResult, Integrity},
    retention::{CleanupError, RetentionPolicy},
    runner::{RunError, Runner},
};

/// The states of the workflow, in order. `Failed` can be reached from any step.
#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Nothing has run yet.
    Init,
    /// The repository exists.
    RepoEnsured,
    /// The backup was uploaded and its output parsed.
    BackedUp,
    /// The repository's integrity was checked.
    Checked,
    /// Old snapshots were forgotten.
    CleanedUp,
    /// Repository statistics were read.
    StatsCollected,
    /// Every step completed.
    Done,
    /// A step failed, the remaining steps were skipped.
    Failed,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "Init",
            Self::RepoEnsured => "Repository Ensured",
            Self::BackedUp => "Backed Up",
            Self::Checked => "Checked",
            Self::CleanedUp => "Cleaned Up",
            Self::StatsCollected => "Stats Collected",
            Self::Done => "Done",
            Self::Failed => "Failed",
        };

        write!(f, "{name}")
    }
}

/// Runs bootstrap, backup, check, cleanup and stats in order, stopping at the first failure.
pub struct Workflow<R, P> {
    restic: Restic<R>,
    parser: P,
    backup: BackupConfig,
    retention_policy: Option<RetentionPolicy>,
    state: Step,
    context: Context,
    result: BackupResult,
}

impl<R: Runner, P: OutputParser> Workflow<R, P> {
    /// Create a workflow. Nothing runs until [`Self::run`].
    pub fn new(
        restic: Restic<R>,
        parser: P,
        backup: BackupConfig,
        retention_policy: Option<RetentionPolicy>,
    ) -> Self {
        Self {
            restic,
            parser,
            backup,
            retention_policy,
            state: Step::Init,
            context: Context::default(),
            result: BackupResult::default(),
        }
    }

    /// The state the workflow reached.
    pub fn state(&self) -> Step {
        self.state
    }

    /// The result so far. After a failure this holds whatever the completed steps produced.
    pub fn result(&self) -> &BackupResult {
        &self.result
    }

    /// The restic wrapper the workflow drives.
    pub fn restic(&self) -> &Restic<R> {
        &self.restic
    }

    /// Run every step. A workflow can only run once.
    pub fn run(&mut self) -> Result<BackupResult, WorkflowError> {
        if self.state != Step::Init {
            return Err(WorkflowError::AlreadyRun(self.state));
        }

        match self.run_steps() {
            Ok(()) => {
                self.state = Step::Done;
                self.context.current_context = "Done";
                info!("{}Backup completed", self.context);
                Ok(self.result.clone())
            }
            Err(e) => {
                error!("{}Backup failed after '{}': {e}", self.context, self.state);
                self.state = Step::Failed;
                Err(e)
            }
        }
    }

    fn run_steps(&mut self) -> Result<(), WorkflowError> {
        // Ensure repository
        {
            self.context.current_context = "Ensure Repository";

            let scratch_dir = &self.restic.config().scratch_dir;
            fs::create_dir_all(scratch_dir)
                .map_err(|e| WorkflowError::ScratchDirectory(e, scratch_dir.clone()))?;

            let bootstrap = self.restic.ensure_repository()?;
            info!("{}Repository ready: {bootstrap:?}", self.context);
            self.state = Step::RepoEnsured;
        }

        // Backup
        {
            self.context.current_context = "Backup";

            let backup_dir = &self.backup.backup_dir;
            info!("{}Backing up {}", self.context, backup_dir.display());

            let output = self
                .restic
                .backup(backup_dir, &self.backup.tags)
                .map_err(|e| WorkflowError::Backup(e, backup_dir.clone()))?;
            self.result = self
                .parser
                .parse_backup(&output)
                .map_err(WorkflowError::ParseBackup)?;

            info!(
                "{}Saved snapshot {}",
                self.context,
                self.result.snapshot.as_deref().unwrap_or("<unknown>")
            );
            self.state = Step::BackedUp;
        }

        // Check
        {
            self.context.current_context = "Check";

            let output = self.restic.check().map_err(WorkflowError::Check)?;
            self.result.integrity = Integrity::from(self.parser.parse_check(&output));

            info!("{}Repository integrity: {:?}", self.context, self.result.integrity);
            self.state = Step::Checked;
        }

        // Cleanup
        let removed = {
            self.context.current_context = "Cleanup";

            let output = match &self.retention_policy {
                Some(policy) => self.restic.cleanup(policy)?,
                None => None,
            };

            let removed = match output {
                Some(output) => {
                    let summary = self
                        .parser
                        .parse_cleanup(&output)
                        .map_err(WorkflowError::ParseCleanup)?;
                    info!(
                        "{}Kept {} snapshots, removed {}",
                        self.context, summary.kept, summary.removed
                    );

                    let dry_run = self
                        .retention_policy
                        .as_ref()
                        .is_some_and(|policy| policy.dry_run);
                    if dry_run { None } else { Some(summary.removed) }
                }
                None => None,
            };

            self.state = Step::CleanedUp;
            removed
        };

        // Stats
        {
            self.context.current_context = "Stats";

            let output = self.restic.stats().map_err(WorkflowError::Stats)?;
            let mut statistics = self
                .parser
                .parse_stats(&output)
                .map_err(WorkflowError::ParseStats)?;
            statistics.snapshots_removed_on_last_cleanup = removed;
            self.result.repository = statistics;

            self.state = Step::StatsCollected;
        }

        Ok(())
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("The workflow already ran and reached '{0}'")]
    AlreadyRun(Step),

    #[error("Failed to create scratch directory '{1}': {0}")]
    ScratchDirectory(#[source] io::Error, PathBuf),

    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("Failed to back up '{1}': {0}")]
    Backup(#[source] RunError, PathBuf),

    #[error("Failed to parse backup output: {0}")]
    ParseBackup(#[source] ParseError),

    #[error("Failed to check repository: {0}")]
    Check(#[source] RunError),

    #[error("Failed to clean up snapshots: {0}")]
    Cleanup(#[from] CleanupError),

    #[error("Failed to parse cleanup output: {0}")]
    ParseCleanup(#[source] ParseError),

    #[error("Failed to read repository stats: {0}")]
    Stats(#[source] RunError),

    #[error("Failed to parse stats output: {0}")]
    ParseStats(#[source] ParseError),
}

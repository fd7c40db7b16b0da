//! # cluster-backup
//! Drives restic through a backup workflow and turns its human oriented output into a
//! structured result and Prometheus metrics.
//!

pub mod command;
pub mod config;
pub mod context;
pub mod metrics;
pub mod parser;
pub mod repository;
pub mod restic;
pub mod result;
pub mod retention;
pub mod runner;
pub mod workflow;

pub use config::{Config, LoadConfigError, ValidateConfigError};
pub use restic::Restic;
pub use result::{BackupResult, FileStatistics, Integrity, RepositoryStatistics};
pub use runner::{ResticCli, RunError, Runner};
pub use workflow::{Step, Workflow, WorkflowError};

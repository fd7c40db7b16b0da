//! # common
//!

#![allow(dead_code)]

use core::cell::RefCell;
use std::{collections::HashMap, fs, path::Path};

use cluster_backup::{
    RunError, Runner,
    config::{BackupConfig, ResticConfig},
};

pub const BACKUP_OUTPUT: &str = "open repository
repository 3f2c1b9a opened successfully, password is correct
created new cache in /tmp/restic/scratch/restic-cache

Files:           1 new,     0 changed,     0 unmodified
Dirs:            2 new,     0 changed,     0 unmodified
Added to the repo: 10 B

processed 1 files, 10 B in 0:05
snapshot abc123 saved
";

pub const CHECK_OUTPUT: &str = "using temporary cache in /tmp/restic-check-cache-1234
repository 3f2c1b9a opened successfully, password is correct
created new cache in /tmp/restic-check-cache-1234
create exclusive lock for repository
load indexes
check all packs
check snapshots, trees and blobs
no errors were found
";

pub const FORGET_OUTPUT: &str = "Applying Policy: keep the last 1 snapshots
keep 1 snapshots:
ID        Time                 Host        Tags        Reasons        Paths
-----------------------------------------------------------------------------
4bba301e  2024-01-02 10:00:00  node-1                  last snapshot  /tmp/restic/backup
-----------------------------------------------------------------------------
1 snapshots

remove 2 snapshots:
ID        Time                 Host        Tags        Paths
------------------------------------------------------------------
8c2e1d0a  2024-01-01 10:00:00  node-1                  /tmp/restic/backup
9d3f2e1b  2023-12-31 10:00:00  node-1                  /tmp/restic/backup
------------------------------------------------------------------
2 snapshots
";

pub const STATS_OUTPUT: &str = "Stats in raw-data mode:
     Snapshots processed:  3
        Total Blob Count:  12
              Total Size:  1.125 KiB
";

/// A runner that answers each subcommand with a scripted output and records every call.
#[derive(Default)]
pub struct MockRunner {
    responses: HashMap<&'static str, Result<String, String>>,
    calls: RefCell<Vec<Vec<String>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `subcommand` successfully with `output`.
    pub fn respond(mut self, subcommand: &'static str, output: &str) -> Self {
        self.responses.insert(subcommand, Ok(output.to_string()));
        self
    }

    /// Fail `subcommand` with `message`.
    pub fn fail(mut self, subcommand: &'static str, message: &str) -> Self {
        self.responses.insert(subcommand, Err(message.to_string()));
        self
    }

    /// A runner answering every workflow step with canonical output.
    pub fn canonical() -> Self {
        Self::new()
            .respond("snapshots", "[]")
            .respond("backup", BACKUP_OUTPUT)
            .respond("check", CHECK_OUTPUT)
            .respond("forget", FORGET_OUTPUT)
            .respond("stats", STATS_OUTPUT)
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    /// The subcommand of each call, in order.
    pub fn subcommands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| call.first().cloned())
            .collect()
    }
}

impl Runner for MockRunner {
    fn run(&self, arguments: &[String]) -> Result<Vec<u8>, RunError> {
        self.calls.borrow_mut().push(arguments.to_vec());

        let subcommand = arguments.first().map(String::as_str).unwrap_or_default();
        match self.responses.get(subcommand) {
            Some(Ok(output)) => Ok(output.clone().into_bytes()),
            Some(Err(message)) => Err(RunError::CommandErrored(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// A restic config with its scratch directory inside `root`.
pub fn test_restic_config(root: &Path) -> ResticConfig {
    ResticConfig {
        scratch_dir: root.join("scratch"),
        ..ResticConfig::default()
    }
}

/// A backup config whose backup directory inside `root` holds a single file.
pub fn test_backup_config(root: &Path) -> BackupConfig {
    let backup_dir = root.join("backup");
    fs::create_dir_all(&backup_dir).unwrap();
    fs::write(backup_dir.join("objects.yaml"), "kind: List").unwrap();

    BackupConfig {
        backup_dir,
        output_dir: Some(root.join("output")),
        ..BackupConfig::default()
    }
}

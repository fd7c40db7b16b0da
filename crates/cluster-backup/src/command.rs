//! Builds restic argument vectors.
//!

use std::path::Path;

use crate::{
    config::ResticConfig,
    retention::{RetentionError, RetentionPolicy},
};

/// Name of the cache directory inside the scratch directory.
pub const CACHE_DIRECTORY: &str = "restic-cache";

/// Builds the arguments for each restic subcommand from the config.
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder<'a> {
    config: &'a ResticConfig,
}

impl<'a> CommandBuilder<'a> {
    /// Create a builder for the given config.
    pub fn new(config: &'a ResticConfig) -> Self {
        Self { config }
    }

    /// Cheap read only command used to find out if the repository exists.
    pub fn probe(&self) -> Vec<String> {
        self.finish(args(["snapshots", "--json"]))
    }

    /// Create a new repository.
    pub fn init(&self) -> Vec<String> {
        self.finish(args(["init"]))
    }

    /// Back up `path`, tagging the snapshot with `tags` in order.
    pub fn backup(&self, path: &Path, tags: &[String]) -> Vec<String> {
        let mut arguments = args(["backup"]);
        arguments.push(path.to_string_lossy().into_owned());

        if !self.config.hostname.is_empty() {
            arguments.push("--host".to_string());
            arguments.push(self.config.hostname.clone());
        }

        for tag in tags {
            arguments.push("--tag".to_string());
            arguments.push(tag.clone());
        }

        self.finish(arguments)
    }

    /// Verify the repository's integrity.
    pub fn check(&self) -> Vec<String> {
        self.finish(args(["check"]))
    }

    /// Forget snapshots according to a retention policy.
    ///
    /// Returns `None` when the policy has no name or value, an unqualified `forget` is
    /// never built.
    pub fn forget(&self, policy: &RetentionPolicy) -> Result<Option<Vec<String>>, RetentionError> {
        let Some(kind) = policy.validate()? else {
            return Ok(None);
        };

        let mut arguments = args(["forget", kind.flag()]);
        arguments.push(policy.value.trim().to_string());

        if policy.prune {
            arguments.push("--prune".to_string());
        }

        if policy.dry_run {
            arguments.push("--dry-run".to_string());
        }

        Ok(Some(self.finish(arguments)))
    }

    /// Repository usage statistics.
    pub fn stats(&self) -> Vec<String> {
        let mut arguments = self.with_cache(args(["stats"]));
        arguments.extend(args(["--mode=raw-data", "--quiet"]));
        self.with_cacert(arguments)
    }

    /// List snapshots as JSON, all of them when `snapshot_ids` is empty.
    pub fn list_snapshots(&self, snapshot_ids: &[String]) -> Vec<String> {
        let mut arguments = self.finish(args(["snapshots", "--json", "--quiet", "--no-lock"]));
        arguments.extend(snapshot_ids.iter().cloned());
        arguments
    }

    /// Forget and prune the given snapshots, `None` when there is nothing to delete.
    pub fn delete_snapshots(&self, snapshot_ids: &[String]) -> Option<Vec<String>> {
        if snapshot_ids.is_empty() {
            return None;
        }

        let mut arguments = self.finish(args(["forget", "--quiet", "--prune"]));
        arguments.extend(snapshot_ids.iter().cloned());
        Some(arguments)
    }

    /// Restore `path` as it was backed up by `host` into the directory containing `path`.
    ///
    /// Restores the latest snapshot when no snapshot is given.
    pub fn restore(&self, path: &Path, host: &str, snapshot_id: Option<&str>) -> Vec<String> {
        let mut arguments = args(["restore", snapshot_id.unwrap_or("latest")]);

        arguments.push("--path".to_string());
        arguments.push(path.to_string_lossy().into_owned());
        arguments.push("--host".to_string());
        arguments.push(host.to_string());

        let target = path.parent().unwrap_or(path);
        arguments.push("--target".to_string());
        arguments.push(target.to_string_lossy().into_owned());

        self.finish(arguments)
    }

    fn finish(&self, arguments: Vec<String>) -> Vec<String> {
        self.with_cacert(self.with_cache(arguments))
    }

    fn with_cache(&self, mut arguments: Vec<String>) -> Vec<String> {
        if self.config.enable_cache {
            let cache_dir = self.config.scratch_dir.join(CACHE_DIRECTORY);
            arguments.push("--cache-dir".to_string());
            arguments.push(cache_dir.to_string_lossy().into_owned());
        } else {
            arguments.push("--no-cache".to_string());
        }

        arguments
    }

    fn with_cacert(&self, mut arguments: Vec<String>) -> Vec<String> {
        if let Some(cacert_file) = &self.config.cacert_file {
            arguments.push("--cacert".to_string());
            arguments.push(cacert_file.to_string_lossy().into_owned());
        }

        arguments
    }
}

fn args<const N: usize>(arguments: [&str; N]) -> Vec<String> {
    arguments.iter().map(ToString::to_string).collect()
}

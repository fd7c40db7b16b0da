//! Cluster backup config
//!

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use shared::{CertificateError, RootCertificates};
use thiserror::Error;

use crate::{
    metrics::{MetricsError, parse_labels},
    parser::FormatVersion,
    retention::{RetentionError, RetentionPolicy},
};

/// How to invoke restic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResticConfig {
    /// Path to the restic executable.
    pub executable: PathBuf,

    /// The repository, passed to restic as `RESTIC_REPOSITORY`.
    #[serde(default)]
    pub repository: String,

    /// Working directory for restic, also holds the cache.
    pub scratch_dir: PathBuf,

    /// Use `<scratch_dir>/restic-cache` instead of `--no-cache`.
    #[serde(default)]
    pub enable_cache: bool,

    /// Overrides the host recorded in new snapshots when not empty.
    #[serde(default)]
    pub hostname: String,

    /// Root certificate to trust when talking to the repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cacert_file: Option<PathBuf>,

    /// Directory where the repository secrets are mounted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_dir: Option<PathBuf>,

    /// Extra environment variables for restic, e.g. storage credentials.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

impl Default for ResticConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("/usr/local/bin/restic"),
            repository: String::new(),
            scratch_dir: PathBuf::from("/tmp/restic/scratch"),
            enable_cache: false,
            hostname: String::new(),
            cacert_file: None,
            secret_dir: None,
            environment: BTreeMap::new(),
        }
    }
}

/// What to back up and where to put the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// The directory the source collector dumped its files into.
    pub backup_dir: PathBuf,

    /// Where `output.json` is written, nothing is written when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Tags to apply to the snapshot.
    #[serde(default)]
    pub tags: Vec<String>,

    /// The restic output dialect.
    #[serde(default)]
    pub format_version: FormatVersion,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            backup_dir: PathBuf::from("/tmp/restic/backup"),
            output_dir: Some(PathBuf::from("/tmp/restic/output")),
            tags: Vec::new(),
            format_version: FormatVersion::default(),
        }
    }
}

/// Metrics export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Export metrics at all.
    #[serde(default)]
    pub enabled: bool,

    /// Where `metrics.prom` is written, the backup's output directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_dir: Option<PathBuf>,

    /// Pushgateway to push the metrics to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushgateway_url: Option<String>,

    /// Constant `key=value` labels applied to every metric.
    #[serde(default)]
    pub labels: Vec<String>,
}

/// The program's config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for the rolling log files.
    pub log_directory: PathBuf,

    /// Minimum level to log, e.g. `info` or `debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// How to invoke restic.
    pub restic: ResticConfig,

    /// What to back up.
    pub backup: BackupConfig,

    /// Which snapshots to forget after the backup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_policy: Option<RetentionPolicy>,

    /// Metrics export.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Tries to load a config from a toml file.
    pub fn load_toml(file_path: &Path) -> Result<Self, LoadConfigError> {
        if !file_path.exists() {
            return Err(LoadConfigError::NoFile);
        }

        let contents = fs::read_to_string(file_path).map_err(LoadConfigError::Read)?;
        let config = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Checks the parts of the config that would otherwise only fail halfway through a run.
    pub fn validate(&self) -> Result<(), ValidateConfigError> {
        if let Some(cacert_file) = &self.restic.cacert_file {
            RootCertificates::load(cacert_file)?;
        }

        if let Some(retention_policy) = &self.retention_policy {
            retention_policy.validate()?;
        }

        parse_labels(&self.metrics.labels)?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_directory: PathBuf::from("./logs"),
            log_level: default_log_level(),
            restic: ResticConfig::default(),
            backup: BackupConfig::default(),
            retention_policy: Some(RetentionPolicy::default()),
            metrics: MetricsConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("The file does not exist.")]
    NoFile,

    #[error("Failed to read the file:\n{0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to deserialize the file:\n{0}")]
    Deserialize(#[from] toml::de::Error),
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ValidateConfigError {
    #[error("Invalid CA certificate:\n{0}")]
    Certificate(#[from] CertificateError),

    #[error("Invalid retention policy:\n{0}")]
    RetentionPolicy(#[from] RetentionError),

    #[error("Invalid metrics labels:\n{0}")]
    Labels(#[from] MetricsError),
}

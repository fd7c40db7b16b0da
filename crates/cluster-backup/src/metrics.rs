//! Prometheus gauges derived from a backup result.
//!

use core::fmt::Write as _;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::MetricsConfig,
    parser::{ParseError, convert_size_to_bytes},
    result::{BackupResult, Integrity},
};

/// Job the metrics are pushed under.
pub const JOB_NAME: &str = "cluster-backup";

/// Name of the metrics file inside the metrics directory.
pub const METRICS_FILE: &str = "metrics.prom";

const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

/// A single gauge sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    /// Fully qualified metric name.
    pub name: &'static str,

    /// Help text.
    pub help: &'static str,

    /// The sample.
    pub value: f64,
}

/// The gauges for one backup run.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupMetrics {
    labels: Vec<(String, String)>,
    gauges: Vec<Gauge>,
}

impl BackupMetrics {
    /// Derive the gauges from `result`.
    ///
    /// Only the fields present in the result become gauges. `success` reports whether the
    /// whole workflow completed.
    pub fn new(
        result: &BackupResult,
        success: bool,
        labels: &[String],
    ) -> Result<Self, MetricsError> {
        let labels = parse_labels(labels)?;
        let mut gauges = Vec::new();

        let mut push = |name: &'static str, help: &'static str, value: Option<f64>| {
            if let Some(value) = value {
                gauges.push(Gauge { name, help, value });
            }
        };

        push(
            "restic_backup_success",
            "Whether the last backup completed successfully",
            Some(if success { 1.0 } else { 0.0 }),
        );
        push(
            "restic_backup_data_size_bytes",
            "Total size of the target data to backup (in bytes)",
            result.size.as_deref().map(convert_size_to_bytes).transpose()?,
        );
        push(
            "restic_backup_data_uploaded_bytes",
            "Amount of data uploaded to the repository in this session (in bytes)",
            result.uploaded.as_deref().map(convert_size_to_bytes).transpose()?,
        );
        push(
            "restic_backup_data_processing_time_seconds",
            "Total time taken to backup the target data",
            result.processing_time.map(|time| count(time.as_seconds())),
        );
        push(
            "restic_backup_total_files",
            "Total number of files that has been backed up",
            result.file_stats.total_files.map(count),
        );
        push(
            "restic_backup_new_files",
            "Total number of new files that has been created since last backup",
            result.file_stats.new_files.map(count),
        );
        push(
            "restic_backup_modified_files",
            "Total number of files that has been modified since last backup",
            result.file_stats.modified_files.map(count),
        );
        push(
            "restic_backup_unmodified_files",
            "Total number of files that has not been changed since last backup",
            result.file_stats.unmodified_files.map(count),
        );
        push(
            "restic_repository_integrity",
            "Result of repository integrity check after last backup",
            match result.integrity {
                Integrity::Unknown => None,
                Integrity::Pass => Some(1.0),
                Integrity::Fail => Some(0.0),
            },
        );
        push(
            "restic_repository_size_bytes",
            "Size of the raw data stored in the repository (in bytes)",
            result
                .repository
                .size
                .as_deref()
                .map(convert_size_to_bytes)
                .transpose()?,
        );
        push(
            "restic_repository_snapshot_count",
            "Number of snapshots in the repository",
            result.repository.snapshot_count.map(count),
        );
        push(
            "restic_repository_snapshots_removed_on_last_cleanup",
            "Number of snapshots removed by the last cleanup",
            result.repository.snapshots_removed_on_last_cleanup.map(count),
        );

        gauges.sort_by(|a, b| a.name.cmp(b.name));

        Ok(Self { labels, gauges })
    }

    /// The gauges, sorted by name.
    pub fn gauges(&self) -> &[Gauge] {
        &self.gauges
    }

    /// The value of the gauge called `name`.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.gauges
            .iter()
            .find(|gauge| gauge.name == name)
            .map(|gauge| gauge.value)
    }

    /// Render the gauges in the Prometheus text exposition format.
    pub fn to_text(&self) -> String {
        let labels = if self.labels.is_empty() {
            String::new()
        } else {
            let pairs: Vec<String> = self
                .labels
                .iter()
                .map(|(key, value)| format!("{key}=\"{}\"", escape_label_value(value)))
                .collect();
            format!("{{{}}}", pairs.join(","))
        };

        let mut text = String::new();
        for gauge in &self.gauges {
            let _ = writeln!(text, "# HELP {} {}", gauge.name, gauge.help);
            let _ = writeln!(text, "# TYPE {} gauge", gauge.name);
            let _ = writeln!(text, "{}{labels} {}", gauge.name, gauge.value);
        }

        text
    }

    /// Write the gauges to `metrics.prom` in `directory`.
    pub fn write_text_file(&self, directory: &Path) -> Result<PathBuf, MetricsError> {
        fs::create_dir_all(directory).map_err(MetricsError::CreateDirectory)?;

        let path = directory.join(METRICS_FILE);
        fs::write(&path, self.to_text()).map_err(MetricsError::WriteFile)?;

        Ok(path)
    }

    /// Push the gauges to a Prometheus pushgateway, replacing the job's previous metrics.
    pub fn push(&self, pushgateway_url: &str) -> Result<(), MetricsError> {
        let url = format!(
            "{}/metrics/job/{JOB_NAME}",
            pushgateway_url.trim_end_matches('/')
        );

        reqwest::blocking::Client::new()
            .put(url)
            .header(CONTENT_TYPE, TEXT_FORMAT)
            .body(self.to_text())
            .send()?
            .error_for_status()?;

        Ok(())
    }

    /// Write and push the metrics as configured.
    ///
    /// The file goes to the metrics directory, or next to `output.json` in `output_dir` when
    /// no metrics directory is set. A failed push is logged and ignored.
    pub fn export(
        &self,
        config: &MetricsConfig,
        output_dir: Option<&Path>,
    ) -> Result<(), MetricsError> {
        if let Some(metrics_dir) = config.metrics_dir.as_deref().or(output_dir) {
            let path = self.write_text_file(metrics_dir)?;
            info!("Wrote metrics to {}", path.display());
        }

        if let Some(pushgateway_url) = &config.pushgateway_url {
            match self.push(pushgateway_url) {
                Ok(()) => info!("Pushed metrics to {pushgateway_url}"),
                Err(error) => warn!("Could not push metrics to {pushgateway_url}: {error}"),
            }
        }

        Ok(())
    }
}

/// Parse `key=value` labels.
pub fn parse_labels(labels: &[String]) -> Result<Vec<(String, String)>, MetricsError> {
    labels
        .iter()
        .map(|label| {
            let (key, value) = label
                .split_once('=')
                .ok_or_else(|| MetricsError::InvalidLabel(label.clone()))?;
            let key = key.trim();

            if !is_valid_label_name(key) {
                return Err(MetricsError::InvalidLabel(label.clone()));
            }

            Ok((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

fn is_valid_label_name(name: &str) -> bool {
    let mut characters = name.chars();

    match characters.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    !name.starts_with("__") && characters.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[allow(clippy::as_conversions, clippy::cast_precision_loss)]
fn count(value: u64) -> f64 {
    value as f64
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Invalid label '{0}', expected 'key=value'")]
    InvalidLabel(String),

    #[error("Invalid result value: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to create metrics directory: {0}")]
    CreateDirectory(#[source] io::Error),

    #[error("Failed to write metrics file: {0}")]
    WriteFile(#[source] io::Error),

    #[error("Failed to push metrics: {0}")]
    Push(#[from] reqwest::Error),
}

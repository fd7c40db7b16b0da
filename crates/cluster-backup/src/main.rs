//! # cluster-backup
//! Backs up a directory with restic, then writes the result and metrics.
//!

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::{fs, path::PathBuf, process::ExitCode};

use cluster_backup::{Config, ResticCli, Restic, Workflow, metrics::BackupMetrics};
use mimalloc::MiMalloc;
use shared::{Failure, init_logger};
use tracing::{error, info};

fn main() -> ExitCode {
    let config_path = std::env::args()
        .skip(1)
        .find(|arg| arg != "init")
        .map_or_else(|| PathBuf::from("./config.toml"), PathBuf::from);

    // Initialize config if args include 'init'.
    if std::env::args().any(|arg| arg.eq("init")) {
        let config = Config::default();
        let contents =
            toml::to_string_pretty(&config).or_log_and_panic("Could not serialize config file");
        fs::write(&config_path, contents).or_log_and_panic("Could not create config file");
        return ExitCode::SUCCESS;
    }

    // Load config
    let config = Config::load_toml(&config_path).or_log_and_panic("Could not load config");
    let _logger = init_logger(&config.log_directory, &config.log_level)
        .or_log_and_panic("Could not create logger");
    if config.validate().or_log("Invalid config").is_none() {
        return ExitCode::FAILURE;
    }

    // Run the workflow
    let runner = ResticCli::new(&config.restic);
    let restic = Restic::new(config.restic.clone(), runner);
    let mut workflow = Workflow::new(
        restic,
        config.backup.format_version,
        config.backup.clone(),
        config.retention_policy.clone(),
    );
    let outcome = workflow.run();

    let mut success = outcome.is_ok();

    // Export metrics, also for failed runs.
    if config.metrics.enabled {
        let exported = BackupMetrics::new(workflow.result(), success, &config.metrics.labels)
            .and_then(|metrics| {
                metrics.export(&config.metrics, config.backup.output_dir.as_deref())
            });

        if exported.or_log("Could not export metrics").is_none() {
            success = false;
        }
    }

    // Write output
    if let (Ok(result), Some(output_dir)) = (&outcome, &config.backup.output_dir) {
        match result.write_output(output_dir) {
            Ok(path) => info!("Wrote output to {}", path.display()),
            Err(e) => {
                error!("Could not write output: {e}");
                success = false;
            }
        }
    }

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

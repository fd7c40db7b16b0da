//! Runs restic.
//!

use std::{ffi::OsString, io, path::PathBuf, process::Command};

use thiserror::Error;
use tracing::{debug, error};

use crate::config::ResticConfig;

/// File inside the secret directory holding the repository password.
pub const PASSWORD_FILE: &str = "RESTIC_PASSWORD";

/// Something that can run restic with a set of arguments.
pub trait Runner {
    /// Run restic, returning its stdout when it exits successfully.
    fn run(&self, arguments: &[String]) -> Result<Vec<u8>, RunError>;
}

/// Runs the restic executable as a child process.
#[derive(Debug, Clone)]
pub struct ResticCli {
    /// The restic executable.
    pub executable: PathBuf,

    /// The directory restic is run in.
    pub working_directory: PathBuf,

    /// The environment restic is run with, on top of the inherited one.
    pub environment: Vec<(String, OsString)>,
}

impl ResticCli {
    /// Create a runner from the restic config.
    pub fn new(config: &ResticConfig) -> Self {
        let mut environment = Vec::new();

        if !config.repository.is_empty() {
            environment.push((
                "RESTIC_REPOSITORY".to_string(),
                OsString::from(&config.repository),
            ));
        }

        if let Some(secret_dir) = &config.secret_dir {
            environment.push((
                "RESTIC_PASSWORD_FILE".to_string(),
                secret_dir.join(PASSWORD_FILE).into_os_string(),
            ));
        }

        for (key, value) in &config.environment {
            environment.push((key.clone(), OsString::from(value)));
        }

        Self {
            executable: config.executable.clone(),
            working_directory: config.scratch_dir.clone(),
            environment,
        }
    }
}

impl Runner for ResticCli {
    fn run(&self, arguments: &[String]) -> Result<Vec<u8>, RunError> {
        let command_line = format!("{} {}", self.executable.display(), arguments.join(" "));
        debug!("Running '{command_line}'");

        let output = Command::new(&self.executable)
            .args(arguments)
            .current_dir(&self.working_directory)
            .envs(self.environment.iter().map(|(key, value)| (key, value)))
            .output()
            .map_err(RunError::RunCommand)?;

        if !output.status.success() {
            let mut combined = output.stdout;
            if !combined.is_empty() && !combined.ends_with(b"\n") {
                combined.push(b'\n');
            }
            combined.extend_from_slice(&output.stderr);
            let combined = String::from_utf8_lossy(&combined);

            error!("Command '{command_line}' failed with {}, output:\n{combined}", output.status);

            let message = error_message(&combined);
            if message.is_empty() {
                return Err(RunError::CommandErrored(format!("restic {}", output.status)));
            }

            return Err(RunError::CommandErrored(message));
        }

        Ok(output.stdout)
    }
}

/// Reduce restic's output to the line carrying the diagnostic, the last one.
pub fn error_message(output: &str) -> String {
    let output = output.strip_suffix('\n').unwrap_or(output);

    output
        .split('\n')
        .next_back()
        .unwrap_or_default()
        .trim_end_matches('\r')
        .to_string()
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to run command:\n{0}")]
    RunCommand(#[source] io::Error),

    #[error("{0}")]
    CommandErrored(String),
}

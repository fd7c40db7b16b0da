//! Retention policies and the cleanup they drive.
//!

use core::{num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    restic::Restic,
    runner::{RunError, Runner},
};

/// The kinds of retention policy restic understands.
#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    /// Keep the last `n` snapshots.
    KeepLast,
    /// Keep the last `n` hourly snapshots.
    KeepHourly,
    /// Keep the last `n` daily snapshots.
    KeepDaily,
    /// Keep the last `n` weekly snapshots.
    KeepWeekly,
    /// Keep the last `n` monthly snapshots.
    KeepMonthly,
    /// Keep the last `n` yearly snapshots.
    KeepYearly,
    /// Keep snapshots with a tag.
    KeepTag,
    /// Keep snapshots newer than a duration such as `1y2m3d4h`.
    KeepWithin,
}

impl Policy {
    /// The restic flag for the policy.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::KeepLast => "--keep-last",
            Self::KeepHourly => "--keep-hourly",
            Self::KeepDaily => "--keep-daily",
            Self::KeepWeekly => "--keep-weekly",
            Self::KeepMonthly => "--keep-monthly",
            Self::KeepYearly => "--keep-yearly",
            Self::KeepTag => "--keep-tag",
            Self::KeepWithin => "--keep-within",
        }
    }
}

impl FromStr for Policy {
    type Err = RetentionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches("--") {
            "keep-last" => Ok(Self::KeepLast),
            "keep-hourly" => Ok(Self::KeepHourly),
            "keep-daily" => Ok(Self::KeepDaily),
            "keep-weekly" => Ok(Self::KeepWeekly),
            "keep-monthly" => Ok(Self::KeepMonthly),
            "keep-yearly" => Ok(Self::KeepYearly),
            "keep-tag" => Ok(Self::KeepTag),
            "keep-within" => Ok(Self::KeepWithin),
            _ => Err(RetentionError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Which snapshots survive a cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// The policy name, e.g. `keep-last`.
    #[serde(default)]
    pub policy: String,

    /// The policy's value, a count, tag or duration depending on the policy.
    #[serde(default)]
    pub value: String,

    /// Reclaim the space of forgotten snapshots.
    #[serde(default)]
    pub prune: bool,

    /// Only report what would be forgotten.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            policy: "keep-last".to_string(),
            value: "5".to_string(),
            prune: false,
            dry_run: false,
        }
    }
}

impl RetentionPolicy {
    /// A policy without a name or value does nothing.
    pub fn is_noop(&self) -> bool {
        self.policy.trim().is_empty() || self.value.trim().is_empty()
    }

    /// Checks the policy name and value, returning `None` for a no-op policy.
    pub fn validate(&self) -> Result<Option<Policy>, RetentionError> {
        if self.is_noop() {
            return Ok(None);
        }

        let policy = Policy::from_str(self.policy.trim())?;
        let value = self.value.trim();

        match policy {
            Policy::KeepTag => {}
            Policy::KeepWithin => validate_within(value)?,
            _ => {
                value
                    .parse::<u64>()
                    .map_err(|e| RetentionError::InvalidCount(value.to_string(), e))?;
            }
        }

        Ok(Some(policy))
    }
}

/// Durations look like `1y5m7d2h`.
fn validate_within(value: &str) -> Result<(), RetentionError> {
    let mut has_digits = false;

    for character in value.chars() {
        if character.is_ascii_digit() {
            has_digits = true;
            continue;
        }

        if !matches!(character, 'y' | 'm' | 'd' | 'h') {
            return Err(RetentionError::UnknownUnit(character, value.to_string()));
        }

        if !has_digits {
            return Err(RetentionError::InvalidDuration(value.to_string()));
        }
        has_digits = false;
    }

    if has_digits {
        return Err(RetentionError::InvalidDuration(value.to_string()));
    }

    Ok(())
}

impl<R: Runner> Restic<R> {
    /// Forget old snapshots according to `policy`.
    ///
    /// Returns `None` without running restic when the policy is a no-op.
    pub fn cleanup(&self, policy: &RetentionPolicy) -> Result<Option<Vec<u8>>, CleanupError> {
        let Some(arguments) = self.command().forget(policy)? else {
            info!("No retention policy, skipping cleanup");
            return Ok(None);
        };

        let output = self.runner().run(&arguments)?;
        Ok(Some(output))
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum RetentionError {
    #[error("Unknown retention policy '{0}'")]
    UnknownPolicy(String),

    #[error("Retention value '{0}' is not a count: {1}")]
    InvalidCount(String, #[source] ParseIntError),

    #[error("Unknown unit '{0}' in duration '{1}'")]
    UnknownUnit(char, String),

    #[error("Invalid duration '{0}'")]
    InvalidDuration(String),
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("Invalid retention policy: {0}")]
    Policy(#[from] RetentionError),

    #[error("Failed to forget snapshots: {0}")]
    Run(#[from] RunError),
}

//! Repository bootstrap.
//!

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    restic::Restic,
    runner::{RunError, Runner},
};

/// What [`Restic::ensure_repository`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// The probe succeeded, the repository was left alone.
    Existing,

    /// The probe failed and a new repository was created.
    Initialized,
}

impl<R: Runner> Restic<R> {
    /// Makes sure the repository exists, initializing it when the probe fails.
    ///
    /// Any probe failure is treated as a missing repository, only the failure of `init` is
    /// an error.
    pub fn ensure_repository(&self) -> Result<Bootstrap, RepositoryError> {
        match self.runner().run(&self.command().probe()) {
            Ok(_) => Ok(Bootstrap::Existing),
            Err(error) => {
                warn!("Repository probe failed, initializing a new repository: {error}");

                self.init().map_err(RepositoryError::Init)?;
                info!("Initialized repository");

                Ok(Bootstrap::Initialized)
            }
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Failed to initialize repository: {0}")]
    Init(#[source] RunError),
}

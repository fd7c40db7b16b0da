//! # Shared
//! Components shared between the backup crates: logging, failure helpers and certificate
//! loading.
//!

#![warn(missing_docs)]

mod certificates;
mod failure;
mod logger;

pub use certificates::{CertificateError, RootCertificates};
pub use failure::{Failure, log_and_panic};
pub use logger::{LoggerError, init_logger};

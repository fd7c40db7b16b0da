use core::fmt::Display;

use tracing::error;

/// Log an error with a message then panic.
///
/// Only for failures before a logger exists, the panic message is the only trace left.
pub fn log_and_panic<Err: Display>(error: Err, message: &str) -> ! {
    error!("{message}: {error}");

    panic!("{message}: {error}");
}

/// Extension trait for results that end the run when they fail.
pub trait Failure<T> {
    /// Log the error, returning `None` so the caller can exit with a failure status.
    fn or_log(self, message: &str) -> Option<T>;

    /// Log the error and panic.
    fn or_log_and_panic(self, message: &str) -> T;
}

impl<T, E: Display> Failure<T> for Result<T, E> {
    fn or_log(self, message: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                error!("{message}: {error}");
                None
            }
        }
    }

    fn or_log_and_panic(self, message: &str) -> T {
        match self {
            Ok(value) => value,
            Err(error) => log_and_panic(error, message),
        }
    }
}

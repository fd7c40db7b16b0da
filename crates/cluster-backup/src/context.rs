//! Context for the current run
//!

use core::fmt;

/// Holds the context of the running workflow. Used for prefixing logs.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    /// The current context
    pub current_context: &'static str,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            current_context: "Init",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.current_context)
    }
}

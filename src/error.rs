//! Error taxonomy for prime generation and checking.
//!
//! - [`Error::Usage`]: malformed or contradictory parameters, detected before
//!   any random draw. Never retried.
//! - [`Error::Exhausted`]: the bounded draw loop gave up. The caller may retry
//!   with relaxed parameters; a non-prime is never returned instead.
//! - [`Error::Resource`]: the random source or arithmetic engine failed.
//!   Propagated immediately.

/// Errors produced by [`crate::builder::PrimeBuilder`] and its collaborators.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid {param}: {reason}")]
    Usage { param: &'static str, reason: String },

    #[error("no {bits}-bit prime found within {attempts} attempts")]
    Exhausted { bits: u32, attempts: u64 },

    #[error("internal failure: {0}")]
    Resource(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn usage(param: &'static str, reason: impl Into<String>) -> Self {
        Error::Usage {
            param,
            reason: reason.into(),
        }
    }

    /// True for errors the caller can fix by changing its input.
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

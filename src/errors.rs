use std::time::Duration;
use thiserror::Error;

/// Errors raised by tree traversal and expansion-state operations.
///
/// Only `ProviderUnavailable` is recoverable; it is absorbed at the node
/// boundary by the flattener and the retry wrapper. Everything else is a
/// fail-fast programming or contract error and propagates to the caller.
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("children temporarily unavailable")]
    ProviderUnavailable {
        /// Provider-suggested re-poll delay, if it has one.
        retry_after: Option<Duration>,
    },

    #[error("illegal traversal state: {0}")]
    IllegalState(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported mutation: {0}")]
    UnsupportedMutation(&'static str),
}

impl TreeError {
    /// Shorthand for an unavailability without a provider-suggested delay.
    pub fn unavailable() -> Self {
        TreeError::ProviderUnavailable { retry_after: None }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, TreeError::ProviderUnavailable { .. })
    }
}

pub type TreeResult<T> = Result<T, TreeError>;

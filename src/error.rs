//! Error types used by the relay runtime and the bundled sources.
//!
//! - [`RuntimeError`] errors raised by the process-level [`Coordinator`](crate::Coordinator).
//! - [`SourceError`] errors raised by the bundled [`Source`](crate::Source) implementations.
//!
//! The relay core itself has a single error path: a source read failure, which
//! [`RelayerCore::read`](crate::RelayerCore::read) hands back verbatim. Full sinks,
//! evictions and empty pops are counted outcomes, not errors.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the relay runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown deadline was exceeded; some tasks had not completed.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured deadline.
        grace: Duration,
        /// Names of the tasks that did not complete in time.
        stuck: Vec<String>,
    },

    /// OS signal listeners could not be installed.
    #[error("failed to install signal handlers: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use relaykit::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }
}

/// # Errors produced by the bundled message sources.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The source has nothing left to hand out.
    #[error("source exhausted")]
    Exhausted,

    /// The source could not produce a message this time.
    #[error("source unavailable: {reason}")]
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
}

impl SourceError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SourceError::Exhausted => "source_exhausted",
            SourceError::Unavailable { .. } => "source_unavailable",
        }
    }
}

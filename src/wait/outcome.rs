//! Terminal result of a wait.

use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};

// ============================================================================
// WaitOutcome
// ============================================================================

/// How a wait ended.
#[derive(Debug)]
#[must_use = "a wait outcome may carry a failure"]
pub enum WaitOutcome<T> {
    /// The condition was satisfied.
    Success(T),

    /// The timeout elapsed first.
    TimedOut {
        /// Label of the wait.
        label: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The condition reported a terminal error, or the session went away.
    Failed(Error),
}

impl<T> WaitOutcome<T> {
    /// Returns `true` on success.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` on timeout.
    #[inline]
    #[must_use]
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Returns the failure kind, with timeouts reported as
    /// [`ErrorKind::WaitTimeout`]. `None` on success.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::TimedOut { .. } => Some(ErrorKind::WaitTimeout),
            Self::Failed(e) => Some(e.kind()),
        }
    }

    /// Returns the value on success, discarding failures.
    #[must_use]
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Converts into a `Result`, mapping a timeout to
    /// [`Error::WaitTimeout`] carrying the label.
    ///
    /// # Errors
    ///
    /// Returns the failure or the timeout error.
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Success(value) => Ok(value),
            Self::TimedOut { label, timeout } => {
                Err(Error::wait_timeout(label, timeout.as_millis() as u64))
            }
            Self::Failed(e) => Err(e),
        }
    }

    /// Maps the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WaitOutcome<U> {
        match self {
            Self::Success(value) => WaitOutcome::Success(f(value)),
            Self::TimedOut { label, timeout } => WaitOutcome::TimedOut { label, timeout },
            Self::Failed(e) => WaitOutcome::Failed(e),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

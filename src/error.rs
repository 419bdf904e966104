//! Error types for session synchronization.
//!
//! Every fallible operation returns [`Result<T>`] which uses [`Error`].
//! Each variant maps to one [`ErrorKind`], the coarse taxonomy that
//! [`PollPolicy`](crate::PollPolicy) ignorable sets are expressed in.
//!
//! # Error Categories
//!
//! | Kind | Variants | Retried by the engine? |
//! |------|----------|------------------------|
//! | [`ErrorKind::SessionInit`] | [`Error::SessionInit`], [`Error::KindMismatch`] | no |
//! | [`ErrorKind::SessionNotBound`] | [`Error::SessionNotBound`], [`Error::SessionTerminated`] | no |
//! | [`ErrorKind::WaitTimeout`] | [`Error::WaitTimeout`] | no |
//! | [`ErrorKind::ElementNotInteractable`] | [`Error::ElementNotInteractable`] | only if ignorable |
//! | [`ErrorKind::StaleHandle`] | [`Error::StaleHandle`] | only if ignorable |
//! | [`ErrorKind::Transport`] | [`Error::Transport`] | only if ignorable |
//! | [`ErrorKind::InvalidLocator`] | [`Error::InvalidLocator`] | only if ignorable |
//! | [`ErrorKind::NoEnabledOption`] | [`Error::NoEnabledOption`] | no |
//! | [`ErrorKind::Config`] | [`Error::Config`], [`Error::Io`] | no |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::io::Error as IoError;
use std::result::Result as StdResult;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifiers::{ContextId, SessionId, TargetId};
use crate::session::BrowserKind;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// ErrorKind
// ============================================================================

/// Coarse failure classification shared by every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Underlying session creation failed.
    SessionInit,
    /// No active session for the calling context.
    SessionNotBound,
    /// Condition never satisfied within the timeout.
    WaitTimeout,
    /// Target exists but cannot be interacted with.
    ElementNotInteractable,
    /// Previously resolved target is no longer valid.
    StaleHandle,
    /// Remote-communication fault.
    Transport,
    /// Malformed locator.
    InvalidLocator,
    /// Bounded retry selector exhausted its attempts.
    NoEnabledOption,
    /// Configuration could not be loaded or is invalid.
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SessionInit => "SessionInitError",
            Self::SessionNotBound => "SessionNotBoundError",
            Self::WaitTimeout => "WaitTimeoutError",
            Self::ElementNotInteractable => "ElementNotInteractableError",
            Self::StaleHandle => "StaleHandleError",
            Self::Transport => "TransportError",
            Self::InvalidLocator => "InvalidLocatorError",
            Self::NoEnabledOption => "NoEnabledOptionError",
            Self::Config => "ConfigError",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Session Errors
    // ========================================================================
    /// Session creation or post-creation setup failed.
    #[error("Failed to start {kind} session: {message}")]
    SessionInit {
        /// Requested browser kind.
        kind: BrowserKind,
        /// Description of the failure.
        message: String,
    },

    /// A context requested a different kind than the session it already owns.
    ///
    /// Only returned under [`KindMismatch::Reject`](crate::KindMismatch::Reject).
    #[error("Context {context} already owns a {bound} session, refused {requested}")]
    KindMismatch {
        /// Requesting context.
        context: ContextId,
        /// Kind of the bound session.
        bound: BrowserKind,
        /// Kind that was requested.
        requested: BrowserKind,
    },

    /// No session is bound to the context.
    #[error("No session bound to context {context}")]
    SessionNotBound {
        /// Context that has no session.
        context: ContextId,
    },

    /// The session was released while still in use.
    #[error("Session {session_id} is no longer active")]
    SessionTerminated {
        /// The released session.
        session_id: SessionId,
    },

    // ========================================================================
    // Wait Errors
    // ========================================================================
    /// Condition not satisfied in time.
    #[error("Timed out after {timeout_ms}ms waiting for {label}")]
    WaitTimeout {
        /// Diagnostic label of the wait.
        label: String,
        /// Milliseconds waited.
        timeout_ms: u64,
    },

    // ========================================================================
    // Target Errors
    // ========================================================================
    /// Target cannot be interacted with.
    #[error("Element {target} is not interactable: {reason}")]
    ElementNotInteractable {
        /// The rejected target.
        target: TargetId,
        /// Why it is not interactable.
        reason: String,
    },

    /// Target reference is stale.
    #[error("Stale element: {target}")]
    StaleHandle {
        /// The stale target.
        target: TargetId,
    },

    /// Locator is malformed.
    #[error("Invalid locator {strategy}={value:?}: {reason}")]
    InvalidLocator {
        /// Strategy name.
        strategy: String,
        /// Raw locator value.
        value: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Bounded random selection found no enabled option.
    #[error("No enabled option after {attempts} attempt(s) over {options} option(s)")]
    NoEnabledOption {
        /// Sampling attempts made.
        attempts: usize,
        /// Size of the option set.
        options: usize,
    },

    // ========================================================================
    // Remote Errors
    // ========================================================================
    /// Remote-communication fault.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the fault.
        message: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a session init error.
    #[inline]
    pub fn session_init(kind: BrowserKind, message: impl Into<String>) -> Self {
        Self::SessionInit {
            kind,
            message: message.into(),
        }
    }

    /// Creates a session not bound error.
    #[inline]
    pub fn session_not_bound(context: ContextId) -> Self {
        Self::SessionNotBound { context }
    }

    /// Creates a session terminated error.
    #[inline]
    pub fn session_terminated(session_id: SessionId) -> Self {
        Self::SessionTerminated { session_id }
    }

    /// Creates a wait timeout error.
    #[inline]
    pub fn wait_timeout(label: impl Into<String>, timeout_ms: u64) -> Self {
        Self::WaitTimeout {
            label: label.into(),
            timeout_ms,
        }
    }

    /// Creates an element not interactable error.
    #[inline]
    pub fn not_interactable(target: TargetId, reason: impl Into<String>) -> Self {
        Self::ElementNotInteractable {
            target,
            reason: reason.into(),
        }
    }

    /// Creates a stale handle error.
    #[inline]
    pub fn stale_handle(target: TargetId) -> Self {
        Self::StaleHandle { target }
    }

    /// Creates an invalid locator error.
    #[inline]
    pub fn invalid_locator(
        strategy: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidLocator {
            strategy: strategy.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Creates a no enabled option error.
    #[inline]
    pub fn no_enabled_option(attempts: usize, options: usize) -> Self {
        Self::NoEnabledOption { attempts, options }
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Classification
// ============================================================================

impl Error {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SessionInit { .. } | Self::KindMismatch { .. } => ErrorKind::SessionInit,
            Self::SessionNotBound { .. } | Self::SessionTerminated { .. } => {
                ErrorKind::SessionNotBound
            }
            Self::WaitTimeout { .. } => ErrorKind::WaitTimeout,
            Self::ElementNotInteractable { .. } => ErrorKind::ElementNotInteractable,
            Self::StaleHandle { .. } => ErrorKind::StaleHandle,
            Self::InvalidLocator { .. } => ErrorKind::InvalidLocator,
            Self::NoEnabledOption { .. } => ErrorKind::NoEnabledOption,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Config { .. } | Self::Io(_) => ErrorKind::Config,
        }
    }

    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::WaitTimeout { .. })
    }

    /// Returns `true` if this is an element error.
    #[inline]
    #[must_use]
    pub fn is_element_error(&self) -> bool {
        matches!(
            self,
            Self::ElementNotInteractable { .. } | Self::StaleHandle { .. }
        )
    }

    /// Returns `true` if the error concerns session ownership.
    #[inline]
    #[must_use]
    pub fn is_session_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::SessionInit | ErrorKind::SessionNotBound
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind as IoErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::transport("socket closed");
        assert_eq!(err.to_string(), "Transport error: socket closed");
    }

    #[test]
    fn test_timeout_display_carries_label() {
        let err = Error::wait_timeout("login button", 1500);
        assert_eq!(
            err.to_string(),
            "Timed out after 1500ms waiting for login button"
        );
        assert!(err.is_timeout());
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            Error::session_init(BrowserKind::Chrome, "boom").kind(),
            ErrorKind::SessionInit
        );
        assert_eq!(
            Error::session_terminated(SessionId::next()).kind(),
            ErrorKind::SessionNotBound
        );
        assert_eq!(
            Error::stale_handle(TargetId::new("a")).kind(),
            ErrorKind::StaleHandle
        );
        assert_eq!(
            Error::invalid_locator("id", "", "empty").kind(),
            ErrorKind::InvalidLocator
        );
        assert_eq!(
            Error::no_enabled_option(5, 3).kind(),
            ErrorKind::NoEnabledOption
        );
    }

    #[test]
    fn test_is_element_error() {
        assert!(Error::stale_handle(TargetId::new("a")).is_element_error());
        assert!(Error::not_interactable(TargetId::new("a"), "disabled").is_element_error());
        assert!(!Error::transport("x").is_element_error());
    }

    #[test]
    fn test_is_session_error() {
        assert!(Error::session_not_bound(ContextId::new()).is_session_error());
        assert!(
            Error::KindMismatch {
                context: ContextId::new(),
                bound: BrowserKind::Chrome,
                requested: BrowserKind::Firefox,
            }
            .is_session_error()
        );
        assert!(!Error::config("x").is_session_error());
    }

    #[test]
    fn test_kind_display_uses_taxonomy_names() {
        assert_eq!(ErrorKind::StaleHandle.to_string(), "StaleHandleError");
        assert_eq!(ErrorKind::NoEnabledOption.to_string(), "NoEnabledOptionError");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(IoErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}

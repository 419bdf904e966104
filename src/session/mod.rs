//! Sessions and their per-context registry.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Session`] | Handle to one live remote session plus its lifecycle state |
//! | [`SessionRegistry`] | Binds at most one session to each execution context |
//! | [`RegistryBuilder`] | Fluent configuration for a registry |
//! | [`BrowserKind`] | Declared kind of a session |
//!
//! # Lifecycle
//!
//! ```text
//! UNBOUND --acquire--> ACTIVE --release--> UNBOUND
//! ACTIVE  --acquire--> ACTIVE            (no-op)
//! UNBOUND --release--> UNBOUND           (no-op, logged)
//! ```
//!
//! A released [`Session`] value reports [`SessionState::Terminated`]; any
//! wait still holding it fails fast.

// ============================================================================
// Submodules
// ============================================================================

/// Registry configuration builder.
pub mod builder;

/// Browser kinds.
pub mod kind;

/// Context-to-session registry.
pub mod registry;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::browser::RemoteSession;
use crate::error::{Error, Result};
use crate::identifiers::{ContextId, SessionId};

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::RegistryBuilder;
pub use kind::BrowserKind;
pub use registry::{KindMismatch, SessionRegistry};

// ============================================================================
// SessionState
// ============================================================================

/// Lifecycle state of a session slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No session bound; reported by
    /// [`SessionRegistry::state`](crate::SessionRegistry::state).
    Unbound,
    /// Bound and usable.
    Active,
    /// Released; the remote side has been asked to quit.
    Terminated,
}

// ============================================================================
// Session
// ============================================================================

/// Internal shared state for a session.
struct SessionInner {
    context: ContextId,
    kind: BrowserKind,
    remote: Arc<dyn RemoteSession>,
    state: Mutex<SessionState>,
}

/// Handle to one live remote session.
///
/// Clones share state: once the registry releases the session, every clone
/// observes [`SessionState::Terminated`].
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id())
            .field("kind", &self.inner.kind)
            .field("context", &self.inner.context)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wraps a freshly created remote session owned by `context`.
    pub(crate) fn new(context: ContextId, kind: BrowserKind, remote: Arc<dyn RemoteSession>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                context,
                kind,
                remote,
                state: Mutex::new(SessionState::Active),
            }),
        }
    }

    /// Creates an active session outside any registry.
    ///
    /// Useful when a caller manages ownership itself or in tests.
    #[must_use]
    pub fn detached(kind: BrowserKind, remote: Arc<dyn RemoteSession>) -> Self {
        Self::new(ContextId::new(), kind, remote)
    }

    /// Returns the remote session ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.inner.remote.session_id()
    }

    /// Returns the declared kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> BrowserKind {
        self.inner.kind
    }

    /// Returns the owning context.
    #[inline]
    #[must_use]
    pub fn context(&self) -> ContextId {
        self.inner.context
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.inner.state.lock()
    }

    /// Returns `true` while the session is usable.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Returns the remote connection.
    #[inline]
    #[must_use]
    pub fn remote(&self) -> &Arc<dyn RemoteSession> {
        &self.inner.remote
    }

    /// Fails with [`Error::SessionTerminated`] unless the session is active.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionTerminated`] after release.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::session_terminated(self.id()))
        }
    }

    /// Marks the session terminated. Returns `false` if it already was.
    pub(crate) fn terminate(&self) -> bool {
        let mut state = self.inner.state.lock();
        let was_active = *state == SessionState::Active;
        *state = SessionState::Terminated;
        was_active
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::browser::memory::MemoryBrowser;
    use crate::error::ErrorKind;

    fn session() -> Session {
        Session::detached(
            BrowserKind::Chrome,
            Arc::new(MemoryBrowser::new(BrowserKind::Chrome)),
        )
    }

    #[test]
    fn test_new_session_is_active() {
        let session = session();
        assert_eq!(session.state(), SessionState::Active);
        assert!(session.ensure_active().is_ok());
    }

    #[test]
    fn test_terminate_is_shared_by_clones() {
        let session = session();
        let clone = session.clone();

        assert!(session.terminate());
        assert!(!clone.terminate());
        assert_eq!(clone.state(), SessionState::Terminated);
        assert_eq!(
            clone.ensure_active().unwrap_err().kind(),
            ErrorKind::SessionNotBound
        );
    }

    #[test]
    fn test_id_comes_from_remote() {
        let remote = Arc::new(MemoryBrowser::new(BrowserKind::Firefox));
        let expected = remote.session_id();
        let session = Session::detached(BrowserKind::Firefox, remote);
        assert_eq!(session.id(), expected);
    }
}

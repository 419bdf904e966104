//! Type-safe identifiers for contexts, sessions and remote targets.
//!
//! Newtype wrappers keep the three ID spaces apart at compile time:
//!
//! | Type | Backing | Meaning |
//! |------|---------|---------|
//! | [`ContextId`] | UUID | One execution context (task or thread) |
//! | [`SessionId`] | `u64` | One live remote session |
//! | [`TargetId`] | `String` | One remote element, as named by the backend |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ContextId
// ============================================================================

thread_local! {
    /// Lazily created token for the current OS thread.
    static THREAD_CONTEXT: ContextId = ContextId::new();
}

/// Identifies one execution context.
///
/// A context owns at most one session in a
/// [`SessionRegistry`](crate::SessionRegistry). Async callers create one token
/// per task with [`ContextId::new`]; thread-per-worker callers can use
/// [`ContextId::current_thread`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Creates a fresh, globally unique context token.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the token bound to the calling OS thread.
    ///
    /// The same thread always gets the same token.
    #[must_use]
    pub fn current_thread() -> Self {
        THREAD_CONTEXT.with(|id| *id)
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// SessionId
// ============================================================================

/// Process-wide counter for session IDs.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one live remote session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocates the next unused session ID.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the numeric value.
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// TargetId
// ============================================================================

/// Identifies one remote element.
///
/// The value is opaque and chosen by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(String);

impl TargetId {
    /// Wraps a backend-provided element reference.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw reference.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Remote element references.
//!
//! A [`TargetHandle`] names one element inside the session that resolved it.
//! It carries no live state: every query goes back to the
//! [`RemoteSession`](super::RemoteSession), which reports
//! [`Error::StaleHandle`](crate::Error::StaleHandle) once the element is gone.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::identifiers::{SessionId, TargetId};

use super::selector::Locator;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a handle.
struct TargetInner {
    /// Backend element reference.
    id: TargetId,

    /// Session that resolved the element.
    session_id: SessionId,

    /// Locator the element was resolved from, if any.
    locator: Option<Locator>,
}

// ============================================================================
// TargetHandle
// ============================================================================

/// Opaque reference to one remote element.
///
/// Cloning is cheap. Two handles are equal when they name the same element
/// of the same session.
#[derive(Clone)]
pub struct TargetHandle {
    inner: Arc<TargetInner>,
}

impl fmt::Debug for TargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetHandle")
            .field("id", &self.inner.id)
            .field("session_id", &self.inner.session_id)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.locator {
            Some(locator) => write!(f, "{} ({locator})", self.inner.id),
            None => write!(f, "{}", self.inner.id),
        }
    }
}

impl PartialEq for TargetHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id && self.inner.session_id == other.inner.session_id
    }
}

impl Eq for TargetHandle {}

impl TargetHandle {
    /// Creates a handle for a backend element reference.
    #[must_use]
    pub fn new(id: TargetId, session_id: SessionId) -> Self {
        Self {
            inner: Arc::new(TargetInner {
                id,
                session_id,
                locator: None,
            }),
        }
    }

    /// Creates a handle remembering the locator it was resolved from.
    #[must_use]
    pub fn resolved(id: TargetId, session_id: SessionId, locator: Locator) -> Self {
        Self {
            inner: Arc::new(TargetInner {
                id,
                session_id,
                locator: Some(locator),
            }),
        }
    }

    /// Returns the backend element reference.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &TargetId {
        &self.inner.id
    }

    /// Returns the session that resolved this element.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.inner.session_id
    }

    /// Returns the originating locator.
    #[inline]
    #[must_use]
    pub fn locator(&self) -> Option<&Locator> {
        self.inner.locator.as_ref()
    }
}

// ============================================================================
// ElementState
// ============================================================================

/// Snapshot of the properties conditions decide on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementState {
    /// Element is displayed (not `display: none`, not `hidden`).
    pub displayed: bool,

    /// Element accepts interaction (no `disabled` attribute).
    pub enabled: bool,

    /// Rendered width in CSS pixels.
    pub width: f64,

    /// Rendered height in CSS pixels.
    pub height: f64,
}

impl ElementState {
    /// A displayed, enabled element of the given size.
    #[inline]
    #[must_use]
    pub const fn visible(width: f64, height: f64) -> Self {
        Self {
            displayed: true,
            enabled: true,
            width,
            height,
        }
    }

    /// An element present in the document but not displayed.
    #[inline]
    #[must_use]
    pub const fn hidden() -> Self {
        Self {
            displayed: false,
            enabled: true,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Returns a copy with `enabled` set.
    #[inline]
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Displayed with a non-zero area.
    #[inline]
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.displayed && self.width > 0.0 && self.height > 0.0
    }

    /// Rendered and enabled.
    #[inline]
    #[must_use]
    pub fn is_clickable(&self) -> bool {
        self.is_rendered() && self.enabled
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_equality_ignores_locator() {
        let session = SessionId::next();
        let a = TargetHandle::new(TargetId::new("e1"), session);
        let b = TargetHandle::resolved(TargetId::new("e1"), session, Locator::id("x"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_handle_equality_includes_session() {
        let a = TargetHandle::new(TargetId::new("e1"), SessionId::next());
        let b = TargetHandle::new(TargetId::new("e1"), SessionId::next());
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_includes_locator() {
        let handle =
            TargetHandle::resolved(TargetId::new("e9"), SessionId::next(), Locator::css("#go"));
        assert_eq!(handle.to_string(), "e9 (css=#go)");
    }

    #[test]
    fn test_zero_size_is_not_rendered() {
        let state = ElementState::visible(0.0, 10.0);
        assert!(state.displayed);
        assert!(!state.is_rendered());
    }

    #[test]
    fn test_clickable_requires_enabled() {
        let state = ElementState::visible(10.0, 10.0);
        assert!(state.is_clickable());
        assert!(!state.with_enabled(false).is_clickable());
        assert!(!ElementState::hidden().is_clickable());
    }
}

//! Timeout, interval and ignorable-error configuration for one wait.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use rustc_hash::FxHashSet;
use tracing::warn;

use crate::error::ErrorKind;

// ============================================================================
// Constants
// ============================================================================

/// Timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed tick of explicit waits.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Smallest interval the engine sleeps for.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

// ============================================================================
// PollPolicy
// ============================================================================

/// Configuration for a single [`poll`](super::poll) call.
///
/// `interval` should be positive and no larger than `timeout`. Neither is
/// enforced: a zero interval is clamped to [`MIN_POLL_INTERVAL`] and an
/// interval above the timeout is kept, both with a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    timeout: Duration,
    interval: Duration,
    ignorable: FxHashSet<ErrorKind>,
    label: Option<String>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::explicit(DEFAULT_TIMEOUT)
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl PollPolicy {
    /// Explicit-wait policy: caller timeout, fixed [`DEFAULT_POLL_INTERVAL`].
    #[must_use]
    pub fn explicit(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: DEFAULT_POLL_INTERVAL,
            ignorable: FxHashSet::default(),
            label: None,
        }
    }

    /// Fluent-wait policy: caller timeout, interval and label.
    #[must_use]
    pub fn fluent(timeout: Duration, interval: Duration, label: impl Into<String>) -> Self {
        Self {
            timeout,
            interval,
            ignorable: FxHashSet::default(),
            label: Some(label.into()),
        }
    }

    /// Sets the interval.
    #[inline]
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the label attached to timeouts.
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Treats failures of `kind` as "not yet".
    #[inline]
    #[must_use]
    pub fn ignoring(mut self, kind: ErrorKind) -> Self {
        self.ignorable.insert(kind);
        self
    }

    /// Treats failures of every kind in `kinds` as "not yet".
    #[must_use]
    pub fn ignoring_all(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.ignorable.extend(kinds);
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl PollPolicy {
    /// Total time budget.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Configured interval, before clamping.
    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Label attached to timeouts, if set.
    #[inline]
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns `true` if failures of `kind` are retried.
    #[inline]
    #[must_use]
    pub fn is_ignorable(&self, kind: ErrorKind) -> bool {
        self.ignorable.contains(&kind)
    }

    /// Interval the engine actually sleeps for.
    pub(crate) fn effective_interval(&self) -> Duration {
        if self.interval.is_zero() {
            warn!(
                min_ms = MIN_POLL_INTERVAL.as_millis() as u64,
                "Zero poll interval; clamping"
            );
            return MIN_POLL_INTERVAL;
        }
        if self.interval > self.timeout {
            warn!(
                interval_ms = self.interval.as_millis() as u64,
                timeout_ms = self.timeout.as_millis() as u64,
                "Poll interval exceeds timeout; the condition may be evaluated only once"
            );
        }
        self.interval
    }
}

// ============================================================================
// Tests
// ============================================================================

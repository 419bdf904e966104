//! Condition waits.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`poll`] | Core loop: evaluate, classify, sleep, repeat |
//! | [`explicit_wait`] | Caller timeout, fixed [`DEFAULT_POLL_INTERVAL`] |
//! | [`Wait`] | Fluent builder: timeout, interval, label, ignorable kinds |
//! | [`Condition`] | Predicate returning a [`ConditionResult`] |
//! | [`conditions`] | Visibility, clickability, alerts, ready state, collections |
//! | [`convenience`] | One-call waits that log their outcome |
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use session_sync::wait::{Clickability, explicit_wait};
//! use session_sync::Locator;
//!
//! let button = explicit_wait(&session, &Clickability::of(Locator::id("submit")), Duration::from_secs(10))
//!     .await
//!     .into_result()?;
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Condition trait and result tag.
pub mod condition;

/// Built-in conditions.
pub mod conditions;

/// Logged one-call waits.
pub mod convenience;

/// The polling loop.
pub mod engine;

/// Wait outcomes.
pub mod outcome;

/// Poll policies and defaults.
pub mod policy;

// ============================================================================
// Re-exports
// ============================================================================

pub use condition::{Condition, ConditionResult, FnCondition, from_fn};
pub use conditions::{
    AlertPresence, Clickability, CollectionClickable, PageReadyState, READY_STATE_COMPLETE,
    READY_STATE_SCRIPT, Target, Visibility,
};
pub use convenience::{
    fluent_visibility, wait_for_alert, wait_for_clickable, wait_for_clickable_collection,
    wait_for_page_load, wait_for_visibility,
};
pub use engine::{Wait, explicit_wait, pause, poll};
pub use outcome::WaitOutcome;
pub use policy::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, MIN_POLL_INTERVAL, PollPolicy};

//! The condition abstraction.
//!
//! A [`Condition`] decides, on each evaluation, whether a wait is over. It
//! reports one of three outcomes as a [`ConditionResult`]; the engine switches
//! on that tag and nothing else. Which remote failures mean "try again" is
//! therefore a property of each condition, visible in its `evaluate` body.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::session::Session;

// ============================================================================
// ConditionResult
// ============================================================================

/// Result of evaluating a [`Condition`] once.
#[derive(Debug)]
pub enum ConditionResult<T> {
    /// Not satisfied yet; the engine may evaluate again.
    NotYet,
    /// Satisfied with a value; the wait succeeds.
    Satisfied(T),
    /// Failed; terminal unless the error's kind is ignorable by the policy.
    Failed(Error),
}

impl<T> ConditionResult<T> {
    /// Returns `true` for [`ConditionResult::NotYet`].
    #[inline]
    #[must_use]
    pub fn is_not_yet(&self) -> bool {
        matches!(self, Self::NotYet)
    }

    /// Returns `true` for [`ConditionResult::Satisfied`].
    #[inline]
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied(_))
    }

    /// Maps the satisfied value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ConditionResult<U> {
        match self {
            Self::NotYet => ConditionResult::NotYet,
            Self::Satisfied(value) => ConditionResult::Satisfied(f(value)),
            Self::Failed(e) => ConditionResult::Failed(e),
        }
    }
}

impl<T> From<Result<Option<T>>> for ConditionResult<T> {
    /// `Ok(Some)` satisfies, `Ok(None)` is not yet, `Err` fails.
    fn from(result: Result<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Self::Satisfied(value),
            Ok(None) => Self::NotYet,
            Err(e) => Self::Failed(e),
        }
    }
}

// ============================================================================
// Condition
// ============================================================================

/// A predicate over a session, evaluated repeatedly by the engine.
#[async_trait]
pub trait Condition: Send + Sync {
    /// Value produced on success.
    type Output: Send;

    /// Evaluates the condition once.
    async fn evaluate(&self, session: &Session) -> ConditionResult<Self::Output>;

    /// Short description used as the default wait label.
    fn describe(&self) -> String;
}

// ============================================================================
// FnCondition
// ============================================================================

/// A condition built from a closure. See [`from_fn`].
pub struct FnCondition<F> {
    label: String,
    f: F,
}

impl<F> fmt::Debug for FnCondition<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCondition")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Builds a condition from an async closure.
///
/// The closure receives a clone of the session handle.
///
/// # Example
///
/// ```ignore
/// use session_sync::wait::{ConditionResult, from_fn};
///
/// let title_set = from_fn("document title", |session| async move {
///     match session.remote().execute_script("return document.title").await {
///         Ok(v) if v.as_str().is_some_and(|t| !t.is_empty()) => ConditionResult::Satisfied(v),
///         Ok(_) => ConditionResult::NotYet,
///         Err(e) => ConditionResult::Failed(e),
///     }
/// });
/// ```
pub fn from_fn<F, Fut, T>(label: impl Into<String>, f: F) -> FnCondition<F>
where
    F: Fn(Session) -> Fut + Send + Sync,
    Fut: Future<Output = ConditionResult<T>> + Send + 'static,
    T: Send + 'static,
{
    FnCondition {
        label: label.into(),
        f,
    }
}

#[async_trait]
impl<F, Fut, T> Condition for FnCondition<F>
where
    F: Fn(Session) -> Fut + Send + Sync,
    Fut: Future<Output = ConditionResult<T>> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    async fn evaluate(&self, session: &Session) -> ConditionResult<T> {
        (self.f)(session.clone()).await
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

// ============================================================================
// Tests
// ============================================================================

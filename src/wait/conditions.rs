//! The condition catalog.
//!
//! | Condition | Satisfied with | Not yet while | Fails on |
//! |-----------|----------------|---------------|----------|
//! | [`Visibility`] | [`TargetHandle`] | unresolved, hidden, zero-size | stale handle, transport, bad locator |
//! | [`Clickability`] | [`TargetHandle`] | as above | also: rendered but disabled |
//! | [`AlertPresence`] | [`DialogHandle`] | no dialog open | transport |
//! | [`PageReadyState`] | `()` | ready state differs | transport |
//! | [`CollectionClickable`] | `Vec<TargetHandle>` | empty, or any member not clickable | transport, bad locator |
//!
//! A [`Target`] given as a locator is re-resolved on every evaluation, so an
//! element replaced between resolution and inspection just means "not yet".
//! A target given as a handle is never re-resolved: if it goes stale the
//! wait fails.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::browser::{DialogHandle, ElementState, Locator, TargetHandle};
use crate::error::{Error, ErrorKind, Result};
use crate::session::Session;

use super::condition::{Condition, ConditionResult};

// ============================================================================
// Constants
// ============================================================================

/// Script reading `document.readyState`.
pub const READY_STATE_SCRIPT: &str = "return document.readyState";

/// Ready state a loaded page reports.
pub const READY_STATE_COMPLETE: &str = "complete";

// ============================================================================
// Target
// ============================================================================

/// What a per-element condition inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Resolved afresh on each evaluation; first match wins.
    Locator(Locator),
    /// An already resolved element.
    Handle(TargetHandle),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locator(locator) => write!(f, "{locator}"),
            Self::Handle(handle) => write!(f, "{handle}"),
        }
    }
}

impl From<Locator> for Target {
    fn from(locator: Locator) -> Self {
        Self::Locator(locator)
    }
}

impl From<TargetHandle> for Target {
    fn from(handle: TargetHandle) -> Self {
        Self::Handle(handle)
    }
}

impl From<&TargetHandle> for Target {
    fn from(handle: &TargetHandle) -> Self {
        Self::Handle(handle.clone())
    }
}

/// Resolves `target` and reads its state.
///
/// `Ok(None)` means "not yet": nothing matched the locator, or the match was
/// replaced before its state could be read. A malformed locator is rejected
/// before the backend is asked.
async fn inspect(session: &Session, target: &Target) -> Result<Option<(TargetHandle, ElementState)>> {
    let remote = session.remote();

    match target {
        Target::Handle(handle) => {
            let state = remote.element_state(handle).await?;
            Ok(Some((handle.clone(), state)))
        }
        Target::Locator(locator) => {
            locator.validate()?;
            let Some(handle) = remote.find_elements(locator).await?.into_iter().next() else {
                return Ok(None);
            };
            match remote.element_state(&handle).await {
                Ok(state) => Ok(Some((handle, state))),
                Err(e) if e.kind() == ErrorKind::StaleHandle => Ok(None),
                Err(e) => Err(e),
            }
        }
    }
}

// ============================================================================
// Visibility
// ============================================================================

/// Satisfied once the target is displayed with a non-zero size.
#[derive(Debug, Clone)]
pub struct Visibility {
    target: Target,
}

impl Visibility {
    /// Waits for `target` to be visible.
    #[must_use]
    pub fn of(target: impl Into<Target>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

#[async_trait]
impl Condition for Visibility {
    type Output = TargetHandle;

    async fn evaluate(&self, session: &Session) -> ConditionResult<TargetHandle> {
        match inspect(session, &self.target).await {
            Ok(Some((handle, state))) if state.is_rendered() => ConditionResult::Satisfied(handle),
            Ok(_) => ConditionResult::NotYet,
            Err(e) => ConditionResult::Failed(e),
        }
    }

    fn describe(&self) -> String {
        format!("visibility of {}", self.target)
    }
}

// ============================================================================
// Clickability
// ============================================================================

/// Satisfied once the target is visible and enabled.
///
/// A rendered but disabled target fails with
/// [`Error::ElementNotInteractable`]; add
/// [`ErrorKind::ElementNotInteractable`] to the policy's ignorable set to
/// wait for it to become enabled instead.
#[derive(Debug, Clone)]
pub struct Clickability {
    target: Target,
}

impl Clickability {
    /// Waits for `target` to be clickable.
    #[must_use]
    pub fn of(target: impl Into<Target>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

#[async_trait]
impl Condition for Clickability {
    type Output = TargetHandle;

    async fn evaluate(&self, session: &Session) -> ConditionResult<TargetHandle> {
        match inspect(session, &self.target).await {
            Ok(Some((handle, state))) if state.is_rendered() => {
                if state.enabled {
                    ConditionResult::Satisfied(handle)
                } else {
                    ConditionResult::Failed(Error::not_interactable(
                        handle.id().clone(),
                        "element is disabled",
                    ))
                }
            }
            Ok(_) => ConditionResult::NotYet,
            Err(e) => ConditionResult::Failed(e),
        }
    }

    fn describe(&self) -> String {
        format!("clickability of {}", self.target)
    }
}

// ============================================================================
// AlertPresence
// ============================================================================

/// Satisfied once a dialog is open.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertPresence;

#[async_trait]
impl Condition for AlertPresence {
    type Output = DialogHandle;

    async fn evaluate(&self, session: &Session) -> ConditionResult<DialogHandle> {
        session.remote().active_dialog().await.into()
    }

    fn describe(&self) -> String {
        "alert presence".to_string()
    }
}

// ============================================================================
// PageReadyState
// ============================================================================

/// Satisfied once `document.readyState` equals the expected value.
#[derive(Debug, Clone)]
pub struct PageReadyState {
    expected: String,
}

impl PageReadyState {
    /// Waits for `document.readyState == "complete"`.
    #[must_use]
    pub fn complete() -> Self {
        Self::equals(READY_STATE_COMPLETE)
    }

    /// Waits for `document.readyState == expected`.
    #[must_use]
    pub fn equals(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl Default for PageReadyState {
    fn default() -> Self {
        Self::complete()
    }
}

#[async_trait]
impl Condition for PageReadyState {
    type Output = ();

    async fn evaluate(&self, session: &Session) -> ConditionResult<()> {
        match session.remote().execute_script(READY_STATE_SCRIPT).await {
            Ok(Value::String(state)) if state == self.expected => ConditionResult::Satisfied(()),
            Ok(_) => ConditionResult::NotYet,
            Err(e) => ConditionResult::Failed(e),
        }
    }

    fn describe(&self) -> String {
        format!("page ready state '{}'", self.expected)
    }
}

// ============================================================================
// CollectionClickable
// ============================================================================

/// Satisfied once the locator matches at least one element and every match
/// is clickable. Yields the matches in document order.
#[derive(Debug, Clone)]
pub struct CollectionClickable {
    locator: Locator,
}

impl CollectionClickable {
    /// Waits for every element matching `locator` to be clickable.
    #[must_use]
    pub fn of(locator: Locator) -> Self {
        Self { locator }
    }
}

#[async_trait]
impl Condition for CollectionClickable {
    type Output = Vec<TargetHandle>;

    async fn evaluate(&self, session: &Session) -> ConditionResult<Vec<TargetHandle>> {
        if let Err(e) = self.locator.validate() {
            return ConditionResult::Failed(e);
        }

        let remote = session.remote();
        let handles = match remote.find_elements(&self.locator).await {
            Ok(handles) if handles.is_empty() => return ConditionResult::NotYet,
            Ok(handles) => handles,
            Err(e) => return ConditionResult::Failed(e),
        };

        for handle in &handles {
            match remote.element_state(handle).await {
                Ok(state) if state.is_clickable() => {}
                Ok(_) => return ConditionResult::NotYet,
                // The collection changed under us; resolve again next tick.
                Err(e) if e.kind() == ErrorKind::StaleHandle => return ConditionResult::NotYet,
                Err(e) => return ConditionResult::Failed(e),
            }
        }

        ConditionResult::Satisfied(handles)
    }

    fn describe(&self) -> String {
        format!("clickability of all {}", self.locator)
    }
}

// ============================================================================
// Tests
// ============================================================================

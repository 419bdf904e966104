//! The remote-target contract.
//!
//! [`RemoteSession`] is everything the engine and the condition catalog need
//! from a live browser session. The wire protocol behind it belongs to the
//! implementor; this crate ships an in-process implementation in
//! [`memory`](super::memory).
//!
//! # Error contract
//!
//! | Situation | Expected error |
//! |-----------|----------------|
//! | Handle no longer in the document | [`Error::StaleHandle`](crate::Error::StaleHandle) |
//! | Locator rejected by the backend | [`Error::InvalidLocator`](crate::Error::InvalidLocator) |
//! | Element refuses interaction | [`Error::ElementNotInteractable`](crate::Error::ElementNotInteractable) |
//! | Answering a dialog that is no longer open | [`Error::Transport`](crate::Error::Transport) |
//! | Any communication fault | [`Error::Transport`](crate::Error::Transport) |
//!
//! "No element matched" is not an error: `find_elements` returns an empty
//! vector.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::identifiers::SessionId;

use super::dialog::DialogHandle;
use super::element::{ElementState, TargetHandle};
use super::selector::Locator;

/// A live connection to one remote automation target.
#[async_trait]
pub trait RemoteSession: Send + Sync + Debug {
    /// Returns the session's ID.
    fn session_id(&self) -> SessionId;

    /// Resolves a locator to every matching element, in document order.
    async fn find_elements(&self, locator: &Locator) -> Result<Vec<TargetHandle>>;

    /// Reads the current state of an element.
    async fn element_state(&self, target: &TargetHandle) -> Result<ElementState>;

    /// Clicks an element.
    async fn click(&self, target: &TargetHandle) -> Result<()>;

    /// Returns the open dialog, if any.
    async fn active_dialog(&self) -> Result<Option<DialogHandle>>;

    /// Accepts `dialog` (OK on a confirm or prompt).
    async fn accept_dialog(&self, dialog: &DialogHandle) -> Result<()>;

    /// Dismisses `dialog` (Cancel on a confirm or prompt).
    async fn dismiss_dialog(&self, dialog: &DialogHandle) -> Result<()>;

    /// Runs a script in the page and returns its JSON result.
    async fn execute_script(&self, script: &str) -> Result<Value>;

    /// Maximizes the browser window.
    async fn maximize_window(&self) -> Result<()>;

    /// Sets the backend's implicit element-resolution timeout.
    async fn set_implicit_wait(&self, timeout: Duration) -> Result<()>;

    /// Terminates the remote session.
    async fn quit(&self) -> Result<()>;
}

//! Interrupt dialogs (alert, confirm, prompt).

use serde::{Deserialize, Serialize};

use crate::identifiers::SessionId;

/// Kind of a JavaScript dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    /// `window.alert`.
    Alert,
    /// `window.confirm`.
    Confirm,
    /// `window.prompt`.
    Prompt,
    /// `beforeunload` confirmation.
    BeforeUnload,
}

/// A dialog currently open on a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogHandle {
    /// Session showing the dialog.
    pub session_id: SessionId,
    /// Dialog kind.
    pub kind: DialogKind,
    /// Message text.
    pub message: String,
}

impl DialogHandle {
    /// Creates a handle.
    pub fn new(session_id: SessionId, kind: DialogKind, message: impl Into<String>) -> Self {
        Self {
            session_id,
            kind,
            message: message.into(),
        }
    }
}

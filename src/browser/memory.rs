//! In-process backend over a scripted page.
//!
//! [`MemoryBrowser`] implements [`RemoteSession`] against a page held in
//! memory; [`MemoryFactory`] hands them out to a
//! [`SessionRegistry`](crate::SessionRegistry). Tests drive the page directly
//! (add elements, flip visibility, open dialogs, inject faults) and the
//! engine observes it exactly as it would a real browser.
//!
//! # Example
//!
//! ```ignore
//! use session_sync::browser::memory::MemoryBrowser;
//! use session_sync::{BrowserKind, ElementState, Locator};
//!
//! let page = MemoryBrowser::new(BrowserKind::Chrome);
//! let id = page.add_element(Locator::id("go"), ElementState::hidden());
//! page.set_state(&id, ElementState::visible(80.0, 24.0));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::driver::{LaunchOptions, SessionFactory};
use crate::error::{Error, Result};
use crate::identifiers::{SessionId, TargetId};
use crate::session::BrowserKind;
use crate::wait::READY_STATE_SCRIPT;

use super::dialog::{DialogHandle, DialogKind};
use super::element::{ElementState, TargetHandle};
use super::remote::RemoteSession;
use super::selector::Locator;

// ============================================================================
// Page Model
// ============================================================================

/// One element of the scripted page.
#[derive(Debug, Clone)]
struct MemoryElement {
    id: TargetId,
    locators: Vec<Locator>,
    state: ElementState,
}

/// Mutable page contents.
#[derive(Debug)]
struct PageState {
    /// Attached elements in document order.
    elements: Vec<MemoryElement>,
    dialog: Option<(DialogKind, String)>,
    ready_state: String,
    fault: Option<String>,
    maximized: bool,
    implicit_wait: Option<Duration>,
    clicked: Vec<TargetId>,
    answered: Vec<(DialogKind, bool)>,
    closed: bool,
    next_element: u64,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            dialog: None,
            ready_state: "complete".to_string(),
            fault: None,
            maximized: false,
            implicit_wait: None,
            clicked: Vec::new(),
            answered: Vec::new(),
            closed: false,
            next_element: 1,
        }
    }
}

impl PageState {
    /// Fails if the session is closed or a fault is injected.
    fn check_link(&self) -> Result<()> {
        if self.closed {
            return Err(Error::transport("session closed"));
        }
        if let Some(message) = &self.fault {
            return Err(Error::transport(message.clone()));
        }
        Ok(())
    }

    fn element(&self, id: &TargetId) -> Option<&MemoryElement> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// Closes the open dialog, recording whether it was accepted.
    fn answer_dialog(&mut self, session_id: SessionId, dialog: &DialogHandle, accepted: bool) -> Result<()> {
        self.check_link()?;

        match &self.dialog {
            Some((kind, message))
                if dialog.session_id == session_id && *kind == dialog.kind && *message == dialog.message =>
            {
                self.answered.push((*kind, accepted));
                self.dialog = None;
                Ok(())
            }
            _ => Err(Error::transport("no such dialog is open")),
        }
    }
}

// ============================================================================
// MemoryBrowser
// ============================================================================

/// A [`RemoteSession`] over an in-memory page.
pub struct MemoryBrowser {
    session_id: SessionId,
    kind: BrowserKind,
    page: Mutex<PageState>,
    setup_delay: Option<Duration>,
    find_calls: AtomicU64,
    quit_calls: AtomicU64,
}

impl fmt::Debug for MemoryBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBrowser")
            .field("session_id", &self.session_id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl MemoryBrowser {
    /// Creates an empty page whose ready state is `complete`.
    #[must_use]
    pub fn new(kind: BrowserKind) -> Self {
        Self {
            session_id: SessionId::next(),
            kind,
            page: Mutex::new(PageState::default()),
            setup_delay: None,
            find_calls: AtomicU64::new(0),
            quit_calls: AtomicU64::new(0),
        }
    }

    /// Makes `maximize_window` and `set_implicit_wait` sleep for `delay`
    /// before taking effect.
    #[must_use]
    pub fn with_setup_delay(mut self, delay: Duration) -> Self {
        self.setup_delay = Some(delay);
        self
    }

    /// Returns the kind this browser was created as.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> BrowserKind {
        self.kind
    }
}

// ============================================================================
// MemoryBrowser - Page Scripting
// ============================================================================

impl MemoryBrowser {
    /// Appends an element matched by `locator`.
    pub fn add_element(&self, locator: Locator, state: ElementState) -> TargetId {
        self.add_element_matching([locator], state)
    }

    /// Appends an element matched by every locator in `locators`.
    pub fn add_element_matching(
        &self,
        locators: impl IntoIterator<Item = Locator>,
        state: ElementState,
    ) -> TargetId {
        let mut page = self.page.lock();
        let id = TargetId::new(format!("s{}-e{}", self.session_id, page.next_element));
        page.next_element += 1;
        page.elements.push(MemoryElement {
            id: id.clone(),
            locators: locators.into_iter().collect(),
            state,
        });
        id
    }

    /// Replaces an element's state. Unknown IDs are ignored.
    pub fn set_state(&self, id: &TargetId, state: ElementState) {
        let mut page = self.page.lock();
        if let Some(element) = page.elements.iter_mut().find(|e| &e.id == id) {
            element.state = state;
        }
    }

    /// Removes an element; handles to it become stale.
    pub fn detach(&self, id: &TargetId) {
        self.page.lock().elements.retain(|e| &e.id != id);
    }

    /// Opens a dialog.
    pub fn open_dialog(&self, kind: DialogKind, message: impl Into<String>) {
        self.page.lock().dialog = Some((kind, message.into()));
    }

    /// Closes the open dialog.
    pub fn close_dialog(&self) {
        self.page.lock().dialog = None;
    }

    /// Sets `document.readyState`, as read by [`READY_STATE_SCRIPT`].
    pub fn set_ready_state(&self, state: impl Into<String>) {
        self.page.lock().ready_state = state.into();
    }

    /// Makes every subsequent remote call fail with a transport error.
    pub fn inject_fault(&self, message: impl Into<String>) {
        self.page.lock().fault = Some(message.into());
    }

    /// Removes an injected fault.
    pub fn clear_fault(&self) {
        self.page.lock().fault = None;
    }
}

// ============================================================================
// MemoryBrowser - Observation
// ============================================================================

impl MemoryBrowser {
    /// Number of `find_elements` calls served.
    #[must_use]
    pub fn find_calls(&self) -> u64 {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Number of `quit` calls received.
    #[must_use]
    pub fn quit_calls(&self) -> u64 {
        self.quit_calls.load(Ordering::SeqCst)
    }

    /// Elements clicked so far, in order.
    #[must_use]
    pub fn clicked(&self) -> Vec<TargetId> {
        self.page.lock().clicked.clone()
    }

    /// Dialogs answered so far, with `true` for accepted.
    #[must_use]
    pub fn answered_dialogs(&self) -> Vec<(DialogKind, bool)> {
        self.page.lock().answered.clone()
    }

    /// Whether `maximize_window` was called.
    #[must_use]
    pub fn is_maximized(&self) -> bool {
        self.page.lock().maximized
    }

    /// The implicit wait last set.
    #[must_use]
    pub fn implicit_wait(&self) -> Option<Duration> {
        self.page.lock().implicit_wait
    }

    /// Whether the session has been quit.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.page.lock().closed
    }
}

// ============================================================================
// MemoryBrowser - RemoteSession
// ============================================================================

#[async_trait]
impl RemoteSession for MemoryBrowser {
    fn session_id(&self) -> SessionId {
        self.session_id
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<TargetHandle>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        locator.validate()?;

        let page = self.page.lock();
        page.check_link()?;

        Ok(page
            .elements
            .iter()
            .filter(|e| e.locators.contains(locator))
            .map(|e| TargetHandle::resolved(e.id.clone(), self.session_id, locator.clone()))
            .collect())
    }

    async fn element_state(&self, target: &TargetHandle) -> Result<ElementState> {
        let page = self.page.lock();
        page.check_link()?;

        if target.session_id() != self.session_id {
            return Err(Error::stale_handle(target.id().clone()));
        }
        page.element(target.id())
            .map(|e| e.state)
            .ok_or_else(|| Error::stale_handle(target.id().clone()))
    }

    async fn click(&self, target: &TargetHandle) -> Result<()> {
        let mut page = self.page.lock();
        page.check_link()?;

        let state = page
            .element(target.id())
            .map(|e| e.state)
            .ok_or_else(|| Error::stale_handle(target.id().clone()))?;
        if !state.is_clickable() {
            return Err(Error::not_interactable(
                target.id().clone(),
                "element is hidden or disabled",
            ));
        }

        page.clicked.push(target.id().clone());
        Ok(())
    }

    async fn active_dialog(&self) -> Result<Option<DialogHandle>> {
        let page = self.page.lock();
        page.check_link()?;

        Ok(page
            .dialog
            .as_ref()
            .map(|(kind, message)| DialogHandle::new(self.session_id, *kind, message.clone())))
    }

    async fn accept_dialog(&self, dialog: &DialogHandle) -> Result<()> {
        self.page.lock().answer_dialog(self.session_id, dialog, true)?;
        debug!(session_id = %self.session_id, kind = ?dialog.kind, "Dialog accepted");
        Ok(())
    }

    async fn dismiss_dialog(&self, dialog: &DialogHandle) -> Result<()> {
        self.page.lock().answer_dialog(self.session_id, dialog, false)?;
        debug!(session_id = %self.session_id, kind = ?dialog.kind, "Dialog dismissed");
        Ok(())
    }

    async fn execute_script(&self, script: &str) -> Result<Value> {
        let page = self.page.lock();
        page.check_link()?;

        if script.trim() == READY_STATE_SCRIPT {
            Ok(Value::String(page.ready_state.clone()))
        } else {
            Ok(Value::Null)
        }
    }

    async fn maximize_window(&self) -> Result<()> {
        if let Some(delay) = self.setup_delay {
            tokio::time::sleep(delay).await;
        }
        let mut page = self.page.lock();
        page.check_link()?;
        page.maximized = true;
        Ok(())
    }

    async fn set_implicit_wait(&self, timeout: Duration) -> Result<()> {
        if let Some(delay) = self.setup_delay {
            tokio::time::sleep(delay).await;
        }
        let mut page = self.page.lock();
        page.check_link()?;
        page.implicit_wait = Some(timeout);
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        self.quit_calls.fetch_add(1, Ordering::SeqCst);
        let mut page = self.page.lock();
        if page.closed {
            return Err(Error::transport("session already closed"));
        }
        page.closed = true;
        debug!(session_id = %self.session_id, "Memory session closed");
        Ok(())
    }
}

// ============================================================================
// MemoryFactory
// ============================================================================

/// Hook run on every browser the factory creates.
type CreateHook = Box<dyn Fn(&MemoryBrowser) + Send + Sync>;

/// A [`SessionFactory`] producing [`MemoryBrowser`]s.
#[derive(Default)]
pub struct MemoryFactory {
    created: Mutex<Vec<Arc<MemoryBrowser>>>,
    failure: Mutex<Option<String>>,
    launch_delay: Option<Duration>,
    setup_delay: Option<Duration>,
    on_create: Option<CreateHook>,
}

impl fmt::Debug for MemoryFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFactory")
            .field("created", &self.create_count())
            .field("launch_delay", &self.launch_delay)
            .field("setup_delay", &self.setup_delay)
            .finish_non_exhaustive()
    }
}

impl MemoryFactory {
    /// Creates a factory that always succeeds immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `delay` before every launch.
    #[must_use]
    pub fn with_launch_delay(mut self, delay: Duration) -> Self {
        self.launch_delay = Some(delay);
        self
    }

    /// Gives every new browser a setup delay (see
    /// [`MemoryBrowser::with_setup_delay`]).
    #[must_use]
    pub fn with_setup_delay(mut self, delay: Duration) -> Self {
        self.setup_delay = Some(delay);
        self
    }

    /// Runs `hook` on every new browser before it is returned.
    #[must_use]
    pub fn on_create<F>(mut self, hook: F) -> Self
    where
        F: Fn(&MemoryBrowser) + Send + Sync + 'static,
    {
        self.on_create = Some(Box::new(hook));
        self
    }

    /// Makes launches fail until [`MemoryFactory::recover`] is called.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    /// Clears a failure set by [`MemoryFactory::fail_with`].
    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Number of browsers created.
    #[must_use]
    pub fn create_count(&self) -> usize {
        self.created.lock().len()
    }

    /// Every browser created so far, oldest first.
    #[must_use]
    pub fn browsers(&self) -> Vec<Arc<MemoryBrowser>> {
        self.created.lock().clone()
    }

    /// The most recently created browser.
    #[must_use]
    pub fn last(&self) -> Option<Arc<MemoryBrowser>> {
        self.created.lock().last().cloned()
    }
}

#[async_trait]
impl SessionFactory for MemoryFactory {
    async fn create(
        &self,
        kind: BrowserKind,
        options: &LaunchOptions,
    ) -> Result<Arc<dyn RemoteSession>> {
        if let Some(delay) = self.launch_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.failure.lock().clone() {
            return Err(Error::transport(message));
        }
        options.validate(kind)?;

        let mut browser = MemoryBrowser::new(kind);
        browser.setup_delay = self.setup_delay;
        let browser = Arc::new(browser);
        if let Some(hook) = &self.on_create {
            hook(&browser);
        }
        self.created.lock().push(Arc::clone(&browser));

        debug!(
            session_id = %browser.session_id(),
            %kind,
            args = ?options.to_args(kind),
            "Memory session launched"
        );
        Ok(browser)
    }
}

// ============================================================================
// Tests
// ============================================================================

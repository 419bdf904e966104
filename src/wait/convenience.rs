//! Ready-made waits for the common cases.
//!
//! Each function runs one wait, logs how it ended and returns the
//! [`WaitOutcome`] unchanged. Callers that prefer log-and-continue can call
//! [`WaitOutcome::ok`]; callers that want to propagate use
//! [`WaitOutcome::into_result`].

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tracing::{error, info, warn};

use crate::browser::{DialogHandle, Locator, TargetHandle};
use crate::session::Session;

use super::conditions::{
    AlertPresence, Clickability, CollectionClickable, PageReadyState, Target, Visibility,
};
use super::engine::{explicit_wait, poll};
use super::outcome::WaitOutcome;
use super::policy::PollPolicy;

// ============================================================================
// Helper Functions
// ============================================================================

/// Logs the end of a wait.
fn report<T>(what: &str, outcome: &WaitOutcome<T>) {
    match outcome {
        WaitOutcome::Success(_) => info!(what, "Wait succeeded"),
        WaitOutcome::TimedOut { label, timeout } => warn!(
            what,
            %label,
            timeout_ms = timeout.as_millis() as u64,
            "Wait timed out"
        ),
        WaitOutcome::Failed(e) => error!(what, error = %e, kind = %e.kind(), "Wait failed"),
    }
}

// ============================================================================
// Waits
// ============================================================================

/// Waits for `target` to be displayed with a non-zero size.
pub async fn wait_for_visibility(
    session: &Session,
    target: impl Into<Target>,
    timeout: Duration,
) -> WaitOutcome<TargetHandle> {
    let outcome = explicit_wait(session, &Visibility::of(target), timeout).await;
    report("visibility", &outcome);
    outcome
}

/// Waits for `target` to be visible and enabled.
pub async fn wait_for_clickable(
    session: &Session,
    target: impl Into<Target>,
    timeout: Duration,
) -> WaitOutcome<TargetHandle> {
    let outcome = explicit_wait(session, &Clickability::of(target), timeout).await;
    report("clickable", &outcome);
    outcome
}

/// Waits for a dialog to open.
pub async fn wait_for_alert(session: &Session, timeout: Duration) -> WaitOutcome<DialogHandle> {
    let outcome = explicit_wait(session, &AlertPresence, timeout).await;
    report("alert", &outcome);
    outcome
}

/// Waits for `document.readyState` to reach `complete`.
pub async fn wait_for_page_load(session: &Session, timeout: Duration) -> WaitOutcome<()> {
    let outcome = explicit_wait(session, &PageReadyState::complete(), timeout).await;
    report("page load", &outcome);
    outcome
}

/// Waits for every element matching `locator` to be clickable.
pub async fn wait_for_clickable_collection(
    session: &Session,
    locator: Locator,
    timeout: Duration,
) -> WaitOutcome<Vec<TargetHandle>> {
    let outcome = explicit_wait(session, &CollectionClickable::of(locator), timeout).await;
    report("clickable collection", &outcome);
    outcome
}

/// Fluent visibility wait with a caller-chosen interval and label.
pub async fn fluent_visibility(
    session: &Session,
    locator: Locator,
    timeout: Duration,
    interval: Duration,
    label: impl Into<String>,
) -> WaitOutcome<TargetHandle> {
    let policy = PollPolicy::fluent(timeout, interval, label);
    let outcome = poll(session, &Visibility::of(locator), &policy).await;
    report("fluent visibility", &outcome);
    outcome
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use tokio::time::Instant;

    use crate::browser::memory::MemoryBrowser;
    use crate::browser::{DialogKind, ElementState};
    use crate::error::ErrorKind;
    use crate::session::BrowserKind;

    fn page() -> (Arc<MemoryBrowser>, Session) {
        let page = Arc::new(MemoryBrowser::new(BrowserKind::Firefox));
        let session = Session::detached(BrowserKind::Firefox, page.clone());
        (page, session)
    }

    #[tokio::test(start_paused = true)]
    async fn test_visibility_appears_later() {
        let (page, session) = page();
        let later = {
            let page = page.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(2)).await;
                page.add_element(Locator::css(".toast"), ElementState::visible(200.0, 30.0))
            })
        };

        let outcome = wait_for_visibility(&session, Locator::css(".toast"), Duration::from_secs(10)).await;
        let id = later.await.unwrap();

        assert!(matches!(outcome, WaitOutcome::Success(h) if h.id() == &id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clickable_times_out_while_hidden() {
        let (page, session) = page();
        page.add_element(Locator::id("next"), ElementState::hidden());

        let outcome = wait_for_clickable(&session, Locator::id("next"), Duration::from_secs(3)).await;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::WaitTimeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_and_page_load() {
        let (page, session) = page();
        page.open_dialog(DialogKind::Alert, "Saved");
        page.set_ready_state("loading");

        let dialog = wait_for_alert(&session, Duration::from_secs(1))
            .await
            .into_result()
            .unwrap();
        assert_eq!(dialog.message, "Saved");

        session.remote().accept_dialog(&dialog).await.unwrap();
        assert!(wait_for_alert(&session, Duration::from_secs(1)).await.is_timed_out());
        assert_eq!(page.answered_dialogs(), vec![(DialogKind::Alert, true)]);

        assert!(wait_for_page_load(&session, Duration::from_secs(1)).await.is_timed_out());
        page.set_ready_state("complete");
        assert!(wait_for_page_load(&session, Duration::from_secs(1)).await.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clickable_collection() {
        let (page, session) = page();
        let options = Locator::css("select#size option");
        for _ in 0..3 {
            page.add_element(options.clone(), ElementState::visible(40.0, 12.0));
        }

        let handles = wait_for_clickable_collection(&session, options, Duration::from_secs(1))
            .await
            .into_result()
            .unwrap();
        assert_eq!(handles.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fluent_visibility_uses_interval_and_label() {
        let (_page, session) = page();
        let started = Instant::now();

        let outcome = fluent_visibility(
            &session,
            Locator::id("missing"),
            Duration::from_secs(2),
            Duration::from_millis(700),
            "missing panel",
        )
        .await;

        assert_eq!(started.elapsed(), Duration::from_millis(2100));
        let err = outcome.into_result().unwrap_err();
        assert!(err.to_string().ends_with("missing panel"));
    }
}

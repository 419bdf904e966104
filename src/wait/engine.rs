//! The condition-polling engine.
//!
//! Every blocking wait in the crate goes through [`poll`]:
//!
//! ```text
//! loop:
//!   session not active        -> Failed(SessionTerminated)
//!   evaluate condition
//!     Satisfied(v)            -> Success(v)          (no trailing sleep)
//!     Failed(e), e terminal   -> Failed(e)           (no retry)
//!     NotYet | ignorable      -> fall through
//!   elapsed >= timeout        -> TimedOut
//!   sleep(interval)
//! ```
//!
//! The condition is always evaluated once before the timeout is checked, so
//! a zero timeout still performs one evaluation. Sleeping is
//! `tokio::time::sleep`; dropping the future cancels the wait at once.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, ErrorKind};
use crate::session::Session;

use super::condition::{Condition, ConditionResult};
use super::outcome::WaitOutcome;
use super::policy::PollPolicy;

// ============================================================================
// poll
// ============================================================================

/// Evaluates `condition` against `session` until it is satisfied, fails
/// terminally, or `policy`'s timeout elapses.
pub async fn poll<C>(session: &Session, condition: &C, policy: &PollPolicy) -> WaitOutcome<C::Output>
where
    C: Condition + ?Sized,
{
    let label = policy
        .label()
        .map_or_else(|| condition.describe(), str::to_owned);
    let interval = policy.effective_interval();
    let started = Instant::now();
    let mut evaluations: u32 = 0;

    debug!(
        session_id = %session.id(),
        %label,
        timeout_ms = policy.timeout().as_millis() as u64,
        interval_ms = interval.as_millis() as u64,
        "Waiting"
    );

    loop {
        if !session.is_active() {
            warn!(session_id = %session.id(), %label, evaluations, "Session ended during wait");
            return WaitOutcome::Failed(Error::session_terminated(session.id()));
        }

        evaluations += 1;
        match condition.evaluate(session).await {
            ConditionResult::Satisfied(value) => {
                debug!(
                    %label,
                    evaluations,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Condition satisfied"
                );
                return WaitOutcome::Success(value);
            }
            ConditionResult::Failed(e) if policy.is_ignorable(e.kind()) => {
                trace!(%label, evaluations, error = %e, "Ignoring failure");
            }
            ConditionResult::Failed(e) => {
                debug!(%label, evaluations, error = %e, "Condition failed");
                return WaitOutcome::Failed(e);
            }
            ConditionResult::NotYet => {
                trace!(%label, evaluations, "Condition not yet satisfied");
            }
        }

        let elapsed = started.elapsed();
        if elapsed >= policy.timeout() {
            debug!(
                %label,
                evaluations,
                elapsed_ms = elapsed.as_millis() as u64,
                "Wait timed out"
            );
            return WaitOutcome::TimedOut {
                label,
                timeout: policy.timeout(),
            };
        }

        sleep(interval).await;
    }
}

/// Explicit wait: `timeout` with the fixed
/// [`DEFAULT_POLL_INTERVAL`](super::policy::DEFAULT_POLL_INTERVAL) tick.
pub async fn explicit_wait<C>(session: &Session, condition: &C, timeout: Duration) -> WaitOutcome<C::Output>
where
    C: Condition + ?Sized,
{
    poll(session, condition, &PollPolicy::explicit(timeout)).await
}

/// Suspends the caller for exactly `duration`.
///
/// For deliberate delays only; prefer a condition wait.
pub async fn pause(duration: Duration) {
    info!(duration_ms = duration.as_millis() as u64, "Pausing");
    sleep(duration).await;
}

// ============================================================================
// Wait
// ============================================================================

/// Fluent wait builder.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use session_sync::wait::{Visibility, Wait};
/// use session_sync::{ErrorKind, Locator};
///
/// let handle = Wait::new(Duration::from_secs(10))
///     .polling_every(Duration::from_millis(250))
///     .with_message("search results")
///     .ignoring(ErrorKind::Transport)
///     .until(&session, &Visibility::of(Locator::css("#results li")))
///     .await
///     .into_result()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Wait {
    policy: PollPolicy,
}

impl Wait {
    /// Starts a wait with `timeout` and the default interval.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            policy: PollPolicy::explicit(timeout),
        }
    }

    /// Sets the interval between evaluations.
    #[inline]
    #[must_use]
    pub fn polling_every(mut self, interval: Duration) -> Self {
        self.policy = self.policy.with_interval(interval);
        self
    }

    /// Sets the label reported on timeout.
    #[inline]
    #[must_use]
    pub fn with_message(mut self, label: impl Into<String>) -> Self {
        self.policy = self.policy.with_label(label);
        self
    }

    /// Keeps polling when the condition fails with `kind`.
    #[inline]
    #[must_use]
    pub fn ignoring(mut self, kind: ErrorKind) -> Self {
        self.policy = self.policy.ignoring(kind);
        self
    }

    /// Returns the policy built so far.
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Runs the wait.
    pub async fn until<C>(&self, session: &Session, condition: &C) -> WaitOutcome<C::Output>
    where
        C: Condition + ?Sized,
    {
        poll(session, condition, &self.policy).await
    }
}

impl From<PollPolicy> for Wait {
    fn from(policy: PollPolicy) -> Self {
        Self { policy }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use proptest::prelude::*;
    use tokio_test::assert_pending;

    use crate::browser::memory::MemoryBrowser;
    use crate::identifiers::TargetId;
    use crate::session::BrowserKind;

    /// Scripted condition: not-yet until evaluation `succeed_at`, or a fixed
    /// failure on every evaluation.
    struct Scripted {
        calls: AtomicU32,
        succeed_at: Option<u32>,
        fail_with: Option<fn() -> Error>,
    }

    impl Scripted {
        fn never() -> Self {
            Self {
                calls: AtomicU32::new(0),
                succeed_at: None,
                fail_with: None,
            }
        }

        fn succeeds_at(k: u32) -> Self {
            Self {
                succeed_at: Some(k),
                ..Self::never()
            }
        }

        fn failing(make: fn() -> Error) -> Self {
            Self {
                fail_with: Some(make),
                ..Self::never()
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Condition for Scripted {
        type Output = u32;

        async fn evaluate(&self, _session: &Session) -> ConditionResult<u32> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(make) = self.fail_with {
                return ConditionResult::Failed(make());
            }
            match self.succeed_at {
                Some(k) if n >= k => ConditionResult::Satisfied(n),
                _ => ConditionResult::NotYet,
            }
        }

        fn describe(&self) -> String {
            "scripted".into()
        }
    }

    fn session() -> Session {
        Session::detached(
            BrowserKind::Chrome,
            Arc::new(MemoryBrowser::new(BrowserKind::Chrome)),
        )
    }

    fn stale() -> Error {
        Error::stale_handle(TargetId::new("gone"))
    }

    fn disabled() -> Error {
        Error::not_interactable(TargetId::new("btn"), "disabled")
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_satisfied_times_out_within_one_interval() {
        let session = session();
        let condition = Scripted::never();
        let timeout = Duration::from_secs(3);
        let interval = Duration::from_millis(400);
        let policy = PollPolicy::fluent(timeout, interval, "never");

        let started = Instant::now();
        let outcome = poll(&session, &condition, &policy).await;
        let elapsed = started.elapsed();

        assert!(outcome.is_timed_out());
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + interval);
        assert!(condition.calls() >= (timeout.as_millis() / interval.as_millis()) as u32);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_kth_evaluation_stops_there() {
        let session = session();
        let condition = Scripted::succeeds_at(4);
        let policy = PollPolicy::fluent(Duration::from_secs(10), Duration::from_secs(1), "k");

        let started = Instant::now();
        let outcome = poll(&session, &condition, &policy).await;

        assert_eq!(outcome.ok(), Some(4));
        assert_eq!(condition.calls(), 4);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_evaluates_once() {
        let session = session();
        let condition = Scripted::never();
        let outcome = poll(&session, &condition, &PollPolicy::explicit(Duration::ZERO)).await;

        assert!(outcome.is_timed_out());
        assert_eq!(condition.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failures_stop_after_one_evaluation() {
        for make in [stale as fn() -> Error, disabled] {
            let session = session();
            let condition = Scripted::failing(make);
            let started = Instant::now();

            let outcome = explicit_wait(&session, &condition, Duration::from_secs(30)).await;

            assert!(matches!(outcome, WaitOutcome::Failed(_)));
            assert_eq!(condition.calls(), 1);
            assert_eq!(started.elapsed(), Duration::ZERO);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignorable_failure_keeps_polling() {
        let session = session();
        let condition = Scripted::failing(stale);
        let outcome = Wait::new(Duration::from_secs(2))
            .polling_every(Duration::from_millis(500))
            .ignoring(ErrorKind::StaleHandle)
            .until(&session, &condition)
            .await;

        assert!(outcome.is_timed_out());
        assert_eq!(condition.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminated_session_fails_fast() {
        let session = session();
        session.terminate();
        let condition = Scripted::never();

        let outcome = explicit_wait(&session, &condition, Duration::from_secs(30)).await;

        assert_eq!(outcome.error_kind(), Some(ErrorKind::SessionNotBound));
        assert_eq!(condition.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_label_defaults_to_description() {
        let session = session();
        let err = explicit_wait(&session, &Scripted::never(), Duration::from_secs(1))
            .await
            .into_result()
            .unwrap_err();
        assert_eq!(err.to_string(), "Timed out after 1000ms waiting for scripted");

        let err = Wait::new(Duration::from_secs(1))
            .with_message("checkout total")
            .until(&session, &Scripted::never())
            .await
            .into_result()
            .unwrap_err();
        assert!(err.to_string().ends_with("checkout total"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_wait_cancels_it() {
        let session = session();
        let condition = Scripted::never();
        let mut wait = tokio_test::task::spawn(explicit_wait(&session, &condition, Duration::from_secs(30)));

        assert_pending!(wait.poll());
        assert_eq!(condition.calls(), 1);
        drop(wait);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(condition.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_sleeps_exact_duration() {
        let started = Instant::now();
        pause(Duration::from_millis(1500)).await;
        assert_eq!(started.elapsed(), Duration::from_millis(1500));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_timing_bounds_hold(timeout_ms in 0u64..5_000, interval_ms in 1u64..1_000) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .unwrap();

            let (calls, elapsed) = runtime.block_on(async {
                let session = session();
                let condition = Scripted::never();
                let timeout = Duration::from_millis(timeout_ms);
                let policy = PollPolicy::fluent(timeout, Duration::from_millis(interval_ms), "p");
                let started = Instant::now();
                let outcome = poll(&session, &condition, &policy).await;
                assert!(outcome.is_timed_out());
                (condition.calls(), started.elapsed())
            });

            prop_assert!(elapsed >= Duration::from_millis(timeout_ms));
            prop_assert!(elapsed < Duration::from_millis(timeout_ms + interval_ms));
            prop_assert!(u64::from(calls) >= timeout_ms / interval_ms);
        }
    }
}

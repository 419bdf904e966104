//! Context-to-session registry.
//!
//! The registry is the only shared mutable state in the crate. Its map is
//! guarded by a mutex that is never held across an `.await`; sessions
//! themselves are created, set up and quit outside the lock.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use session_sync::browser::memory::MemoryFactory;
//! use session_sync::{BrowserKind, ContextId, SessionRegistry};
//!
//! let registry = SessionRegistry::builder()
//!     .factory(Arc::new(MemoryFactory::new()))
//!     .build()?;
//!
//! let ctx = ContextId::new();
//! registry.acquire(ctx, BrowserKind::ChromeHeadless).await?;
//! let session = registry.current(ctx)?;
//! // ... waits against `session` ...
//! registry.release(ctx).await;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, error, info, warn};

use crate::browser::RemoteSession;
use crate::driver::{LaunchOptions, SessionFactory};
use crate::error::{Error, Result};
use crate::identifiers::ContextId;

use super::builder::RegistryBuilder;
use super::{BrowserKind, Session, SessionState};

// ============================================================================
// KindMismatch
// ============================================================================

/// What `acquire` does when the context already owns a session of a
/// different kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindMismatch {
    /// Keep the bound session and ignore the requested kind (logged).
    #[default]
    Keep,
    /// Fail with [`Error::KindMismatch`].
    Reject,
    /// Release the bound session and create one of the requested kind.
    Replace,
}

// ============================================================================
// Types
// ============================================================================

/// Settings fixed at build time.
#[derive(Debug, Clone)]
pub(crate) struct RegistrySettings {
    /// Maximize the window after creation.
    pub maximize: bool,

    /// Implicit element-resolution timeout applied after creation.
    pub implicit_wait: Option<Duration>,

    /// Policy for kind mismatches.
    pub on_kind_mismatch: KindMismatch,

    /// Launch options; `None` derives them from the kind.
    pub launch_options: Option<LaunchOptions>,
}

/// Internal shared state for the registry.
struct RegistryInner {
    factory: Arc<dyn SessionFactory>,
    bindings: Mutex<FxHashMap<ContextId, Session>>,
    settings: RegistrySettings,
}

// ============================================================================
// SessionRegistry
// ============================================================================

/// Binds at most one [`Session`] to each execution context.
///
/// Cloning is cheap; clones share the same bindings.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("bound", &self.len())
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SessionRegistry - Public API
// ============================================================================

impl SessionRegistry {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Binds a new session of `kind` to `context` unless one is bound.
    ///
    /// If the context already owns a session, that session is returned and
    /// nothing is created. A differing `kind` is handled per
    /// [`KindMismatch`].
    ///
    /// # Errors
    ///
    /// - [`Error::SessionInit`] if creation or post-creation setup fails, or
    ///   if `kind` cannot run in parallel and another context holds one
    /// - [`Error::KindMismatch`] under [`KindMismatch::Reject`]
    pub async fn acquire(&self, context: ContextId, kind: BrowserKind) -> Result<Session> {
        if let Some(existing) = self.bound(context) {
            if existing.kind() == kind {
                debug!(%context, session_id = %existing.id(), "Session already bound");
                return Ok(existing);
            }

            match self.inner.settings.on_kind_mismatch {
                KindMismatch::Keep => {
                    warn!(
                        %context,
                        bound = %existing.kind(),
                        requested = %kind,
                        "Session already bound with another kind; keeping it"
                    );
                    return Ok(existing);
                }
                KindMismatch::Reject => {
                    warn!(%context, bound = %existing.kind(), requested = %kind, "Kind mismatch rejected");
                    return Err(Error::KindMismatch {
                        context,
                        bound: existing.kind(),
                        requested: kind,
                    });
                }
                KindMismatch::Replace => {
                    info!(%context, bound = %existing.kind(), requested = %kind, "Replacing session");
                    self.release(context).await;
                }
            }
        }

        let holder = exclusive_holder(&self.inner.bindings.lock(), context, kind);
        if let Some(holder) = holder {
            return Err(exclusive_error(context, holder, kind));
        }

        let remote = self.launch(kind).await?;
        let session = Session::new(context, kind, Arc::clone(&remote));

        let bound = {
            let mut map = self.inner.bindings.lock();
            match exclusive_holder(&map, context, kind) {
                Some(holder) => Err(holder),
                None => match map.entry(context) {
                    Entry::Occupied(entry) => Ok(Some(entry.get().clone())),
                    Entry::Vacant(entry) => {
                        entry.insert(session.clone());
                        Ok(None)
                    }
                },
            }
        };

        match bound {
            Ok(None) => {}
            Ok(Some(existing)) => {
                warn!(%context, "Concurrent acquire on one context; discarding the newer session");
                discard(&session, remote.as_ref()).await;
                return Ok(existing);
            }
            Err(holder) => {
                discard(&session, remote.as_ref()).await;
                return Err(exclusive_error(context, holder, kind));
            }
        }

        info!(%context, session_id = %session.id(), %kind, "Session acquired");
        Ok(session)
    }

    /// Returns the session bound to `context`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionNotBound`] if nothing is bound.
    pub fn current(&self, context: ContextId) -> Result<Session> {
        self.bound(context)
            .ok_or_else(|| Error::session_not_bound(context))
    }

    /// Terminates and unbinds the session of `context`.
    ///
    /// Never fails: releasing an unbound context is logged and ignored, and
    /// a remote quit failure is logged after the binding is removed.
    pub async fn release(&self, context: ContextId) {
        let removed = self.inner.bindings.lock().remove(&context);

        let Some(session) = removed else {
            warn!(%context, "No session bound; nothing to release");
            return;
        };

        session.terminate();
        match session.remote().quit().await {
            Ok(()) => info!(%context, session_id = %session.id(), "Session released"),
            Err(e) => warn!(
                %context,
                session_id = %session.id(),
                error = %e,
                "Session unbound but remote quit failed"
            ),
        }
    }

    /// Releases every bound session.
    pub async fn release_all(&self) {
        let sessions: Vec<Session> = {
            let mut map = self.inner.bindings.lock();
            map.drain().map(|(_, session)| session).collect()
        };

        info!(count = sessions.len(), "Releasing all sessions");

        let quits = sessions.iter().map(|session| {
            session.terminate();
            session.remote().quit()
        });

        for (session, result) in sessions.iter().zip(join_all(quits).await) {
            if let Err(e) = result {
                debug!(session_id = %session.id(), error = %e, "Error quitting session during shutdown");
            }
        }
    }

    /// Returns the state of `context`'s slot: [`SessionState::Active`] while
    /// a session is bound, [`SessionState::Unbound`] otherwise.
    #[must_use]
    pub fn state(&self, context: ContextId) -> SessionState {
        self.bound(context)
            .map_or(SessionState::Unbound, |session| session.state())
    }

    /// Returns `true` if `context` owns a session.
    #[must_use]
    pub fn is_bound(&self, context: ContextId) -> bool {
        self.inner.bindings.lock().contains_key(&context)
    }

    /// Returns the number of bound sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.bindings.lock().len()
    }

    /// Returns `true` if no session is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// SessionRegistry - Internal API
// ============================================================================

impl SessionRegistry {
    /// Creates a registry.
    pub(crate) fn new(factory: Arc<dyn SessionFactory>, settings: RegistrySettings) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                factory,
                bindings: Mutex::new(FxHashMap::default()),
                settings,
            }),
        }
    }

    fn bound(&self, context: ContextId) -> Option<Session> {
        self.inner.bindings.lock().get(&context).cloned()
    }

    /// Creates and prepares a remote session.
    ///
    /// A session that fails setup is quit before returning; one abandoned
    /// mid-setup by cancellation is quit by [`QuitGuard`].
    async fn launch(&self, kind: BrowserKind) -> Result<Arc<dyn RemoteSession>> {
        let options = self
            .inner
            .settings
            .launch_options
            .clone()
            .unwrap_or_else(|| LaunchOptions::for_kind(kind));

        let remote = self
            .inner
            .factory
            .create(kind, &options)
            .await
            .map_err(|e| {
                error!(%kind, error = %e, "Session creation failed");
                match e {
                    Error::SessionInit { .. } => e,
                    other => Error::session_init(kind, other.to_string()),
                }
            })?;

        let guard = QuitGuard::new(Arc::clone(&remote));
        let prepared = self.prepare(remote.as_ref()).await;
        guard.disarm();

        if let Err(e) = prepared {
            error!(%kind, error = %e, "Session setup failed");
            if let Err(quit_err) = remote.quit().await {
                warn!(%kind, error = %quit_err, "Failed to quit session after setup failure");
            }
            return Err(Error::session_init(kind, format!("setup failed: {e}")));
        }

        Ok(remote)
    }

    /// Applies post-creation setup.
    async fn prepare(&self, remote: &dyn RemoteSession) -> Result<()> {
        if self.inner.settings.maximize {
            remote.maximize_window().await?;
        }
        if let Some(timeout) = self.inner.settings.implicit_wait {
            remote.set_implicit_wait(timeout).await?;
            debug!(timeout_ms = timeout.as_millis() as u64, "Implicit wait applied");
        }
        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Returns another context holding a session of `kind` when `kind` cannot
/// run several sessions at once.
fn exclusive_holder(
    bindings: &FxHashMap<ContextId, Session>,
    context: ContextId,
    kind: BrowserKind,
) -> Option<ContextId> {
    if kind.supports_parallel() {
        return None;
    }
    bindings
        .iter()
        .find(|(bound_to, session)| **bound_to != context && session.kind() == kind)
        .map(|(bound_to, _)| *bound_to)
}

fn exclusive_error(context: ContextId, holder: ContextId, kind: BrowserKind) -> Error {
    warn!(%context, %holder, %kind, "Kind allows one session at a time");
    Error::session_init(kind, format!("only one {kind} session may exist; held by context {holder}"))
}

/// Terminates and quits a session that lost the race to be bound.
async fn discard(session: &Session, remote: &dyn RemoteSession) {
    session.terminate();
    if let Err(e) = remote.quit().await {
        warn!(context = %session.context(), error = %e, "Failed to quit discarded session");
    }
}

// ============================================================================
// QuitGuard
// ============================================================================

/// Quits a remote session that was created but never bound.
///
/// Armed while setup runs; dropping it armed (the `acquire` future was
/// cancelled) schedules `quit` on the current runtime.
struct QuitGuard {
    remote: Option<Arc<dyn RemoteSession>>,
}

impl QuitGuard {
    fn new(remote: Arc<dyn RemoteSession>) -> Self {
        Self {
            remote: Some(remote),
        }
    }

    fn disarm(mut self) {
        self.remote = None;
    }
}

impl Drop for QuitGuard {
    fn drop(&mut self) {
        let Some(remote) = self.remote.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!(session_id = %remote.session_id(), "Quitting session abandoned during setup");
                handle.spawn(async move {
                    if let Err(e) = remote.quit().await {
                        debug!(error = %e, "Failed to quit abandoned session");
                    }
                });
            }
            Err(_) => {
                warn!(session_id = %remote.session_id(), "No runtime to quit abandoned session");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use crate::browser::memory::MemoryFactory;
    use crate::error::ErrorKind;

    fn registry_with(factory: &Arc<MemoryFactory>) -> SessionRegistry {
        SessionRegistry::builder()
            .factory(factory.clone())
            .build()
            .expect("registry")
    }

    #[tokio::test]
    async fn test_acquire_binds_active_session() {
        let factory = Arc::new(MemoryFactory::new());
        let registry = registry_with(&factory);
        let ctx = ContextId::new();

        let session = registry.acquire(ctx, BrowserKind::Chrome).await.unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.context(), ctx);
        assert_eq!(registry.current(ctx).unwrap().id(), session.id());
        assert!(registry.is_bound(ctx));
    }

    #[tokio::test]
    async fn test_acquire_twice_creates_once() {
        let factory = Arc::new(MemoryFactory::new());
        let registry = registry_with(&factory);
        let ctx = ContextId::new();

        let first = registry.acquire(ctx, BrowserKind::Firefox).await.unwrap();
        let second = registry.acquire(ctx, BrowserKind::Firefox).await.unwrap();

        assert_eq!(factory.create_count(), 1);
        assert_eq!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_kind_mismatch_keeps_by_default() {
        let factory = Arc::new(MemoryFactory::new());
        let registry = registry_with(&factory);
        let ctx = ContextId::new();

        registry.acquire(ctx, BrowserKind::Chrome).await.unwrap();
        let kept = registry.acquire(ctx, BrowserKind::Edge).await.unwrap();

        assert_eq!(kept.kind(), BrowserKind::Chrome);
        assert_eq!(factory.create_count(), 1);
    }

    #[tokio::test]
    async fn test_kind_mismatch_reject() {
        let factory = Arc::new(MemoryFactory::new());
        let registry = SessionRegistry::builder()
            .factory(factory.clone())
            .on_kind_mismatch(KindMismatch::Reject)
            .build()
            .unwrap();
        let ctx = ContextId::new();

        registry.acquire(ctx, BrowserKind::Chrome).await.unwrap();
        let err = registry.acquire(ctx, BrowserKind::Edge).await.unwrap_err();

        assert!(matches!(err, Error::KindMismatch { .. }));
        assert_eq!(err.kind(), ErrorKind::SessionInit);
        assert_eq!(registry.current(ctx).unwrap().kind(), BrowserKind::Chrome);
    }

    #[tokio::test]
    async fn test_kind_mismatch_replace() {
        let factory = Arc::new(MemoryFactory::new());
        let registry = SessionRegistry::builder()
            .factory(factory.clone())
            .on_kind_mismatch(KindMismatch::Replace)
            .build()
            .unwrap();
        let ctx = ContextId::new();

        let old = registry.acquire(ctx, BrowserKind::Chrome).await.unwrap();
        let new = registry.acquire(ctx, BrowserKind::Edge).await.unwrap();

        assert_eq!(new.kind(), BrowserKind::Edge);
        assert_eq!(old.state(), SessionState::Terminated);
        assert!(factory.browsers()[0].is_closed());
        assert_eq!(factory.create_count(), 2);
    }

    #[tokio::test]
    async fn test_current_without_session_fails() {
        let registry = registry_with(&Arc::new(MemoryFactory::new()));
        let ctx = ContextId::new();

        let err = registry.current(ctx).unwrap_err();
        assert!(matches!(err, Error::SessionNotBound { context } if context == ctx));
    }

    #[tokio::test]
    async fn test_release_twice_is_noop() {
        let factory = Arc::new(MemoryFactory::new());
        let registry = registry_with(&factory);
        let ctx = ContextId::new();

        let session = registry.acquire(ctx, BrowserKind::Chrome).await.unwrap();
        registry.release(ctx).await;
        registry.release(ctx).await;

        assert!(!registry.is_bound(ctx));
        assert_eq!(session.state(), SessionState::Terminated);
        assert_eq!(factory.last().unwrap().quit_calls(), 1);
    }

    #[tokio::test]
    async fn test_release_without_acquire_is_noop() {
        let registry = registry_with(&Arc::new(MemoryFactory::new()));
        registry.release(ContextId::new()).await;
        registry.release(ContextId::new()).await;
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_release_unbinds_even_if_quit_fails() {
        let factory = Arc::new(MemoryFactory::new());
        let registry = registry_with(&factory);
        let ctx = ContextId::new();

        registry.acquire(ctx, BrowserKind::Chrome).await.unwrap();
        factory.last().unwrap().quit().await.unwrap();

        registry.release(ctx).await;
        assert!(!registry.is_bound(ctx));
    }

    #[tokio::test]
    async fn test_acquire_after_release_creates_new() {
        let factory = Arc::new(MemoryFactory::new());
        let registry = registry_with(&factory);
        let ctx = ContextId::new();

        let first = registry.acquire(ctx, BrowserKind::Chrome).await.unwrap();
        registry.release(ctx).await;
        let second = registry.acquire(ctx, BrowserKind::Chrome).await.unwrap();

        assert_ne!(first.id(), second.id());
        assert_eq!(factory.create_count(), 2);
    }

    #[tokio::test]
    async fn test_creation_failure_is_session_init() {
        let factory = Arc::new(MemoryFactory::new());
        factory.fail_with("driver binary missing");
        let registry = registry_with(&factory);
        let ctx = ContextId::new();

        let err = registry.acquire(ctx, BrowserKind::Safari).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionInit);
        assert!(err.to_string().contains("driver binary missing"));
        assert!(!registry.is_bound(ctx));
    }

    #[tokio::test]
    async fn test_setup_applies_maximize_and_implicit_wait() {
        let factory = Arc::new(MemoryFactory::new());
        let registry = SessionRegistry::builder()
            .factory(factory.clone())
            .implicit_wait(Duration::from_secs(12))
            .build()
            .unwrap();

        registry
            .acquire(ContextId::new(), BrowserKind::Chrome)
            .await
            .unwrap();

        let page = factory.last().unwrap();
        assert!(page.is_maximized());
        assert_eq!(page.implicit_wait(), Some(Duration::from_secs(12)));
    }

    #[tokio::test]
    async fn test_setup_failure_quits_and_does_not_bind() {
        let factory = Arc::new(MemoryFactory::new().on_create(|page| page.inject_fault("no display")));
        let registry = registry_with(&factory);
        let ctx = ContextId::new();

        let err = registry.acquire(ctx, BrowserKind::Chrome).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionInit);
        assert!(!registry.is_bound(ctx));
        assert_eq!(factory.last().unwrap().quit_calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_contexts_get_distinct_sessions() {
        let factory = Arc::new(MemoryFactory::new());
        let registry = registry_with(&factory);

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    let ctx = ContextId::new();
                    let session = registry.acquire(ctx, BrowserKind::ChromeHeadless).await.unwrap();
                    assert_eq!(registry.current(ctx).unwrap().id(), session.id());
                    session.id()
                })
            })
            .collect();

        let ids: HashSet<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.expect("task"))
            .collect();

        assert_eq!(ids.len(), 16);
        assert_eq!(registry.len(), 16);
        assert_eq!(factory.create_count(), 16);
    }

    #[tokio::test]
    async fn test_release_all() {
        let factory = Arc::new(MemoryFactory::new());
        let registry = registry_with(&factory);

        for _ in 0..3 {
            registry
                .acquire(ContextId::new(), BrowserKind::Firefox)
                .await
                .unwrap();
        }
        registry.release_all().await;

        assert!(registry.is_empty());
        assert!(factory.browsers().iter().all(|b| b.is_closed()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_acquire_leaves_nothing_bound() {
        let factory = Arc::new(MemoryFactory::new().with_launch_delay(Duration::from_secs(5)));
        let registry = registry_with(&factory);
        let ctx = ContextId::new();

        let task = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.acquire(ctx, BrowserKind::Chrome).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        task.abort();

        let joined = task.await;
        assert!(joined.unwrap_err().is_cancelled());
        assert!(!registry.is_bound(ctx));
        assert_eq!(factory.create_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_setup_quits_the_new_session() {
        let factory = Arc::new(MemoryFactory::new().with_setup_delay(Duration::from_secs(5)));
        let registry = registry_with(&factory);
        let ctx = ContextId::new();

        let task = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.acquire(ctx, BrowserKind::Chrome).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(factory.create_count(), 1);
        task.abort();

        assert!(task.await.unwrap_err().is_cancelled());
        // Let the scheduled quit run.
        tokio::time::sleep(Duration::from_millis(1)).await;

        let page = factory.last().unwrap();
        assert!(!registry.is_bound(ctx));
        assert!(!page.is_maximized());
        assert_eq!(page.quit_calls(), 1);
        assert!(page.is_closed());
    }

    #[tokio::test]
    async fn test_state_follows_binding() {
        let registry = registry_with(&Arc::new(MemoryFactory::new()));
        let ctx = ContextId::new();

        assert_eq!(registry.state(ctx), SessionState::Unbound);
        registry.acquire(ctx, BrowserKind::Edge).await.unwrap();
        assert_eq!(registry.state(ctx), SessionState::Active);
        registry.release(ctx).await;
        assert_eq!(registry.state(ctx), SessionState::Unbound);
    }

    #[tokio::test]
    async fn test_safari_allows_one_session() {
        let factory = Arc::new(MemoryFactory::new());
        let registry = registry_with(&factory);
        let (first, second) = (ContextId::new(), ContextId::new());

        registry.acquire(first, BrowserKind::Safari).await.unwrap();
        let err = registry.acquire(second, BrowserKind::Safari).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SessionInit);
        assert!(!registry.is_bound(second));
        assert_eq!(factory.create_count(), 1);

        // Other kinds and the holder itself are unaffected.
        registry.acquire(second, BrowserKind::Chrome).await.unwrap();
        registry.acquire(first, BrowserKind::Safari).await.unwrap();
        assert_eq!(registry.len(), 2);

        registry.release(first).await;
        let third = ContextId::new();
        registry.acquire(third, BrowserKind::Safari).await.unwrap();
        assert_eq!(registry.current(third).unwrap().kind(), BrowserKind::Safari);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_safari_acquires_bind_one() {
        let factory = Arc::new(MemoryFactory::new().with_launch_delay(Duration::from_secs(1)));
        let registry = registry_with(&factory);

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.acquire(ContextId::new(), BrowserKind::Safari).await })
            })
            .collect();

        let results: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.expect("task"))
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(factory.create_count(), 2);
        assert_eq!(factory.browsers().iter().filter(|b| b.is_closed()).count(), 1);
    }
}

//! Builder pattern for registry configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use session_sync::browser::memory::MemoryFactory;
//! use session_sync::{KindMismatch, SessionRegistry};
//!
//! let registry = SessionRegistry::builder()
//!     .factory(Arc::new(MemoryFactory::new()))
//!     .implicit_wait(Duration::from_secs(10))
//!     .on_kind_mismatch(KindMismatch::Reject)
//!     .build()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::WaitSettings;
use crate::driver::{LaunchOptions, SessionFactory};
use crate::error::{Error, Result};
use crate::wait::DEFAULT_TIMEOUT;

use super::registry::{KindMismatch, RegistrySettings, SessionRegistry};

// ============================================================================
// RegistryBuilder
// ============================================================================

/// Builder for configuring a [`SessionRegistry`].
///
/// Use [`SessionRegistry::builder()`] to create a new builder.
#[derive(Clone)]
pub struct RegistryBuilder {
    factory: Option<Arc<dyn SessionFactory>>,
    maximize: bool,
    implicit_wait: Option<Duration>,
    on_kind_mismatch: KindMismatch,
    launch_options: Option<LaunchOptions>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            factory: None,
            maximize: true,
            implicit_wait: Some(DEFAULT_TIMEOUT),
            on_kind_mismatch: KindMismatch::default(),
            launch_options: None,
        }
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("has_factory", &self.factory.is_some())
            .field("maximize", &self.maximize)
            .field("implicit_wait", &self.implicit_wait)
            .field("on_kind_mismatch", &self.on_kind_mismatch)
            .field("launch_options", &self.launch_options)
            .finish()
    }
}

// ============================================================================
// RegistryBuilder Implementation
// ============================================================================

impl RegistryBuilder {
    /// Creates a builder with default settings and no factory.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the factory that launches sessions. Required.
    #[inline]
    #[must_use]
    pub fn factory(mut self, factory: Arc<dyn SessionFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Maximizes each new window. Defaults to `true`.
    #[inline]
    #[must_use]
    pub fn maximize(mut self, maximize: bool) -> Self {
        self.maximize = maximize;
        self
    }

    /// Sets the implicit wait applied to each new session.
    ///
    /// Defaults to [`DEFAULT_TIMEOUT`].
    #[inline]
    #[must_use]
    pub fn implicit_wait(mut self, timeout: Duration) -> Self {
        self.implicit_wait = Some(timeout);
        self
    }

    /// Leaves the backend's implicit wait untouched.
    #[inline]
    #[must_use]
    pub fn no_implicit_wait(mut self) -> Self {
        self.implicit_wait = None;
        self
    }

    /// Sets the policy for acquiring a different kind on a bound context.
    #[inline]
    #[must_use]
    pub fn on_kind_mismatch(mut self, policy: KindMismatch) -> Self {
        self.on_kind_mismatch = policy;
        self
    }

    /// Overrides the per-kind launch options.
    #[inline]
    #[must_use]
    pub fn launch_options(mut self, options: LaunchOptions) -> Self {
        self.launch_options = Some(options);
        self
    }

    /// Applies loaded settings: window maximization and implicit wait.
    #[must_use]
    pub fn settings(mut self, settings: &WaitSettings) -> Self {
        self.maximize = settings.maximize;
        self.implicit_wait = Some(settings.timeout);
        self
    }

    /// Builds the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no factory was set.
    pub fn build(self) -> Result<SessionRegistry> {
        let factory = self.factory.ok_or_else(|| {
            Error::config(
                "Session factory is required. Use .factory() to set it.\n\
                 Example: SessionRegistry::builder().factory(Arc::new(MemoryFactory::new()))",
            )
        })?;

        Ok(SessionRegistry::new(
            factory,
            RegistrySettings {
                maximize: self.maximize,
                implicit_wait: self.implicit_wait,
                on_kind_mismatch: self.on_kind_mismatch,
                launch_options: self.launch_options,
            },
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================

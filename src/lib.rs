//! Session Sync - per-context browser sessions and condition waits.
//!
//! This library lets many concurrent test workers each own exactly one
//! remote browser session, and wait on conditions in that session
//! (visibility, clickability, dialogs, page readiness) with bounded time
//! and a precise failure classification.
//!
//! # Architecture
//!
//! - A [`SessionRegistry`] maps each [`ContextId`] to at most one
//!   [`Session`]. Its map is the only shared mutable state.
//! - Sessions are created by a [`SessionFactory`] and talk to the target
//!   through the [`RemoteSession`] trait. The wire protocol is the
//!   implementor's concern.
//! - Every wait goes through [`wait::poll`], which evaluates a
//!   [`Condition`](wait::Condition) returning a tagged
//!   [`ConditionResult`](wait::ConditionResult). Retry versus stop is decided
//!   by that tag and the policy's ignorable kinds, never by the engine.
//! - Everything is async on tokio. Cancelling a wait means dropping it.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use session_sync::browser::memory::MemoryFactory;
//! use session_sync::wait::{Clickability, explicit_wait};
//! use session_sync::{BrowserKind, ContextId, Locator, Result, SessionRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let registry = SessionRegistry::builder()
//!         .factory(Arc::new(MemoryFactory::new()))
//!         .build()?;
//!
//!     let ctx = ContextId::new();
//!     let session = registry.acquire(ctx, BrowserKind::ChromeHeadless).await?;
//!
//!     let button = explicit_wait(&session, &Clickability::of(Locator::id("go")), Duration::from_secs(5))
//!         .await
//!         .into_result()?;
//!     session.remote().click(&button).await?;
//!
//!     registry.release(ctx).await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | Remote target contract, locators, handles, memory backend |
//! | [`config`] | Property files and wait defaults |
//! | [`driver`] | Session factory and launch options |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`select`] | Bounded random selection of an enabled option |
//! | [`session`] | Sessions and the per-context registry |
//! | [`wait`] | Polling engine, conditions, convenience waits |

// ============================================================================
// Modules
// ============================================================================

/// Remote target model: sessions, locators, element handles.
pub mod browser;

/// Property-file configuration.
pub mod config;

/// Session factory and launch options.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Bounded random option selection.
pub mod select;

/// Sessions and the session registry.
pub mod session;

/// Condition waits.
pub mod wait;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{DialogHandle, DialogKind, ElementState, Locator, RemoteSession, TargetHandle};

// Configuration
pub use config::{Properties, WaitSettings};

// Driver types
pub use driver::{LaunchOptions, SessionFactory};

// Error types
pub use error::{Error, ErrorKind, Result};

// Identifier types
pub use identifiers::{ContextId, SessionId, TargetId};

// Session types
pub use session::{BrowserKind, KindMismatch, RegistryBuilder, Session, SessionRegistry, SessionState};

// Wait types
pub use wait::{PollPolicy, Wait, WaitOutcome};

//! Session creation.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SessionFactory`] | Launches remote sessions for the registry |
//! | [`LaunchOptions`] | Process-level launch options |
//!
//! An in-process factory lives in
//! [`browser::memory`](crate::browser::memory).

// ============================================================================
// Submodules
// ============================================================================

/// The factory trait.
pub mod factory;

/// Launch options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use factory::SessionFactory;
pub use options::LaunchOptions;

//! Remote target model.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RemoteSession`] | Contract every backend implements |
//! | [`Locator`] | Strategy + value element descriptor |
//! | [`TargetHandle`] | Opaque reference to one resolved element |
//! | [`ElementState`] | Displayed/enabled/size snapshot |
//! | [`DialogHandle`] | An open alert, confirm or prompt |
//! | [`memory::MemoryBrowser`] | In-process backend over a scripted page |
//!
//! # Example
//!
//! ```ignore
//! use session_sync::Locator;
//!
//! let by_id = Locator::id("submit");
//! let parsed = Locator::parse("xpath=//form/button")?;
//! assert_eq!(parsed.strategy(), "xpath");
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Interrupt dialogs.
pub mod dialog;

/// Element handles and state.
pub mod element;

/// In-process backend.
pub mod memory;

/// The remote session contract.
pub mod remote;

/// Locators.
pub mod selector;

// ============================================================================
// Re-exports
// ============================================================================

pub use dialog::{DialogHandle, DialogKind};
pub use element::{ElementState, TargetHandle};
pub use remote::RemoteSession;
pub use selector::Locator;

//! Launch options handed to a [`SessionFactory`](super::SessionFactory).
//!
//! # Example
//!
//! ```ignore
//! use session_sync::{BrowserKind, LaunchOptions};
//!
//! let options = LaunchOptions::for_kind(BrowserKind::ChromeHeadless)
//!     .with_window_size(1920, 1080)
//!     .with_private();
//!
//! let args = options.to_args(BrowserKind::ChromeHeadless);
//! // ["--headless", "--window-size=1920,1080", "--incognito"]
//! ```

use crate::error::{Error, Result};
use crate::session::BrowserKind;

// ============================================================================
// LaunchOptions
// ============================================================================

/// Process-level options for a new remote session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Run without a visible window.
    pub headless: bool,

    /// Initial window dimensions in pixels (width, height).
    pub window_size: Option<(u32, u32)>,

    /// Open a private/incognito window.
    pub private: bool,

    /// Additional backend-specific arguments, passed through verbatim.
    pub extra_args: Vec<String>,
}

// ============================================================================
// Constructors
// ============================================================================

impl LaunchOptions {
    /// Creates options with every flag off.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            headless: false,
            window_size: None,
            private: false,
            extra_args: Vec::new(),
        }
    }

    /// Creates the default options for a browser kind.
    ///
    /// Headless kinds get `headless = true`.
    #[must_use]
    pub fn for_kind(kind: BrowserKind) -> Self {
        Self {
            headless: kind.is_headless(),
            ..Self::new()
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl LaunchOptions {
    /// Enables headless mode.
    #[inline]
    #[must_use]
    pub fn with_headless(mut self) -> Self {
        self.headless = true;
        self
    }

    /// Sets the initial window size.
    #[inline]
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = Some((width, height));
        self
    }

    /// Enables private browsing.
    #[inline]
    #[must_use]
    pub fn with_private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Adds one extra argument.
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Adds several extra arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }
}

// ============================================================================
// Conversion
// ============================================================================

impl LaunchOptions {
    /// Renders the options as command-line arguments for `kind`.
    ///
    /// Safari and Explorer have no headless or private switch; those flags
    /// are skipped for them.
    #[must_use]
    pub fn to_args(&self, kind: BrowserKind) -> Vec<String> {
        let mut args = Vec::new();
        let chromium = matches!(
            kind,
            BrowserKind::Chrome
                | BrowserKind::ChromeHeadless
                | BrowserKind::Edge
                | BrowserKind::EdgeHeadless
        );
        let firefox = matches!(kind, BrowserKind::Firefox | BrowserKind::FirefoxHeadless);

        if self.headless && (chromium || firefox) {
            args.push("--headless".to_string());
        }

        if let Some((width, height)) = self.window_size {
            if firefox {
                args.push(format!("--width={width}"));
                args.push(format!("--height={height}"));
            } else if chromium {
                args.push(format!("--window-size={width},{height}"));
            }
        }

        if self.private {
            match kind {
                BrowserKind::Chrome | BrowserKind::ChromeHeadless => {
                    args.push("--incognito".to_string());
                }
                BrowserKind::Edge | BrowserKind::EdgeHeadless => {
                    args.push("--inprivate".to_string());
                }
                BrowserKind::Firefox | BrowserKind::FirefoxHeadless => {
                    args.push("--private-window".to_string());
                }
                BrowserKind::Safari | BrowserKind::Explorer => {}
            }
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Validates the options against the requested kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for zero window dimensions or a headless
    /// request on a kind without headless support.
    pub fn validate(&self, kind: BrowserKind) -> Result<()> {
        if let Some((width, height)) = self.window_size
            && (width == 0 || height == 0)
        {
            return Err(Error::config("Window dimensions must be greater than zero"));
        }
        if self.headless && matches!(kind, BrowserKind::Safari | BrowserKind::Explorer) {
            return Err(Error::config(format!("{kind} has no headless mode")));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

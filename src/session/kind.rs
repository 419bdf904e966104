//! Declared browser kinds.
//!
//! Names round-trip through [`FromStr`] and [`Display`] in kebab-case
//! (`chrome`, `firefox-headless`, ...), the same form configuration files use.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// BrowserKind
// ============================================================================

/// Kind of remote session a context asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrowserKind {
    /// Chrome with a visible window.
    Chrome,
    /// Firefox with a visible window.
    Firefox,
    /// Edge with a visible window.
    Edge,
    /// Safari. A registry binds at most one Safari session at a time.
    Safari,
    /// Internet Explorer (legacy).
    Explorer,
    /// Chrome without a window.
    ChromeHeadless,
    /// Firefox without a window.
    FirefoxHeadless,
    /// Edge without a window.
    EdgeHeadless,
}

impl BrowserKind {
    /// Every supported kind.
    pub const ALL: [BrowserKind; 8] = [
        Self::Chrome,
        Self::Firefox,
        Self::Edge,
        Self::Safari,
        Self::Explorer,
        Self::ChromeHeadless,
        Self::FirefoxHeadless,
        Self::EdgeHeadless,
    ];

    /// Returns `true` for the headless variants.
    #[inline]
    #[must_use]
    pub const fn is_headless(self) -> bool {
        matches!(
            self,
            Self::ChromeHeadless | Self::FirefoxHeadless | Self::EdgeHeadless
        )
    }

    /// Returns `false` for kinds that cannot run several sessions at once.
    ///
    /// [`SessionRegistry::acquire`](crate::SessionRegistry::acquire) refuses
    /// a second live session of such a kind.
    #[inline]
    #[must_use]
    pub const fn supports_parallel(self) -> bool {
        !matches!(self, Self::Safari)
    }

    /// Returns the kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Edge => "edge",
            Self::Safari => "safari",
            Self::Explorer => "explorer",
            Self::ChromeHeadless => "chrome-headless",
            Self::FirefoxHeadless => "firefox-headless",
            Self::EdgeHeadless => "edge-headless",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Error::config(format!("Unknown browser kind: {s:?}")))
    }
}

// ============================================================================
// Tests
// ============================================================================

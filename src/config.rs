//! Property-file configuration.
//!
//! [`Properties`] reads `key=value` files; [`WaitSettings`] pulls the wait
//! and session defaults out of them. Missing or malformed entries are logged
//! and replaced by defaults, never fatal.
//!
//! # Recognized keys
//!
//! | Key | Default | Meaning |
//! |-----|---------|---------|
//! | `wait.timeout.seconds` | `30` | Wait timeout and implicit wait |
//! | `wait.interval.millis` | `500` | Fluent-wait interval |
//! | `session.browser` | `chrome` | Browser kind to acquire |
//! | `session.maximize` | `true` | Maximize new windows |
//!
//! # File format
//!
//! ```text
//! # comment
//! ! also a comment
//! wait.timeout.seconds = 15
//! session.browser: firefox-headless
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::session::BrowserKind;
use crate::wait::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, PollPolicy};

// ============================================================================
// Constants
// ============================================================================

/// Key for the wait timeout in seconds.
pub const KEY_TIMEOUT_SECONDS: &str = "wait.timeout.seconds";

/// Key for the poll interval in milliseconds.
pub const KEY_INTERVAL_MILLIS: &str = "wait.interval.millis";

/// Key for the browser kind.
pub const KEY_BROWSER: &str = "session.browser";

/// Key for window maximization.
pub const KEY_MAXIMIZE: &str = "session.maximize";

/// `key = value` or `key: value`.
static ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^=:\s]+)\s*[=:]\s*(.*?)\s*$").expect("valid regex"));

// ============================================================================
// Properties
// ============================================================================

/// String-keyed property lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: FxHashMap<String, String>,
}

impl Properties {
    /// Parses property text. Later duplicates win; unparseable lines are
    /// logged and skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut entries = FxHashMap::default();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            match ENTRY.captures(line) {
                Some(caps) => {
                    entries.insert(caps[1].to_string(), caps[2].to_string());
                }
                None => warn!(line = index + 1, content = line, "Skipping malformed property line"),
            }
        }

        Self { entries }
    }

    /// Reads and parses a property file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let properties = Self::parse(&text);
        debug!(path = %path.display(), entries = properties.len(), "Loaded properties");
        Ok(properties)
    }

    /// Like [`Properties::load`], but logs a failure and returns an empty
    /// set.
    #[must_use]
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Could not load properties; using defaults");
            Self::default()
        })
    }

    /// Returns the value for `key`, logging a warning when it is absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = self.entries.get(key).map(String::as_str);
        if value.is_none() {
            warn!(key, "Property not found");
        }
        value
    }

    /// Parses the value for `key`, falling back to `default` when it is
    /// absent or malformed.
    pub fn get_parsed<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match raw.parse() {
            Ok(value) => value,
            Err(e) => {
                warn!(key, value = raw, error = %e, "Malformed property; using default");
                default
            }
        }
    }

    /// Sets a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// WaitSettings
// ============================================================================

/// Wait and session defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    /// Wait timeout, also used as the implicit wait.
    pub timeout: Duration,

    /// Fluent-wait interval.
    pub interval: Duration,

    /// Browser kind to acquire.
    pub browser: BrowserKind,

    /// Maximize new windows.
    pub maximize: bool,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
            browser: BrowserKind::Chrome,
            maximize: true,
        }
    }
}

impl WaitSettings {
    /// Reads settings, using defaults for absent or malformed keys.
    #[must_use]
    pub fn from_properties(properties: &Properties) -> Self {
        let defaults = Self::default();

        Self {
            timeout: Duration::from_secs(
                properties.get_parsed(KEY_TIMEOUT_SECONDS, defaults.timeout.as_secs()),
            ),
            interval: Duration::from_millis(
                properties.get_parsed(KEY_INTERVAL_MILLIS, defaults.interval.as_millis() as u64),
            ),
            browser: properties.get_parsed(KEY_BROWSER, defaults.browser),
            maximize: properties.get_parsed(KEY_MAXIMIZE, defaults.maximize),
        }
    }

    /// Loads settings from a property file, or defaults if it is unreadable.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::from_properties(&Properties::load_or_empty(path))
    }

    /// Explicit-wait policy with the configured timeout.
    #[must_use]
    pub fn explicit_policy(&self) -> PollPolicy {
        PollPolicy::explicit(self.timeout)
    }

    /// Fluent-wait policy with the configured timeout and interval.
    #[must_use]
    pub fn fluent_policy(&self, label: impl Into<String>) -> PollPolicy {
        PollPolicy::fluent(self.timeout, self.interval, label)
    }
}

impl TryFrom<&Properties> for WaitSettings {
    type Error = Error;

    /// Strict variant of [`WaitSettings::from_properties`]: a present but
    /// malformed value is an error.
    fn try_from(properties: &Properties) -> Result<Self> {
        fn strict<T>(properties: &Properties, key: &str, default: T) -> Result<T>
        where
            T: FromStr,
            T::Err: std::fmt::Display,
        {
            match properties.entries.get(key) {
                None => Ok(default),
                Some(raw) => raw
                    .parse()
                    .map_err(|e| Error::config(format!("{key}: invalid value {raw:?}: {e}"))),
            }
        }

        let defaults = Self::default();
        Ok(Self {
            timeout: Duration::from_secs(strict(
                properties,
                KEY_TIMEOUT_SECONDS,
                defaults.timeout.as_secs(),
            )?),
            interval: Duration::from_millis(strict(
                properties,
                KEY_INTERVAL_MILLIS,
                defaults.interval.as_millis() as u64,
            )?),
            browser: strict(properties, KEY_BROWSER, defaults.browser)?,
            maximize: strict(properties, KEY_MAXIMIZE, defaults.maximize)?,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use crate::error::ErrorKind;

    #[test]
    fn test_parse_formats_and_comments() {
        let props = Properties::parse(
            "# settings\n\
             ! legacy comment\n\
             \n\
             wait.timeout.seconds = 12\n\
             session.browser:firefox-headless\n\
             url=http://example.com/a=b\n\
             not a property\n",
        );

        assert_eq!(props.len(), 3);
        assert_eq!(props.get("wait.timeout.seconds"), Some("12"));
        assert_eq!(props.get("session.browser"), Some("firefox-headless"));
        assert_eq!(props.get("url"), Some("http://example.com/a=b"));
        assert_eq!(props.get("missing"), None);
    }

    #[test]
    fn test_settings_defaults() {
        let settings = WaitSettings::from_properties(&Properties::default());
        assert_eq!(settings, WaitSettings::default());
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.interval, Duration::from_millis(500));
    }

    #[test]
    fn test_settings_from_properties() {
        let props = Properties::parse(
            "wait.timeout.seconds=5\nwait.interval.millis=250\nsession.browser=EDGE_HEADLESS\nsession.maximize=false\n",
        );
        let settings = WaitSettings::from_properties(&props);

        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.interval, Duration::from_millis(250));
        assert_eq!(settings.browser, BrowserKind::EdgeHeadless);
        assert!(!settings.maximize);

        let policy = settings.fluent_policy("grid");
        assert_eq!(policy.interval(), Duration::from_millis(250));
        assert_eq!(policy.label(), Some("grid"));
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let props = Properties::parse("wait.timeout.seconds=soon\nsession.browser=netscape\n");
        let settings = WaitSettings::from_properties(&props);
        assert_eq!(settings.timeout, DEFAULT_TIMEOUT);
        assert_eq!(settings.browser, BrowserKind::Chrome);

        let err = WaitSettings::try_from(&props).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains(KEY_TIMEOUT_SECONDS));
    }

    #[test]
    fn test_load_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "wait.timeout.seconds = 9")?;
        writeln!(file, "session.maximize = false")?;

        let props = Properties::load(file.path())?;
        assert_eq!(props.get(KEY_TIMEOUT_SECONDS), Some("9"));

        let settings = WaitSettings::load_or_default(file.path());
        assert_eq!(settings.timeout, Duration::from_secs(9));
        assert!(!settings.maximize);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.properties");

        let err = Properties::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(Properties::load_or_empty(&path).is_empty());
        assert_eq!(WaitSettings::load_or_default(&path), WaitSettings::default());
    }
}

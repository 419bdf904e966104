//! Element locator strategies.
//!
//! A [`Locator`] is the immutable `{strategy, value}` descriptor conditions
//! resolve into [`TargetHandle`](super::TargetHandle)s.
//!
//! # Example
//!
//! ```ignore
//! use session_sync::Locator;
//!
//! let submit = Locator::css("#submit");
//! let row = Locator::xpath("//table/tbody/tr[1]");
//! let parsed = Locator::parse("name=email")?;
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Validation Patterns
// ============================================================================

/// Single token without whitespace (ids, name attributes).
static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\S+$").expect("valid regex"));

/// One CSS class name.
static CLASS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[_a-zA-Z][_a-zA-Z0-9-]*$").expect("valid regex"));

/// One HTML tag name.
static TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9-]*$").expect("valid regex"));

// ============================================================================
// Locator Enum
// ============================================================================

/// Element locator strategy and value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value")]
pub enum Locator {
    /// CSS selector.
    #[serde(rename = "css")]
    Css(String),

    /// XPath expression.
    #[serde(rename = "xpath")]
    XPath(String),

    /// Exact trimmed text content.
    #[serde(rename = "text")]
    Text(String),

    /// Text content substring.
    #[serde(rename = "partialText")]
    PartialText(String),

    /// Element `id` attribute.
    #[serde(rename = "id")]
    Id(String),

    /// Tag name.
    #[serde(rename = "tag")]
    Tag(String),

    /// `name` attribute.
    #[serde(rename = "name")]
    Name(String),

    /// Single class name.
    #[serde(rename = "class")]
    Class(String),

    /// Exact link text of an `<a>` element.
    #[serde(rename = "linkText")]
    LinkText(String),
}

// ============================================================================
// Constructors
// ============================================================================

impl Locator {
    /// Creates a CSS locator.
    #[inline]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Creates an XPath locator.
    #[inline]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Creates an exact text locator.
    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Creates a partial text locator.
    #[inline]
    pub fn partial_text(text: impl Into<String>) -> Self {
        Self::PartialText(text.into())
    }

    /// Creates an ID locator.
    #[inline]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Creates a tag name locator.
    #[inline]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    /// Creates a name attribute locator.
    #[inline]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Creates a class name locator.
    #[inline]
    pub fn class(class: impl Into<String>) -> Self {
        Self::Class(class.into())
    }

    /// Creates a link text locator.
    #[inline]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Builds a validated locator from a strategy name and value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLocator`] for an unknown strategy or a value
    /// the strategy cannot accept.
    pub fn new(strategy: &str, value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let locator = match strategy {
            "css" => Self::Css(value),
            "xpath" => Self::XPath(value),
            "text" => Self::Text(value),
            "partialText" => Self::PartialText(value),
            "id" => Self::Id(value),
            "tag" => Self::Tag(value),
            "name" => Self::Name(value),
            "class" => Self::Class(value),
            "linkText" => Self::LinkText(value),
            other => return Err(Error::invalid_locator(other, value, "unknown strategy")),
        };
        locator.validate()?;
        Ok(locator)
    }

    /// Parses `strategy=value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLocator`] if the separator is missing or the
    /// result does not validate.
    pub fn parse(spec: &str) -> Result<Self> {
        let (strategy, value) = spec
            .split_once('=')
            .ok_or_else(|| Error::invalid_locator("", spec, "expected strategy=value"))?;
        Self::new(strategy.trim(), value)
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Locator {
    /// Returns the strategy name.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
            Self::Text(_) => "text",
            Self::PartialText(_) => "partialText",
            Self::Id(_) => "id",
            Self::Tag(_) => "tag",
            Self::Name(_) => "name",
            Self::Class(_) => "class",
            Self::LinkText(_) => "linkText",
        }
    }

    /// Returns the locator value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Css(v)
            | Self::XPath(v)
            | Self::Text(v)
            | Self::PartialText(v)
            | Self::Id(v)
            | Self::Tag(v)
            | Self::Name(v)
            | Self::Class(v)
            | Self::LinkText(v) => v,
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

impl Locator {
    /// Checks that the value is well-formed for its strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLocator`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let value = self.value();
        let reject = |reason: &str| Err(Error::invalid_locator(self.strategy(), value, reason));

        if value.trim().is_empty() {
            return reject("value is empty");
        }

        match self {
            Self::Id(v) | Self::Name(v) if !TOKEN.is_match(v) => reject("contains whitespace"),
            Self::Class(v) if !CLASS_NAME.is_match(v) => reject("not a single class name"),
            Self::Tag(v) if !TAG_NAME.is_match(v) => reject("not a tag name"),
            Self::XPath(v) if !v.starts_with(['/', '(', '.']) => {
                reject("xpath must start with '/', '(' or '.'")
            }
            Self::XPath(v) | Self::Css(v) if !brackets_balanced(v) => {
                reject("unbalanced brackets or quotes")
            }
            _ => Ok(()),
        }
    }
}

/// Returns `true` if `()`/`[]` nest properly outside quoted strings.
fn brackets_balanced(expr: &str) -> bool {
    let mut stack = Vec::new();
    let mut quote: Option<char> = None;

    for c in expr.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' => stack.push(c),
            ')' if stack.pop() != Some('(') => return false,
            ']' if stack.pop() != Some('[') => return false,
            _ => {}
        }
    }

    stack.is_empty() && quote.is_none()
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

impl From<&str> for Locator {
    /// Converts a string to a CSS locator.
    fn from(s: &str) -> Self {
        Self::Css(s.to_string())
    }
}

impl From<String> for Locator {
    /// Converts a string to a CSS locator.
    fn from(s: String) -> Self {
        Self::Css(s)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ErrorKind;

    #[test]
    fn test_strategy_and_value() {
        let locator = Locator::id("username");
        assert_eq!(locator.strategy(), "id");
        assert_eq!(locator.value(), "username");
    }

    #[test]
    fn test_from_str_is_css() {
        let locator: Locator = "#login".into();
        assert!(matches!(locator, Locator::Css(_)));
    }

    #[test]
    fn test_parse() {
        let locator = Locator::parse("name=email").unwrap();
        assert_eq!(locator, Locator::name("email"));
        assert_eq!(locator.to_string(), "name=email");
    }

    #[test]
    fn test_parse_keeps_equals_in_value() {
        let locator = Locator::parse("css=input[type='text']").unwrap();
        assert_eq!(locator.value(), "input[type='text']");
    }

    #[test]
    fn test_parse_without_separator() {
        let err = Locator::parse("nonsense").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidLocator);
    }

    #[test]
    fn test_unknown_strategy() {
        assert!(Locator::new("shadow", "x").is_err());
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(Locator::css("   ").validate().is_err());
    }

    #[test]
    fn test_validate_token_strategies() {
        assert!(Locator::id("two words").validate().is_err());
        assert!(Locator::class("btn primary").validate().is_err());
        assert!(Locator::class("btn-primary").validate().is_ok());
        assert!(Locator::tag("h1").validate().is_ok());
        assert!(Locator::tag("1h").validate().is_err());
    }

    #[test]
    fn test_validate_xpath() {
        assert!(Locator::xpath("//div[@id='a']").validate().is_ok());
        assert!(Locator::xpath("(//li)[2]").validate().is_ok());
        assert!(Locator::xpath("div").validate().is_err());
        assert!(Locator::xpath("//div[@id='a'").validate().is_err());
    }

    #[test]
    fn test_validate_css_brackets_inside_quotes() {
        assert!(Locator::css("a[title='(x']").validate().is_ok());
        assert!(Locator::css("a[title='x'").validate().is_err());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(Locator::xpath("//a")).unwrap();
        assert_eq!(json["strategy"], "xpath");
        assert_eq!(json["value"], "//a");
    }
}

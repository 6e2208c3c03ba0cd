//! Element locator strategies.
//!
//! Provides Selenium-like `By` selectors covering both the web strategies and
//! the mobile/native ones used by Appium and WinAppDriver.
//!
//! # Example
//!
//! ```ignore
//! use selenium_appium::By;
//!
//! // Native app strategies
//! let plus = By::name("Plus");
//! let result = By::accessibility_id("CalculatorResults");
//! let minus = By::xpath("//Button[@AutomationId=\"minusButton\"]");
//!
//! // Generic constructor
//! let button = By::new(Strategy::ClassName, "Button");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================================================
// Strategy Enum
// ============================================================================

/// Element locator strategy.
///
/// Serializes to the wire name used in the `using` field of "Find Element".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Element ID (`id`).
    #[serde(rename = "id")]
    Id,

    /// Name attribute, or the UI Automation `Name` property on Windows.
    #[serde(rename = "name")]
    Name,

    /// Class name (`class name`).
    #[serde(rename = "class name")]
    ClassName,

    /// Accessibility ID (`accessibility id`), the `AutomationId` on Windows.
    #[serde(rename = "accessibility id")]
    AccessibilityId,

    /// XPath expression.
    #[serde(rename = "xpath")]
    XPath,

    /// CSS selector (`css selector`).
    #[serde(rename = "css selector")]
    Css,

    /// Link text (for `<a>` elements).
    #[serde(rename = "link text")]
    LinkText,

    /// Partial link text (for `<a>` elements).
    #[serde(rename = "partial link text")]
    PartialLinkText,

    /// Tag name.
    #[serde(rename = "tag name")]
    TagName,

    /// Android UiAutomator selector.
    #[serde(rename = "-android uiautomator")]
    AndroidUiAutomator,

    /// iOS UIAutomation expression.
    #[serde(rename = "-ios uiautomation")]
    IosUiAutomation,
}

impl Strategy {
    /// All strategies, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Id,
        Self::Name,
        Self::ClassName,
        Self::AccessibilityId,
        Self::XPath,
        Self::Css,
        Self::LinkText,
        Self::PartialLinkText,
        Self::TagName,
        Self::AndroidUiAutomator,
        Self::IosUiAutomation,
    ];

    /// Returns the strategy name for the protocol.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::ClassName => "class name",
            Self::AccessibilityId => "accessibility id",
            Self::XPath => "xpath",
            Self::Css => "css selector",
            Self::LinkText => "link text",
            Self::PartialLinkText => "partial link text",
            Self::TagName => "tag name",
            Self::AndroidUiAutomator => "-android uiautomator",
            Self::IosUiAutomation => "-ios uiautomation",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| Error::invalid_argument(format!("unknown locator strategy: {s}")))
    }
}

// ============================================================================
// By
// ============================================================================

/// A locator: strategy plus value.
///
/// Serializes to `{"using": ..., "value": ...}`, the body of "Find Element".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct By {
    /// Locator strategy.
    #[serde(rename = "using")]
    strategy: Strategy,
    /// Strategy-specific value.
    value: String,
}

impl By {
    /// Creates a locator from any strategy.
    #[inline]
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Creates an ID selector.
    #[inline]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(Strategy::Id, id)
    }

    /// Creates a name selector.
    #[inline]
    pub fn name(name: impl Into<String>) -> Self {
        Self::new(Strategy::Name, name)
    }

    /// Creates a class name selector.
    #[inline]
    pub fn class_name(class: impl Into<String>) -> Self {
        Self::new(Strategy::ClassName, class)
    }

    /// Creates an accessibility ID selector.
    #[inline]
    pub fn accessibility_id(id: impl Into<String>) -> Self {
        Self::new(Strategy::AccessibilityId, id)
    }

    /// Creates an XPath selector.
    #[inline]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, expr)
    }

    /// Creates a CSS selector.
    #[inline]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(Strategy::Css, selector)
    }

    /// Creates a link text selector.
    #[inline]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::new(Strategy::LinkText, text)
    }

    /// Creates a partial link text selector.
    #[inline]
    pub fn partial_link_text(text: impl Into<String>) -> Self {
        Self::new(Strategy::PartialLinkText, text)
    }

    /// Creates a tag name selector.
    #[inline]
    pub fn tag_name(name: impl Into<String>) -> Self {
        Self::new(Strategy::TagName, name)
    }

    /// Creates an Android UiAutomator selector.
    #[inline]
    pub fn android_uiautomator(selector: impl Into<String>) -> Self {
        Self::new(Strategy::AndroidUiAutomator, selector)
    }

    /// Creates an iOS UIAutomation selector.
    #[inline]
    pub fn ios_uiautomation(expr: impl Into<String>) -> Self {
        Self::new(Strategy::IosUiAutomation, expr)
    }

    /// Returns the locator strategy.
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Returns the selector value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}

// ============================================================================
// Tests
// ============================================================================

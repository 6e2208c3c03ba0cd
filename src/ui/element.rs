//! Resolved UI element.
//!
//! An [`Element`] is a remote reference returned by "Find Element". It stays
//! bound to the driver that found it; if the UI changes, the reference can
//! go stale and the remote end reports "stale element reference".
//!
//! Most callers never hold an `Element` directly: [`Locator`](super::Locator)
//! re-resolves on every interaction.
//!
//! # Example
//!
//! ```ignore
//! let display = connection.find_element(&By::accessibility_id("CalculatorResults")).await?;
//!
//! // Get properties
//! let text = display.text().await?;
//! let name = display.attribute("Name").await?;
//!
//! // Interact
//! display.click().await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::{ElementId, SessionId};
use crate::protocol::response::{expect_bool, expect_string};
use crate::protocol::{Command, ElementCommand};
use crate::transport::RemoteDriver;

use super::screenshot::Screenshot;
use super::selector::By;

// ============================================================================
// Rect
// ============================================================================

/// Element position and size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Returns the top-left corner.
    #[inline]
    #[must_use]
    pub fn location(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Returns the width and height.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Returns the center point.
    #[inline]
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for an element.
pub(crate) struct ElementInner {
    /// Remote element reference.
    pub id: ElementId,

    /// Driver that found the element.
    pub driver: Arc<dyn RemoteDriver>,
}

// ============================================================================
// Element
// ============================================================================

/// A handle to a located UI element.
#[derive(Clone)]
pub struct Element {
    /// Shared inner state.
    pub(crate) inner: Arc<ElementInner>,
}

// ============================================================================
// Element - Display
// ============================================================================

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.inner.id)
            .field("session_id", self.inner.driver.session_id())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Element - Constructor
// ============================================================================

impl Element {
    /// Creates an element handle bound to `driver`.
    #[must_use]
    pub fn new(id: ElementId, driver: Arc<dyn RemoteDriver>) -> Self {
        Self {
            inner: Arc::new(ElementInner { id, driver }),
        }
    }
}

// ============================================================================
// Element - Accessors
// ============================================================================

impl Element {
    /// Returns this element's ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.inner.id
    }

    /// Returns the session the element belongs to.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        self.inner.driver.session_id()
    }
}

// ============================================================================
// Element - Actions
// ============================================================================

impl Element {
    /// Clicks the element.
    pub async fn click(&self) -> Result<()> {
        debug!(element_id = %self.inner.id, "Clicking element");
        self.run(ElementCommand::Click {
            element_id: self.inner.id.clone(),
        })
        .await
        .map(drop)
    }

    /// Clears an editable element.
    pub async fn clear(&self) -> Result<()> {
        debug!(element_id = %self.inner.id, "Clearing element");
        self.run(ElementCommand::Clear {
            element_id: self.inner.id.clone(),
        })
        .await
        .map(drop)
    }

    /// Types text into the element.
    pub async fn send_keys(&self, text: &str) -> Result<()> {
        debug!(element_id = %self.inner.id, len = text.len(), "Sending keys");
        self.run(ElementCommand::SendKeys {
            element_id: self.inner.id.clone(),
            text: text.to_string(),
        })
        .await
        .map(drop)
    }

    /// Submits the form containing the element.
    pub async fn submit(&self) -> Result<()> {
        self.run(ElementCommand::Submit {
            element_id: self.inner.id.clone(),
        })
        .await
        .map(drop)
    }
}

// ============================================================================
// Element - Properties
// ============================================================================

impl Element {
    /// Gets the visible text.
    pub async fn text(&self) -> Result<String> {
        let value = self
            .run(ElementCommand::GetText {
                element_id: self.inner.id.clone(),
            })
            .await?;
        expect_string(value)
    }

    /// Gets an attribute, or `None` if it is not set.
    ///
    /// Non-string values (booleans, numbers) are returned in JSON form.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        let value = self
            .run(ElementCommand::GetAttribute {
                element_id: self.inner.id.clone(),
                name: name.to_string(),
            })
            .await?;

        Ok(match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    /// Gets a computed CSS property.
    pub async fn css_value(&self, name: &str) -> Result<String> {
        let value = self
            .run(ElementCommand::GetCssValue {
                element_id: self.inner.id.clone(),
                name: name.to_string(),
            })
            .await?;
        expect_string(value)
    }

    /// Gets the tag name (the control type for native apps).
    pub async fn tag_name(&self) -> Result<String> {
        let value = self
            .run(ElementCommand::GetTagName {
                element_id: self.inner.id.clone(),
            })
            .await?;
        expect_string(value)
    }

    /// Gets position and size.
    pub async fn rect(&self) -> Result<Rect> {
        let value = self
            .run(ElementCommand::GetRect {
                element_id: self.inner.id.clone(),
            })
            .await?;
        serde_json::from_value(value)
            .map_err(|e| Error::protocol(format!("Invalid element rect: {e}")))
    }

    /// Gets the top-left corner.
    pub async fn location(&self) -> Result<(f64, f64)> {
        Ok(self.rect().await?.location())
    }

    /// Gets the width and height.
    pub async fn size(&self) -> Result<(f64, f64)> {
        Ok(self.rect().await?.size())
    }

    /// Checks if the element is visible.
    pub async fn is_displayed(&self) -> Result<bool> {
        let value = self
            .run(ElementCommand::IsDisplayed {
                element_id: self.inner.id.clone(),
            })
            .await?;
        expect_bool(&value)
    }

    /// Checks if the element is enabled.
    pub async fn is_enabled(&self) -> Result<bool> {
        let value = self
            .run(ElementCommand::IsEnabled {
                element_id: self.inner.id.clone(),
            })
            .await?;
        expect_bool(&value)
    }

    /// Checks if the element is selected (checkboxes, radio buttons, options).
    pub async fn is_selected(&self) -> Result<bool> {
        let value = self
            .run(ElementCommand::IsSelected {
                element_id: self.inner.id.clone(),
            })
            .await?;
        expect_bool(&value)
    }

    /// Captures this element.
    pub async fn take_screenshot(&self) -> Result<Screenshot> {
        let value = self
            .run(ElementCommand::TakeScreenshot {
                element_id: self.inner.id.clone(),
            })
            .await?;
        Screenshot::from_base64(&expect_string(value)?)
    }
}

// ============================================================================
// Element - Nested Search
// ============================================================================

impl Element {
    /// Finds a descendant element, without waiting.
    pub async fn find_element(&self, by: &By) -> Result<Element> {
        let driver = Arc::clone(&self.inner.driver);
        let id = driver.find_element(by, Some(&self.inner.id)).await?;
        Ok(Element::new(id, driver))
    }

    /// Finds all matching descendant elements, without waiting.
    pub async fn find_elements(&self, by: &By) -> Result<Vec<Element>> {
        let driver = &self.inner.driver;
        let ids = driver.find_elements(by, Some(&self.inner.id)).await?;
        Ok(ids
            .into_iter()
            .map(|id| Element::new(id, Arc::clone(driver)))
            .collect())
    }
}

// ============================================================================
// Element - Internal
// ============================================================================

impl Element {
    /// Executes an element command on the owning driver.
    async fn run(&self, command: ElementCommand) -> Result<Value> {
        self.inner.driver.execute(Command::Element(command)).await
    }
}

// ============================================================================
// Tests
// ============================================================================

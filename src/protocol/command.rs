//! Command definitions organized by endpoint group.
//!
//! Each command knows its HTTP method, its path relative to the session
//! (`/session/{sessionId}`), and its JSON body.
//!
//! # Command Groups
//!
//! | Group | Commands |
//! |-------|----------|
//! | `session` | Delete, timeouts |
//! | `navigation` | URL, history, title |
//! | `window` | Handles, close |
//! | `document` | Source, scripts, screenshots |
//! | `element` | Find, state, interaction |
//! | custom | Vendor commands from [`CommandRegistry`](super::CommandRegistry) |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde_json::{Map, Value, json};
use urlencoding::encode;

use crate::identifiers::ElementId;

// ============================================================================
// Method
// ============================================================================

/// HTTP method of a remote command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Returns the method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }

    /// Converts to the HTTP client's method type.
    pub(crate) fn to_http(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Command Wrapper
// ============================================================================

/// All remote commands organized by endpoint group.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Session commands.
    Session(SessionCommand),
    /// Navigation commands.
    Navigation(NavigationCommand),
    /// Window commands.
    Window(WindowCommand),
    /// Document commands.
    Document(DocumentCommand),
    /// Element commands.
    Element(ElementCommand),
    /// A command registered at runtime by name.
    ///
    /// String values in `params` fill the `:name` placeholders of the
    /// registered path; the rest becomes the request body.
    Custom {
        /// Registered command name.
        name: String,
        /// Command parameters.
        params: Value,
    },
}

impl Command {
    /// Creates a custom command with parameters.
    #[inline]
    pub fn custom(name: impl Into<String>, params: Value) -> Self {
        Self::Custom {
            name: name.into(),
            params,
        }
    }

    /// Returns a short name for logging.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Session(c) => c.name(),
            Self::Navigation(c) => c.name(),
            Self::Window(c) => c.name(),
            Self::Document(c) => c.name(),
            Self::Element(c) => c.name(),
            Self::Custom { name, .. } => name,
        }
    }

    /// Returns the HTTP method, or `None` for custom commands.
    #[must_use]
    pub fn method(&self) -> Option<Method> {
        let method = match self {
            Self::Session(SessionCommand::Delete) => Method::Delete,
            Self::Session(SessionCommand::GetTimeouts) => Method::Get,
            Self::Session(SessionCommand::SetTimeouts { .. }) => Method::Post,

            Self::Navigation(
                NavigationCommand::GetCurrentUrl | NavigationCommand::GetTitle,
            ) => Method::Get,
            Self::Navigation(_) => Method::Post,

            Self::Window(WindowCommand::Close) => Method::Delete,
            Self::Window(_) => Method::Get,

            Self::Document(
                DocumentCommand::ExecuteScript { .. } | DocumentCommand::ExecuteAsyncScript { .. },
            ) => Method::Post,
            Self::Document(_) => Method::Get,

            Self::Element(
                ElementCommand::Find { .. }
                | ElementCommand::FindAll { .. }
                | ElementCommand::Click { .. }
                | ElementCommand::Clear { .. }
                | ElementCommand::SendKeys { .. }
                | ElementCommand::Submit { .. },
            ) => Method::Post,
            Self::Element(_) => Method::Get,

            Self::Custom { .. } => return None,
        };
        Some(method)
    }

    /// Returns the path relative to `/session/{sessionId}`.
    ///
    /// Custom commands return `None`; their path comes from the registry.
    #[must_use]
    pub fn path(&self) -> Option<String> {
        let path = match self {
            Self::Session(SessionCommand::Delete) => String::new(),
            Self::Session(_) => "/timeouts".to_string(),

            Self::Navigation(c) => match c {
                NavigationCommand::Navigate { .. } | NavigationCommand::GetCurrentUrl => {
                    "/url".to_string()
                }
                NavigationCommand::Back => "/back".to_string(),
                NavigationCommand::Forward => "/forward".to_string(),
                NavigationCommand::Refresh => "/refresh".to_string(),
                NavigationCommand::GetTitle => "/title".to_string(),
            },

            Self::Window(c) => match c {
                WindowCommand::GetHandle | WindowCommand::Close => "/window".to_string(),
                WindowCommand::GetHandles => "/window/handles".to_string(),
            },

            Self::Document(c) => match c {
                DocumentCommand::GetPageSource => "/source".to_string(),
                DocumentCommand::ExecuteScript { .. } => "/execute/sync".to_string(),
                DocumentCommand::ExecuteAsyncScript { .. } => "/execute/async".to_string(),
                DocumentCommand::TakeScreenshot => "/screenshot".to_string(),
            },

            Self::Element(c) => c.path(),

            Self::Custom { .. } => return None,
        };
        Some(path)
    }

    /// Returns the JSON body, if the command carries one.
    #[must_use]
    pub fn body(&self) -> Option<Value> {
        match self {
            Self::Session(SessionCommand::SetTimeouts {
                implicit_ms,
                page_load_ms,
                script_ms,
            }) => {
                let mut body = Map::new();
                if let Some(ms) = implicit_ms {
                    body.insert("implicit".to_string(), json!(ms));
                }
                if let Some(ms) = page_load_ms {
                    body.insert("pageLoad".to_string(), json!(ms));
                }
                if let Some(ms) = script_ms {
                    body.insert("script".to_string(), json!(ms));
                }
                Some(Value::Object(body))
            }

            Self::Navigation(NavigationCommand::Navigate { url }) => Some(json!({ "url": url })),
            Self::Navigation(
                NavigationCommand::Back | NavigationCommand::Forward | NavigationCommand::Refresh,
            ) => Some(json!({})),

            Self::Document(
                DocumentCommand::ExecuteScript { script, args }
                | DocumentCommand::ExecuteAsyncScript { script, args },
            ) => Some(json!({ "script": script, "args": args })),

            Self::Element(c) => c.body(),

            Self::Custom { params, .. } => Some(params.clone()),

            _ => None,
        }
    }
}

// ============================================================================
// Session Commands
// ============================================================================

/// Session lifecycle and configuration commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// End the session.
    Delete,

    /// Read the session timeouts. Doubles as a liveness probe.
    GetTimeouts,

    /// Set the session timeouts.
    SetTimeouts {
        /// Implicit element wait.
        implicit_ms: Option<u64>,
        /// Page load timeout.
        page_load_ms: Option<u64>,
        /// Script timeout.
        script_ms: Option<u64>,
    },
}

impl SessionCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Delete => "deleteSession",
            Self::GetTimeouts => "getTimeouts",
            Self::SetTimeouts { .. } => "setTimeouts",
        }
    }
}

// ============================================================================
// Navigation Commands
// ============================================================================

/// Navigation commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationCommand {
    /// Navigate to URL.
    Navigate {
        /// URL to navigate to.
        url: String,
    },
    /// Get current URL.
    GetCurrentUrl,
    /// Navigate back in history.
    Back,
    /// Navigate forward in history.
    Forward,
    /// Reload current page.
    Refresh,
    /// Get page title.
    GetTitle,
}

impl NavigationCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigateTo",
            Self::GetCurrentUrl => "getCurrentUrl",
            Self::Back => "back",
            Self::Forward => "forward",
            Self::Refresh => "refresh",
            Self::GetTitle => "getTitle",
        }
    }
}

// ============================================================================
// Window Commands
// ============================================================================

/// Window handle commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowCommand {
    /// Get current window handle.
    GetHandle,
    /// Get all window handles.
    GetHandles,
    /// Close current window.
    Close,
}

impl WindowCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::GetHandle => "getWindowHandle",
            Self::GetHandles => "getWindowHandles",
            Self::Close => "closeWindow",
        }
    }
}

// ============================================================================
// Document Commands
// ============================================================================

/// Document-level commands.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentCommand {
    /// Get page source (or the UI tree XML for native apps).
    GetPageSource,

    /// Execute synchronous script.
    ExecuteScript {
        /// Script body.
        script: String,
        /// Script arguments.
        args: Vec<Value>,
    },

    /// Execute asynchronous script.
    ExecuteAsyncScript {
        /// Script body.
        script: String,
        /// Script arguments.
        args: Vec<Value>,
    },

    /// Capture the viewport as base64 PNG.
    TakeScreenshot,
}

impl DocumentCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::GetPageSource => "getPageSource",
            Self::ExecuteScript { .. } => "executeScript",
            Self::ExecuteAsyncScript { .. } => "executeAsyncScript",
            Self::TakeScreenshot => "takeScreenshot",
        }
    }
}

// ============================================================================
// Element Commands
// ============================================================================

/// Element retrieval, state, and interaction commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementCommand {
    /// Find a single element, optionally below a parent.
    Find {
        /// Locator strategy wire name.
        using: String,
        /// Locator value.
        value: String,
        /// Parent element (optional).
        parent_id: Option<ElementId>,
    },

    /// Find all matching elements, optionally below a parent.
    FindAll {
        /// Locator strategy wire name.
        using: String,
        /// Locator value.
        value: String,
        /// Parent element (optional).
        parent_id: Option<ElementId>,
    },

    /// Click the element.
    Click {
        /// Element ID.
        element_id: ElementId,
    },

    /// Clear an editable element.
    Clear {
        /// Element ID.
        element_id: ElementId,
    },

    /// Type text into the element.
    SendKeys {
        /// Element ID.
        element_id: ElementId,
        /// Text to type.
        text: String,
    },

    /// Submit the form containing the element.
    Submit {
        /// Element ID.
        element_id: ElementId,
    },

    /// Get the visible text.
    GetText {
        /// Element ID.
        element_id: ElementId,
    },

    /// Get an attribute.
    GetAttribute {
        /// Element ID.
        element_id: ElementId,
        /// Attribute name.
        name: String,
    },

    /// Get a computed CSS value.
    GetCssValue {
        /// Element ID.
        element_id: ElementId,
        /// CSS property name.
        name: String,
    },

    /// Get the tag name (control type for native apps).
    GetTagName {
        /// Element ID.
        element_id: ElementId,
    },

    /// Get position and size.
    GetRect {
        /// Element ID.
        element_id: ElementId,
    },

    /// Check enabled state.
    IsEnabled {
        /// Element ID.
        element_id: ElementId,
    },

    /// Check selected state.
    IsSelected {
        /// Element ID.
        element_id: ElementId,
    },

    /// Check visibility.
    IsDisplayed {
        /// Element ID.
        element_id: ElementId,
    },

    /// Capture the element as base64 PNG.
    TakeScreenshot {
        /// Element ID.
        element_id: ElementId,
    },
}

impl ElementCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Find { .. } => "findElement",
            Self::FindAll { .. } => "findElements",
            Self::Click { .. } => "elementClick",
            Self::Clear { .. } => "elementClear",
            Self::SendKeys { .. } => "elementSendKeys",
            Self::Submit { .. } => "elementSubmit",
            Self::GetText { .. } => "getElementText",
            Self::GetAttribute { .. } => "getElementAttribute",
            Self::GetCssValue { .. } => "getElementCssValue",
            Self::GetTagName { .. } => "getElementTagName",
            Self::GetRect { .. } => "getElementRect",
            Self::IsEnabled { .. } => "isElementEnabled",
            Self::IsSelected { .. } => "isElementSelected",
            Self::IsDisplayed { .. } => "isElementDisplayed",
            Self::TakeScreenshot { .. } => "takeElementScreenshot",
        }
    }

    fn path(&self) -> String {
        match self {
            Self::Find { parent_id, .. } => match parent_id {
                Some(parent) => format!("/element/{}/element", encode(parent.as_str())),
                None => "/element".to_string(),
            },
            Self::FindAll { parent_id, .. } => match parent_id {
                Some(parent) => format!("/element/{}/elements", encode(parent.as_str())),
                None => "/elements".to_string(),
            },
            Self::Click { element_id } => element_path(element_id, "click"),
            Self::Clear { element_id } => element_path(element_id, "clear"),
            Self::SendKeys { element_id, .. } => element_path(element_id, "value"),
            Self::Submit { element_id } => element_path(element_id, "submit"),
            Self::GetText { element_id } => element_path(element_id, "text"),
            Self::GetAttribute { element_id, name } => {
                element_path(element_id, &format!("attribute/{}", encode(name)))
            }
            Self::GetCssValue { element_id, name } => {
                element_path(element_id, &format!("css/{}", encode(name)))
            }
            Self::GetTagName { element_id } => element_path(element_id, "name"),
            Self::GetRect { element_id } => element_path(element_id, "rect"),
            Self::IsEnabled { element_id } => element_path(element_id, "enabled"),
            Self::IsSelected { element_id } => element_path(element_id, "selected"),
            Self::IsDisplayed { element_id } => element_path(element_id, "displayed"),
            Self::TakeScreenshot { element_id } => element_path(element_id, "screenshot"),
        }
    }

    fn body(&self) -> Option<Value> {
        match self {
            Self::Find { using, value, .. } | Self::FindAll { using, value, .. } => {
                Some(json!({ "using": using, "value": value }))
            }
            // `value` keeps JSON wire servers (WinAppDriver) happy.
            Self::SendKeys { text, .. } => {
                let chars: Vec<String> = text.chars().map(String::from).collect();
                Some(json!({ "text": text, "value": chars }))
            }
            Self::Click { .. } | Self::Clear { .. } | Self::Submit { .. } => Some(json!({})),
            _ => None,
        }
    }
}

/// Builds `/element/{id}/{suffix}`.
fn element_path(element_id: &ElementId, suffix: &str) -> String {
    format!("/element/{}/{}", encode(element_id.as_str()), suffix)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn element() -> ElementId {
        ElementId::new("42.7")
    }

    #[test]
    fn test_find_element_command() {
        let command = Command::Element(ElementCommand::Find {
            using: "name".to_string(),
            value: "Seven".to_string(),
            parent_id: None,
        });

        assert_eq!(command.method(), Some(Method::Post));
        assert_eq!(command.path().as_deref(), Some("/element"));
        assert_eq!(
            command.body(),
            Some(json!({ "using": "name", "value": "Seven" }))
        );
    }

    #[test]
    fn test_find_child_element_path() {
        let command = Command::Element(ElementCommand::FindAll {
            using: "class name".to_string(),
            value: "Button".to_string(),
            parent_id: Some(element()),
        });

        assert_eq!(command.path().as_deref(), Some("/element/42.7/elements"));
    }

    #[test]
    fn test_attribute_name_is_encoded() {
        let command = Command::Element(ElementCommand::GetAttribute {
            element_id: element(),
            name: "Automation Id".to_string(),
        });

        assert_eq!(command.method(), Some(Method::Get));
        assert_eq!(
            command.path().as_deref(),
            Some("/element/42.7/attribute/Automation%20Id")
        );
        assert_eq!(command.body(), None);
    }

    #[test]
    fn test_send_keys_body() {
        let command = Command::Element(ElementCommand::SendKeys {
            element_id: element(),
            text: "ab".to_string(),
        });

        assert_eq!(
            command.body(),
            Some(json!({ "text": "ab", "value": ["a", "b"] }))
        );
    }

    #[test]
    fn test_delete_session_targets_session_root() {
        let command = Command::Session(SessionCommand::Delete);
        assert_eq!(command.method(), Some(Method::Delete));
        assert_eq!(command.path().as_deref(), Some(""));
    }

    #[test]
    fn test_set_timeouts_skips_unset_fields() {
        let command = Command::Session(SessionCommand::SetTimeouts {
            implicit_ms: Some(0),
            page_load_ms: None,
            script_ms: Some(500),
        });

        assert_eq!(command.body(), Some(json!({ "implicit": 0, "script": 500 })));
    }

    #[test]
    fn test_custom_command_has_no_fixed_route() {
        let command = Command::custom("getNetworkConnection", json!({}));
        assert_eq!(command.name(), "getNetworkConnection");
        assert_eq!(command.method(), None);
        assert_eq!(command.path(), None);
    }
}

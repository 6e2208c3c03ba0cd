//! Error types for selenium-appium.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use selenium_appium::{By, Connection, Result};
//!
//! async fn example(connection: &Connection) -> Result<()> {
//!     connection.locator(By::name("Seven")).click().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`] |
//! | Connection | [`Error::NoConnection`], [`Error::Connection`] |
//! | Element | [`Error::ElementNotFound`] |
//! | Page | [`Error::PageNotReady`], [`Error::NotImplemented`] |
//! | Protocol | [`Error::UnknownCommand`], [`Error::WebDriver`], [`Error::Protocol`] |
//! | External | [`Error::Http`], [`Error::Json`], [`Error::Url`], [`Error::Base64`], [`Error::Image`], [`Error::Io`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use base64::DecodeError;
use image::ImageError;
use thiserror::Error;
use url::ParseError;

// ============================================================================
// Constants
// ============================================================================

/// W3C error code reported when a lookup matches nothing.
const NO_SUCH_ELEMENT: &str = "no such element";

/// JSON wire status code for "no such element".
const JSON_WIRE_NO_SUCH_ELEMENT: &str = "7";

/// W3C error code reported for a reference to a vanished element.
const STALE_ELEMENT: &str = "stale element reference";

/// JSON wire status code for "stale element reference".
const JSON_WIRE_STALE_ELEMENT: &str = "10";

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when connection configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// No driver is attached to the connection.
    ///
    /// Always a usage error: start or attach a session first.
    #[error("No valid connection")]
    NoConnection,

    /// Session creation or teardown failed at the remote end.
    ///
    /// The underlying cause is retained by the connection and available
    /// through [`Connection::last_error`](crate::Connection::last_error).
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    // ========================================================================
    // Element Errors
    // ========================================================================
    /// Polling for an element exceeded its timeout.
    #[error("Element not found: {strategy}={value} after {timeout_ms}ms")]
    ElementNotFound {
        /// Locator strategy used.
        strategy: String,
        /// Locator value used.
        value: String,
        /// Milliseconds waited before giving up.
        timeout_ms: u64,
    },

    // ========================================================================
    // Page Errors
    // ========================================================================
    /// A readiness condition did not hold in time.
    #[error("Page {page} not ready after {timeout_ms}ms: {condition}")]
    PageNotReady {
        /// Page object name.
        page: String,
        /// Description of the failing condition.
        condition: String,
        /// Milliseconds waited before giving up.
        timeout_ms: u64,
    },

    /// A required page object hook was not provided.
    #[error("Not implemented: {what}")]
    NotImplemented {
        /// The missing implementation.
        what: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Custom command was never defined on the executor.
    #[error("Unknown command: {command}")]
    UnknownCommand {
        /// The unregistered command name.
        command: String,
    },

    /// Error reported by the remote end.
    #[error("WebDriver error ({error}): {message}")]
    WebDriver {
        /// W3C error code or JSON wire status.
        error: String,
        /// Message from the remote end.
        message: String,
    },

    /// Unexpected response shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid server URL.
    #[error("URL error: {0}")]
    Url(#[from] ParseError),

    /// Invalid base64 payload.
    #[error("Base64 error: {0}")]
    Base64(#[from] DecodeError),

    /// Image decoding error.
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an element not found error.
    #[inline]
    pub fn element_not_found(
        strategy: impl Into<String>,
        value: impl Into<String>,
        timeout_ms: u64,
    ) -> Self {
        Self::ElementNotFound {
            strategy: strategy.into(),
            value: value.into(),
            timeout_ms,
        }
    }

    /// Creates a page not ready error.
    #[inline]
    pub fn page_not_ready(
        page: impl Into<String>,
        condition: impl Into<String>,
        timeout_ms: u64,
    ) -> Self {
        Self::PageNotReady {
            page: page.into(),
            condition: condition.into(),
            timeout_ms,
        }
    }

    /// Creates a not implemented error.
    #[inline]
    pub fn not_implemented(what: impl Into<String>) -> Self {
        Self::NotImplemented { what: what.into() }
    }

    /// Creates an unknown command error.
    #[inline]
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Creates a remote end error.
    #[inline]
    pub fn webdriver(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WebDriver {
            error: error.into(),
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::PageNotReady { .. }
        ) || matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Returns `true` if the remote end reported that no element matched.
    ///
    /// This is the only error a poll-until-located loop keeps retrying on.
    #[inline]
    #[must_use]
    pub fn is_no_such_element(&self) -> bool {
        matches!(
            self,
            Self::WebDriver { error, .. }
                if error == NO_SUCH_ELEMENT || error == JSON_WIRE_NO_SUCH_ELEMENT
        )
    }

    /// Returns `true` if an element reference went stale.
    #[inline]
    #[must_use]
    pub fn is_stale_element(&self) -> bool {
        matches!(
            self,
            Self::WebDriver { error, .. }
                if error == STALE_ELEMENT || error == JSON_WIRE_STALE_ELEMENT
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::NoConnection | Self::Connection { .. })
            || matches!(self, Self::Http(e) if e.is_connect())
    }
}

// ============================================================================
// Tests
// ============================================================================

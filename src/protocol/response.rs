//! Response envelope parsing.
//!
//! Remote ends answer in one of two envelopes:
//!
//! W3C:
//! ```json
//! { "value": { ... } }
//! { "value": { "error": "no such element", "message": "...", "stacktrace": "" } }
//! ```
//!
//! JSON wire (older Appium drivers, WinAppDriver):
//! ```json
//! { "sessionId": "...", "status": 0, "value": { ... } }
//! { "sessionId": "...", "status": 7, "value": { "message": "..." } }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{ElementId, SessionId};

// ============================================================================
// Constants
// ============================================================================

/// W3C web element identifier key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// JSON wire web element identifier key.
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

// ============================================================================
// Envelope
// ============================================================================

/// Raw response body in either envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    /// Payload (or error object).
    #[serde(default)]
    pub value: Value,

    /// JSON wire status code (0 = success).
    #[serde(default)]
    pub status: Option<i64>,

    /// JSON wire session ID.
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

impl Envelope {
    /// Parses a response body. An empty body is an empty envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the body is not JSON.
    pub fn parse(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(body)?)
    }

    /// Extracts the payload, turning error envelopes into [`Error::WebDriver`].
    ///
    /// `http_success` is whether the HTTP status was 2xx.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebDriver`] if the remote end reported an error.
    pub fn into_result(self, http_success: bool) -> Result<Value> {
        if let Some(status) = self.status
            && status != 0
        {
            let message = message_of(&self.value);
            return Err(Error::webdriver(status.to_string(), message));
        }

        if let Some(code) = self.value.get("error").and_then(Value::as_str) {
            return Err(Error::webdriver(code, message_of(&self.value)));
        }

        if !http_success {
            return Err(Error::webdriver("unknown error", message_of(&self.value)));
        }

        Ok(self.value)
    }
}

/// Returns `value.message`, or the whole value rendered as text.
fn message_of(value: &Value) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

// ============================================================================
// NewSession
// ============================================================================

/// Result of "New Session".
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Session ID minted by the remote end.
    pub session_id: SessionId,
    /// Capabilities the remote end matched.
    pub capabilities: Value,
}

impl NewSession {
    /// Extracts the session from a W3C or JSON wire envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if no session ID is present.
    pub fn from_envelope(envelope: Envelope) -> Result<Self> {
        let legacy_id = envelope.session_id.clone();
        let value = envelope.into_result(true)?;

        let w3c_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .map(str::to_string);

        match (w3c_id, legacy_id) {
            (Some(id), _) => Ok(Self {
                session_id: SessionId::new(id),
                capabilities: value.get("capabilities").cloned().unwrap_or(Value::Null),
            }),
            (None, Some(id)) => Ok(Self {
                session_id: SessionId::new(id),
                capabilities: value,
            }),
            (None, None) => Err(Error::protocol("No sessionId in new session response")),
        }
    }
}

// ============================================================================
// Value Helpers
// ============================================================================

/// Reads a web element reference from a value.
#[must_use]
pub fn element_id(value: &Value) -> Option<ElementId> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(ElementId::new)
}

/// Reads a web element reference, failing on any other shape.
///
/// # Errors
///
/// Returns [`Error::Protocol`] if the value is not an element reference.
pub fn expect_element_id(value: &Value) -> Result<ElementId> {
    element_id(value)
        .ok_or_else(|| Error::protocol(format!("Expected element reference, got {value}")))
}

/// Reads a list of web element references.
///
/// # Errors
///
/// Returns [`Error::Protocol`] if the value is not an array of references.
pub fn expect_element_ids(value: &Value) -> Result<Vec<ElementId>> {
    value
        .as_array()
        .ok_or_else(|| Error::protocol(format!("Expected element array, got {value}")))?
        .iter()
        .map(expect_element_id)
        .collect()
}

/// Reads a string payload.
///
/// # Errors
///
/// Returns [`Error::Protocol`] if the value is not a string.
pub fn expect_string(value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(Error::protocol(format!("Expected string, got {other}"))),
    }
}

/// Reads a boolean payload.
///
/// # Errors
///
/// Returns [`Error::Protocol`] if the value is not a boolean.
pub fn expect_bool(value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::protocol(format!("Expected boolean, got {value}")))
}

// ============================================================================
// Tests
// ============================================================================

//! Session capabilities.
//!
//! Capabilities are an opaque JSON object passed through to the server on
//! "New Session". Typed setters cover the keys Appium and WinAppDriver
//! read most often; anything else goes through [`Capabilities::with`].
//!
//! # Example
//!
//! ```ignore
//! use selenium_appium::Capabilities;
//!
//! // WinAppDriver: launch the Windows calculator
//! let caps = Capabilities::windows_app("Microsoft.WindowsCalculator_8wekyb3d8bbwe!App");
//!
//! // Appium: Android emulator
//! let caps = Capabilities::new()
//!     .with_platform_name("Android")
//!     .with_device_name("emulator-5554")
//!     .with_automation_name("UiAutomator2")
//!     .with_app("/tmp/app.apk");
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Device name WinAppDriver expects for the local desktop.
pub const WINDOWS_DEVICE_NAME: &str = "WindowsPC";

// ============================================================================
// Capabilities
// ============================================================================

/// Opaque capability map sent on session creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(Map<String, Value>);

// ============================================================================
// Constructors
// ============================================================================

impl Capabilities {
    /// Creates an empty capability map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates capabilities for a Windows desktop app under WinAppDriver.
    ///
    /// `app` is an AUMID (`Package_hash!App`) or an executable path.
    #[must_use]
    pub fn windows_app(app: impl Into<String>) -> Self {
        Self::new()
            .with_browser_name("")
            .with_platform_name("windows")
            .with_device_name(WINDOWS_DEVICE_NAME)
            .with_app(app)
    }

    /// Wraps an existing JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the value is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::invalid_argument(format!(
                "capabilities must be a JSON object, got {other}"
            ))),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl Capabilities {
    /// Sets an arbitrary capability.
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `browserName`.
    #[inline]
    #[must_use]
    pub fn with_browser_name(self, name: impl Into<String>) -> Self {
        self.with("browserName", name.into())
    }

    /// Sets `platformName`.
    #[inline]
    #[must_use]
    pub fn with_platform_name(self, name: impl Into<String>) -> Self {
        self.with("platformName", name.into())
    }

    /// Sets `platformVersion`.
    #[inline]
    #[must_use]
    pub fn with_platform_version(self, version: impl Into<String>) -> Self {
        self.with("platformVersion", version.into())
    }

    /// Sets `deviceName`.
    #[inline]
    #[must_use]
    pub fn with_device_name(self, name: impl Into<String>) -> Self {
        self.with("deviceName", name.into())
    }

    /// Sets `app`.
    #[inline]
    #[must_use]
    pub fn with_app(self, app: impl Into<String>) -> Self {
        self.with("app", app.into())
    }

    /// Sets `automationName`.
    #[inline]
    #[must_use]
    pub fn with_automation_name(self, name: impl Into<String>) -> Self {
        self.with("automationName", name.into())
    }

    /// Sets `newCommandTimeout` in seconds.
    #[inline]
    #[must_use]
    pub fn with_new_command_timeout(self, secs: u64) -> Self {
        self.with("newCommandTimeout", secs)
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Capabilities {
    /// Sets an arbitrary capability in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns a capability value.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a capability as a string.
    #[inline]
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns `true` if no capability is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of capabilities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the capabilities as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl TryFrom<Value> for Capabilities {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

// ============================================================================
// Tests
// ============================================================================

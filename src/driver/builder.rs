//! Builder pattern for connection configuration.
//!
//! Provides a fluent API for configuring and creating [`Connection`] instances.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use selenium_appium::Connection;
//!
//! let connection = Connection::builder()
//!     .url("http://127.0.0.1:4723/wd/hub")
//!     .element_wait_timeout(5000)
//!     .request_timeout(Duration::from_secs(60))
//!     .build()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::transport::{HttpSessionFactory, SessionFactory};

use super::connection::{Connection, DEFAULT_SERVER_URL};
use super::timeouts::{DEFAULT_ELEMENT_WAIT_MS, DEFAULT_PAGE_WAIT_MS, TimeoutRegistry};

// ============================================================================
// ConnectionBuilder
// ============================================================================

/// Builder for configuring a [`Connection`] instance.
///
/// Use [`Connection::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct ConnectionBuilder {
    /// Server URL used by `start()`.
    url: Option<String>,
    /// Shared timeout registry.
    timeouts: Option<TimeoutRegistry>,
    /// Element wait for a private registry.
    element_wait_ms: Option<u64>,
    /// Page wait for a private registry.
    page_wait_ms: Option<u64>,
    /// Session factory replacing HTTP.
    factory: Option<Arc<dyn SessionFactory>>,
    /// Per-command HTTP timeout.
    request_timeout: Option<Duration>,
    /// "New Session" HTTP timeout.
    session_timeout: Option<Duration>,
}

// ============================================================================
// ConnectionBuilder Implementation
// ============================================================================

impl ConnectionBuilder {
    /// Creates a new builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server URL `start()` connects to.
    ///
    /// Defaults to [`DEFAULT_SERVER_URL`].
    #[inline]
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Shares an existing timeout registry.
    #[inline]
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutRegistry) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Gives the connection its own registry with this element wait.
    #[inline]
    #[must_use]
    pub fn element_wait_timeout(mut self, ms: u64) -> Self {
        self.element_wait_ms = Some(ms);
        self
    }

    /// Gives the connection its own registry with this page wait.
    #[inline]
    #[must_use]
    pub fn page_wait_timeout(mut self, ms: u64) -> Self {
        self.page_wait_ms = Some(ms);
        self
    }

    /// Replaces HTTP session creation.
    #[inline]
    #[must_use]
    pub fn factory(mut self, factory: Arc<dyn SessionFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Sets the per-command HTTP timeout.
    #[inline]
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the "New Session" HTTP timeout.
    #[inline]
    #[must_use]
    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = Some(timeout);
        self
    }

    /// Builds the connection with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the URL does not parse or is not HTTP(S)
    /// - [`Error::Config`] if both a shared registry and timeout values are set
    /// - [`Error::Config`] if HTTP timeouts are combined with a custom factory
    pub fn build(self) -> Result<Connection> {
        let url = self.validate_url()?;
        let timeouts = self.validate_timeouts()?;
        let factory = self.validate_factory()?;

        Ok(Connection::from_parts(factory, timeouts, url))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ConnectionBuilder {
    /// Validates the server URL.
    fn validate_url(&self) -> Result<Url> {
        let raw = self.url.as_deref().unwrap_or(DEFAULT_SERVER_URL);
        let url = Url::parse(raw)
            .map_err(|e| Error::config(format!("Invalid server URL {raw:?}: {e}")))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::config(format!(
                "Server URL must be http or https, got {scheme}://"
            ))),
        }
    }

    /// Validates the timeout configuration.
    fn validate_timeouts(&self) -> Result<TimeoutRegistry> {
        let has_values = self.element_wait_ms.is_some() || self.page_wait_ms.is_some();

        match (&self.timeouts, has_values) {
            (Some(_), true) => Err(Error::config(
                "Use either .timeouts() or .element_wait_timeout()/.page_wait_timeout(), not both",
            )),
            (Some(shared), false) => Ok(shared.clone()),
            (None, true) => Ok(TimeoutRegistry::with_values(
                self.element_wait_ms.unwrap_or(DEFAULT_ELEMENT_WAIT_MS),
                self.page_wait_ms.unwrap_or(DEFAULT_PAGE_WAIT_MS),
            )),
            (None, false) => Ok(TimeoutRegistry::global().clone()),
        }
    }

    /// Validates the session factory configuration.
    fn validate_factory(&self) -> Result<Arc<dyn SessionFactory>> {
        let has_http_settings = self.request_timeout.is_some() || self.session_timeout.is_some();

        match &self.factory {
            Some(_) if has_http_settings => Err(Error::config(
                "HTTP timeouts apply to the built-in factory only; configure the custom factory instead",
            )),
            Some(factory) => Ok(Arc::clone(factory)),
            None => {
                let mut factory = HttpSessionFactory::new();
                if let Some(timeout) = self.request_timeout {
                    factory = factory.request_timeout(timeout);
                }
                if let Some(timeout) = self.session_timeout {
                    factory = factory.session_timeout(timeout);
                }
                Ok(Arc::new(factory))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

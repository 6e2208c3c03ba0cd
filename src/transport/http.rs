//! HTTP remote driver.
//!
//! Speaks the W3C WebDriver wire protocol (with JSON wire fallbacks) to an
//! Appium, WinAppDriver or Selenium server.
//!
//! # Routing
//!
//! | Command | Route |
//! |---------|-------|
//! | New Session | `POST {server}/session` |
//! | Standard | `{method} {server}/session/{id}{command path}` |
//! | Custom | Registry template, `:sessionId` filled in |
//!
//! Every request carries a per-request timeout. Session creation gets a
//! longer one, since servers may install and launch the app first.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, Response};
use serde_json::{Value, json};
use tracing::{debug, trace, warn};
use url::Url;
use urlencoding::encode;

use crate::driver::Capabilities;
use crate::error::{Error, Result};
use crate::identifiers::SessionId;
use crate::protocol::{Command, CommandDefinition, CommandRegistry, Envelope, Method, NewSession};

use super::driver::{RemoteDriver, SessionFactory};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for command execution.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for "New Session".
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(120);

// ============================================================================
// HttpRemoteDriver
// ============================================================================

/// A remote session reached over HTTP.
///
/// # Thread Safety
///
/// `HttpRemoteDriver` is `Send + Sync`. The underlying `reqwest::Client`
/// pools connections, so concurrent commands do not serialize.
pub struct HttpRemoteDriver {
    /// Shared HTTP client.
    client: Client,
    /// Server root, always ending in `/`.
    server_url: Url,
    /// Session minted by the server.
    session_id: SessionId,
    /// Capabilities the server matched.
    capabilities: Value,
    /// Custom commands known to this session.
    registry: RwLock<CommandRegistry>,
    /// Timeout applied to each command.
    request_timeout: Duration,
}

impl fmt::Debug for HttpRemoteDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRemoteDriver")
            .field("server_url", &self.server_url.as_str())
            .field("session_id", &self.session_id)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl HttpRemoteDriver {
    /// Opens a new session on the server at `server_url`.
    ///
    /// The capabilities are sent both as W3C `alwaysMatch` and as JSON wire
    /// `desiredCapabilities`, so older servers accept them too.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] if the server is unreachable
    /// - [`Error::WebDriver`] if the server refuses the session
    /// - [`Error::Protocol`] if the response carries no session ID
    pub async fn connect(
        client: Client,
        server_url: &Url,
        capabilities: &Capabilities,
        session_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let server_url = normalize(server_url);
        let endpoint = server_url.join("session")?;
        let caps = capabilities.to_value();
        let body = json!({
            "capabilities": { "alwaysMatch": caps, "firstMatch": [{}] },
            "desiredCapabilities": caps,
        });

        debug!(url = %endpoint, "Creating session");

        let response = client
            .post(endpoint)
            .timeout(session_timeout)
            .json(&body)
            .send()
            .await?;

        let session = NewSession::from_envelope(decode(response).await?)?;

        debug!(session_id = %session.session_id, "Session created");

        Ok(Self {
            client,
            server_url,
            session_id: session.session_id,
            capabilities: session.capabilities,
            registry: RwLock::new(CommandRegistry::new()),
            request_timeout,
        })
    }

    /// Returns the server root URL.
    #[inline]
    #[must_use]
    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// Returns the per-command timeout.
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Sends one request and unwraps the response envelope.
    async fn send(
        &self,
        command: &str,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        let url = self.server_url.join(path.trim_start_matches('/'))?;
        trace!(command, %method, %url, "Sending command");

        let mut request = self
            .client
            .request(method.to_http(), url)
            .timeout(self.request_timeout);

        match body {
            Some(body) => request = request.json(&body),
            None if method == Method::Post => request = request.json(&json!({})),
            None => {}
        }

        let response = request.send().await.inspect_err(|e| {
            warn!(command, error = %e, "Request failed");
        })?;

        decode(response).await?.into_result(true)
    }
}

#[async_trait]
impl RemoteDriver for HttpRemoteDriver {
    #[inline]
    fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    fn capabilities(&self) -> Value {
        self.capabilities.clone()
    }

    async fn execute(&self, command: Command) -> Result<Value> {
        match command {
            Command::Custom { name, params } => {
                let resolved = self
                    .registry
                    .read()
                    .resolve(&name, &self.session_id, &params)?;
                self.send(&name, resolved.method, &resolved.path, resolved.body)
                    .await
            }
            standard => {
                let (Some(method), Some(path)) = (standard.method(), standard.path()) else {
                    return Err(Error::protocol(format!(
                        "No route for command {}",
                        standard.name()
                    )));
                };
                let path = format!("session/{}{}", encode(self.session_id.as_str()), path);
                self.send(standard.name(), method, &path, standard.body())
                    .await
            }
        }
    }

    fn define_command(&self, definition: CommandDefinition) {
        debug!(name = %definition.name, path = %definition.path, "Defining command");
        self.registry.write().define(definition);
    }
}

/// Reads a response into an envelope, failing on error envelopes.
async fn decode(response: Response) -> Result<Envelope> {
    let status = response.status();
    let text = response.text().await?;
    trace!(status = status.as_u16(), body = %text, "Response received");

    let envelope = match Envelope::parse(&text) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(Error::webdriver(
                "unknown error",
                format!("HTTP {status}: {text}"),
            ));
        }
        Err(e) => return Err(e),
    };

    if !status.is_success() {
        envelope.clone().into_result(false)?;
    }

    Ok(envelope)
}

/// Ensures the URL path ends in `/` so relative joins append.
fn normalize(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

// ============================================================================
// HttpSessionFactory
// ============================================================================

/// Creates [`HttpRemoteDriver`] sessions.
#[derive(Debug, Clone)]
pub struct HttpSessionFactory {
    client: Client,
    session_timeout: Duration,
    request_timeout: Duration,
}

impl Default for HttpSessionFactory {
    fn default() -> Self {
        Self::with_client(Client::new())
    }
}

impl HttpSessionFactory {
    /// Creates a factory with a fresh HTTP client and default timeouts.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory sharing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            request_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Sets the timeout for "New Session".
    #[inline]
    #[must_use]
    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// Sets the timeout for every other command.
    #[inline]
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[async_trait]
impl SessionFactory for HttpSessionFactory {
    async fn create_session(
        &self,
        capabilities: &Capabilities,
        url: &Url,
    ) -> Result<Arc<dyn RemoteDriver>> {
        let driver = HttpRemoteDriver::connect(
            self.client.clone(),
            url,
            capabilities,
            self.session_timeout,
            self.request_timeout,
        )
        .await?;
        Ok(Arc::new(driver))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::protocol::ElementCommand;
    use crate::testing::FakeServer;
    use crate::ui::By;

    async fn connect(server: &FakeServer) -> HttpRemoteDriver {
        HttpRemoteDriver::connect(
            Client::new(),
            &server.url(),
            &Capabilities::windows_app("Microsoft.WindowsCalculator_8wekyb3d8bbwe!App"),
            DEFAULT_SESSION_TIMEOUT,
            DEFAULT_COMMAND_TIMEOUT,
        )
        .await
        .expect("session")
    }

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_COMMAND_TIMEOUT.as_secs(), 30);
        assert_eq!(DEFAULT_SESSION_TIMEOUT.as_secs(), 120);
    }

    #[test]
    fn test_normalize_appends_slash() {
        let url = Url::parse("http://localhost:4723/wd/hub").expect("url");
        assert_eq!(normalize(&url).as_str(), "http://localhost:4723/wd/hub/");

        let url = Url::parse("http://localhost:4723/").expect("url");
        assert_eq!(normalize(&url).as_str(), "http://localhost:4723/");
    }

    #[tokio::test]
    async fn test_connect_sends_both_capability_shapes() {
        let server = FakeServer::spawn().await;
        let driver = connect(&server).await;

        assert_eq!(driver.session_id().as_str(), FakeServer::SESSION_ID);

        let request = server.requests().into_iter().next().expect("new session");
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/wd/hub/session");
        assert_eq!(
            request.body["capabilities"]["alwaysMatch"]["platformName"],
            "windows"
        );
        assert_eq!(request.body["desiredCapabilities"]["deviceName"], "WindowsPC");
    }

    #[tokio::test]
    async fn test_connect_refused_session() {
        let server = FakeServer::spawn().await;
        server.refuse_sessions();

        let err = HttpRemoteDriver::connect(
            Client::new(),
            &server.url(),
            &Capabilities::windows_app("App"),
            DEFAULT_SESSION_TIMEOUT,
            DEFAULT_COMMAND_TIMEOUT,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::WebDriver { ref error, .. } if error == "session not created"));
    }

    #[tokio::test]
    async fn test_find_element_routes_under_session() {
        let server = FakeServer::spawn().await;
        server.add_element("name", "Seven");
        let driver = connect(&server).await;

        let element_id = driver
            .find_element(&By::name("Seven"), None)
            .await
            .expect("found");

        assert_eq!(element_id.as_str(), "el-Seven");
        let request = server.requests().pop().expect("find");
        assert_eq!(request.path, "/wd/hub/session/fake-session/element");
        assert_eq!(request.body, json!({ "using": "name", "value": "Seven" }));
    }

    #[tokio::test]
    async fn test_missing_element_is_no_such_element() {
        let server = FakeServer::spawn().await;
        let driver = connect(&server).await;

        let err = driver
            .execute(Command::Element(ElementCommand::Find {
                using: "name".to_string(),
                value: "Eight".to_string(),
                parent_id: None,
            }))
            .await
            .unwrap_err();

        assert!(err.is_no_such_element());
    }

    #[tokio::test]
    async fn test_custom_command_requires_definition() {
        let server = FakeServer::spawn().await;
        let driver = connect(&server).await;

        let err = driver
            .execute(Command::custom("getNetworkConnection", Value::Null))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCommand { .. }));

        driver.define_command(CommandDefinition::new(
            "getNetworkConnection",
            Method::Get,
            "/session/:sessionId/network_connection",
        ));

        let value = driver
            .execute(Command::custom("getNetworkConnection", Value::Null))
            .await
            .expect("defined");
        assert_eq!(value, json!(6));

        let request = server.requests().pop().expect("custom");
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/wd/hub/session/fake-session/network_connection");
    }

    #[tokio::test]
    async fn test_quit_deletes_session() {
        let server = FakeServer::spawn().await;
        let driver = connect(&server).await;

        driver.quit().await.expect("quit");

        let request = server.requests().pop().expect("delete");
        assert_eq!(request.method, "DELETE");
        assert_eq!(request.path, "/wd/hub/session/fake-session");
        assert!(driver.probe().await.is_err());
    }

    #[tokio::test]
    async fn test_factory_creates_sessions() {
        let server = FakeServer::spawn().await;
        let factory = HttpSessionFactory::new().request_timeout(Duration::from_secs(5));

        let driver = factory
            .create_session(&Capabilities::windows_app("App"), &server.url())
            .await
            .expect("session");

        assert_eq!(driver.session_id().as_str(), FakeServer::SESSION_ID);
        driver.probe().await.expect("alive");
    }
}

//! Test doubles for the remote end.
//!
//! | Double | Replaces |
//! |--------|----------|
//! | [`MockDriver`] | A live session, scripted per locator and command |
//! | [`MockFactory`] | Session creation, hands out `MockDriver`s |
//! | [`FakeServer`] | An Appium server, over real HTTP |

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::extract::State;
use axum::http::{Method as HttpMethod, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

use crate::driver::Capabilities;
use crate::error::{Error, Result};
use crate::identifiers::{ElementId, SessionId};
use crate::protocol::response::ELEMENT_KEY;
use crate::protocol::{Command, CommandDefinition, CommandRegistry, ElementCommand};
use crate::transport::{RemoteDriver, SessionFactory, poll_until_located};
use crate::ui::By;

// ============================================================================
// Tracing
// ============================================================================

/// Installs a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// MockDriver
// ============================================================================

/// Scripted in-memory session.
///
/// Elements are unknown until registered with [`MockDriver::locate`] or
/// [`MockDriver::locate_after`]; lookups of unknown elements fail with
/// "no such element". Every command is recorded.
#[derive(Debug)]
pub(crate) struct MockDriver {
    session_id: SessionId,
    state: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    commands: Vec<Command>,
    /// Misses left before each locator is found.
    present: FxHashMap<By, u32>,
    finds: FxHashMap<By, u32>,
    waits: Vec<(By, Duration)>,
    failures: FxHashMap<String, (String, String)>,
    responses: FxHashMap<String, Value>,
    registry: CommandRegistry,
}

impl MockState {
    fn lookup(&mut self, by: &By) -> Option<ElementId> {
        *self.finds.entry(by.clone()).or_default() += 1;
        match self.present.get_mut(by) {
            Some(0) => Some(ElementId::new(by.to_string())),
            Some(misses) => {
                *misses -= 1;
                None
            }
            None => None,
        }
    }
}

impl MockDriver {
    pub(crate) const SESSION_ID: &'static str = "mock-session";

    pub(crate) fn new() -> Self {
        Self::with_session(Self::SESSION_ID)
    }

    pub(crate) fn with_session(session_id: impl Into<String>) -> Self {
        let mut state = MockState::default();
        for (name, value) in [
            ("getTimeouts", json!({ "implicit": 0, "pageLoad": 300_000, "script": 30_000 })),
            ("isElementDisplayed", json!(true)),
            ("isElementEnabled", json!(true)),
            ("isElementSelected", json!(false)),
        ] {
            state.responses.insert(name.to_string(), value);
        }

        Self {
            session_id: SessionId::new(session_id),
            state: Mutex::new(state),
        }
    }

    /// Makes `by` found on the first lookup.
    pub(crate) fn locate(&self, by: &By) {
        self.state.lock().present.insert(by.clone(), 0);
    }

    /// Makes `by` found on the `nth` lookup (1-based).
    pub(crate) fn locate_after(&self, by: &By, nth: u32) {
        self.state.lock().present.insert(by.clone(), nth.saturating_sub(1));
    }

    /// Makes every command named `name` fail with a remote error.
    pub(crate) fn fail_command(&self, name: &str, code: &str, message: &str) {
        self.state
            .lock()
            .failures
            .insert(name.to_string(), (code.to_string(), message.to_string()));
    }

    /// Sets the payload returned for commands named `name`.
    pub(crate) fn respond(&self, name: &str, value: Value) {
        self.state.lock().responses.insert(name.to_string(), value);
    }

    pub(crate) fn commands(&self) -> Vec<Command> {
        self.state.lock().commands.clone()
    }

    pub(crate) fn command_names(&self) -> Vec<String> {
        self.state
            .lock()
            .commands
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    pub(crate) fn count(&self, name: &str) -> usize {
        self.state
            .lock()
            .commands
            .iter()
            .filter(|c| c.name() == name)
            .count()
    }

    pub(crate) fn find_count(&self, by: &By) -> u32 {
        self.state.lock().finds.get(by).copied().unwrap_or(0)
    }

    /// Returns every `wait_until_located` call with its timeout.
    pub(crate) fn waits(&self) -> Vec<(By, Duration)> {
        self.state.lock().waits.clone()
    }

    pub(crate) fn is_defined(&self, name: &str) -> bool {
        self.state.lock().registry.contains(name)
    }

    fn respond_to(&self, command: &Command) -> Result<Value> {
        let mut state = self.state.lock();
        state.commands.push(command.clone());

        if let Some((code, message)) = state.failures.get(command.name()) {
            return Err(Error::webdriver(code.clone(), message.clone()));
        }

        match command {
            Command::Element(ElementCommand::Find { using, value, .. }) => {
                let by = By::new(using.parse()?, value.clone());
                state
                    .lookup(&by)
                    .map(|id| json!({ ELEMENT_KEY: id.as_str() }))
                    .ok_or_else(|| Error::webdriver("no such element", by.to_string()))
            }
            Command::Element(ElementCommand::FindAll { using, value, .. }) => {
                let by = By::new(using.parse()?, value.clone());
                let found = state.lookup(&by).map(|id| json!({ ELEMENT_KEY: id.as_str() }));
                Ok(Value::Array(found.into_iter().collect()))
            }
            Command::Custom { name, .. } if !state.registry.contains(name) => {
                Err(Error::unknown_command(name.as_str()))
            }
            other => Ok(state
                .responses
                .get(other.name())
                .cloned()
                .unwrap_or(Value::Null)),
        }
    }
}

#[async_trait]
impl RemoteDriver for MockDriver {
    fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    async fn execute(&self, command: Command) -> Result<Value> {
        self.respond_to(&command)
    }

    fn define_command(&self, definition: CommandDefinition) {
        self.state.lock().registry.define(definition);
    }

    async fn wait_until_located(&self, by: &By, timeout: Duration) -> Result<ElementId> {
        self.state.lock().waits.push((by.clone(), timeout));
        poll_until_located(self, by, timeout).await
    }
}

// ============================================================================
// MockFactory
// ============================================================================

/// Session factory handing out [`MockDriver`]s.
#[derive(Debug, Default)]
pub(crate) struct MockFactory {
    state: Mutex<FactoryState>,
}

#[derive(Debug, Default)]
struct FactoryState {
    prepared: VecDeque<MockDriver>,
    drivers: Vec<Arc<MockDriver>>,
    requests: Vec<(Capabilities, Url)>,
    failure: Option<(String, String)>,
}

impl MockFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues a pre-scripted driver for the next session.
    pub(crate) fn prepare(&self, driver: MockDriver) {
        self.state.lock().prepared.push_back(driver);
    }

    /// Makes every session creation fail until [`MockFactory::accept_sessions`].
    pub(crate) fn refuse_sessions(&self, code: &str, message: &str) {
        self.state.lock().failure = Some((code.to_string(), message.to_string()));
    }

    pub(crate) fn accept_sessions(&self) {
        self.state.lock().failure = None;
    }

    pub(crate) fn created(&self) -> usize {
        self.state.lock().drivers.len()
    }

    pub(crate) fn drivers(&self) -> Vec<Arc<MockDriver>> {
        self.state.lock().drivers.clone()
    }

    pub(crate) fn last_driver(&self) -> Option<Arc<MockDriver>> {
        self.state.lock().drivers.last().cloned()
    }

    pub(crate) fn requests(&self) -> Vec<(Capabilities, Url)> {
        self.state.lock().requests.clone()
    }

    fn create(&self, capabilities: &Capabilities, url: &Url) -> Result<Arc<MockDriver>> {
        let mut state = self.state.lock();
        state.requests.push((capabilities.clone(), url.clone()));

        if let Some((code, message)) = &state.failure {
            return Err(Error::webdriver(code.clone(), message.clone()));
        }

        let next = state.drivers.len() + 1;
        let driver = state
            .prepared
            .pop_front()
            .unwrap_or_else(|| MockDriver::with_session(format!("mock-session-{next}")));
        let driver = Arc::new(driver);
        state.drivers.push(Arc::clone(&driver));
        Ok(driver)
    }
}

#[async_trait]
impl SessionFactory for MockFactory {
    async fn create_session(
        &self,
        capabilities: &Capabilities,
        url: &Url,
    ) -> Result<Arc<dyn RemoteDriver>> {
        let driver: Arc<dyn RemoteDriver> = self.create(capabilities, url)?;
        Ok(driver)
    }
}

// ============================================================================
// FakeServer
// ============================================================================

/// A request received by [`FakeServer`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
}

/// Minimal Appium-like HTTP server rooted at `/wd/hub`.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeServer {
    state: Arc<Mutex<FakeState>>,
    addr: Option<std::net::SocketAddr>,
}

#[derive(Debug, Default)]
struct FakeState {
    requests: Vec<RecordedRequest>,
    elements: FxHashSet<(String, String)>,
    network: u64,
    session_open: bool,
    refuse_sessions: bool,
}

impl FakeServer {
    pub(crate) const SESSION_ID: &'static str = "fake-session";

    /// Binds to an ephemeral port and serves in the background.
    pub(crate) async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let mut server = Self::default();
        server.state.lock().network = 6;
        server.addr = Some(listener.local_addr().expect("local addr"));

        let router = Router::new().fallback(handle).with_state(server.clone());
        tokio::spawn(async move { axum::serve(listener, router).await });

        server
    }

    pub(crate) fn url(&self) -> Url {
        let addr = self.addr.expect("spawned");
        Url::parse(&format!("http://{addr}/wd/hub")).expect("url")
    }

    pub(crate) fn add_element(&self, using: &str, value: &str) {
        self.state
            .lock()
            .elements
            .insert((using.to_string(), value.to_string()));
    }

    pub(crate) fn refuse_sessions(&self) {
        self.state.lock().refuse_sessions = true;
    }

    pub(crate) fn network(&self) -> u64 {
        self.state.lock().network
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }
}

fn ok(value: Value) -> Response {
    (StatusCode::OK, Json(json!({ "value": value }))).into_response()
}

fn fail(status: StatusCode, error: &str, message: &str) -> Response {
    let body = json!({ "value": { "error": error, "message": message, "stacktrace": "" } });
    (status, Json(body)).into_response()
}

async fn handle(
    State(server): State<FakeServer>,
    method: HttpMethod,
    uri: Uri,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

    let mut state = server.state.lock();
    state.requests.push(RecordedRequest {
        method: method.as_str().to_string(),
        path: path.clone(),
        body: body.clone(),
    });

    if method == HttpMethod::POST && path == "/wd/hub/session" {
        if state.refuse_sessions {
            return fail(
                StatusCode::INTERNAL_SERVER_ERROR,
                "session not created",
                "app not found",
            );
        }
        state.session_open = true;
        return ok(json!({
            "sessionId": FakeServer::SESSION_ID,
            "capabilities": body["capabilities"]["alwaysMatch"],
        }));
    }

    let root = format!("/wd/hub/session/{}", FakeServer::SESSION_ID);
    let Some(command) = path.strip_prefix(&root).filter(|_| state.session_open) else {
        return fail(StatusCode::NOT_FOUND, "invalid session id", &path);
    };

    match (method.as_str(), command) {
        ("DELETE", "") => {
            state.session_open = false;
            ok(Value::Null)
        }
        ("GET", "/timeouts") => ok(json!({ "implicit": 0, "pageLoad": 300_000, "script": 30_000 })),
        ("GET", "/title") => ok(json!("Calculator")),
        ("POST", "/element") => {
            let using = body["using"].as_str().unwrap_or_default().to_string();
            let value = body["value"].as_str().unwrap_or_default().to_string();
            if state.elements.contains(&(using, value.clone())) {
                ok(json!({ ELEMENT_KEY: format!("el-{value}") }))
            } else {
                fail(StatusCode::NOT_FOUND, "no such element", &value)
            }
        }
        ("GET", "/network_connection") => ok(json!(state.network)),
        ("POST", "/network_connection") => {
            if let Some(kind) = body["parameters"]["type"].as_u64() {
                state.network = kind;
            }
            ok(json!(state.network))
        }
        (_, c) if c.starts_with("/element/") => ok(Value::Null),
        _ => fail(StatusCode::NOT_FOUND, "unknown command", &path),
    }
}

//! Remote session lifecycle.
//!
//! A [`Connection`] owns zero or one live [`RemoteDriver`] and forwards
//! every session and element operation to it. When no driver is attached,
//! every operation fails with [`Error::NoConnection`].
//!
//! # Lifecycle
//!
//! ```text
//!   empty ──start()/attach()──► active ──stop()/detach()──► empty
//!                                  │
//!                               restart()
//! ```
//!
//! # Example
//!
//! ```ignore
//! use selenium_appium::{By, Capabilities, Connection};
//!
//! let connection = Connection::new();
//! connection
//!     .start(Capabilities::windows_app("Microsoft.WindowsCalculator_8wekyb3d8bbwe!App"))
//!     .await?;
//!
//! connection.locator(By::name("Seven")).click().await?;
//!
//! let outcome = connection.stop().await;
//! if let Some(warning) = outcome.warning() {
//!     eprintln!("teardown failed: {warning}");
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::identifiers::SessionId;
use crate::protocol::response::expect_string;
use crate::protocol::{
    Command, CommandDefinition, DocumentCommand, NavigationCommand, SessionCommand,
    WindowCommand,
};
use crate::transport::{HttpSessionFactory, RemoteDriver, SessionFactory};
use crate::ui::{By, Element, Locator, Screenshot};

use super::builder::ConnectionBuilder;
use super::capabilities::Capabilities;
use super::timeouts::{TimeoutRegistry, effective_timeout};

// ============================================================================
// Constants
// ============================================================================

/// Server URL used when none is given: a local Appium 1.x server.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:4723/wd/hub";

/// Process-wide connection.
static GLOBAL: LazyLock<Connection> = LazyLock::new(Connection::new);

// ============================================================================
// StopOutcome
// ============================================================================

/// Result of [`Connection::stop`].
///
/// Stopping never fails; a teardown error is reported here as a warning
/// and also kept in [`Connection::last_error`].
#[derive(Debug, Clone)]
pub enum StopOutcome {
    /// No driver was attached.
    Idle,
    /// The session was torn down.
    Stopped,
    /// The driver was released but teardown failed.
    StoppedWithWarning(Arc<Error>),
}

impl StopOutcome {
    /// Returns `true` unless teardown failed.
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !matches!(self, Self::StoppedWithWarning(_))
    }

    /// Returns the teardown error, if any.
    #[inline]
    #[must_use]
    pub fn warning(&self) -> Option<&Error> {
        match self {
            Self::StoppedWithWarning(e) => Some(e),
            _ => None,
        }
    }
}

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the connection.
pub(crate) struct ConnectionInner {
    /// Unique identifier for this connection.
    id: Uuid,

    /// Creates drivers on `start()`.
    factory: Arc<dyn SessionFactory>,

    /// Default wait timeouts.
    timeouts: TimeoutRegistry,

    /// URL used by `start()`.
    default_url: Url,

    /// Mutable session state.
    state: Mutex<ConnectionState>,
}

#[derive(Default)]
struct ConnectionState {
    /// Active driver.
    driver: Option<Arc<dyn RemoteDriver>>,
    /// Capabilities of the last `start()`.
    capabilities: Option<Capabilities>,
    /// URL of the last `start()`.
    url: Option<Url>,
    /// Most recent lifecycle failure.
    last_error: Option<Arc<Error>>,
    /// Custom commands replayed onto every new driver.
    commands: Vec<CommandDefinition>,
}

// ============================================================================
// Connection
// ============================================================================

/// Handle to zero or one live remote session.
///
/// Cloning is cheap; clones share the same session.
///
/// # Thread Safety
///
/// State is guarded by a mutex that is never held across a network call.
/// Operations are otherwise not serialized: concurrent `start()`/`stop()`
/// from unrelated flows on one connection race, and the last writer wins.
#[derive(Clone)]
pub struct Connection {
    /// Shared inner state.
    pub(crate) inner: Arc<ConnectionInner>,
}

// ============================================================================
// Connection - Display
// ============================================================================

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session_id = self.session_id();
        f.debug_struct("Connection")
            .field("id", &self.inner.id)
            .field("session_id", &session_id)
            .field("default_url", &self.inner.default_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Connection - Construction
// ============================================================================

impl Connection {
    /// Creates an empty connection using HTTP sessions, the global
    /// [`TimeoutRegistry`] and [`DEFAULT_SERVER_URL`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(
            Arc::new(HttpSessionFactory::new()),
            TimeoutRegistry::global().clone(),
            default_url(),
        )
    }

    /// Creates an empty connection that opens sessions through `factory`.
    #[must_use]
    pub fn with_factory(factory: Arc<dyn SessionFactory>) -> Self {
        Self::from_parts(factory, TimeoutRegistry::global().clone(), default_url())
    }

    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    /// Returns the process-wide connection.
    #[inline]
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    pub(crate) fn from_parts(
        factory: Arc<dyn SessionFactory>,
        timeouts: TimeoutRegistry,
        default_url: Url,
    ) -> Self {
        Self {
            inner: Arc::new(ConnectionInner {
                id: Uuid::new_v4(),
                factory,
                timeouts,
                default_url,
                state: Mutex::new(ConnectionState::default()),
            }),
        }
    }
}

/// Parses [`DEFAULT_SERVER_URL`].
fn default_url() -> Url {
    // Constant input; cannot fail.
    Url::parse(DEFAULT_SERVER_URL).unwrap_or_else(|e| unreachable!("{e}"))
}

// ============================================================================
// Connection - Accessors
// ============================================================================

impl Connection {
    /// Returns the unique ID of this connection.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Returns the timeout registry used by locators and pages.
    #[inline]
    #[must_use]
    pub fn timeouts(&self) -> &TimeoutRegistry {
        &self.inner.timeouts
    }

    /// Returns the URL `start()` connects to.
    #[inline]
    #[must_use]
    pub fn default_url(&self) -> &Url {
        &self.inner.default_url
    }

    /// Returns the active session ID, if a driver is attached.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.inner
            .state
            .lock()
            .driver
            .as_ref()
            .map(|d| d.session_id().clone())
    }

    /// Returns `true` if a driver is attached, without contacting it.
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.state.lock().driver.is_some()
    }

    /// Returns the most recent failure seen by `start()` or `stop()`.
    ///
    /// Cleared by a successful `start()`.
    #[must_use]
    pub fn last_error(&self) -> Option<Arc<Error>> {
        self.inner.state.lock().last_error.clone()
    }

    /// Returns the attached driver.
    ///
    /// Every higher-level operation goes through here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoConnection`] if nothing is attached.
    pub fn driver(&self) -> Result<Arc<dyn RemoteDriver>> {
        self.inner
            .state
            .lock()
            .driver
            .clone()
            .ok_or(Error::NoConnection)
    }

    fn record_error(&self, error: Error) -> Arc<Error> {
        let error = Arc::new(error);
        self.inner.state.lock().last_error = Some(Arc::clone(&error));
        error
    }
}

// ============================================================================
// Connection - Lifecycle
// ============================================================================

impl Connection {
    /// Opens a session at the default URL.
    ///
    /// # Errors
    ///
    /// See [`Connection::start_with_url`].
    pub async fn start(&self, capabilities: Capabilities) -> Result<()> {
        let url = self.inner.default_url.clone();
        self.start_session(capabilities, url).await
    }

    /// Opens a session at `url`.
    ///
    /// An already active session is stopped first.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the capabilities are empty
    /// - [`Error::Url`] if `url` does not parse
    /// - [`Error::Connection`] if session creation fails; the cause is kept
    ///   in [`Connection::last_error`]
    pub async fn start_with_url(&self, capabilities: Capabilities, url: &str) -> Result<()> {
        let url = Url::parse(url)?;
        self.start_session(capabilities, url).await
    }

    async fn start_session(&self, capabilities: Capabilities, url: Url) -> Result<()> {
        if capabilities.is_empty() {
            return Err(Error::connection("capabilities is not set"));
        }

        if self.is_attached() {
            warn!(connection = %self.inner.id, "Session already active, stopping it first");
            self.stop().await;
        }

        info!(connection = %self.inner.id, %url, "Starting session");

        let driver = match self.inner.factory.create_session(&capabilities, &url).await {
            Ok(driver) => driver,
            Err(e) => {
                let message = e.to_string();
                warn!(connection = %self.inner.id, error = %e, "Session creation failed");
                self.record_error(e);
                return Err(Error::connection(message));
            }
        };

        let session_id = driver.session_id().clone();

        let replaced = {
            let mut state = self.inner.state.lock();
            for definition in &state.commands {
                driver.define_command(definition.clone());
            }
            state.capabilities = Some(capabilities);
            state.url = Some(url);
            state.last_error = None;
            state.driver.replace(driver)
        };

        // A concurrent start() won the race; end its session.
        if let Some(replaced) = replaced {
            warn!(session_id = %replaced.session_id(), "Replacing a live session");
            if let Err(e) = replaced.quit().await {
                debug!(error = %e, "Replaced session teardown failed");
            }
        }

        info!(connection = %self.inner.id, %session_id, "Session started");
        Ok(())
    }

    /// Ends the active session.
    ///
    /// Never fails. The driver is released whatever the teardown outcome.
    pub async fn stop(&self) -> StopOutcome {
        let driver = self.inner.state.lock().driver.take();

        let Some(driver) = driver else {
            debug!(connection = %self.inner.id, "Stop requested with no session");
            return StopOutcome::Idle;
        };

        let session_id = driver.session_id().clone();
        match driver.quit().await {
            Ok(()) => {
                info!(connection = %self.inner.id, %session_id, "Session stopped");
                StopOutcome::Stopped
            }
            Err(e) => {
                warn!(
                    connection = %self.inner.id,
                    %session_id,
                    error = %e,
                    "Session teardown failed, driver released anyway"
                );
                StopOutcome::StoppedWithWarning(self.record_error(e))
            }
        }
    }

    /// Stops, then starts again with the last capabilities and URL.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the connection was never started
    /// - Any error from [`Connection::start_with_url`]
    pub async fn restart(&self) -> Result<()> {
        let (capabilities, url) = {
            let state = self.inner.state.lock();
            (state.capabilities.clone(), state.url.clone())
        };

        let (Some(capabilities), Some(url)) = (capabilities, url) else {
            return Err(Error::connection("restart requires a previous start"));
        };

        let outcome = self.stop().await;
        debug!(connection = %self.inner.id, clean = outcome.is_clean(), "Restarting session");

        self.start_session(capabilities, url).await
    }

    /// Adopts an externally created driver.
    ///
    /// Returns the previously attached driver, released without teardown.
    pub fn attach(&self, driver: Arc<dyn RemoteDriver>) -> Option<Arc<dyn RemoteDriver>> {
        let session_id = driver.session_id().clone();
        let previous = {
            let mut state = self.inner.state.lock();
            for definition in &state.commands {
                driver.define_command(definition.clone());
            }
            state.driver.replace(driver)
        };

        if let Some(previous) = &previous {
            warn!(replaced = %previous.session_id(), "Attach replaced a live session");
        }
        debug!(connection = %self.inner.id, %session_id, "Driver attached");
        previous
    }

    /// Releases the driver without ending its session.
    pub fn detach(&self) -> Option<Arc<dyn RemoteDriver>> {
        let driver = self.inner.state.lock().driver.take();
        if let Some(driver) = &driver {
            debug!(connection = %self.inner.id, session_id = %driver.session_id(), "Driver detached");
        }
        driver
    }

    /// Returns `true` if a driver is attached and its session answers.
    ///
    /// Never fails; any probe error reads as inactive.
    pub async fn is_active(&self) -> bool {
        let Ok(driver) = self.driver() else {
            return false;
        };

        match driver.probe().await {
            Ok(()) => true,
            Err(e) => {
                debug!(session_id = %driver.session_id(), error = %e, "Session probe failed");
                false
            }
        }
    }

    /// Defines a custom command on this connection.
    ///
    /// The definition applies to the attached driver now and is replayed
    /// onto every driver started or attached later.
    pub fn define_command(&self, definition: CommandDefinition) {
        let driver = {
            let mut state = self.inner.state.lock();
            state.commands.retain(|d| d.name != definition.name);
            state.commands.push(definition.clone());
            state.driver.clone()
        };

        if let Some(driver) = driver {
            driver.define_command(definition);
        }
    }
}

// ============================================================================
// Connection - Elements
// ============================================================================

impl Connection {
    /// Creates a lazy locator bound to this connection. No remote call.
    #[inline]
    #[must_use]
    pub fn locator(&self, by: By) -> Locator {
        Locator::new(by, self.clone())
    }

    /// Looks an element up once, without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoConnection`] or the remote lookup error.
    pub async fn find_element(&self, by: &By) -> Result<Element> {
        let driver = self.driver()?;
        let id = driver.find_element(by, None).await?;
        Ok(Element::new(id, driver))
    }

    /// Looks all matching elements up once, without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoConnection`] or the remote lookup error.
    pub async fn find_elements(&self, by: &By) -> Result<Vec<Element>> {
        let driver = self.driver()?;
        let ids = driver.find_elements(by, None).await?;
        Ok(ids
            .into_iter()
            .map(|id| Element::new(id, Arc::clone(&driver)))
            .collect())
    }

    /// Polls until an element is located.
    ///
    /// `timeout` defaults to the registry's element wait.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ElementNotFound`] on timeout.
    pub async fn wait_for_element(&self, by: &By, timeout: Option<Duration>) -> Result<Element> {
        let driver = self.driver()?;
        let timeout = effective_timeout(timeout, None, self.inner.timeouts.element_wait());
        let id = driver.wait_until_located(by, timeout).await?;
        Ok(Element::new(id, driver))
    }
}

// ============================================================================
// Connection - Session Commands
// ============================================================================

impl Connection {
    /// Executes a raw command on the attached driver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoConnection`] or the command's error.
    pub async fn execute(&self, command: Command) -> Result<Value> {
        let driver = self.driver()?;
        debug!(session_id = %driver.session_id(), command = command.name(), "Executing command");
        driver.execute(command).await
    }

    /// Executes a custom command defined with [`Connection::define_command`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCommand`] if `name` was never defined.
    pub async fn execute_custom(&self, name: &str, params: Value) -> Result<Value> {
        self.execute(Command::custom(name, params)).await
    }

    /// Returns the capabilities matched by the remote end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoConnection`] if nothing is attached.
    pub fn capabilities(&self) -> Result<Value> {
        Ok(self.driver()?.capabilities())
    }

    /// Sets the remote session timeouts. `None` leaves a value unchanged.
    pub async fn set_session_timeouts(
        &self,
        implicit: Option<Duration>,
        page_load: Option<Duration>,
        script: Option<Duration>,
    ) -> Result<()> {
        let as_ms = |d: Duration| d.as_millis() as u64;
        self.execute(Command::Session(SessionCommand::SetTimeouts {
            implicit_ms: implicit.map(as_ms),
            page_load_ms: page_load.map(as_ms),
            script_ms: script.map(as_ms),
        }))
        .await
        .map(drop)
    }

    /// Navigates to a URL.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.execute(Command::Navigation(NavigationCommand::Navigate {
            url: url.to_string(),
        }))
        .await
        .map(drop)
    }

    /// Returns the current URL.
    pub async fn current_url(&self) -> Result<String> {
        expect_string(
            self.execute(Command::Navigation(NavigationCommand::GetCurrentUrl))
                .await?,
        )
    }

    /// Returns the window title.
    pub async fn title(&self) -> Result<String> {
        expect_string(self.execute(Command::Navigation(NavigationCommand::GetTitle)).await?)
    }

    /// Navigates back.
    pub async fn back(&self) -> Result<()> {
        self.execute(Command::Navigation(NavigationCommand::Back))
            .await
            .map(drop)
    }

    /// Navigates forward.
    pub async fn forward(&self) -> Result<()> {
        self.execute(Command::Navigation(NavigationCommand::Forward))
            .await
            .map(drop)
    }

    /// Reloads the current page.
    pub async fn refresh(&self) -> Result<()> {
        self.execute(Command::Navigation(NavigationCommand::Refresh))
            .await
            .map(drop)
    }

    /// Returns the page source (the UI tree XML for native apps).
    pub async fn page_source(&self) -> Result<String> {
        expect_string(
            self.execute(Command::Document(DocumentCommand::GetPageSource))
                .await?,
        )
    }

    /// Returns the current window handle.
    pub async fn window_handle(&self) -> Result<String> {
        expect_string(self.execute(Command::Window(WindowCommand::GetHandle)).await?)
    }

    /// Returns all window handles.
    pub async fn window_handles(&self) -> Result<Vec<String>> {
        let value = self.execute(Command::Window(WindowCommand::GetHandles)).await?;
        match value {
            Value::Array(items) => items.into_iter().map(expect_string).collect(),
            other => Err(Error::protocol(format!("Expected handle array, got {other}"))),
        }
    }

    /// Closes the current window.
    pub async fn close_window(&self) -> Result<()> {
        self.execute(Command::Window(WindowCommand::Close))
            .await
            .map(drop)
    }

    /// Executes a synchronous script and returns its result.
    pub async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.execute(Command::Document(DocumentCommand::ExecuteScript {
            script: script.to_string(),
            args,
        }))
        .await
    }

    /// Executes an asynchronous script and returns the value it calls back with.
    pub async fn execute_async_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.execute(Command::Document(DocumentCommand::ExecuteAsyncScript {
            script: script.to_string(),
            args,
        }))
        .await
    }

    /// Captures the screen.
    pub async fn take_screenshot(&self) -> Result<Screenshot> {
        let value = self
            .execute(Command::Document(DocumentCommand::TakeScreenshot))
            .await?;
        Screenshot::from_base64(&expect_string(value)?)
    }

    /// Suspends the calling task.
    pub async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Tests
// ============================================================================

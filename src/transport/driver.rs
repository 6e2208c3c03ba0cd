//! Remote driver contract.
//!
//! [`RemoteDriver`] is the seam between this crate and whatever speaks the
//! wire protocol. The crate ships an HTTP implementation
//! ([`HttpRemoteDriver`](super::HttpRemoteDriver)); tests and interop code
//! can plug in their own.
//!
//! Only [`RemoteDriver::session_id`], [`RemoteDriver::execute`] and
//! [`RemoteDriver::define_command`] are required. Lookup, polling, probing,
//! and teardown have default implementations built on `execute`.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::{Instant, sleep};
use tracing::{debug, trace};
use url::Url;

use crate::driver::Capabilities;
use crate::error::{Error, Result};
use crate::identifiers::{ElementId, SessionId};
use crate::protocol::response::{expect_element_id, expect_element_ids};
use crate::protocol::{Command, CommandDefinition, ElementCommand, SessionCommand};
use crate::ui::By;

// ============================================================================
// Constants
// ============================================================================

/// Delay between lookups in [`RemoteDriver::wait_until_located`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

// ============================================================================
// RemoteDriver
// ============================================================================

/// A live remote session.
///
/// Implementations must be cheap to share: the crate holds them as
/// `Arc<dyn RemoteDriver>` and calls them from any task.
#[async_trait]
pub trait RemoteDriver: Send + Sync + fmt::Debug {
    /// Returns the remote session ID.
    fn session_id(&self) -> &SessionId;

    /// Executes a command and returns its payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebDriver`] for errors reported by the remote end,
    /// [`Error::UnknownCommand`] for undefined custom commands, and transport
    /// errors otherwise.
    async fn execute(&self, command: Command) -> Result<Value>;

    /// Registers a custom command on this session's executor.
    fn define_command(&self, definition: CommandDefinition);

    /// Returns the capabilities matched by the remote end.
    fn capabilities(&self) -> Value {
        Value::Null
    }

    /// Ends the remote session.
    async fn quit(&self) -> Result<()> {
        self.execute(Command::Session(SessionCommand::Delete))
            .await
            .map(drop)
    }

    /// Checks that the session is still alive on the remote end.
    async fn probe(&self) -> Result<()> {
        self.execute(Command::Session(SessionCommand::GetTimeouts))
            .await
            .map(drop)
    }

    /// Looks an element up once, without waiting.
    async fn find_element(&self, by: &By, parent: Option<&ElementId>) -> Result<ElementId> {
        let value = self
            .execute(Command::Element(ElementCommand::Find {
                using: by.strategy().as_str().to_string(),
                value: by.value().to_string(),
                parent_id: parent.cloned(),
            }))
            .await?;
        expect_element_id(&value)
    }

    /// Looks all matching elements up once, without waiting.
    async fn find_elements(&self, by: &By, parent: Option<&ElementId>) -> Result<Vec<ElementId>> {
        let value = self
            .execute(Command::Element(ElementCommand::FindAll {
                using: by.strategy().as_str().to_string(),
                value: by.value().to_string(),
                parent_id: parent.cloned(),
            }))
            .await?;
        expect_element_ids(&value)
    }

    /// Returns the delay between lookups while polling.
    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Polls until the element is located or `timeout` elapses.
    ///
    /// Defaults to [`poll_until_located`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ElementNotFound`] when the deadline passes.
    async fn wait_until_located(&self, by: &By, timeout: Duration) -> Result<ElementId> {
        poll_until_located(self, by, timeout).await
    }
}

// ============================================================================
// Polling
// ============================================================================

/// Looks an element up repeatedly until it is located or `timeout` elapses.
///
/// Only "no such element" is retried; any other error ends the wait.
/// At least one lookup is always made, even with a zero timeout.
///
/// # Errors
///
/// Returns [`Error::ElementNotFound`] when the deadline passes.
pub async fn poll_until_located<D>(driver: &D, by: &By, timeout: Duration) -> Result<ElementId>
where
    D: RemoteDriver + ?Sized,
{
    let deadline = Instant::now() + timeout;
    let interval = driver.poll_interval();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        match driver.find_element(by, None).await {
            Ok(element_id) => {
                debug!(%by, attempts, %element_id, "Element located");
                return Ok(element_id);
            }
            Err(e) if e.is_no_such_element() => {
                trace!(%by, attempts, "Element not located yet");
            }
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if now >= deadline {
            debug!(%by, attempts, timeout_ms = timeout.as_millis() as u64, "Element wait timed out");
            return Err(Error::element_not_found(
                by.strategy().as_str(),
                by.value(),
                timeout.as_millis() as u64,
            ));
        }

        sleep(interval.min(deadline - now)).await;
    }
}

// ============================================================================
// SessionFactory
// ============================================================================

/// Creates remote sessions from capabilities.
///
/// [`Connection`](crate::Connection) goes through a factory on every
/// `start()`, which keeps session creation replaceable in tests.
#[async_trait]
pub trait SessionFactory: Send + Sync + fmt::Debug {
    /// Opens a new session on the server at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or refuses the session.
    async fn create_session(
        &self,
        capabilities: &Capabilities,
        url: &Url,
    ) -> Result<Arc<dyn RemoteDriver>>;
}

// ============================================================================
// Tests
// ============================================================================

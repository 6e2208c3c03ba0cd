//! Readiness conditions.
//!
//! | Condition | Holds when |
//! |-----------|------------|
//! | [`ReadyCondition::Located`] | the locator resolves |
//! | [`ReadyCondition::Displayed`] | the locator resolves and the element is displayed |
//! | [`ReadyCondition::Custom`] | the predicate returns `true` |
//!
//! Each condition is waited for with the page timeout. A condition that does
//! not hold in time reports [`Readiness::TimedOut`]; any other failure is
//! returned as an error.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::time::{Instant, sleep};
use tracing::trace;

use crate::driver::Connection;
use crate::error::{Error, Result};
use crate::transport::DEFAULT_POLL_INTERVAL;
use crate::ui::Locator;

// ============================================================================
// Types
// ============================================================================

/// Async predicate over a connection.
pub type ReadyPredicate =
    Arc<dyn Fn(Connection) -> BoxFuture<'static, Result<bool>> + Send + Sync>;

/// Result of waiting for one condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The condition held.
    Ready,
    /// The timeout elapsed first.
    TimedOut,
}

// ============================================================================
// ReadyCondition
// ============================================================================

/// One step of a page's readiness check.
#[derive(Clone)]
pub enum ReadyCondition {
    /// The element can be located.
    Located(Locator),

    /// The element can be located and is displayed.
    Displayed(Locator),

    /// An arbitrary async predicate, polled until it returns `true`.
    Custom {
        /// Name used in logs and errors.
        name: String,
        /// The predicate.
        predicate: ReadyPredicate,
    },
}

impl fmt::Debug for ReadyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Located(locator) => f.debug_tuple("Located").field(locator).finish(),
            Self::Displayed(locator) => f.debug_tuple("Displayed").field(locator).finish(),
            Self::Custom { name, .. } => f
                .debug_struct("Custom")
                .field("name", name)
                .finish_non_exhaustive(),
        }
    }
}

impl fmt::Display for ReadyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Located(locator) => write!(f, "located {locator}"),
            Self::Displayed(locator) => write!(f, "displayed {locator}"),
            Self::Custom { name, .. } => write!(f, "custom {name}"),
        }
    }
}

impl From<Locator> for ReadyCondition {
    fn from(locator: Locator) -> Self {
        Self::Located(locator)
    }
}

impl ReadyCondition {
    /// Waits for the locator to resolve.
    #[inline]
    #[must_use]
    pub fn located(locator: Locator) -> Self {
        Self::Located(locator)
    }

    /// Waits for the locator to resolve to a displayed element.
    #[inline]
    #[must_use]
    pub fn displayed(locator: Locator) -> Self {
        Self::Displayed(locator)
    }

    /// Waits for an async predicate to return `true`.
    #[must_use]
    pub fn custom<F, Fut>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        Self::Custom {
            name: name.into(),
            predicate: Arc::new(move |connection| predicate(connection).boxed()),
        }
    }

    /// Waits until the condition holds or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns any failure other than the condition not holding yet.
    pub async fn wait(&self, connection: &Connection, timeout: Duration) -> Result<Readiness> {
        match self {
            Self::Located(locator) => match locator.resolve_within(Some(timeout)).await {
                Ok(_) => Ok(Readiness::Ready),
                Err(Error::ElementNotFound { .. }) => Ok(Readiness::TimedOut),
                Err(e) => Err(e),
            },
            Self::Displayed(locator) => wait_displayed(locator, timeout).await,
            Self::Custom { name, predicate } => {
                poll(name, timeout, || predicate(connection.clone())).await
            }
        }
    }
}

/// Polls until the locator resolves to a displayed element.
async fn wait_displayed(locator: &Locator, timeout: Duration) -> Result<Readiness> {
    let deadline = Instant::now() + timeout;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let element = match locator.resolve_within(Some(remaining)).await {
            Ok(element) => element,
            Err(Error::ElementNotFound { .. }) => return Ok(Readiness::TimedOut),
            Err(e) => return Err(e),
        };

        match element.is_displayed().await {
            Ok(true) => return Ok(Readiness::Ready),
            Ok(false) => trace!(%locator, "Element located but hidden"),
            Err(e) if e.is_stale_element() || e.is_no_such_element() => {
                trace!(%locator, "Element vanished while checking visibility");
            }
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(Readiness::TimedOut);
        }
        sleep(DEFAULT_POLL_INTERVAL.min(deadline - now)).await;
    }
}

/// Polls a predicate until it returns `true`.
async fn poll<F>(name: &str, timeout: Duration, mut check: F) -> Result<Readiness>
where
    F: FnMut() -> BoxFuture<'static, Result<bool>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if check().await? {
            return Ok(Readiness::Ready);
        }
        trace!(condition = name, "Condition not met yet");

        let now = Instant::now();
        if now >= deadline {
            return Ok(Readiness::TimedOut);
        }
        sleep(DEFAULT_POLL_INTERVAL.min(deadline - now)).await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};

    use serde_json::json;

    use crate::testing::{MockDriver, MockFactory};
    use crate::transport::RemoteDriver;
    use crate::ui::By;

    fn attached() -> (Connection, Arc<MockDriver>) {
        let connection = Connection::with_factory(Arc::new(MockFactory::new()));
        let driver = Arc::new(MockDriver::new());
        connection.attach(Arc::clone(&driver) as Arc<dyn RemoteDriver>);
        (connection, driver)
    }

    #[test]
    fn test_display() {
        let connection = Connection::with_factory(Arc::new(MockFactory::new()));
        let condition = ReadyCondition::from(connection.locator(By::name("Seven")));
        assert_eq!(condition.to_string(), "located name=Seven");

        let condition = ReadyCondition::custom("always", |_| async { Ok::<_, Error>(true) });
        assert_eq!(condition.to_string(), "custom always");
    }

    #[tokio::test]
    async fn test_located() {
        let (connection, driver) = attached();
        driver.locate(&By::name("Seven"));

        let condition = ReadyCondition::located(connection.locator(By::name("Seven")));
        let readiness = condition
            .wait(&connection, Duration::from_secs(1))
            .await
            .expect("wait");

        assert_eq!(readiness, Readiness::Ready);
        assert_eq!(driver.waits(), vec![(By::name("Seven"), Duration::from_secs(1))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_located_times_out() {
        let (connection, _driver) = attached();
        let condition = ReadyCondition::located(connection.locator(By::name("Eight")));

        let readiness = condition
            .wait(&connection, Duration::from_millis(300))
            .await
            .expect("wait");
        assert_eq!(readiness, Readiness::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_displayed_waits_for_visibility() {
        let (connection, driver) = attached();
        driver.locate(&By::name("Result"));
        driver.respond("isElementDisplayed", json!(false));

        let condition = ReadyCondition::displayed(connection.locator(By::name("Result")));
        let readiness = condition
            .wait(&connection, Duration::from_millis(600))
            .await
            .expect("wait");

        assert_eq!(readiness, Readiness::TimedOut);
        assert!(driver.count("isElementDisplayed") >= 2);

        driver.respond("isElementDisplayed", json!(true));
        let readiness = condition
            .wait(&connection, Duration::from_millis(600))
            .await
            .expect("wait");
        assert_eq!(readiness, Readiness::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_polls_until_true() {
        let (connection, _driver) = attached();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let condition = ReadyCondition::custom("third time", move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok::<_, Error>(n >= 3) }
        });

        let readiness = condition
            .wait(&connection, Duration::from_secs(5))
            .await
            .expect("wait");

        assert_eq!(readiness, Readiness::Ready);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_custom_error_propagates() {
        let (connection, _driver) = attached();
        let condition = ReadyCondition::custom("title", |connection: Connection| async move {
            Ok::<_, Error>(connection.title().await? == "Calculator")
        });

        connection.detach();
        let err = condition
            .wait(&connection, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoConnection));
    }
}

//! Page objects.
//!
//! A page object wraps a [`Page`] context and declares the conditions that
//! mark the screen as ready. Navigation helpers chain a click to the
//! readiness wait of the destination page.
//!
//! # Example
//!
//! ```ignore
//! use selenium_appium::{By, Page, PageObject, ReadyCondition, Result};
//!
//! struct Calculator {
//!     page: Page,
//! }
//!
//! impl PageObject for Calculator {
//!     fn page(&self) -> &Page {
//!         &self.page
//!     }
//!
//!     fn ready_conditions(&self) -> Result<Vec<ReadyCondition>> {
//!         Ok(vec![self.locator(By::name("Seven")).into()])
//!     }
//! }
//!
//! let calculator = Calculator { page: Page::new(connection.clone()) };
//! calculator.wait_until_ready(None).await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::driver::{Connection, effective_timeout};
use crate::error::{Error, Result};
use crate::ui::{By, Locator};

use super::condition::{ReadyCondition, Readiness};
use super::state::PageState;

// ============================================================================
// Page
// ============================================================================

/// Per-page context: the connection, an optional wait override, and the
/// readiness state.
pub struct Page {
    connection: Connection,
    timeout: Option<Duration>,
    state: Mutex<PageState>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("connection", &self.connection.id())
            .field("timeout", &self.timeout)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Creates an unverified page bound to `connection`.
    #[must_use]
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            timeout: None,
            state: Mutex::new(PageState::Unverified),
        }
    }

    /// Overrides the registry page wait for this page.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the connection this page is bound to.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Returns the page wait override, if any.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the outcome of the latest readiness check.
    #[inline]
    #[must_use]
    pub fn state(&self) -> PageState {
        *self.state.lock()
    }

    pub(crate) fn set_state(&self, state: PageState) {
        *self.state.lock() = state;
    }

    /// Creates a lazy locator on this page's connection.
    #[inline]
    #[must_use]
    pub fn locator(&self, by: By) -> Locator {
        self.connection.locator(by)
    }
}

// ============================================================================
// PageObject
// ============================================================================

/// A screen of the application under test.
///
/// Only [`PageObject::page`] is required. Pages that never override
/// [`PageObject::ready_conditions`] fail their readiness check with
/// [`Error::NotImplemented`].
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Returns the page context.
    fn page(&self) -> &Page;

    /// Returns the ordered readiness conditions.
    ///
    /// An empty list means the page is ready without contacting the server.
    ///
    /// # Errors
    ///
    /// The default implementation returns [`Error::NotImplemented`].
    fn ready_conditions(&self) -> Result<Vec<ReadyCondition>> {
        Err(Error::not_implemented(format!(
            "ready conditions for {}",
            self.name()
        )))
    }

    /// Name used in logs and errors. Defaults to the type name.
    fn name(&self) -> String {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_string()
    }

    #[inline]
    fn connection(&self) -> &Connection {
        self.page().connection()
    }

    #[inline]
    fn state(&self) -> PageState {
        self.page().state()
    }

    #[inline]
    fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Creates a lazy locator on the page's connection.
    #[inline]
    fn locator(&self, by: By) -> Locator {
        self.page().locator(by)
    }

    /// Waits for every readiness condition in order.
    ///
    /// Each condition gets the full timeout, resolved as `timeout`, then the
    /// page override, then the registry page wait. The first condition that
    /// does not hold stops the check.
    ///
    /// # Errors
    ///
    /// - [`Error::PageNotReady`] if a condition times out
    /// - [`Error::NotImplemented`] if the page declares no conditions
    /// - Any remote error raised while checking
    ///
    /// The page is left [`PageState::Failed`] on error and
    /// [`PageState::Ready`] on success.
    async fn wait_until_ready(&self, timeout: Option<Duration>) -> Result<()> {
        let page = self.page();
        let name = self.name();

        let conditions = match self.ready_conditions() {
            Ok(conditions) => conditions,
            Err(e) => {
                page.set_state(PageState::Failed);
                return Err(e);
            }
        };

        let timeout = effective_timeout(
            timeout,
            page.timeout(),
            page.connection().timeouts().page_wait(),
        );
        debug!(
            page = %name,
            conditions = conditions.len(),
            timeout_ms = timeout.as_millis() as u64,
            "Waiting for page"
        );

        for condition in &conditions {
            match condition.wait(page.connection(), timeout).await {
                Ok(Readiness::Ready) => {}
                Ok(Readiness::TimedOut) => {
                    page.set_state(PageState::Failed);
                    warn!(page = %name, %condition, "Page not ready");
                    return Err(Error::page_not_ready(
                        name,
                        condition.to_string(),
                        timeout.as_millis() as u64,
                    ));
                }
                Err(e) => {
                    page.set_state(PageState::Failed);
                    warn!(page = %name, %condition, error = %e, "Readiness check failed");
                    return Err(e);
                }
            }
        }

        page.set_state(PageState::Ready);
        debug!(page = %name, "Page ready");
        Ok(())
    }

    /// Clicks `locator`, then builds the destination page on the same
    /// connection and waits until it is ready.
    ///
    /// `factory` runs only after the click succeeds.
    ///
    /// # Errors
    ///
    /// Returns the click failure, or the destination's readiness failure.
    async fn click_and_wait_for_page<P, F>(
        &self,
        factory: F,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Result<P>
    where
        Self: Sized,
        P: PageObject,
        F: FnOnce(Connection) -> P + Send,
    {
        locator.click().await?;

        let next = factory(self.connection().clone());
        debug!(from = %self.name(), to = %next.name(), "Navigated");
        next.wait_until_ready(timeout).await?;
        Ok(next)
    }

    /// Checks presence with a single lookup. Any failure reads as absent.
    async fn element_exists(&self, by: &By) -> bool {
        self.connection().find_element(by).await.is_ok()
    }
}

// ============================================================================
// Tests
// ============================================================================

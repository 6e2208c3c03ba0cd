//! Lazy element locators.
//!
//! A [`Locator`] is a strategy, a value and a connection. Creating one
//! makes no remote call; every interaction resolves it afresh by polling
//! until the element is located, so locators survive UI rebuilds that would
//! leave an [`Element`] stale.
//!
//! # Timeouts
//!
//! Each resolution waits at most:
//!
//! 1. the per-call timeout ([`Locator::resolve_within`]), else
//! 2. the locator's own timeout ([`Locator::with_timeout`]), else
//! 3. the connection's registry element wait (10 000 ms by default).
//!
//! # Example
//!
//! ```ignore
//! use selenium_appium::{By, Connection};
//!
//! let seven = connection.locator(By::name("Seven"));
//! let plus = connection.locator(By::name("Plus"));
//! let result = connection
//!     .locator(By::accessibility_id("CalculatorResults"))
//!     .with_timeout(Duration::from_secs(2));
//!
//! seven.click().await?;
//! plus.click().await?;
//! seven.click().await?;
//! assert_eq!(result.text().await?, "Display is 14");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::driver::{Connection, effective_timeout};
use crate::error::Result;

use super::element::{Element, Rect};
use super::screenshot::Screenshot;
use super::selector::By;

// ============================================================================
// Locator
// ============================================================================

/// A lazily resolved element reference.
#[derive(Clone)]
pub struct Locator {
    by: By,
    connection: Connection,
    timeout: Option<Duration>,
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("by", &self.by)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.by.fmt(f)
    }
}

// ============================================================================
// Locator - Construction
// ============================================================================

impl Locator {
    /// Creates a locator. No remote call is made.
    #[inline]
    #[must_use]
    pub fn new(by: By, connection: Connection) -> Self {
        Self {
            by,
            connection,
            timeout: None,
        }
    }

    /// Creates a locator on the process-wide connection.
    #[inline]
    #[must_use]
    pub fn global(by: By) -> Self {
        Self::new(by, Connection::global().clone())
    }

    /// Overrides the registry element wait for this locator.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the selector.
    #[inline]
    #[must_use]
    pub fn by(&self) -> &By {
        &self.by
    }

    /// Returns the locator's own timeout, if set.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the connection the locator resolves against.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

// ============================================================================
// Locator - Resolution
// ============================================================================

impl Locator {
    /// Polls until the element is located.
    ///
    /// # Errors
    ///
    /// - [`Error::NoConnection`](crate::Error::NoConnection) if no session is attached
    /// - [`Error::ElementNotFound`](crate::Error::ElementNotFound) on timeout
    pub async fn resolve(&self) -> Result<Element> {
        self.resolve_within(None).await
    }

    /// Polls until the element is located, with a per-call timeout.
    ///
    /// # Errors
    ///
    /// See [`Locator::resolve`].
    pub async fn resolve_within(&self, timeout: Option<Duration>) -> Result<Element> {
        let driver = self.connection.driver()?;
        let timeout = effective_timeout(
            timeout,
            self.timeout,
            self.connection.timeouts().element_wait(),
        );

        debug!(by = %self.by, timeout_ms = timeout.as_millis() as u64, "Resolving locator");
        let id = driver.wait_until_located(&self.by, timeout).await?;
        Ok(Element::new(id, driver))
    }

    /// Checks presence with a single lookup, without waiting.
    ///
    /// Any error, including no connection, reads as absent.
    pub async fn exists(&self) -> bool {
        self.connection.find_element(&self.by).await.is_ok()
    }
}

// ============================================================================
// Locator - Interactions
// ============================================================================

impl Locator {
    /// Resolves, then clicks.
    pub async fn click(&self) -> Result<()> {
        self.resolve().await?.click().await
    }

    /// Resolves, then clears.
    pub async fn clear(&self) -> Result<()> {
        self.resolve().await?.clear().await
    }

    /// Resolves, then types text.
    pub async fn send_keys(&self, text: &str) -> Result<()> {
        self.resolve().await?.send_keys(text).await
    }

    /// Resolves, then submits.
    pub async fn submit(&self) -> Result<()> {
        self.resolve().await?.submit().await
    }

    /// Resolves, then reads the visible text.
    pub async fn text(&self) -> Result<String> {
        self.resolve().await?.text().await
    }

    /// Resolves, then reads an attribute.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.resolve().await?.attribute(name).await
    }

    /// Resolves, then reads a CSS property.
    pub async fn css_value(&self, name: &str) -> Result<String> {
        self.resolve().await?.css_value(name).await
    }

    /// Resolves, then reads the tag name.
    pub async fn tag_name(&self) -> Result<String> {
        self.resolve().await?.tag_name().await
    }

    /// Resolves, then reads position and size.
    pub async fn rect(&self) -> Result<Rect> {
        self.resolve().await?.rect().await
    }

    /// Resolves, then reads the top-left corner.
    pub async fn location(&self) -> Result<(f64, f64)> {
        self.resolve().await?.location().await
    }

    /// Resolves, then reads width and height.
    pub async fn size(&self) -> Result<(f64, f64)> {
        self.resolve().await?.size().await
    }

    /// Resolves, then checks visibility.
    pub async fn is_displayed(&self) -> Result<bool> {
        self.resolve().await?.is_displayed().await
    }

    /// Resolves, then checks enabled state.
    pub async fn is_enabled(&self) -> Result<bool> {
        self.resolve().await?.is_enabled().await
    }

    /// Resolves, then checks selected state.
    pub async fn is_selected(&self) -> Result<bool> {
        self.resolve().await?.is_selected().await
    }

    /// Resolves, then captures the element.
    pub async fn take_screenshot(&self) -> Result<Screenshot> {
        self.resolve().await?.take_screenshot().await
    }

    /// Resolves, then finds a descendant without waiting.
    pub async fn find_element(&self, by: &By) -> Result<Element> {
        self.resolve().await?.find_element(by).await
    }

    /// Resolves, then finds all matching descendants without waiting.
    pub async fn find_elements(&self, by: &By) -> Result<Vec<Element>> {
        self.resolve().await?.find_elements(by).await
    }

    /// Creates a locator for a descendant, resolved through this one.
    #[must_use]
    pub fn child(&self, by: By) -> ChildLocator {
        ChildLocator {
            parent: self.clone(),
            by,
        }
    }
}

// ============================================================================
// ChildLocator
// ============================================================================

/// A descendant of a lazily resolved element.
///
/// Resolving waits for the parent, then looks the child up once.
#[derive(Debug, Clone)]
pub struct ChildLocator {
    parent: Locator,
    by: By,
}

impl ChildLocator {
    /// Resolves the parent, then the child.
    pub async fn resolve(&self) -> Result<Element> {
        self.parent.find_element(&self.by).await
    }

    /// Resolves, then clicks.
    pub async fn click(&self) -> Result<()> {
        self.resolve().await?.click().await
    }

    /// Resolves, then reads the visible text.
    pub async fn text(&self) -> Result<String> {
        self.resolve().await?.text().await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use serde_json::json;

    use crate::driver::{Capabilities, TimeoutRegistry};
    use crate::error::Error;
    use crate::identifiers::ElementId;
    use crate::protocol::{Command, ElementCommand};
    use crate::testing::{MockDriver, MockFactory};
    use crate::transport::{RemoteDriver, SessionFactory};

    fn attached(timeouts: TimeoutRegistry) -> (Connection, Arc<MockDriver>) {
        let connection = Connection::from_parts(
            Arc::new(MockFactory::new()) as Arc<dyn SessionFactory>,
            timeouts,
            url::Url::parse("http://localhost:4723/wd/hub").expect("url"),
        );
        let driver = Arc::new(MockDriver::new());
        connection.attach(Arc::clone(&driver) as Arc<dyn RemoteDriver>);
        (connection, driver)
    }

    #[tokio::test]
    async fn test_construction_makes_no_remote_call() {
        let factory = Arc::new(MockFactory::new());
        let connection = Connection::with_factory(Arc::clone(&factory) as Arc<dyn SessionFactory>);
        connection
            .start(Capabilities::windows_app("App"))
            .await
            .expect("start");

        let _locator = connection
            .locator(By::name("Seven"))
            .with_timeout(Duration::from_secs(1));

        let driver = factory.last_driver().expect("driver");
        assert!(driver.commands().is_empty());
        assert!(driver.waits().is_empty());
    }

    #[tokio::test]
    async fn test_construction_without_connection() {
        let connection = Connection::with_factory(Arc::new(MockFactory::new()));
        let locator = connection.locator(By::name("Seven"));
        assert_eq!(locator.to_string(), "name=Seven");
        assert!(matches!(locator.click().await, Err(Error::NoConnection)));
        assert!(!locator.exists().await);
    }

    #[tokio::test]
    async fn test_click_polls_once_then_clicks() {
        let factory = Arc::new(MockFactory::new());
        let prepared = MockDriver::new();
        prepared.locate(&By::name("Seven"));
        factory.prepare(prepared);

        let connection = Connection::from_parts(
            Arc::clone(&factory) as Arc<dyn SessionFactory>,
            TimeoutRegistry::new(),
            url::Url::parse("http://localhost:4723/wd/hub").expect("url"),
        );
        connection
            .start(Capabilities::windows_app(
                "Microsoft.WindowsCalculator_8wekyb3d8bbwe!App",
            ))
            .await
            .expect("start");
        let driver = factory.last_driver().expect("driver");

        connection.locator(By::name("Seven")).click().await.expect("click");

        let requests = factory.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0.get_str("platformName"), Some("windows"));
        assert_eq!(driver.waits(), vec![(By::name("Seven"), Duration::from_millis(10_000))]);
        assert_eq!(driver.count("findElement"), 1);
        assert_eq!(
            driver.commands().last(),
            Some(&Command::Element(ElementCommand::Click {
                element_id: ElementId::new("name=Seven"),
            }))
        );
    }

    #[tokio::test]
    async fn test_every_interaction_resolves_again() {
        let (connection, driver) = attached(TimeoutRegistry::new());
        driver.locate(&By::accessibility_id("CalculatorResults"));
        driver.respond("getElementText", json!("Display is 7"));

        let result = connection.locator(By::accessibility_id("CalculatorResults"));
        result.text().await.expect("first");
        result.text().await.expect("second");

        assert_eq!(driver.waits().len(), 2);
        assert_eq!(driver.find_count(&By::accessibility_id("CalculatorResults")), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_precedence() {
        let registry = TimeoutRegistry::with_values(3000, 30_000);
        let (connection, driver) = attached(registry);
        let by = By::name("Missing");

        let plain = connection.locator(by.clone());
        let tuned = connection.locator(by.clone()).with_timeout(Duration::from_millis(2000));

        assert!(plain.resolve().await.is_err());
        assert!(tuned.resolve().await.is_err());
        assert!(tuned.resolve_within(Some(Duration::from_millis(1000))).await.is_err());

        let timeouts: Vec<u64> = driver
            .waits()
            .into_iter()
            .map(|(_, t)| t.as_millis() as u64)
            .collect();
        assert_eq!(timeouts, vec![3000, 2000, 1000]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_registry_change_applies_to_next_resolution() {
        let registry = TimeoutRegistry::new();
        let (connection, driver) = attached(registry.clone());
        let locator = connection.locator(By::name("Missing"));

        registry.set_element_wait_timeout(500);
        let err = locator.resolve().await.unwrap_err();

        assert!(matches!(err, Error::ElementNotFound { timeout_ms: 500, .. }));
        assert_eq!(driver.waits()[0].1, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_names_locator() {
        let (connection, _driver) = attached(TimeoutRegistry::with_values(100, 100));

        let err = connection
            .locator(By::xpath("//Button[@Name='Eight']"))
            .click()
            .await
            .unwrap_err();

        match err {
            Error::ElementNotFound { strategy, value, timeout_ms } => {
                assert_eq!(strategy, "xpath");
                assert_eq!(value, "//Button[@Name='Eight']");
                assert_eq!(timeout_ms, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_exists_does_not_wait() {
        let (connection, driver) = attached(TimeoutRegistry::new());
        driver.locate(&By::name("Plus"));

        assert!(connection.locator(By::name("Plus")).exists().await);
        assert!(!connection.locator(By::name("Minus")).exists().await);
        assert!(driver.waits().is_empty());
    }

    #[tokio::test]
    async fn test_child_locator() {
        let (connection, driver) = attached(TimeoutRegistry::new());
        driver.locate(&By::accessibility_id("NumberPad"));
        driver.locate(&By::name("Seven"));

        connection
            .locator(By::accessibility_id("NumberPad"))
            .child(By::name("Seven"))
            .click()
            .await
            .expect("click");

        assert_eq!(
            driver.command_names(),
            vec!["findElement", "findElement", "elementClick"]
        );
    }
}

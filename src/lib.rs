//! Selenium/Appium client automation layer.
//!
//! This library sits between UI test code and a remote WebDriver server
//! (Appium, WinAppDriver, Selenium). It owns the session lifecycle, resolves
//! elements lazily with polling waits, and models screens as page objects
//! with readiness checks.
//!
//! # Architecture
//!
//! ```text
//! test code ──► PageObject ──► Locator ──► Connection ──► RemoteDriver ──HTTP──► server
//!                   │             │             │
//!                   └─────────────┴──► TimeoutRegistry (element / page waits)
//! ```
//!
//! Key design principles:
//!
//! - A [`Connection`] holds zero or one live session and can be restarted
//! - A [`Locator`] never touches the server until an interaction runs
//! - Every interaction re-resolves its element
//! - Waits resolve as per-call, then per-instance, then registry default
//!
//! # Quick Start
//!
//! ```no_run
//! use selenium_appium::{By, Capabilities, Connection, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let connection = Connection::builder()
//!         .url("http://127.0.0.1:4723/wd/hub")
//!         .element_wait_timeout(5_000)
//!         .build()?;
//!
//!     connection
//!         .start(Capabilities::windows_app(
//!             "Microsoft.WindowsCalculator_8wekyb3d8bbwe!App",
//!         ))
//!         .await?;
//!
//!     connection.locator(By::name("Seven")).click().await?;
//!     let result = connection
//!         .locator(By::accessibility_id("CalculatorResults"))
//!         .text()
//!         .await?;
//!     println!("Display: {result}");
//!
//!     connection.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`driver`] | [`Connection`], [`Capabilities`], [`TimeoutRegistry`], mobile extensions |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`page`] | [`PageObject`], [`PageState`], [`ReadyCondition`] |
//! | [`protocol`] | WebDriver commands and responses (internal) |
//! | [`transport`] | [`RemoteDriver`] seam and HTTP implementation |
//! | [`ui`] | [`By`], [`Locator`], [`Element`] |

// ============================================================================
// Modules
// ============================================================================

/// Connection lifecycle and configuration.
///
/// Use [`Connection::builder()`] to create a configured connection.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for remote entities.
pub mod identifiers;

/// Page objects and readiness checks.
pub mod page;

/// WebDriver command and response types.
///
/// Internal module mapping commands to W3C endpoints.
pub mod protocol;

/// Remote driver seam and HTTP transport.
pub mod transport;

/// Selectors, lazy locators and element handles.
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Driver types
pub use driver::{
    Capabilities, Connection, ConnectionBuilder, MobileExtension, NetworkConnectionType,
    StopOutcome, TimeoutRegistry,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ElementId, SessionId};

// Page types
pub use page::{Page, PageObject, PageState, ReadyCondition};

// Protocol types
pub use protocol::{Command, CommandDefinition, Method};

// Transport types
pub use transport::{HttpRemoteDriver, HttpSessionFactory, RemoteDriver, SessionFactory};

// UI types
pub use ui::{By, ChildLocator, Element, Locator, Rect, Screenshot, Strategy};

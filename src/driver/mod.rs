//! Connection lifecycle and configuration.
//!
//! This module provides the main entry point for UI automation.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Connection`] | Owns zero or one live remote session |
//! | [`ConnectionBuilder`] | Fluent configuration builder |
//! | [`Capabilities`] | Session capabilities payload |
//! | [`TimeoutRegistry`] | Default element and page waits |
//! | [`MobileExtension`] | Network connection commands for mobile sessions |
//!
//! # Example
//!
//! ```ignore
//! use selenium_appium::{By, Capabilities, Connection, Result};
//!
//! # async fn example() -> Result<()> {
//! let connection = Connection::builder()
//!     .url("http://localhost:4723/wd/hub")
//!     .build()?;
//!
//! connection
//!     .start(Capabilities::windows_app("Microsoft.WindowsCalculator_8wekyb3d8bbwe!App"))
//!     .await?;
//!
//! connection.locator(By::name("Seven")).click().await?;
//! connection.stop().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for connection configuration.
pub mod builder;

/// Session capabilities.
pub mod capabilities;

/// Core connection implementation.
pub mod connection;

/// Mobile JSON wire extensions.
pub mod extension;

/// Default wait timeouts.
pub mod timeouts;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ConnectionBuilder;
pub use capabilities::Capabilities;
pub use connection::{Connection, DEFAULT_SERVER_URL, StopOutcome};
pub use extension::{MobileExtension, NetworkConnectionType};
pub use timeouts::{
    DEFAULT_ELEMENT_WAIT_MS, DEFAULT_PAGE_WAIT_MS, TimeoutRegistry, effective_timeout,
};

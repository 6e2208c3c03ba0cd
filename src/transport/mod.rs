//! Remote end transport.
//!
//! This module handles communication between the local end (Rust) and the
//! remote end (Appium, WinAppDriver or any W3C WebDriver server).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Connection     │                              │  Appium /       │
//! │                 │        HTTP + JSON           │  WinAppDriver   │
//! │  SessionFactory │─────────────────────────────►│                 │
//! │  → RemoteDriver │      localhost:4723          │  /wd/hub        │
//! │                 │                              │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Session Lifecycle
//!
//! 1. `SessionFactory::create_session` - POST capabilities, get a session ID
//! 2. `RemoteDriver::execute` - Send commands under `/session/{id}`
//! 3. `RemoteDriver::quit` - DELETE the session
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `driver` | `RemoteDriver` and `SessionFactory` traits, element polling |
//! | `http` | reqwest-based implementation |

// ============================================================================
// Submodules
// ============================================================================

/// Remote driver and session factory traits.
pub mod driver;

/// HTTP implementation of the remote driver.
pub mod http;

// ============================================================================
// Re-exports
// ============================================================================

pub use driver::{DEFAULT_POLL_INTERVAL, RemoteDriver, SessionFactory, poll_until_located};
pub use http::{DEFAULT_COMMAND_TIMEOUT, DEFAULT_SESSION_TIMEOUT, HttpRemoteDriver, HttpSessionFactory};

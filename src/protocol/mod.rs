//! Remote protocol message types.
//!
//! This module defines the commands sent to a WebDriver/Appium endpoint and
//! the parsing of its responses. The HTTP exchange itself lives in
//! [`transport`](crate::transport).
//!
//! # Protocol Overview
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Command`] | A standard endpoint or a registered custom command |
//! | [`CommandRegistry`] | Runtime `(name, method, path template)` definitions |
//! | [`Envelope`] | W3C / JSON wire response body |
//!
//! # Paths
//!
//! Standard commands are routed below `/session/{sessionId}`. Custom
//! commands carry absolute templates such as
//! `/session/:sessionId/network_connection`.

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by endpoint group.
pub mod command;

/// Custom command registry and path templates.
pub mod registry;

/// Response envelope parsing.
pub mod response;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{
    Command, DocumentCommand, ElementCommand, Method, NavigationCommand, SessionCommand,
    WindowCommand,
};
pub use registry::{CommandDefinition, CommandRegistry, ResolvedCommand};
pub use response::{Envelope, NewSession};

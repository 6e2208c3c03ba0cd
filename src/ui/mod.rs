//! Element selection and interaction.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`By`] | Strategy plus value |
//! | [`Locator`] | Lazy locator, re-resolved on every interaction |
//! | [`Element`] | Resolved remote element reference |
//! | [`Screenshot`] | Decoded screenshot bytes |

// ============================================================================
// Submodules
// ============================================================================

/// Resolved element handles.
pub mod element;

/// Lazy locators.
pub mod locator;

/// Screenshot decoding.
pub mod screenshot;

/// Locator strategies.
pub mod selector;

// ============================================================================
// Re-exports
// ============================================================================

pub use element::{Element, Rect};
pub use locator::{ChildLocator, Locator};
pub use screenshot::Screenshot;
pub use selector::{By, Strategy};

//! Page objects and readiness.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PageObject`] | Trait implemented by each screen |
//! | [`Page`] | Connection, wait override and state for one page |
//! | [`PageState`] | `Unverified`, `Ready` or `Failed` |
//! | [`ReadyCondition`] | One step of a readiness check |

// ============================================================================
// Submodules
// ============================================================================

/// Readiness conditions.
pub mod condition;

/// Page context and the page object trait.
pub mod object;

/// Readiness state.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use condition::{ReadyCondition, ReadyPredicate, Readiness};
pub use object::{Page, PageObject};
pub use state::PageState;

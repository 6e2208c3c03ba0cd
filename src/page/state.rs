//! Page readiness state.

use std::fmt;

// ============================================================================
// PageState
// ============================================================================

/// Outcome of the latest readiness check.
///
/// ```text
/// Unverified ──wait_until_ready()──► Ready
///      │                               │
///      └──────────────► Failed ◄───────┘
/// ```
///
/// Each `wait_until_ready` call evaluates again, so `Ready` and `Failed`
/// reflect only the most recent call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageState {
    /// Never checked.
    #[default]
    Unverified,
    /// Every readiness condition held.
    Ready,
    /// A readiness condition timed out or errored.
    Failed,
}

impl PageState {
    /// Returns `true` if the last check succeeded.
    #[inline]
    #[must_use]
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unverified => "unverified",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Tests
// ============================================================================

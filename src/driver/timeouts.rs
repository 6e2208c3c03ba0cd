//! Default wait timeouts.
//!
//! Two values control how long the crate waits by default:
//!
//! | Timeout | Default | Used by |
//! |---------|---------|---------|
//! | Element wait | 10 000 ms | [`Locator`](crate::Locator) interactions |
//! | Page wait | 30 000 ms | [`PageObject::wait_until_ready`](crate::PageObject::wait_until_ready) |
//!
//! A [`TimeoutRegistry`] is shared by cloning; every clone sees updates.
//! [`TimeoutRegistry::global`] is the process-wide instance new connections
//! use unless given their own.
//!
//! Explicit timeouts always win over registry values:
//! per-call > per-instance > registry. See [`effective_timeout`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use tracing::debug;

// ============================================================================
// Constants
// ============================================================================

/// Default element wait in milliseconds.
pub const DEFAULT_ELEMENT_WAIT_MS: u64 = 10_000;

/// Default page wait in milliseconds.
pub const DEFAULT_PAGE_WAIT_MS: u64 = 30_000;

/// Process-wide registry.
static GLOBAL: LazyLock<TimeoutRegistry> = LazyLock::new(TimeoutRegistry::new);

// ============================================================================
// TimeoutRegistry
// ============================================================================

/// Shared, mutable default timeouts.
///
/// Values are read at the moment a wait starts, so changing them affects
/// later waits only.
#[derive(Clone)]
pub struct TimeoutRegistry {
    inner: Arc<TimeoutRegistryInner>,
}

struct TimeoutRegistryInner {
    element_wait_ms: AtomicU64,
    page_wait_ms: AtomicU64,
}

impl fmt::Debug for TimeoutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutRegistry")
            .field("element_wait_ms", &self.element_wait_timeout())
            .field("page_wait_ms", &self.page_wait_timeout())
            .finish()
    }
}

impl Default for TimeoutRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeoutRegistry {
    /// Creates a registry with the default values.
    #[must_use]
    pub fn new() -> Self {
        Self::with_values(DEFAULT_ELEMENT_WAIT_MS, DEFAULT_PAGE_WAIT_MS)
    }

    /// Creates a registry with explicit values in milliseconds.
    #[must_use]
    pub fn with_values(element_wait_ms: u64, page_wait_ms: u64) -> Self {
        Self {
            inner: Arc::new(TimeoutRegistryInner {
                element_wait_ms: AtomicU64::new(element_wait_ms),
                page_wait_ms: AtomicU64::new(page_wait_ms),
            }),
        }
    }

    /// Returns the process-wide registry.
    #[inline]
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the element wait in milliseconds.
    #[inline]
    #[must_use]
    pub fn element_wait_timeout(&self) -> u64 {
        self.inner.element_wait_ms.load(Ordering::Relaxed)
    }

    /// Sets the element wait in milliseconds.
    pub fn set_element_wait_timeout(&self, ms: u64) {
        debug!(ms, "Element wait timeout set");
        self.inner.element_wait_ms.store(ms, Ordering::Relaxed);
    }

    /// Returns the page wait in milliseconds.
    #[inline]
    #[must_use]
    pub fn page_wait_timeout(&self) -> u64 {
        self.inner.page_wait_ms.load(Ordering::Relaxed)
    }

    /// Sets the page wait in milliseconds.
    pub fn set_page_wait_timeout(&self, ms: u64) {
        debug!(ms, "Page wait timeout set");
        self.inner.page_wait_ms.store(ms, Ordering::Relaxed);
    }

    /// Returns the element wait as a [`Duration`].
    #[inline]
    #[must_use]
    pub fn element_wait(&self) -> Duration {
        Duration::from_millis(self.element_wait_timeout())
    }

    /// Returns the page wait as a [`Duration`].
    #[inline]
    #[must_use]
    pub fn page_wait(&self) -> Duration {
        Duration::from_millis(self.page_wait_timeout())
    }

    /// Restores both defaults.
    pub fn reset(&self) {
        self.set_element_wait_timeout(DEFAULT_ELEMENT_WAIT_MS);
        self.set_page_wait_timeout(DEFAULT_PAGE_WAIT_MS);
    }
}

// ============================================================================
// Precedence
// ============================================================================

/// Picks the timeout for a wait: per-call, then per-instance, then registry.
#[inline]
#[must_use]
pub fn effective_timeout(
    call: Option<Duration>,
    instance: Option<Duration>,
    registry: Duration,
) -> Duration {
    call.or(instance).unwrap_or(registry)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let registry = TimeoutRegistry::new();
        assert_eq!(registry.element_wait_timeout(), 10_000);
        assert_eq!(registry.page_wait_timeout(), 30_000);
        assert_eq!(registry.element_wait(), Duration::from_secs(10));
        assert_eq!(registry.page_wait(), Duration::from_secs(30));
    }

    #[test]
    fn test_short_waits_read_back() {
        let registry = TimeoutRegistry::new();

        registry.set_element_wait_timeout(100);
        registry.set_page_wait_timeout(100);

        assert_eq!(registry.element_wait_timeout(), 100);
        assert_eq!(registry.page_wait_timeout(), 100);
        assert_eq!(registry.element_wait(), Duration::from_millis(100));
    }

    #[test]
    fn test_get_after_set() {
        let registry = TimeoutRegistry::new();

        registry.set_element_wait_timeout(5000);
        assert_eq!(registry.element_wait_timeout(), 5000);
        assert_eq!(registry.page_wait_timeout(), 30_000);

        registry.set_page_wait_timeout(0);
        assert_eq!(registry.page_wait_timeout(), 0);
    }

    #[test]
    fn test_clones_share_values() {
        let registry = TimeoutRegistry::new();
        let clone = registry.clone();

        clone.set_element_wait_timeout(1);
        assert_eq!(registry.element_wait_timeout(), 1);

        registry.reset();
        assert_eq!(clone.element_wait_timeout(), DEFAULT_ELEMENT_WAIT_MS);
    }

    #[test]
    fn test_independent_registries() {
        let a = TimeoutRegistry::with_values(1, 2);
        let b = TimeoutRegistry::new();

        a.set_page_wait_timeout(3);
        assert_eq!(b.page_wait_timeout(), DEFAULT_PAGE_WAIT_MS);
    }

    #[test]
    fn test_effective_timeout_order() {
        let call = Some(Duration::from_millis(1));
        let instance = Some(Duration::from_millis(2));
        let registry = Duration::from_millis(3);

        assert_eq!(effective_timeout(call, instance, registry), Duration::from_millis(1));
        assert_eq!(effective_timeout(None, instance, registry), Duration::from_millis(2));
        assert_eq!(effective_timeout(None, None, registry), Duration::from_millis(3));
    }

    proptest! {
        #[test]
        fn prop_effective_timeout_prefers_most_specific(
            call in proptest::option::of(0u64..100_000),
            instance in proptest::option::of(0u64..100_000),
            registry in 0u64..100_000,
        ) {
            let picked = effective_timeout(
                call.map(Duration::from_millis),
                instance.map(Duration::from_millis),
                Duration::from_millis(registry),
            );
            let expected = call.or(instance).unwrap_or(registry);
            prop_assert_eq!(picked, Duration::from_millis(expected));
        }

        #[test]
        fn prop_set_then_get(ms in any::<u64>()) {
            let registry = TimeoutRegistry::new();
            registry.set_element_wait_timeout(ms);
            registry.set_page_wait_timeout(ms);
            prop_assert_eq!(registry.element_wait_timeout(), ms);
            prop_assert_eq!(registry.page_wait_timeout(), ms);
        }
    }
}

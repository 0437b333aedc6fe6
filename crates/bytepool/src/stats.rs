//! Atomic pool statistics for lock-free usage tracking.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Statistics for pool usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Acquisitions served from a class's free store.
    pub hits: u64,
    /// Acquisitions that had to allocate a new class-sized block.
    pub misses: u64,
    /// Acquisitions above the maximum size, served by an unpoolable block.
    pub oversized: u64,
    /// Blocks accepted back into a class.
    pub released: u64,
    /// Releases refused because the block fits no class.
    pub rejected: u64,
    /// Legal releases dropped because the class store was full.
    pub evictions: u64,
}

impl PoolStats {
    /// Fraction of class acquisitions served from the pool.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Atomic pool statistics for lock-free updates.
pub(crate) struct AtomicPoolStats {
    hits: AtomicU64,
    misses: AtomicU64,
    oversized: AtomicU64,
    released: AtomicU64,
    rejected: AtomicU64,
    evictions: AtomicU64,
}

impl AtomicPoolStats {
    pub(crate) fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            oversized: AtomicU64::new(0),
            released: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub(crate) fn snapshot(&self) -> PoolStats {
        PoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            oversized: self.oversized.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.oversized.store(0, Ordering::Relaxed);
        self.released.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_oversized(&self) {
        self.oversized.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_released(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for AtomicPoolStats {
    fn default() -> Self {
        Self::new()
    }
}

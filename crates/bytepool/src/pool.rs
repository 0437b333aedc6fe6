//! Byte pool with power-of-two size classes for block reuse.

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::block::ByteBlock;
use crate::class::{class_capacities, doubling_index};
use crate::config::PoolConfig;
use crate::stats::{AtomicPoolStats, PoolStats};

/// Free blocks of one fixed capacity.
struct SizeClass {
    capacity: usize,
    free: Mutex<Vec<Box<[u8]>>>,
}

impl SizeClass {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            free: Mutex::new(Vec::new()),
        }
    }
}

/// Pool of byte blocks, organized by size class (power of 2).
///
/// Class `i` holds blocks of `min_size << i` bytes while that is below
/// `max_size`; a terminal class holds blocks of exactly `max_size`. The
/// layout is fixed at construction. Acquire and release are safe to call
/// concurrently from any number of threads.
pub struct SizeClassPool {
    classes: Vec<SizeClass>,
    min_size: usize,
    max_size: usize,
    last_index: usize,
    max_per_class: usize,
    stats: AtomicPoolStats,
}

impl SizeClassPool {
    /// Create a pool for the given bounds.
    ///
    /// `min_size` is raised to at least 2 and `max_size` to at least
    /// `min_size`.
    #[must_use]
    pub fn new(min_size: usize, max_size: usize) -> Self {
        Self::from_config(&PoolConfig::new(min_size, max_size))
    }

    /// Create a pool from a [`PoolConfig`].
    #[must_use]
    pub fn from_config(config: &PoolConfig) -> Self {
        let config = config.normalize();
        let classes: Vec<SizeClass> = class_capacities(config.min_size, config.max_size)
            .into_iter()
            .map(SizeClass::new)
            .collect();
        debug!(
            min_size = config.min_size,
            max_size = config.max_size,
            classes = classes.len(),
            "size-class pool created"
        );
        Self {
            last_index: classes.len() - 1,
            classes,
            min_size: config.min_size,
            max_size: config.max_size,
            max_per_class: config.max_per_class,
            stats: AtomicPoolStats::new(),
        }
    }

    /// Capacity of the smallest class.
    #[must_use]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Capacity of the terminal class.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Capacities of all classes, ascending.
    #[must_use]
    pub fn class_capacities(&self) -> Vec<usize> {
        self.classes.iter().map(|c| c.capacity).collect()
    }

    /// Capacity of the class that serves `size`, or `None` above `max_size`.
    #[must_use]
    pub fn class_for(&self, size: usize) -> Option<usize> {
        self.class_index(size).map(|i| self.classes[i].capacity)
    }

    fn class_index(&self, size: usize) -> Option<usize> {
        if size <= self.min_size {
            return Some(0);
        }
        if size == self.max_size {
            return Some(self.last_index);
        }
        if size > self.max_size {
            return None;
        }
        Some(doubling_index(size, self.min_size).min(self.last_index))
    }

    /// Block of length `size`, with the capacity of the class serving `size`.
    ///
    /// The contents are whatever a previous user left behind; they are not
    /// zeroed. Sizes above `max_size` get a fresh block of exactly `size`
    /// bytes that belongs to no class and will be refused by [`release`].
    ///
    /// [`release`]: SizeClassPool::release
    pub fn acquire_exact(&self, size: usize) -> ByteBlock {
        let Some(index) = self.class_index(size) else {
            self.stats.record_oversized();
            trace!(size, max_size = self.max_size, "oversized acquire bypasses pool");
            let mut block = ByteBlock::alloc(size);
            block.set_len(size);
            return block;
        };
        let mut block = self.take(index);
        block.set_len(size);
        block
    }

    /// Empty block ready for appends, with room for at least `size` bytes.
    pub fn acquire_empty(&self, size: usize) -> ByteBlock {
        let mut block = self.acquire_exact(size);
        block.clear();
        block
    }

    /// Empty block from the terminal class.
    pub fn acquire_max(&self) -> ByteBlock {
        self.acquire_empty(self.max_size)
    }

    /// Empty block from the smallest class.
    pub fn acquire_min(&self) -> ByteBlock {
        self.acquire_empty(self.min_size)
    }

    /// Full-length block from the terminal class.
    pub fn acquire_exact_max(&self) -> ByteBlock {
        self.acquire_exact(self.max_size)
    }

    /// Full-length block from the smallest class.
    pub fn acquire_exact_min(&self) -> ByteBlock {
        self.acquire_exact(self.min_size)
    }

    fn take(&self, index: usize) -> ByteBlock {
        let class = &self.classes[index];
        if let Some(storage) = class.free.lock().pop() {
            self.stats.record_hit();
            return ByteBlock::from_storage(storage, 0);
        }
        self.stats.record_miss();
        ByteBlock::alloc(class.capacity)
    }

    /// Return a block to the class matching its capacity.
    ///
    /// Returns `false` and drops the block when its capacity is zero, above
    /// `max_size`, or not exactly a class capacity. A legal block offered to a
    /// full class is accepted and dropped.
    pub fn release(&self, block: ByteBlock) -> bool {
        let capacity = block.capacity();
        let class = match self.class_index(capacity) {
            Some(index) if capacity != 0 && self.classes[index].capacity == capacity => {
                &self.classes[index]
            }
            _ => {
                self.stats.record_rejected();
                trace!(capacity, "release rejected: not a class capacity");
                return false;
            }
        };

        let mut free = class.free.lock();
        if free.len() < self.max_per_class {
            free.push(block.into_storage());
            self.stats.record_released();
        } else {
            drop(free);
            self.stats.record_eviction();
            trace!(capacity, "release dropped: class full");
        }
        true
    }

    /// Pre-populate the class serving `size` up to `count` free blocks.
    pub fn warm(&self, size: usize, count: usize) {
        let Some(index) = self.class_index(size) else {
            return;
        };
        let class = &self.classes[index];
        let mut free = class.free.lock();
        let to_add = count
            .saturating_sub(free.len())
            .min(self.max_per_class.saturating_sub(free.len()));
        for _ in 0..to_add {
            free.push(vec![0u8; class.capacity].into_boxed_slice());
        }
    }

    /// Total free blocks across all classes.
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.classes.iter().map(|c| c.free.lock().len()).sum()
    }

    /// Free blocks held by the class serving `size`.
    #[must_use]
    pub fn pooled_in_class(&self, size: usize) -> usize {
        self.class_index(size)
            .map_or(0, |i| self.classes[i].free.lock().len())
    }

    /// Drop every free block.
    pub fn clear(&self) {
        for class in &self.classes {
            class.free.lock().clear();
        }
    }

    /// Get a snapshot of pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.stats.snapshot()
    }

    /// Reset pool statistics counters.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }
}

impl Default for SizeClassPool {
    fn default() -> Self {
        Self::from_config(&PoolConfig::default())
    }
}

impl std::fmt::Debug for SizeClassPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeClassPool")
            .field("min_size", &self.min_size)
            .field("max_size", &self.max_size)
            .field("classes", &self.classes.len())
            .finish_non_exhaustive()
    }
}

//! Process-wide default pool and convenience entry points.
//!
//! The default pool starts with [`DEFAULT_MIN_SIZE`] and [`DEFAULT_MAX_SIZE`]
//! and can be swapped wholesale with [`reinitialize_default`] or
//! [`install_default`]. Blocks acquired from a replaced pool are still
//! released to whichever pool is the default at release time; they are
//! accepted only if their capacity is a class of that pool.

use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::block::ByteBlock;
use crate::config::{DEFAULT_MAX_SIZE, DEFAULT_MIN_SIZE};
use crate::pool::SizeClassPool;

static DEFAULT_POOL: LazyLock<RwLock<Arc<SizeClassPool>>> = LazyLock::new(|| {
    RwLock::new(Arc::new(SizeClassPool::new(
        DEFAULT_MIN_SIZE,
        DEFAULT_MAX_SIZE,
    )))
});

/// Handle to the current default pool.
#[must_use]
pub fn default_pool() -> Arc<SizeClassPool> {
    Arc::clone(&DEFAULT_POOL.read())
}

/// Replace the default pool with a fresh one for the given bounds.
pub fn reinitialize_default(min_size: usize, max_size: usize) -> Arc<SizeClassPool> {
    let pool = Arc::new(SizeClassPool::new(min_size, max_size));
    install_default(Arc::clone(&pool));
    pool
}

/// Make `pool` the default, returning the previous default.
pub fn install_default(pool: Arc<SizeClassPool>) -> Arc<SizeClassPool> {
    debug!(
        min_size = pool.min_size(),
        max_size = pool.max_size(),
        "default pool replaced"
    );
    std::mem::replace(&mut *DEFAULT_POOL.write(), pool)
}

/// [`SizeClassPool::acquire_exact`] on the default pool.
pub fn acquire_exact(size: usize) -> ByteBlock {
    DEFAULT_POOL.read().acquire_exact(size)
}

/// [`SizeClassPool::acquire_empty`] on the default pool.
pub fn acquire_empty(size: usize) -> ByteBlock {
    DEFAULT_POOL.read().acquire_empty(size)
}

/// [`SizeClassPool::acquire_max`] on the default pool.
pub fn acquire_max() -> ByteBlock {
    DEFAULT_POOL.read().acquire_max()
}

/// [`SizeClassPool::acquire_min`] on the default pool.
pub fn acquire_min() -> ByteBlock {
    DEFAULT_POOL.read().acquire_min()
}

/// [`SizeClassPool::acquire_exact_max`] on the default pool.
pub fn acquire_exact_max() -> ByteBlock {
    DEFAULT_POOL.read().acquire_exact_max()
}

/// [`SizeClassPool::acquire_exact_min`] on the default pool.
pub fn acquire_exact_min() -> ByteBlock {
    DEFAULT_POOL.read().acquire_exact_min()
}

/// [`SizeClassPool::release`] on the default pool.
pub fn release(block: ByteBlock) -> bool {
    DEFAULT_POOL.read().release(block)
}

//! Process-wide default buffer pool and convenience entry points.
//!
//! The default buffer pool sits on top of [`bytepool::default_pool`]. When
//! that pool is replaced, the next call here builds a new buffer pool over
//! the replacement.

use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::buffer::Buffer;
use crate::pool::BufferPool;

static DEFAULT_BUFFERS: LazyLock<RwLock<Arc<BufferPool>>> =
    LazyLock::new(|| RwLock::new(Arc::new(BufferPool::new(bytepool::default_pool()))));

/// Handle to the default buffer pool, tracking the current default byte pool.
#[must_use]
pub fn default_buffer_pool() -> Arc<BufferPool> {
    let bytes = bytepool::default_pool();
    {
        let current = DEFAULT_BUFFERS.read();
        if Arc::ptr_eq(current.bytes_pool(), &bytes) {
            return Arc::clone(&current);
        }
    }
    let mut current = DEFAULT_BUFFERS.write();
    if !Arc::ptr_eq(current.bytes_pool(), &bytes) {
        *current = Arc::new(BufferPool::new(bytes));
    }
    Arc::clone(&current)
}

/// Replace the default byte pool and the buffer pool over it.
pub fn reinitialize_default(min_size: usize, max_size: usize) -> Arc<BufferPool> {
    bytepool::reinitialize_default(min_size, max_size);
    default_buffer_pool()
}

/// [`BufferPool::get`] on the default buffer pool.
pub fn get() -> Buffer {
    default_buffer_pool().get()
}

/// [`BufferPool::make`] on the default buffer pool.
pub fn make(capacity: usize) -> Buffer {
    default_buffer_pool().make(capacity)
}

/// [`BufferPool::release`] on the default buffer pool.
pub fn release(buf: Buffer) -> bool {
    default_buffer_pool().release(buf)
}

/// [`BufferPool::put`] on the default buffer pool.
pub fn put(buf: Buffer) {
    default_buffer_pool().put(buf);
}

/// [`BufferPool::clone_buffer`] on the default buffer pool.
pub fn clone(src: &Buffer) -> Buffer {
    default_buffer_pool().clone_buffer(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_tracks_default_bytes() {
        let a = default_buffer_pool();
        assert!(Arc::ptr_eq(a.bytes_pool(), &bytepool::default_pool()));
        assert!(Arc::ptr_eq(&a, &default_buffer_pool()));
    }

    #[test]
    fn convenience_round_trip() {
        let mut buf = get();
        buf.write_string("hello");
        let dup = clone(&buf);
        assert_eq!(dup.bytes(), b"hello");
        assert!(release(dup));
        put(buf);
        let fresh = make(10);
        assert!(fresh.capacity() >= 10);
        assert!(fresh.is_empty());
    }
}

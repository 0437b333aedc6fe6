//! Pool of reusable [`Buffer`] wrappers.

use std::sync::Arc;

use bytepool::{ByteBlock, SizeClassPool};
use parking_lot::Mutex;

use crate::buffer::Buffer;

/// Capacity of buffers handed out by [`BufferPool::get`].
pub const DEFAULT_BUFFER_SIZE: usize = 64;
/// Default bound on parked wrappers.
pub const DEFAULT_MAX_IDLE: usize = 1024;

/// Recycles [`Buffer`] wrappers on top of a [`SizeClassPool`].
///
/// Wrappers and their memory are pooled separately: a released buffer's
/// block goes back to the size-class pool, and the emptied wrapper is parked
/// here for the next [`get`](BufferPool::get) or [`make`](BufferPool::make).
/// Parked wrappers hold no reference back to this pool.
pub struct BufferPool {
    bytes: Arc<SizeClassPool>,
    idle: Mutex<Vec<Buffer>>,
    default_size: usize,
    max_idle: usize,
}

impl BufferPool {
    /// A buffer pool over `bytes` with default limits.
    #[must_use]
    pub fn new(bytes: Arc<SizeClassPool>) -> Self {
        Self::with_limits(bytes, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_IDLE)
    }

    /// A buffer pool with a custom initial capacity and idle bound.
    #[must_use]
    pub fn with_limits(bytes: Arc<SizeClassPool>, default_size: usize, max_idle: usize) -> Self {
        Self {
            bytes,
            idle: Mutex::new(Vec::new()),
            default_size,
            max_idle,
        }
    }

    /// The size-class pool backing buffer memory.
    #[must_use]
    pub fn bytes_pool(&self) -> &Arc<SizeClassPool> {
        &self.bytes
    }

    /// Number of parked wrappers.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    /// Empty buffer with the default initial capacity.
    pub fn get(self: &Arc<Self>) -> Buffer {
        self.make(self.default_size)
    }

    /// Empty buffer with room for at least `capacity` bytes.
    pub fn make(self: &Arc<Self>, capacity: usize) -> Buffer {
        let block = self.bytes.acquire_empty(capacity);
        let parked = self.idle.lock().pop();
        let mut buf = parked.unwrap_or_else(|| Buffer::with_pool(Arc::clone(&self.bytes)));
        buf.replace_block(block);
        buf.bytes = Arc::clone(&self.bytes);
        buf.home = Some(Arc::clone(self));
        buf.ref_reset();
        buf
    }

    /// Buffer holding a copy of `src`, with a fresh reference delta.
    pub fn clone_buffer(self: &Arc<Self>, src: &Buffer) -> Buffer {
        let mut buf = self.make(src.len());
        buf.write_bytes(src.bytes());
        buf
    }

    /// Return `buf`'s memory to its size-class pool and park the wrapper.
    ///
    /// Returns whether the memory was accepted. The wrapper is parked either
    /// way, unless the idle bound is reached.
    pub fn release(&self, mut buf: Buffer) -> bool {
        let block = buf.replace_block(ByteBlock::new());
        let accepted = buf.bytes.release(block);
        buf.home = None;
        buf.ref_reset();

        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(buf);
        }
        accepted
    }

    /// Same as [`release`](BufferPool::release), ignoring the outcome.
    pub fn put(&self, buf: Buffer) {
        let _ = self.release(buf);
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("bytes", &self.bytes)
            .field("idle", &self.idle())
            .field("default_size", &self.default_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffers(min: usize, max: usize) -> Arc<BufferPool> {
        Arc::new(BufferPool::new(Arc::new(SizeClassPool::new(min, max))))
    }

    #[test]
    fn get_has_default_capacity() {
        let pool = buffers(2, 8192);
        let buf = pool.get();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), DEFAULT_BUFFER_SIZE);
        assert_eq!(buf.ref_load(), 0);
    }

    #[test]
    fn make_rounds_to_class() {
        let pool = buffers(2, 8192);
        assert_eq!(pool.make(8).capacity(), 8);
        assert_eq!(pool.make(100).capacity(), 128);
    }

    #[test]
    fn release_recycles_wrapper_and_memory() {
        let pool = buffers(2, 8192);
        let mut buf = pool.get();
        buf.write_string("abc");
        let ptr = buf.block().as_ptr();
        assert!(buf.release());
        assert_eq!(pool.idle(), 1);
        assert_eq!(pool.bytes_pool().pooled_in_class(64), 1);

        let again = pool.get();
        assert_eq!(pool.idle(), 0);
        assert!(again.is_empty());
        assert_eq!(again.block().as_ptr(), ptr);
    }

    #[test]
    fn recycled_wrapper_has_fresh_refs() {
        let pool = buffers(2, 64);
        let buf = pool.get();
        buf.ref_add(5);
        pool.put(buf);
        assert_eq!(pool.get().ref_load(), 0);
    }

    #[test]
    fn release_reports_unpoolable_memory() {
        let pool = buffers(2, 64);
        let mut buf = pool.get();
        buf.write_bytes(&[1u8; 200]);
        assert!(!pool.release(buf));
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn close_follows_release() {
        let pool = buffers(2, 64);
        assert!(pool.get().close().is_ok());
        let mut big = pool.get();
        big.grow(500);
        assert!(big.close().is_err());
    }

    #[test]
    fn idle_bound() {
        let bytes = Arc::new(SizeClassPool::new(2, 64));
        let pool = Arc::new(BufferPool::with_limits(bytes, 16, 1));
        let a = pool.get();
        let b = pool.get();
        assert_eq!(a.capacity(), 16);
        pool.put(a);
        pool.put(b);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn clone_buffer_copies() {
        let pool = buffers(2, 64);
        let mut src = pool.get();
        src.write_string("copy me");
        src.ref_inc();
        let dup = pool.clone_buffer(&src);
        assert_eq!(dup.bytes(), b"copy me");
        assert_eq!(dup.ref_load(), 0);
        assert!(dup.release());
        assert!(src.release());
    }

    #[test]
    fn parked_wrappers_do_not_keep_pool_alive() {
        let pool = buffers(2, 64);
        let buf = pool.get();
        buf.put();
        assert_eq!(Arc::strong_count(&pool), 1);
    }
}

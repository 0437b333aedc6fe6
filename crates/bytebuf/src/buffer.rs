//! Growable byte buffer over pooled memory.

use std::fmt;
use std::io::{self, ErrorKind, Read, Write};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use bytepool::{ByteBlock, SizeClassPool};
use tracing::trace;

use crate::error::{fatal, BufferError, MAX_BUFFER_SIZE};
use crate::pool::BufferPool;
use crate::refs::RefGuard;

/// A growable byte buffer whose memory comes from a [`SizeClassPool`].
///
/// Growth swaps the backing block for a larger one from the pool and
/// returns the old block immediately, so no borrow of the old contents can
/// outlive a growing call. Mutation needs `&mut self`; holders sharing a
/// buffer through an [`Arc`] only get read access.
///
/// The reference delta is coordination state for shared holders: `0` means
/// one owner, and each additional holder increments it before taking the
/// buffer and decrements it when done. The pools do not check it. See
/// [`Buffer::release_shared`] for the release side.
///
/// Obtain buffers from a [`BufferPool`] (or the crate-level [`get`] and
/// [`make`]) and hand them back with [`Buffer::release`] when finished.
///
/// [`get`]: crate::get
/// [`make`]: crate::make
pub struct Buffer {
    block: ByteBlock,
    refs: AtomicI64,
    pub(crate) bytes: Arc<SizeClassPool>,
    pub(crate) home: Option<Arc<BufferPool>>,
}

impl Buffer {
    /// An empty, zero-capacity buffer that grows through the default pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_pool(bytepool::default_pool())
    }

    /// An empty, zero-capacity buffer that grows through `bytes`.
    #[must_use]
    pub fn with_pool(bytes: Arc<SizeClassPool>) -> Self {
        Self {
            block: ByteBlock::new(),
            refs: AtomicI64::new(0),
            bytes,
            home: None,
        }
    }

    /// An empty buffer with room for at least `capacity` bytes from `bytes`.
    #[must_use]
    pub fn with_capacity_in(capacity: usize, bytes: Arc<SizeClassPool>) -> Self {
        let block = bytes.acquire_empty(capacity);
        let mut buf = Self::with_pool(bytes);
        buf.block = block;
        buf
    }

    /// Swap in a new block, returning the old one.
    pub(crate) fn replace_block(&mut self, block: ByteBlock) -> ByteBlock {
        std::mem::replace(&mut self.block, block)
    }

    /// The backing block.
    #[must_use]
    pub fn block(&self) -> &ByteBlock {
        &self.block
    }

    /// The size-class pool this buffer grows through.
    #[must_use]
    pub fn bytes_pool(&self) -> &Arc<SizeClassPool> {
        &self.bytes
    }

    /// Current contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.block
    }

    /// Current contents, mutably.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.block
    }

    /// Owned copy of the contents, independent of pooled memory.
    #[must_use]
    pub fn copy_out(&self) -> Vec<u8> {
        self.block.to_vec()
    }

    /// Contents as UTF-8.
    pub fn as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.block)
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.block.len()
    }

    /// Whether the buffer holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    /// Capacity of the backing block.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    // ---------------------------------------------------------------
    // Growth
    // ---------------------------------------------------------------

    /// Ensure room for `n` more bytes without changing the length.
    ///
    /// # Panics
    ///
    /// Panics with [`BufferError::TooLarge`] if `len + n` exceeds
    /// [`MAX_BUFFER_SIZE`]. The contents are left untouched.
    #[track_caller]
    pub fn guarantee(&mut self, n: usize) {
        if let Err(err) = self.try_guarantee(n) {
            fatal(err);
        }
    }

    /// Like [`guarantee`](Buffer::guarantee), returning the error instead.
    pub fn try_guarantee(&mut self, n: usize) -> Result<(), BufferError> {
        let needed = self.checked_size(n)?;
        if self.block.capacity() < needed {
            self.regrow(needed);
        }
        Ok(())
    }

    /// Extend the length by `n`, growing first if needed.
    ///
    /// The revealed bytes are leftovers from earlier use of the memory and
    /// must be written through [`bytes_mut`](Buffer::bytes_mut) before they
    /// are meaningful.
    ///
    /// # Panics
    ///
    /// Panics with [`BufferError::TooLarge`] if `len + n` exceeds
    /// [`MAX_BUFFER_SIZE`].
    #[track_caller]
    pub fn grow(&mut self, n: usize) {
        if let Err(err) = self.try_grow(n) {
            fatal(err);
        }
    }

    /// Like [`grow`](Buffer::grow), returning the error instead.
    pub fn try_grow(&mut self, n: usize) -> Result<(), BufferError> {
        self.try_guarantee(n)?;
        let len = self.block.len() + n;
        self.block.set_len(len);
        Ok(())
    }

    fn checked_size(&self, n: usize) -> Result<usize, BufferError> {
        self.block
            .len()
            .checked_add(n)
            .filter(|&size| size <= MAX_BUFFER_SIZE)
            .ok_or(BufferError::TooLarge)
    }

    /// Room for an append of `n` bytes, doubling capacity when it runs out.
    #[track_caller]
    fn reserve(&mut self, n: usize) {
        if self.block.remaining() >= n {
            return;
        }
        let needed = match self.checked_size(n) {
            Ok(needed) => needed,
            Err(err) => fatal(err),
        };
        let doubled = self.block.capacity().saturating_mul(2).min(MAX_BUFFER_SIZE);
        self.regrow(needed.max(doubled));
    }

    /// Move the contents into a block of at least `capacity` bytes and hand
    /// the old block back to the pool.
    fn regrow(&mut self, capacity: usize) {
        let mut block = self.bytes.acquire_empty(capacity);
        block.extend_from_slice(&self.block);
        let old = self.replace_block(block);
        trace!(
            from = old.capacity(),
            to = self.block.capacity(),
            len = self.block.len(),
            "buffer grown"
        );
        self.bytes.release(old);
    }

    // ---------------------------------------------------------------
    // Writing
    // ---------------------------------------------------------------

    /// Append `p`.
    pub fn write_bytes(&mut self, p: &[u8]) {
        self.reserve(p.len());
        self.block.extend_from_slice(p);
    }

    /// Append one byte.
    pub fn write_byte(&mut self, b: u8) {
        self.reserve(1);
        self.block.push(b);
    }

    /// Append the UTF-8 bytes of `s`.
    pub fn write_string(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Replace the contents with `p`.
    pub fn set(&mut self, p: &[u8]) {
        self.block.clear();
        self.write_bytes(p);
    }

    /// Replace the contents with the UTF-8 bytes of `s`.
    pub fn set_string(&mut self, s: &str) {
        self.set(s.as_bytes());
    }

    // ---------------------------------------------------------------
    // Reading and I/O
    // ---------------------------------------------------------------

    /// Copy the start of the contents into `dst`; returns bytes copied.
    ///
    /// Does not consume: repeated calls copy the same prefix.
    pub fn read(&self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.block.len());
        dst[..n].copy_from_slice(&self.block[..n]);
        n
    }

    /// Append everything `source` yields until end of stream.
    ///
    /// Capacity doubles through the pool whenever the buffer fills, up to
    /// [`MAX_BUFFER_SIZE`]. Returns the number of bytes appended. On error,
    /// bytes read before the failure stay in the buffer; the count appended
    /// is `len()` after the call minus `len()` before it. Reaching the
    /// ceiling yields an error of kind [`ErrorKind::Other`] wrapping
    /// [`BufferError::TooLarge`].
    pub fn read_from<R: Read + ?Sized>(&mut self, source: &mut R) -> io::Result<usize> {
        self.read_from_capped(source, MAX_BUFFER_SIZE)
    }

    fn read_from_capped<R: Read + ?Sized>(
        &mut self,
        source: &mut R,
        ceiling: usize,
    ) -> io::Result<usize> {
        let start = self.block.len();
        loop {
            if self.block.remaining() == 0 {
                let capacity = self.block.capacity();
                if capacity >= ceiling {
                    trace!(appended = self.block.len() - start, "read_from hit size limit");
                    return Err(io::Error::other(BufferError::TooLarge));
                }
                let target = capacity
                    .saturating_mul(2)
                    .max(self.bytes.min_size())
                    .min(ceiling);
                self.regrow(target);
            }
            match source.read(self.block.spare_mut()) {
                Ok(0) => return Ok(self.block.len() - start),
                Ok(n) => {
                    let len = self.block.len() + n;
                    self.block.set_len(len);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }

    /// Write the whole contents to `sink`; returns bytes written.
    pub fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<usize> {
        sink.write_all(&self.block)?;
        Ok(self.block.len())
    }

    // ---------------------------------------------------------------
    // Truncation
    // ---------------------------------------------------------------

    /// Keep only the first `n` bytes.
    ///
    /// # Panics
    ///
    /// Panics with [`BufferError::Truncation`] if `n` exceeds the length.
    #[track_caller]
    pub fn truncate(&mut self, n: usize) {
        if let Err(err) = self.try_truncate(n) {
            fatal(err);
        }
    }

    /// Like [`truncate`](Buffer::truncate), returning the error instead.
    pub fn try_truncate(&mut self, n: usize) -> Result<(), BufferError> {
        if n > self.block.len() {
            return Err(BufferError::Truncation);
        }
        self.block.truncate(n);
        Ok(())
    }

    /// Drop all contents, keeping the capacity.
    pub fn reset(&mut self) {
        self.block.clear();
    }

    // ---------------------------------------------------------------
    // Reference delta
    // ---------------------------------------------------------------

    /// Add one holder.
    pub fn ref_inc(&self) {
        self.ref_add(1);
    }

    /// Remove one holder.
    pub fn ref_dec(&self) {
        self.ref_add(-1);
    }

    /// Add `delta` to the reference delta.
    pub fn ref_add(&self, delta: i64) {
        self.refs.fetch_add(delta, Ordering::AcqRel);
    }

    /// Overwrite the reference delta.
    pub fn ref_store(&self, val: i64) {
        self.refs.store(val, Ordering::Release);
    }

    /// Current reference delta.
    #[must_use]
    pub fn ref_load(&self) -> i64 {
        self.refs.load(Ordering::Acquire)
    }

    /// Decrement and return the value before the decrement.
    ///
    /// The caller that sees `0` (or less) was the last holder.
    pub fn ref_swap_dec(&self) -> i64 {
        self.refs.fetch_sub(1, Ordering::AcqRel)
    }

    /// Back to a single owner.
    pub fn ref_reset(&self) {
        self.ref_store(0);
    }

    /// Hold an extra reference until the guard drops.
    pub fn ref_guard(&self) -> RefGuard<'_> {
        RefGuard::new(self)
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Return the memory to the size-class pool and the wrapper to its
    /// buffer pool, if it came from one.
    ///
    /// Returns `false` when the memory fits no class; it is then simply
    /// dropped.
    pub fn release(self) -> bool {
        match self.home.clone() {
            Some(pool) => pool.release(self),
            None => {
                let Self { block, bytes, .. } = self;
                bytes.release(block)
            }
        }
    }

    /// Same as [`release`](Buffer::release), ignoring the outcome.
    pub fn put(self) {
        let _ = self.release();
    }

    /// [`release`](Buffer::release) as a `Result`.
    pub fn close(self) -> Result<(), BufferError> {
        if self.release() {
            Ok(())
        } else {
            Err(BufferError::Close)
        }
    }

    /// Drop one shared holder; the last one releases the buffer.
    ///
    /// Decrements the reference delta. If other holders remain, nothing else
    /// happens and `false` is returned. The last holder releases the buffer
    /// when it also holds the last `Arc`; if another `Arc` is still alive
    /// the memory is left to ordinary deallocation and `false` is returned.
    pub fn release_shared(this: Arc<Self>) -> bool {
        if this.ref_swap_dec() > 0 {
            return false;
        }
        match Arc::try_unwrap(this) {
            Ok(buf) => buf.release(),
            Err(_) => {
                trace!("shared release skipped: buffer still referenced");
                false
            }
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Buffer {
    /// Copy the contents into new pooled memory with a fresh reference delta.
    fn clone(&self) -> Self {
        let mut block = self.bytes.acquire_empty(self.block.len());
        block.extend_from_slice(&self.block);
        Self {
            block,
            refs: AtomicI64::new(0),
            bytes: Arc::clone(&self.bytes),
            home: self.home.clone(),
        }
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf);
        Ok(buf.len())
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.write_bytes(buf);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s);
        Ok(())
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.bytes()
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.block))
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("refs", &self.ref_load())
            .finish_non_exhaustive()
    }
}

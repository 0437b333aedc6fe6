//! Byte memory blocks handed out by the size-class pool.
//!
//! A [`ByteBlock`] owns fully initialised storage of a fixed capacity and
//! tracks a logical length separately. Storage is zero-filled once, when it is
//! first allocated; after that it is recycled as-is. Bytes between the logical
//! length and the capacity therefore hold whatever a previous user left there.
//! Reading them is memory-safe but yields indeterminate content.

use std::fmt;
use std::ops::{Deref, DerefMut};

/// Contiguous bytes with a logical length and a fixed capacity.
#[derive(Default)]
pub struct ByteBlock {
    storage: Box<[u8]>,
    len: usize,
}

impl ByteBlock {
    /// An empty block with zero capacity. Never poolable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate fresh zero-filled storage of exactly `capacity` bytes.
    pub(crate) fn alloc(capacity: usize) -> Self {
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Wrap recycled storage, exposing `len` bytes of it.
    pub(crate) fn from_storage(storage: Box<[u8]>, len: usize) -> Self {
        debug_assert!(len <= storage.len());
        Self { storage, len }
    }

    /// Give up the storage, discarding the logical length.
    pub(crate) fn into_storage(self) -> Box<[u8]> {
        self.storage
    }

    /// Logical length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the logical length is zero.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total bytes of storage.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bytes available past the logical length.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.storage.len() - self.len
    }

    /// Address of the first storage byte. Used to observe reuse.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.storage.as_ptr()
    }

    /// Set the logical length.
    ///
    /// Growing the length reveals leftover bytes from earlier use; they are
    /// not cleared.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the capacity.
    pub fn set_len(&mut self, len: usize) {
        assert!(
            len <= self.capacity(),
            "block length {len} exceeds capacity {}",
            self.capacity()
        );
        self.len = len;
    }

    /// Shorten the logical length to `len`. No-op if already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// Set the logical length to zero.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append `src` after the logical length.
    ///
    /// # Panics
    ///
    /// Panics if `src` does not fit in the remaining capacity.
    pub fn extend_from_slice(&mut self, src: &[u8]) {
        assert!(
            src.len() <= self.remaining(),
            "block overflow: {} bytes into {} remaining",
            src.len(),
            self.remaining()
        );
        let end = self.len + src.len();
        self.storage[self.len..end].copy_from_slice(src);
        self.len = end;
    }

    /// Append one byte.
    ///
    /// # Panics
    ///
    /// Panics if the block is full.
    pub fn push(&mut self, byte: u8) {
        assert!(self.len < self.capacity(), "block overflow: block is full");
        self.storage[self.len] = byte;
        self.len += 1;
    }

    /// Storage between the logical length and the capacity.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.len..]
    }

    /// Copy the logical contents into an owned `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        (**self).to_vec()
    }
}

impl Deref for ByteBlock {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.storage[..self.len]
    }
}

impl DerefMut for ByteBlock {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.storage[..self.len]
    }
}

impl AsRef<[u8]> for ByteBlock {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl AsMut<[u8]> for ByteBlock {
    fn as_mut(&mut self) -> &mut [u8] {
        self
    }
}

impl From<Vec<u8>> for ByteBlock {
    /// Adopt a `Vec`, keeping its length and its full capacity so that a
    /// vector of a class-sized capacity can be released into the pool.
    fn from(mut vec: Vec<u8>) -> Self {
        let len = vec.len();
        vec.resize(vec.capacity(), 0);
        Self {
            storage: vec.into_boxed_slice(),
            len,
        }
    }
}

impl fmt::Debug for ByteBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBlock")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

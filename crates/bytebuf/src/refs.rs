//! Scoped reference guard.

use std::ops::Deref;

use crate::buffer::Buffer;

/// Holds one extra reference on a [`Buffer`] for its lifetime.
///
/// Created by [`Buffer::ref_guard`], which increments the reference delta;
/// dropping the guard decrements it again.
#[must_use = "dropping the guard releases the reference immediately"]
pub struct RefGuard<'a> {
    buffer: &'a Buffer,
}

impl<'a> RefGuard<'a> {
    pub(crate) fn new(buffer: &'a Buffer) -> Self {
        buffer.ref_inc();
        Self { buffer }
    }
}

impl Deref for RefGuard<'_> {
    type Target = Buffer;

    fn deref(&self) -> &Buffer {
        self.buffer
    }
}

impl Drop for RefGuard<'_> {
    fn drop(&mut self) {
        self.buffer.ref_dec();
    }
}

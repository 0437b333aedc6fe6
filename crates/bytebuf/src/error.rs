//! Buffer error type.

use thiserror::Error;

/// Largest length or capacity a [`Buffer`](crate::Buffer) may reach:
/// `2^31 - 1` bytes, regardless of pool configuration.
#[allow(clippy::cast_sign_loss)]
pub const MAX_BUFFER_SIZE: usize = i32::MAX as usize;

/// Errors raised by buffer operations.
///
/// The panicking operations (`grow`, `guarantee`, `truncate`) panic with the
/// display text of these variants; their `try_` counterparts return them.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// The requested size exceeds [`MAX_BUFFER_SIZE`].
    #[error("buffer too large: limit is {} bytes", MAX_BUFFER_SIZE)]
    TooLarge,

    /// Truncation index past the current length.
    #[error("buffer truncation out of range")]
    Truncation,

    /// The pools refused the buffer's memory on close.
    #[error("buffer memory was not returned to the pool")]
    Close,
}

/// Abort with a contract violation.
#[cold]
#[track_caller]
pub(crate) fn fatal(err: BufferError) -> ! {
    panic!("{err}")
}

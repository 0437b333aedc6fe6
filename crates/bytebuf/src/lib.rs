//! # bytebuf
//!
//! Growable byte buffers whose memory is recycled through a
//! [`bytepool::SizeClassPool`], plus a pool for the buffer wrappers
//! themselves.
//!
//! ```
//! let mut buf = bytebuf::get();
//! buf.write_string("hello");
//! assert_eq!(buf.bytes(), b"hello");
//! buf.put();
//! ```
#![warn(missing_docs)]

pub mod buffer;
pub mod error;
pub mod global;
pub mod pool;
pub mod refs;

// Re-exports
pub use buffer::Buffer;
pub use error::{BufferError, MAX_BUFFER_SIZE};
pub use global::{clone, default_buffer_pool, get, make, put, reinitialize_default, release};
pub use pool::{BufferPool, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_IDLE};
pub use refs::RefGuard;

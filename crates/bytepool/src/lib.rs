//! # bytepool
//!
//! Size-classed pool of reusable byte blocks.
//!
//! A [`SizeClassPool`] splits `[min_size, max_size]` into power-of-two
//! classes and recycles blocks of exactly those capacities. Requests above
//! `max_size` are served by plain allocations that are never pooled. A
//! process-wide default pool backs the free functions in this crate.
#![warn(missing_docs)]

pub mod block;
mod class;
pub mod config;
pub mod global;
pub mod pool;
pub mod stats;

// Re-exports
pub use block::ByteBlock;
pub use config::{
    ConfigError, PoolConfig, DEFAULT_MAX_PER_CLASS, DEFAULT_MAX_SIZE, DEFAULT_MIN_SIZE,
    ENV_MAX_PER_CLASS, ENV_MAX_SIZE, ENV_MIN_SIZE, MIN_CAPACITY,
};
pub use global::{
    acquire_empty, acquire_exact, acquire_exact_max, acquire_exact_min, acquire_max, acquire_min,
    default_pool, install_default, reinitialize_default, release,
};
pub use pool::SizeClassPool;
pub use stats::PoolStats;

//! bytepool CLI library: configuration and workload for the `bytepool` binary.

pub mod app;
pub mod config;
pub mod report;

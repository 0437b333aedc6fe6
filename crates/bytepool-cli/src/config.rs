//! Application configuration from CLI flags and environment.

use std::path::PathBuf;

use bytepool::{ConfigError, PoolConfig};
use clap::Parser;

/// Run a buffer churn workload against a size-class pool and report pool statistics.
#[derive(Parser, Debug)]
#[command(name = "bytepool", version, about)]
pub struct AppConfig {
    /// Smallest size class in bytes.
    #[arg(long, env = "BYTEPOOL_MIN_SIZE")]
    pub min_size: Option<usize>,

    /// Largest size class in bytes; bigger buffers are not pooled.
    #[arg(long, env = "BYTEPOOL_MAX_SIZE")]
    pub max_size: Option<usize>,

    /// Free blocks kept per class.
    #[arg(long, env = "BYTEPOOL_MAX_PER_CLASS")]
    pub max_per_class: Option<usize>,

    /// JSON pool config file. Flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Buffer cycles per worker thread.
    #[arg(short, long, default_value = "10000")]
    pub iterations: usize,

    /// Worker threads.
    #[arg(short, long, default_value = "4")]
    pub threads: usize,

    /// Largest payload written per cycle, in bytes.
    #[arg(short, long, default_value = "4096")]
    pub payload: usize,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Pool configuration: file (or defaults) overlaid with flags, then clamped.
    pub fn pool_config(&self) -> Result<PoolConfig, ConfigError> {
        let mut pool = match &self.config {
            Some(path) => PoolConfig::from_json_file(path)?,
            None => PoolConfig::default(),
        };
        if let Some(min_size) = self.min_size {
            pool.min_size = min_size;
        }
        if let Some(max_size) = self.max_size {
            pool.max_size = max_size;
        }
        if let Some(max_per_class) = self.max_per_class {
            pool.max_per_class = max_per_class;
        }
        Ok(pool.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        AppConfig::try_parse_from(std::iter::once("bytepool").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&[]);
        assert_eq!(config.iterations, 10_000);
        assert_eq!(config.threads, 4);
        assert_eq!(config.payload, 4096);
        assert!(!config.json);
    }

    #[test]
    fn flags_override_pool_defaults() {
        let config = parse(&["--min-size", "1", "--max-size", "1024"]);
        let pool = config.pool_config().unwrap();
        assert_eq!(pool.min_size, 2);
        assert_eq!(pool.max_size, 1024);
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.json");
        std::fs::write(&path, r#"{"min_size": 8, "max_size": 512}"#).unwrap();
        let path_arg = path.to_str().unwrap();
        let config = parse(&["--config", path_arg, "--max-size", "2048"]);
        let pool = config.pool_config().unwrap();
        assert_eq!(pool.min_size, 8);
        assert_eq!(pool.max_size, 2048);
    }
}

//! Pool configuration: defaults, JSON files and environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest class capacity a pool will accept.
pub const MIN_CAPACITY: usize = 2;
/// Default smallest class capacity.
pub const DEFAULT_MIN_SIZE: usize = 2;
/// Default terminal class capacity.
pub const DEFAULT_MAX_SIZE: usize = 8192;
/// Default bound on free blocks kept per class.
pub const DEFAULT_MAX_PER_CLASS: usize = 1024;

/// Environment variable overriding `min_size`.
pub const ENV_MIN_SIZE: &str = "BYTEPOOL_MIN_SIZE";
/// Environment variable overriding `max_size`.
pub const ENV_MAX_SIZE: &str = "BYTEPOOL_MAX_SIZE";
/// Environment variable overriding `max_per_class`.
pub const ENV_MAX_PER_CLASS: &str = "BYTEPOOL_MAX_PER_CLASS";

/// Errors raised while loading a [`PoolConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("cannot access config file {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for a `PoolConfig`.
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// An environment variable held something other than an unsigned integer.
    #[error("invalid value {value:?} for {var}")]
    Env {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Bounds and limits for a size-class pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Capacity of the smallest class.
    pub min_size: usize,
    /// Capacity of the terminal class; larger requests bypass the pool.
    pub max_size: usize,
    /// Free blocks kept per class before releases are dropped.
    pub max_per_class: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            max_per_class: DEFAULT_MAX_PER_CLASS,
        }
    }
}

impl PoolConfig {
    /// Config with the given bounds and the default per-class limit.
    #[must_use]
    pub fn new(min_size: usize, max_size: usize) -> Self {
        Self {
            min_size,
            max_size,
            ..Self::default()
        }
    }

    /// Apply the clamps: `min_size >= 2`, `max_size >= min_size`.
    #[must_use]
    pub fn normalize(self) -> Self {
        let min_size = self.min_size.max(MIN_CAPACITY);
        Self {
            min_size,
            max_size: self.max_size.max(min_size),
            max_per_class: self.max_per_class,
        }
    }

    /// Defaults overlaid with `BYTEPOOL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overlaid with values produced by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        for (var, field) in [
            (ENV_MIN_SIZE, &mut config.min_size),
            (ENV_MAX_SIZE, &mut config.max_size),
            (ENV_MAX_PER_CLASS, &mut config.max_per_class),
        ] {
            if let Some(value) = lookup(var) {
                *field = value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Env { var, value })?;
            }
        }
        Ok(config)
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the config to a JSON file.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| io_err(std::io::Error::other(e)))?;
        std::fs::write(path, content).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn default_bounds() {
        let config = PoolConfig::default();
        assert_eq!(config.min_size, 2);
        assert_eq!(config.max_size, 8192);
        assert_eq!(config.max_per_class, 1024);
    }

    #[test]
    fn normalize_clamps() {
        assert_eq!(PoolConfig::new(0, 0).normalize(), PoolConfig::new(2, 2));
        assert_eq!(PoolConfig::new(64, 8).normalize(), PoolConfig::new(64, 64));
        assert_eq!(PoolConfig::new(4, 16).normalize(), PoolConfig::new(4, 16));
    }

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [(ENV_MIN_SIZE, "8"), (ENV_MAX_SIZE, " 4096 ")].into();
        let config = PoolConfig::from_lookup(|k| vars.get(k).map(ToString::to_string)).unwrap();
        assert_eq!(config.min_size, 8);
        assert_eq!(config.max_size, 4096);
        assert_eq!(config.max_per_class, DEFAULT_MAX_PER_CLASS);
    }

    #[test]
    fn lookup_rejects_garbage() {
        let err = PoolConfig::from_lookup(|k| (k == ENV_MAX_SIZE).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_MAX_SIZE, .. }));
        assert!(err.to_string().contains("lots"));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: PoolConfig = serde_json::from_str(r#"{"max_size": 1024}"#).unwrap();
        assert_eq!(config, PoolConfig::new(DEFAULT_MIN_SIZE, 1024));
    }
}

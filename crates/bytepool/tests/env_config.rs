//! Pool configuration from `BYTEPOOL_*` environment variables.
//!
//! Kept in its own test binary: it mutates the process environment.

use bytepool::{ConfigError, PoolConfig, ENV_MAX_PER_CLASS, ENV_MAX_SIZE, ENV_MIN_SIZE};

#[test]
fn from_env_overlays_defaults() {
    std::env::remove_var(ENV_MIN_SIZE);
    std::env::remove_var(ENV_MAX_SIZE);
    std::env::remove_var(ENV_MAX_PER_CLASS);
    assert_eq!(PoolConfig::from_env().unwrap(), PoolConfig::default());

    std::env::set_var(ENV_MIN_SIZE, "16");
    std::env::set_var(ENV_MAX_PER_CLASS, "8");
    let config = PoolConfig::from_env().unwrap();
    assert_eq!(config.min_size, 16);
    assert_eq!(config.max_size, bytepool::DEFAULT_MAX_SIZE);
    assert_eq!(config.max_per_class, 8);

    std::env::set_var(ENV_MAX_SIZE, "-1");
    let err = PoolConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Env { var: ENV_MAX_SIZE, .. }));

    std::env::remove_var(ENV_MIN_SIZE);
    std::env::remove_var(ENV_MAX_SIZE);
    std::env::remove_var(ENV_MAX_PER_CLASS);
}

//! bytepool: buffer churn workload over a size-class pool.

use anyhow::Result;
use bytepool_cli::{app, config};

fn main() -> Result<()> {
    let config = config::AppConfig::parse();

    let level = if config.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    app::run(&config)
}

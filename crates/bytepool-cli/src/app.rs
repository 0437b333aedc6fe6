//! Workload runner.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use bytebuf::{BufferPool, DEFAULT_BUFFER_SIZE};
use bytepool::SizeClassPool;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::report::Report;

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    let report = run_workload(config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if config.json {
        report.write_json(&mut out)?;
    } else {
        use std::io::Write;
        writeln!(out, "{report}")?;
    }
    Ok(())
}

/// Build the pools from `config`, churn buffers through them, and summarize.
pub fn run_workload(config: &AppConfig) -> Result<Report> {
    let pool_config = config.pool_config().context("loading pool configuration")?;
    anyhow::ensure!(config.threads > 0, "--threads must be at least 1");

    let bytes = Arc::new(SizeClassPool::from_config(&pool_config));
    let buffers = Arc::new(BufferPool::new(Arc::clone(&bytes)));
    bytes.warm(DEFAULT_BUFFER_SIZE, config.threads);
    let payload: Vec<u8> = (0..=u8::MAX).cycle().take(config.payload).collect();
    let cycles = config.threads.saturating_mul(config.iterations);

    let workers = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .context("starting worker threads")?;
    debug!(threads = config.threads, cycles, "workload starting");

    let start = Instant::now();
    let bytes_written: u64 = workers.install(|| {
        (0..cycles)
            .into_par_iter()
            .map(|i| cycle(&buffers, &payload, i))
            .sum()
    });
    let elapsed = start.elapsed();
    info!(elapsed_ms = elapsed.as_millis(), "workload finished");

    Ok(Report {
        min_size: bytes.min_size(),
        max_size: bytes.max_size(),
        classes: bytes.class_capacities(),
        threads: config.threads,
        cycles,
        bytes_written,
        pooled_blocks: bytes.pooled(),
        idle_wrappers: buffers.idle(),
        stats: bytes.stats(),
        elapsed_ms: elapsed.as_millis(),
    })
}

/// One buffer lifecycle: acquire, fill, occasionally clone, release.
fn cycle(buffers: &Arc<BufferPool>, payload: &[u8], i: usize) -> u64 {
    let len = if payload.is_empty() {
        0
    } else {
        i.wrapping_mul(2_654_435_761) % (payload.len() + 1)
    };

    let mut buf = buffers.get();
    buf.write_bytes(&payload[..len]);
    if i % 16 == 0 {
        let copy = buffers.clone_buffer(&buf);
        copy.put();
    }
    buf.put();
    len as u64
}

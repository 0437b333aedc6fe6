//! Workload summary output.

use std::fmt;
use std::io::Write;

use bytepool::PoolStats;
use serde::Serialize;

/// What a workload run did to the pools.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Smallest class capacity.
    pub min_size: usize,
    /// Terminal class capacity.
    pub max_size: usize,
    /// All class capacities.
    pub classes: Vec<usize>,
    /// Worker threads used.
    pub threads: usize,
    /// Buffer cycles run in total.
    pub cycles: usize,
    /// Payload bytes written across all cycles.
    pub bytes_written: u64,
    /// Free blocks left in the size-class pool.
    pub pooled_blocks: usize,
    /// Parked buffer wrappers.
    pub idle_wrappers: usize,
    /// Size-class pool counters.
    pub stats: PoolStats,
    /// Wall time of the run.
    pub elapsed_ms: u128,
}

impl Report {
    /// Write the report as pretty JSON.
    pub fn write_json(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)?;
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Pool:      {}..={} bytes, {} classes",
            self.min_size,
            self.max_size,
            self.classes.len()
        )?;
        writeln!(
            f,
            "Workload:  {} cycles on {} threads, {} bytes written",
            self.cycles, self.threads, self.bytes_written
        )?;
        writeln!(
            f,
            "Acquires:  {} hits, {} misses, {} oversized (hit rate {:.1}%)",
            self.stats.hits,
            self.stats.misses,
            self.stats.oversized,
            self.stats.hit_rate() * 100.0
        )?;
        writeln!(
            f,
            "Releases:  {} pooled, {} rejected, {} evicted",
            self.stats.released, self.stats.rejected, self.stats.evictions
        )?;
        writeln!(
            f,
            "Resident:  {} free blocks, {} idle wrappers",
            self.pooled_blocks, self.idle_wrappers
        )?;
        write!(f, "Elapsed:   {} ms", self.elapsed_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Report {
        Report {
            min_size: 2,
            max_size: 8,
            classes: vec![2, 4, 8],
            threads: 1,
            cycles: 10,
            bytes_written: 40,
            pooled_blocks: 3,
            idle_wrappers: 1,
            stats: PoolStats {
                hits: 9,
                misses: 1,
                ..PoolStats::default()
            },
            elapsed_ms: 0,
        }
    }

    #[test]
    fn text_report() {
        let text = sample().to_string();
        assert!(text.contains("2..=8 bytes, 3 classes"));
        assert!(text.contains("9 hits, 1 misses"));
        assert!(text.contains("hit rate 90.0%"));
    }

    #[test]
    fn json_report() {
        let mut out = Vec::new();
        sample().write_json(&mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["classes"], serde_json::json!([2, 4, 8]));
        assert_eq!(value["stats"]["hits"], 9);
    }
}

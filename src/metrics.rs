/// Live metrics for the TUI visualizer.
///
/// The driver writes a JSON snapshot to METRICS_PATH while it replays a
/// trace. The viz binary polls this file and re-renders the dashboard.
/// Writes are atomic (write to .tmp then rename) to avoid torn reads.
use serde::{Deserialize, Serialize};

use crate::cache::Cache;

pub const METRICS_PATH: &str = "/tmp/cachesim_live.json";

#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct LiveMetrics {
    /// "idle" | "running" | "complete"
    pub status: String,
    /// Trace file being replayed
    pub trace_name: String,

    // Cache geometry
    pub capacity: u64,
    pub block_size: u64,
    pub associativity: u64,
    pub num_sets: u64,

    // Running counters
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    /// Hit rate in [0.0, 1.0]; absent before the first access
    pub hit_rate: Option<f64>,

    /// Total addresses in the trace (for the progress gauge)
    pub addresses_total: u64,
    /// Most recently simulated address
    pub last_address: u64,
    /// "hit" | "miss" | "" before the first access
    pub last_outcome: String,

    /// Valid blocks per set — index = set index
    pub set_occupancy: Vec<u32>,

    /// Unix timestamp in ms when this snapshot was written
    pub timestamp_ms: u64,
}

impl LiveMetrics {
    /// Snapshot the cache's current geometry, counters, and occupancy.
    /// Trace progress and the last outcome are filled in by the driver.
    pub fn from_cache(cache: &Cache) -> Self {
        let geom = cache.geometry();
        let stats = cache.stats();
        let set_occupancy = cache
            .sets()
            .iter()
            .map(|set| set.blocks.iter().filter(|b| b.valid).count() as u32)
            .collect();

        LiveMetrics {
            capacity: geom.capacity,
            block_size: geom.block_size,
            associativity: geom.associativity,
            num_sets: geom.num_sets,
            accesses: stats.accesses,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            set_occupancy,
            timestamp_ms: now_ms(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// I/O helpers
// ---------------------------------------------------------------------------

/// Atomically write metrics to METRICS_PATH.
/// Uses a .tmp intermediate file + rename to avoid torn reads by the viz.
pub fn write_metrics(metrics: &LiveMetrics) {
    if let Ok(json) = serde_json::to_string(metrics) {
        let tmp = format!("{}.tmp", METRICS_PATH);
        if std::fs::write(&tmp, &json).is_ok() {
            let _ = std::fs::rename(&tmp, METRICS_PATH);
        }
    }
}

/// Read the latest metrics snapshot. Returns None if the file doesn't exist
/// or can't be parsed (e.g. no simulation has run yet).
pub fn read_metrics() -> Option<LiveMetrics> {
    let data = std::fs::read_to_string(METRICS_PATH).ok()?;
    serde_json::from_str(&data).ok()
}

/// Returns current Unix time in milliseconds.
pub fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;

    #[test]
    fn snapshot_mirrors_cache_state() {
        let mut cache = Cache::new(CacheConfig::new(128, 16, 2)).unwrap();
        cache.record_access(0);
        cache.record_access(64);
        cache.record_access(0);

        let metrics = LiveMetrics::from_cache(&cache);
        assert_eq!(metrics.num_sets, 4);
        assert_eq!(metrics.accesses, 3);
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 2);
        assert_eq!(metrics.set_occupancy, vec![2, 0, 0, 0]);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let cache = Cache::new(CacheConfig::direct_mapped(1024, 64)).unwrap();
        let mut metrics = LiveMetrics::from_cache(&cache);
        metrics.status = "running".to_string();
        let json = serde_json::to_string(&metrics).unwrap();
        let back: LiveMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status, "running");
        assert_eq!(back.capacity, 1024);
        assert_eq!(back.hit_rate, None);
    }
}

/// Textual reporting.
/// Formats configuration, per-set contents, and aggregate statistics as
/// text. Everything here consumes only read accessors of the cache; no
/// model state is mutated by reporting.
use std::fmt::Write;

use crate::cache::Cache;

/// Display row for one block slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockView {
    /// Slot position within the set
    pub way: usize,
    pub tag: u64,
    pub valid: bool,
    pub recency: i64,
}

/// Display rows for one set.
#[derive(Debug, Clone)]
pub struct SetContents {
    pub set_index: usize,
    pub blocks: Vec<BlockView>,
}

/// Snapshot of the whole grid for display, in set order.
pub fn contents(cache: &Cache) -> Vec<SetContents> {
    cache
        .sets()
        .iter()
        .enumerate()
        .map(|(set_index, set)| SetContents {
            set_index,
            blocks: set
                .blocks
                .iter()
                .enumerate()
                .map(|(way, block)| BlockView {
                    way,
                    tag: block.tag,
                    valid: block.valid,
                    recency: block.recency,
                })
                .collect(),
        })
        .collect()
}

/// Configuration echo, one `Name value` line per parameter.
pub fn format_config(cache: &Cache) -> String {
    let geom = cache.geometry();
    format!(
        "Capacity {}\nBlock size {}\nAssociativity {}\nNum Sets {}\n",
        geom.capacity, geom.block_size, geom.associativity, geom.num_sets
    )
}

/// Per-set contents dump: index, tag (hex), valid bit, and lru state.
pub fn format_contents(cache: &Cache) -> String {
    let mut out = String::new();
    for set in contents(cache) {
        writeln!(out, "****** SET {}******", set.set_index).unwrap();
        for block in &set.blocks {
            writeln!(
                out,
                "Index {}: tag {:x} valid {} lru {}",
                block.way,
                block.tag,
                block.valid as u8,
                block.recency
            )
            .unwrap();
        }
        writeln!(out, "*****************").unwrap();
    }
    out
}

/// Statistics summary: access/hit/miss counters and the hit rate.
/// The hit rate keeps the reference simulator's formatting (six decimal
/// places with trailing zeros trimmed); with no accesses it is undefined.
pub fn format_statistics(cache: &Cache) -> String {
    let stats = cache.stats();
    let rate = match stats.hit_rate() {
        Some(rate) => trim_rate(rate),
        None => "undefined".to_string(),
    };
    format!(
        "ACCESSES {}\nHITS {}\nMISSES {}\nHIT RATE {}\n",
        stats.accesses, stats.hits, stats.misses, rate
    )
}

/// Render a rate with up to six decimals, dropping trailing zeros but
/// keeping at least one digit after the point.
fn trim_rate(rate: f64) -> String {
    let mut text = format!("{:.6}", rate);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.push('0');
    }
    text
}

/// The cache model itself.
/// Owns the set/block grid and the counters, decodes addresses into
/// tag/set coordinates, detects hits, ages blocks, and evicts on misses.
/// One access = one call to `record_access`; decode → hit-test → age →
/// evict run internally so callers never see a partially mutated cache.
use log::{debug, info, trace};

use crate::block::{Block, RECENCY_FRESH, Set};
use crate::config::{CacheConfig, ConfigError, Geometry};
use crate::stats::CacheStats;

/// Outcome of a single access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Hit,
    Miss,
}

impl Access {
    pub fn is_hit(&self) -> bool {
        *self == Access::Hit
    }
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Access::Hit => write!(f, "hit"),
            Access::Miss => write!(f, "miss"),
        }
    }
}

/// An address split into its cache coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// Address divided by block size — the memory line number
    pub block_addr: u64,
    /// Which set the line maps to
    pub set_index: usize,
    /// Line number divided by set count — identifies the line within its set
    pub tag: u64,
}

/// A configurable set-associative cache fed one byte address at a time.
///
/// The grid is allocated once at construction (`num_sets` sets of
/// `associativity` blocks each) and never resized; eviction overwrites
/// blocks in place.
pub struct Cache {
    geometry: Geometry,
    sets: Vec<Set>,
    stats: CacheStats,
}

impl Cache {
    /// Validate the configuration and allocate the empty grid.
    /// No cache exists if validation fails.
    pub fn new(config: CacheConfig) -> Result<Self, ConfigError> {
        let geometry = config.validate()?;
        let sets = (0..geometry.num_sets)
            .map(|_| Set::new(geometry.associativity as usize, geometry.block_size as usize))
            .collect();

        info!(
            "cache initialized: capacity={} block_size={} associativity={} num_sets={}",
            geometry.capacity, geometry.block_size, geometry.associativity, geometry.num_sets
        );

        Ok(Cache {
            geometry,
            sets,
            stats: CacheStats::default(),
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Read-only view of the set grid, in set order.
    pub fn sets(&self) -> &[Set] {
        &self.sets
    }

    /// Split a byte address into (block address, set index, tag).
    /// Pure; standard set-indexed mapping.
    pub fn decode(&self, addr: u64) -> Decoded {
        let block_addr = addr / self.geometry.block_size;
        Decoded {
            block_addr,
            set_index: (block_addr % self.geometry.num_sets) as usize,
            tag: block_addr / self.geometry.num_sets,
        }
    }

    /// Record one access and return its outcome.
    ///
    /// Sequences the whole per-access state machine: decode, hit detection,
    /// LRU aging, and (on a miss) eviction/insertion. Counters are updated
    /// before returning, so `accesses == hits + misses` holds at every exit.
    pub fn record_access(&mut self, addr: u64) -> Access {
        self.stats.accesses += 1;
        let decoded = self.decode(addr);
        let set = &mut self.sets[decoded.set_index];

        let hit_way = find_hit(set, addr);
        let has_space = set.has_space();
        age_blocks(set, hit_way, has_space);

        match hit_way {
            Some(way) => {
                self.stats.hits += 1;
                trace!(
                    "access {:#x}: hit set={} way={} tag={:#x}",
                    addr, decoded.set_index, way, decoded.tag
                );
                Access::Hit
            }
            None => {
                let way = select_victim(set);
                if set.blocks[way].valid {
                    debug!(
                        "evicting set={} way={} tag={:#x} for tag={:#x}",
                        decoded.set_index, way, set.blocks[way].tag, decoded.tag
                    );
                }
                set.blocks[way].fill(addr, decoded.tag);
                self.stats.misses += 1;
                trace!(
                    "access {:#x}: miss set={} way={} tag={:#x}",
                    addr, decoded.set_index, way, decoded.tag
                );
                Access::Miss
            }
        }
    }
}

/// Scan the set in slot order for a block whose stored words contain the
/// accessed address. On a hit the block is marked freshest immediately,
/// before the aging pass runs.
///
/// Note this searches the seeded contents, not the tag: a line inserted by
/// address A holds the run A..A+block_size, so any access falling in that
/// run hits. This matches the reference simulator exactly. Invalid blocks
/// are skipped; their placeholder words never represent a line.
fn find_hit(set: &mut Set, addr: u64) -> Option<usize> {
    for (way, block) in set.blocks.iter_mut().enumerate() {
        if block.valid && block.contents.iter().any(|&word| word == addr) {
            block.recency = RECENCY_FRESH;
            return Some(way);
        }
    }
    None
}

/// Age every other block in the set relative to the one just touched (hit)
/// or about to be inserted (miss).
///
/// Two branches keep recency a usable total-order proxy:
/// - while the set still has empty slots, every occupied block except the
///   freshest ages together;
/// - once the set is full, only blocks that were at recency 0 age, which
///   builds the strict recency chain eviction relies on without letting
///   ages inflate every access.
fn age_blocks(set: &mut Set, hit_way: Option<usize>, has_space: bool) {
    for (way, block) in set.blocks.iter_mut().enumerate() {
        if Some(way) == hit_way {
            continue;
        }
        let should_age = if has_space {
            !block.is_empty()
        } else {
            block.recency == RECENCY_FRESH
        };
        if should_age {
            block.recency += 1;
        }
    }
}

/// Choose the destination slot for a miss: the first never-used slot in
/// slot order, otherwise the block with the strictly maximal recency
/// (least-recently-used). Ties go to the first occurrence in slot order.
fn select_victim(set: &Set) -> usize {
    if let Some(way) = set.blocks.iter().position(Block::is_empty) {
        return way;
    }
    let mut victim = 0;
    for (way, block) in set.blocks.iter().enumerate() {
        if block.recency > set.blocks[victim].recency {
            victim = way;
        }
    }
    victim
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: u64, block_size: u64, associativity: u64) -> Cache {
        Cache::new(CacheConfig::new(capacity, block_size, associativity)).unwrap()
    }

    /// Counters must balance after every single access.
    fn assert_counters(cache: &Cache) {
        let stats = cache.stats();
        assert_eq!(stats.accesses, stats.hits + stats.misses);
    }

    /// No set may hold two valid blocks with the same tag.
    fn assert_unique_tags(cache: &Cache) {
        for set in cache.sets() {
            let mut tags: Vec<u64> =
                set.blocks.iter().filter(|b| b.valid).map(|b| b.tag).collect();
            tags.sort_unstable();
            tags.dedup();
            assert_eq!(
                tags.len(),
                set.blocks.iter().filter(|b| b.valid).count()
            );
        }
    }

    #[test]
    fn decode_splits_address_into_coordinates() {
        let cache = cache(1024, 64, 1);
        let decoded = cache.decode(1024);
        // 1024 / 64 = line 16, 16 % 16 sets = set 0, 16 / 16 = tag 1
        assert_eq!(decoded.block_addr, 16);
        assert_eq!(decoded.set_index, 0);
        assert_eq!(decoded.tag, 1);
    }

    #[test]
    fn first_access_to_fresh_cache_is_a_miss() {
        let mut cache = cache(1024, 64, 1);
        assert_eq!(cache.record_access(0), Access::Miss);
        assert_counters(&cache);
    }

    #[test]
    fn direct_mapped_conflict_evicts_in_place() {
        // 1024/64/1 -> 16 sets; 0 and 1024 both map to set 0.
        let mut cache = cache(1024, 64, 1);
        assert_eq!(cache.record_access(0), Access::Miss);
        assert_eq!(cache.record_access(1024), Access::Miss);
        let stats = cache.stats();
        assert_eq!(stats.accesses, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 0);
        // Same slot reused: only one valid block in set 0, holding 1024's line
        let set = &cache.sets()[0];
        assert_eq!(set.blocks.iter().filter(|b| b.valid).count(), 1);
        assert_eq!(set.blocks[0].tag, 1);
        assert_counters(&cache);
    }

    #[test]
    fn two_way_set_retains_both_lines() {
        // 128/16/2 -> 4 sets; 0 and 64 map to set 0 with different tags.
        let mut cache = cache(128, 16, 2);
        assert_eq!(cache.record_access(0), Access::Miss);
        assert_eq!(cache.record_access(64), Access::Miss);
        assert_eq!(cache.record_access(0), Access::Hit);
        let stats = cache.stats();
        assert_eq!(stats.accesses, 3);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_unique_tags(&cache);
    }

    #[test]
    fn repeated_access_after_hit_stays_a_hit() {
        let mut cache = cache(128, 16, 2);
        cache.record_access(0);
        cache.record_access(64);
        assert_eq!(cache.record_access(0), Access::Hit);
        let before: Vec<(u64, bool)> = cache.sets()[0]
            .blocks
            .iter()
            .map(|b| (b.tag, b.valid))
            .collect();
        assert_eq!(cache.record_access(0), Access::Hit);
        let after: Vec<(u64, bool)> = cache.sets()[0]
            .blocks
            .iter()
            .map(|b| (b.tag, b.valid))
            .collect();
        assert_eq!(before, after);
        assert_counters(&cache);
    }

    #[test]
    fn full_set_evicts_least_recently_used() {
        // 128/16/2 -> accesses 0, 64, 128 all hit set 0; the third must
        // evict 0's line (the one not touched in between).
        let mut cache = cache(128, 16, 2);
        cache.record_access(0);
        cache.record_access(64);
        assert_eq!(cache.record_access(128), Access::Miss);

        let set = &cache.sets()[0];
        let tags: Vec<u64> = set.blocks.iter().filter(|b| b.valid).map(|b| b.tag).collect();
        // 64 -> line 4 -> tag 1; 128 -> line 8 -> tag 2; 0's tag 0 is gone
        assert!(tags.contains(&1));
        assert!(tags.contains(&2));
        assert!(!tags.contains(&0));

        // Exactly one block freshest after the eviction
        let fresh = set.blocks.iter().filter(|b| b.recency == 0).count();
        assert_eq!(fresh, 1);
        assert_unique_tags(&cache);
        assert_counters(&cache);
    }

    #[test]
    fn recency_tie_breaks_by_slot_order() {
        // 0 (way 0), 64 (way 1), 0 again (hit, way 1 ages to 1), then a
        // miss: the full-set aging bumps way 0 back to 1, so both ways tie
        // at recency 1 and the first slot is the deterministic victim.
        let mut cache = cache(128, 16, 2);
        cache.record_access(0);
        cache.record_access(64);
        cache.record_access(0);
        assert_eq!(cache.record_access(128), Access::Miss);

        let set = &cache.sets()[0];
        assert_eq!(set.blocks[0].tag, 2); // 128's line replaced way 0
        assert_eq!(set.blocks[1].tag, 1); // 64's line survives
        let fresh = set.blocks.iter().filter(|b| b.recency == 0).count();
        assert_eq!(fresh, 1);
    }

    #[test]
    fn counters_balance_over_a_mixed_trace() {
        let mut cache = cache(256, 16, 4);
        for addr in [0u64, 8, 16, 300, 16, 0, 4096, 8192, 300, 12] {
            cache.record_access(addr);
            assert_counters(&cache);
            assert_unique_tags(&cache);
        }
    }

    #[test]
    fn empty_blocks_stay_invalid_until_filled() {
        let mut cache = cache(256, 16, 4);
        cache.record_access(0);
        for set in cache.sets() {
            for block in &set.blocks {
                if block.is_empty() {
                    assert!(!block.valid);
                }
            }
        }
    }

    #[test]
    fn access_within_an_inserted_line_hits() {
        // Line inserted by address 0 holds words 0..16, so 5 hits.
        let mut cache = cache(128, 16, 2);
        cache.record_access(0);
        assert_eq!(cache.record_access(5), Access::Hit);
    }
}

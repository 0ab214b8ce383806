/// Access statistics.
/// Three monotonically non-decreasing counters owned by the cache and
/// exposed read-only; `accesses == hits + misses` at all times.
use std::fmt;

#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStats {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Hit rate as a fraction, or `None` before the first access.
    /// The zero-access case is undefined and must never surface as NaN.
    pub fn hit_rate(&self) -> Option<f64> {
        if self.accesses == 0 {
            None
        } else {
            Some(self.hits as f64 / self.accesses as f64)
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} accesses, {} hits, {} misses",
            self.accesses, self.hits, self.misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_is_undefined_with_no_accesses() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), None);
    }

    #[test]
    fn hit_rate_is_hits_over_accesses() {
        let stats = CacheStats {
            accesses: 4,
            hits: 1,
            misses: 3,
        };
        assert_eq!(stats.hit_rate(), Some(0.25));
    }
}

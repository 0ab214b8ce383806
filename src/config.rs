/// Cache configuration and validation.
/// A cache is described by three numbers — total capacity, block size, and
/// set associativity, all in bytes except the associativity — and every
/// derived quantity (block count, set count) must come out exact.
use serde::Deserialize;

/// User-supplied cache geometry.
/// `associativity` defaults to 1 (direct-mapped) when omitted.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheConfig {
    /// Total cache size in bytes
    pub capacity: u64,
    /// Cache block (line) size in bytes
    pub block_size: u64,
    /// Number of ways per set
    #[serde(default = "default_associativity")]
    pub associativity: u64,
}

fn default_associativity() -> u64 {
    1
}

/// A rejected configuration, naming the violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// One of the three parameters is zero
    ZeroParameter(&'static str),
    /// Capacity must be even
    OddCapacity(u64),
    /// Block size must be even
    OddBlockSize(u64),
    /// Capacity must divide evenly into block_size * associativity chunks
    NotDivisible {
        capacity: u64,
        block_size: u64,
        associativity: u64,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroParameter(name) => {
                write!(f, "{} must be nonzero", name)
            }
            ConfigError::OddCapacity(c) => {
                write!(f, "capacity {} is not even", c)
            }
            ConfigError::OddBlockSize(b) => {
                write!(f, "block size {} is not even", b)
            }
            ConfigError::NotDivisible {
                capacity,
                block_size,
                associativity,
            } => {
                write!(
                    f,
                    "capacity {} is not divisible by block size {} x associativity {}",
                    capacity, block_size, associativity
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl CacheConfig {
    pub fn new(capacity: u64, block_size: u64, associativity: u64) -> Self {
        CacheConfig {
            capacity,
            block_size,
            associativity,
        }
    }

    /// Direct-mapped configuration (associativity 1).
    pub fn direct_mapped(capacity: u64, block_size: u64) -> Self {
        Self::new(capacity, block_size, 1)
    }

    /// Check the configuration and derive the set/block geometry.
    ///
    /// The even-ness checks on capacity and block size are inherited from the
    /// reference simulator (a proxy for power-of-two; deliberately not
    /// strengthened). The divisibility rule guarantees the derived geometry
    /// is exact: `num_sets * associativity * block_size == capacity`.
    pub fn validate(&self) -> Result<Geometry, ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroParameter("capacity"));
        }
        if self.block_size == 0 {
            return Err(ConfigError::ZeroParameter("block size"));
        }
        if self.associativity == 0 {
            return Err(ConfigError::ZeroParameter("associativity"));
        }
        if self.capacity % 2 != 0 {
            return Err(ConfigError::OddCapacity(self.capacity));
        }
        if self.block_size % 2 != 0 {
            return Err(ConfigError::OddBlockSize(self.block_size));
        }
        if self.capacity % (self.block_size * self.associativity) != 0 {
            return Err(ConfigError::NotDivisible {
                capacity: self.capacity,
                block_size: self.block_size,
                associativity: self.associativity,
            });
        }

        let num_blocks = self.capacity / self.block_size;
        let num_sets = num_blocks / self.associativity;
        Ok(Geometry {
            capacity: self.capacity,
            block_size: self.block_size,
            associativity: self.associativity,
            num_blocks,
            num_sets,
        })
    }
}

/// A validated configuration with its derived set/block counts.
/// Only produced by `CacheConfig::validate`, so the exactness invariant
/// always holds.
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    pub capacity: u64,
    pub block_size: u64,
    pub associativity: u64,
    pub num_blocks: u64,
    pub num_sets: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_mapped_geometry() {
        let geom = CacheConfig::direct_mapped(1024, 64).validate().unwrap();
        assert_eq!(geom.num_blocks, 16);
        assert_eq!(geom.num_sets, 16);
        assert_eq!(geom.num_sets * geom.associativity * geom.block_size, 1024);
    }

    #[test]
    fn two_way_geometry() {
        let geom = CacheConfig::new(128, 16, 2).validate().unwrap();
        assert_eq!(geom.num_blocks, 8);
        assert_eq!(geom.num_sets, 4);
        assert_eq!(geom.num_sets * geom.associativity * geom.block_size, 128);
    }

    #[test]
    fn geometry_is_exact_for_valid_configs() {
        for (capacity, block_size, associativity) in
            [(1024, 64, 1), (128, 16, 2), (256, 64, 4), (4096, 32, 8)]
        {
            let geom = CacheConfig::new(capacity, block_size, associativity)
                .validate()
                .unwrap();
            assert_eq!(
                geom.num_sets * geom.associativity * geom.block_size,
                capacity
            );
        }
    }

    #[test]
    fn rejects_zero_parameters() {
        assert_eq!(
            CacheConfig::new(0, 64, 1).validate().unwrap_err(),
            ConfigError::ZeroParameter("capacity")
        );
        assert_eq!(
            CacheConfig::new(1024, 0, 1).validate().unwrap_err(),
            ConfigError::ZeroParameter("block size")
        );
        assert_eq!(
            CacheConfig::new(1024, 64, 0).validate().unwrap_err(),
            ConfigError::ZeroParameter("associativity")
        );
    }

    #[test]
    fn rejects_odd_capacity_and_block_size() {
        assert_eq!(
            CacheConfig::new(1023, 64, 1).validate().unwrap_err(),
            ConfigError::OddCapacity(1023)
        );
        assert_eq!(
            CacheConfig::new(1024, 63, 1).validate().unwrap_err(),
            ConfigError::OddBlockSize(63)
        );
    }

    #[test]
    fn rejects_non_divisible_combination() {
        // 1000 / (64 * 2) has a fractional component
        let err = CacheConfig::new(1000, 64, 2).validate().unwrap_err();
        assert!(matches!(err, ConfigError::NotDivisible { .. }));
    }

    #[test]
    fn even_but_not_power_of_two_is_accepted() {
        // The even-ness proxy check admits this on purpose.
        let geom = CacheConfig::new(96, 6, 1).validate().unwrap();
        assert_eq!(geom.num_sets, 16);
    }

    #[test]
    fn config_deserializes_with_default_associativity() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"capacity": 1024, "block_size": 64}"#).unwrap();
        assert_eq!(config.associativity, 1);
        assert!(config.validate().is_ok());
    }
}

use serde::{Deserialize, Serialize};

use crate::decoder::AddressLayout;
use crate::error::ConfigError;

/// Parameters of one direct-mapped cache and the memory behind it.
///
/// Immutable once built; every component of a run borrows it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Number of bits needed to address memory.
    pub memory_bits: u32,
    /// Cycles needed to access main memory.
    pub memory_cycles: u32,
    /// Total cache capacity in bytes (`S`).
    pub cache_size: u64,
    /// Cache line size in bytes (`L`).
    pub line_size: u64,
    /// Cycles needed to access the cache.
    pub cache_cycles: u32,
}

impl CacheConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn lines(&self) -> u64 {
        self.cache_size / self.line_size.max(1)
    }

    /// Checks every precondition of the address decoder and returns the derived layout.
    pub fn validate(&self) -> Result<AddressLayout, ConfigError> {
        if self.memory_cycles == 0 {
            return Err(ConfigError::Zero {
                field: "memory_cycles",
            });
        }
        if self.cache_cycles == 0 {
            return Err(ConfigError::Zero {
                field: "cache_cycles",
            });
        }

        let layout = AddressLayout::new(self)?;
        self.warn_unusual();
        Ok(layout)
    }

    fn warn_unusual(&self) {
        if !(16..=40).contains(&self.memory_bits) {
            log::warn!(
                "memory_bits = {} is outside the usual range of 16-40",
                self.memory_bits
            );
        }
        if !(50..=200).contains(&self.memory_cycles) {
            log::warn!(
                "memory_cycles = {} is outside the usual range of 50-200",
                self.memory_cycles
            );
        }
        if !(1..=10).contains(&self.cache_cycles) {
            log::warn!(
                "cache_cycles = {} is outside the usual range of 1-10",
                self.cache_cycles
            );
        }
    }
}

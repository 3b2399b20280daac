use crate::config::CacheConfig;
use crate::error::ConfigError;

/// Bit-field partitioning of an address for one cache geometry.
///
/// ```text
/// | tag_bits | index_bits | offset_bits |
/// ```
///
/// Only constructible from a configuration whose line size and line count are
/// powers of two, so every field can be extracted with shifts and masks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddressLayout {
    memory_bits: u32,
    offset_bits: u32,
    index_bits: u32,
    tag_bits: u32,
    offset_mask: u64,
    index_mask: u64,
}

/// Upper bound on the line count of a simulated cache (16M lines).
pub const MAX_INDEX_BITS: u32 = 24;

/// The three fields of a decoded address.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DecodedAddress {
    pub offset: u64,
    pub index: u64,
    pub tag: u64,
}

impl AddressLayout {
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let CacheConfig {
            memory_bits,
            cache_size,
            line_size,
            ..
        } = *config;

        if cache_size == 0 {
            return Err(ConfigError::Zero {
                field: "cache_size",
            });
        }
        if line_size == 0 {
            return Err(ConfigError::Zero { field: "line_size" });
        }
        if cache_size % line_size != 0 {
            return Err(ConfigError::NotDivisible {
                cache_size,
                line_size,
            });
        }
        if !line_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "line_size",
                value: line_size,
            });
        }

        let lines = cache_size / line_size;
        if !lines.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "line count (cache_size / line_size)",
                value: lines,
            });
        }
        if !(1..=u64::BITS).contains(&memory_bits) {
            return Err(ConfigError::MemoryBits { memory_bits });
        }

        // powers of two: log2 is exact
        let offset_bits = line_size.ilog2();
        let index_bits = lines.ilog2();
        let Some(tag_bits) = memory_bits.checked_sub(offset_bits + index_bits) else {
            return Err(ConfigError::NegativeTagBits {
                memory_bits,
                index_bits,
                offset_bits,
            });
        };
        if index_bits > MAX_INDEX_BITS || usize::try_from(lines).is_err() {
            return Err(ConfigError::TooManyLines {
                lines,
                index_bits,
                max_index_bits: MAX_INDEX_BITS,
            });
        }

        Ok(Self {
            memory_bits,
            offset_bits,
            index_bits,
            tag_bits,
            offset_mask: line_size - 1,
            index_mask: lines - 1,
        })
    }

    pub fn memory_bits(&self) -> u32 {
        self.memory_bits
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    pub fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    pub fn line_size(&self) -> u64 {
        self.offset_mask + 1
    }

    pub fn lines(&self) -> u64 {
        self.index_mask + 1
    }

    /// Whether `address` is representable with `memory_bits` bits.
    pub fn fits(&self, address: u64) -> bool {
        address.checked_shr(self.memory_bits).unwrap_or(0) == 0
    }

    pub fn decode(&self, address: u64) -> DecodedAddress {
        DecodedAddress {
            offset: address & self.offset_mask,
            index: (address >> self.offset_bits) & self.index_mask,
            tag: address
                .checked_shr(self.offset_bits + self.index_bits)
                .unwrap_or(0),
        }
    }

    /// Inverse of [`AddressLayout::decode`] for addresses that [`fit`](Self::fits).
    pub fn compose(&self, fields: DecodedAddress) -> u64 {
        let tag = fields
            .tag
            .checked_shl(self.offset_bits + self.index_bits)
            .unwrap_or(0);
        tag | (fields.index << self.offset_bits) | fields.offset
    }
}

/// Decodes a single address, validating the geometry first.
pub fn decode(address: u64, config: &CacheConfig) -> Result<DecodedAddress, ConfigError> {
    AddressLayout::new(config).map(|layout| layout.decode(address))
}

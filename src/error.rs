/// A cache configuration that cannot be turned into a valid address layout.
///
/// Every variant names the offending value and the constraint it violates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got 0")]
    Zero { field: &'static str },
    #[error("cache size {cache_size}B is not a multiple of the line size {line_size}B")]
    NotDivisible { cache_size: u64, line_size: u64 },
    #[error("{field} must be a power of two, got {value}")]
    NotPowerOfTwo { field: &'static str, value: u64 },
    #[error("memory_bits must be within 1..=64, got {memory_bits}")]
    MemoryBits { memory_bits: u32 },
    #[error(
        "memory_bits {memory_bits} leaves no room for {index_bits} index bits and {offset_bits} offset bits"
    )]
    NegativeTagBits {
        memory_bits: u32,
        index_bits: u32,
        offset_bits: u32,
    },
    #[error("{lines} cache lines ({index_bits} index bits) exceed the supported maximum of {max_index_bits} index bits")]
    TooManyLines {
        lines: u64,
        index_bits: u32,
        max_index_bits: u32,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("invalid cache configuration: {0}")]
    Configuration(#[from] ConfigError),
    #[error("access #{sequence}: address {address} does not fit in {memory_bits} address bits")]
    AddressOutOfRange {
        sequence: u64,
        address: u64,
        memory_bits: u32,
    },
    #[error("trace '{name}' unavailable: {reason}")]
    TraceUnavailable { name: String, reason: String },
    #[error("failed to parse trace '{name}':\n{message}")]
    TraceSyntax { name: String, message: String },
}

impl SimError {
    pub fn trace_unavailable(name: impl Into<String>, reason: impl ToString) -> Self {
        SimError::TraceUnavailable {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

pub mod cache;
pub mod config;
pub mod decoder;
pub mod dual;
pub mod error;
pub mod format;
pub mod simulation;
pub mod stats;
pub mod trace;

pub use config::CacheConfig;
pub use error::{ConfigError, SimError};
pub use simulation::{AccessRecord, SimulationResult, Simulator, simulate};

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
use wasm_bindgen::prelude::*;

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
#[wasm_bindgen]
pub fn run_simulation(
    trace: &str,
    memory_bits: u32,
    memory_cycles: u32,
    cache_size: u64,
    line_size: u64,
    cache_cycles: u32,
    binary_trace: bool,
    binary_fields: bool,
) -> String {
    let config = CacheConfig {
        memory_bits,
        memory_cycles,
        cache_size,
        line_size,
        cache_cycles,
    };
    let encoding = if binary_trace {
        trace::TraceEncoding::Binary
    } else {
        trace::TraceEncoding::Decimal
    };

    format::render(&config, trace, encoding, binary_fields).unwrap_or_else(|e| e.to_string())
}

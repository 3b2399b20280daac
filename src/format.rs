//! Text rendering of access records and finished runs.

use crate::config::CacheConfig;
use crate::decoder::AddressLayout;
use crate::error::SimError;
use crate::simulation::{AccessRecord, SimulationResult, simulate};
use crate::trace::{Trace, TraceEncoding};

const SEPARATOR: &str = "-------------------------";

/// `value` as binary digits, zero padded to `width`. A zero-width field renders empty.
pub fn binary(value: u64, width: u32) -> String {
    if width == 0 {
        return String::new();
    }
    format!("{value:0width$b}", width = width as usize)
}

fn field(value: u64, width: u32, binary_fields: bool) -> String {
    if binary_fields && width > 0 {
        format!("{value} ({})", binary(value, width))
    } else {
        value.to_string()
    }
}

impl AccessRecord {
    pub fn format(&self, layout: &AddressLayout, binary_fields: bool) -> String {
        let totals = &self.totals;
        [
            format!(
                "Access #{}: Address = {}",
                self.sequence,
                field(self.address, layout.memory_bits(), binary_fields)
            ),
            format!(
                "Offset: {}, Index: {}, Tag: {}",
                field(self.fields.offset, layout.offset_bits(), binary_fields),
                field(self.fields.index, layout.index_bits(), binary_fields),
                field(self.fields.tag, layout.tag_bits(), binary_fields),
            ),
            format!("Result: {}", self.outcome),
            format!("Total Hits so far: {}", totals.hits),
            format!("Total Misses so far: {}", totals.misses),
            format!("Total Accesses so far: {}", totals.total_accesses),
            SEPARATOR.to_string(),
        ]
        .join("\n")
    }
}

impl SimulationResult {
    pub fn format_cache_state(&self, binary_fields: bool) -> String {
        let mut result = vec!["Final Cache State:".to_string()];
        result.extend(self.lines.iter().enumerate().map(|(i, line)| {
            format!(
                "Line {i}: Valid Bit = {}, Tag = {}",
                u8::from(line.valid),
                field(line.tag, self.layout.tag_bits(), binary_fields)
            )
        }));
        result.join("\n")
    }

    pub fn format_summary(&self) -> String {
        let config = &self.config;
        let layout = &self.layout;
        let stats = &self.stats;
        [
            format!("Trace: {}", self.name),
            format!(
                "Cache: {}B, {} lines of {}B, | {} tag bits | {} index bits | {} offset bits |",
                config.cache_size,
                layout.lines(),
                layout.line_size(),
                layout.tag_bits(),
                layout.index_bits(),
                layout.offset_bits()
            ),
            format!(
                "Cache-Hit: {} cycles, Cache-Miss: {} cycles",
                config.cache_cycles,
                config.cache_cycles + config.memory_cycles
            ),
            format!("Total Accesses: {}", stats.total_accesses),
            format!(
                "Hits: {}, Misses: {} (cold: {}, conflict: {})",
                stats.hits, stats.misses, stats.cold_misses, stats.conflict_misses
            ),
            format!("Hit Ratio: {:.4}", self.report.hit_ratio),
            format!("Miss Ratio: {:.4}", self.report.miss_ratio),
            format!(
                "Average Memory Access Time (AMAT): {:.2} cycles",
                self.report.amat
            ),
        ]
        .join("\n")
    }
}

/// Parses `trace` and renders the whole run: every access, the final cache state and the summary.
pub fn render(
    config: &CacheConfig,
    trace: &str,
    encoding: TraceEncoding,
    binary_fields: bool,
) -> Result<String, SimError> {
    let trace = Trace::parse("trace", trace, encoding)?;
    let layout = config.validate()?;

    let mut result = Vec::new();
    let simulation_result = simulate(config, trace.name(), trace.addresses(), |record| {
        result.push(record.format(&layout, binary_fields))
    })?;
    result.push(simulation_result.format_cache_state(binary_fields));
    result.push(simulation_result.format_summary());

    Ok(result.join("\n"))
}

use crate::cache::CacheHit;
use crate::config::CacheConfig;

/// Counters of one simulation run. Owned by a single simulator.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    pub total_accesses: u64,
    pub hits: u64,
    pub misses: u64,
    /// Misses on a line that was still invalid.
    pub cold_misses: u64,
    /// Misses that overwrote a different resident tag.
    pub conflict_misses: u64,
}

impl RunStatistics {
    pub fn record(&mut self, outcome: CacheHit) {
        match outcome {
            CacheHit::Hit => self.hits += 1,
            CacheHit::Miss { prev: None } => {
                self.misses += 1;
                self.cold_misses += 1;
            }
            CacheHit::Miss { prev: Some(_) } => {
                self.misses += 1;
                self.conflict_misses += 1;
            }
        }
        self.total_accesses += 1;
    }
}

/// Hit ratio, miss ratio and average memory access time of a finished run.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Report {
    pub hit_ratio: f64,
    pub miss_ratio: f64,
    /// Average memory access time in cycles.
    pub amat: f64,
}

impl Report {
    /// All values are 0 for a run without accesses.
    pub fn new(stats: &RunStatistics, config: &CacheConfig) -> Self {
        if stats.total_accesses == 0 {
            return Self {
                hit_ratio: 0.0,
                miss_ratio: 0.0,
                amat: 0.0,
            };
        }

        let total = stats.total_accesses as f64;
        let cache_cycles = f64::from(config.cache_cycles);
        let miss_cycles = cache_cycles + f64::from(config.memory_cycles);
        let total_cycles = stats.hits as f64 * cache_cycles + stats.misses as f64 * miss_cycles;

        Self {
            hit_ratio: stats.hits as f64 / total,
            miss_ratio: stats.misses as f64 / total,
            amat: total_cycles / total,
        }
    }
}

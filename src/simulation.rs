use crate::cache::{CacheHit, CacheLine, DirectMappedCache};
use crate::config::CacheConfig;
use crate::decoder::{AddressLayout, DecodedAddress};
use crate::error::SimError;
use crate::stats::{Report, RunStatistics};

/// Outcome of one access, handed to the caller as soon as it is classified.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    /// 1-based position in the trace.
    pub sequence: u64,
    pub address: u64,
    pub fields: DecodedAddress,
    pub outcome: CacheHit,
    /// Counters including this access.
    pub totals: RunStatistics,
}

/// Replays addresses against one direct-mapped cache.
#[derive(Debug)]
pub struct Simulator<'c> {
    config: &'c CacheConfig,
    layout: AddressLayout,
    cache: DirectMappedCache,
    stats: RunStatistics,
}

impl<'c> Simulator<'c> {
    pub fn new(config: &'c CacheConfig) -> Result<Self, SimError> {
        let layout = config.validate()?;

        Ok(Self {
            config,
            layout,
            cache: DirectMappedCache::new(&layout),
            stats: RunStatistics::default(),
        })
    }

    pub fn layout(&self) -> &AddressLayout {
        &self.layout
    }

    pub fn statistics(&self) -> &RunStatistics {
        &self.stats
    }

    pub fn cache(&self) -> &DirectMappedCache {
        &self.cache
    }

    /// Invalidates every line and clears the counters.
    pub fn reset(&mut self) {
        self.cache.reset();
        self.stats = RunStatistics::default();
    }

    pub fn access(&mut self, address: u64) -> Result<AccessRecord, SimError> {
        let sequence = self.stats.total_accesses + 1;
        if !self.layout.fits(address) {
            return Err(SimError::AddressOutOfRange {
                sequence,
                address,
                memory_bits: self.layout.memory_bits(),
            });
        }

        let fields = self.layout.decode(address);
        let outcome = self.cache.lookup(fields.index, fields.tag);
        if !outcome.is_hit() {
            self.cache.install(fields.index, fields.tag);
        }
        self.stats.record(outcome);

        log::debug!(
            "#{sequence} {address:#x} index={} tag={:#x} {outcome}",
            fields.index,
            fields.tag
        );

        Ok(AccessRecord {
            sequence,
            address,
            fields,
            outcome,
            totals: self.stats,
        })
    }

    /// Processes `addresses` strictly in order, passing every record to `on_access`.
    ///
    /// Stops at the first address that does not fit in `memory_bits`.
    pub fn run<I, F>(&mut self, addresses: I, mut on_access: F) -> Result<&RunStatistics, SimError>
    where
        I: IntoIterator<Item = u64>,
        F: FnMut(&AccessRecord),
    {
        for address in addresses {
            let record = self.access(address)?;
            on_access(&record);
        }

        Ok(&self.stats)
    }

    pub fn finish(self, name: impl Into<String>) -> SimulationResult {
        SimulationResult {
            name: name.into(),
            config: *self.config,
            layout: self.layout,
            stats: self.stats,
            report: Report::new(&self.stats, self.config),
            lines: self.cache.lines().to_vec(),
        }
    }
}

/// Final state of a completed run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub name: String,
    pub config: CacheConfig,
    pub layout: AddressLayout,
    pub stats: RunStatistics,
    pub report: Report,
    pub lines: Vec<CacheLine>,
}

/// Runs a whole trace against a fresh cache.
///
/// Any error aborts the run; no partial result is returned.
pub fn simulate<F>(
    config: &CacheConfig,
    name: &str,
    addresses: &[u64],
    on_access: F,
) -> Result<SimulationResult, SimError>
where
    F: FnMut(&AccessRecord),
{
    let mut simulator = Simulator::new(config)?;
    log::info!(
        "{name}: {} lines of {}B, | {} tag bits | {} index bits | {} offset bits |",
        simulator.layout().lines(),
        simulator.layout().line_size(),
        simulator.layout().tag_bits(),
        simulator.layout().index_bits(),
        simulator.layout().offset_bits(),
    );

    if let Err(e) = simulator.run(addresses.iter().copied(), on_access) {
        log::error!("{name}: {e}");
        return Err(e);
    }

    let result = simulator.finish(name);
    log::info!(
        "{name}: {} accesses, {} hits, {} misses",
        result.stats.total_accesses,
        result.stats.hits,
        result.stats.misses
    );
    Ok(result)
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::error::ConfigError;

    fn config() -> CacheConfig {
        CacheConfig {
            memory_bits: 8,
            memory_cycles: 100,
            cache_size: 16,
            line_size: 4,
            cache_cycles: 2,
        }
    }

    fn outcomes(config: &CacheConfig, addresses: &[u64]) -> Vec<bool> {
        let mut hits = Vec::new();
        simulate(config, "test", addresses, |record| {
            hits.push(record.outcome.is_hit())
        })
        .unwrap();
        hits
    }

    #[test]
    fn example() {
        crate::test::init_logging();

        let mut records = Vec::new();
        let result = simulate(&config(), "example", &[0, 4, 8, 0], |record| {
            records.push(*record)
        })
        .unwrap();

        assert_eq!(result.stats.hits, 1);
        assert_eq!(result.stats.misses, 3);
        assert_eq!(result.stats.total_accesses, 4);
        assert_eq!(result.report.amat, 77.0);

        let fields: Vec<_> = records
            .iter()
            .map(|r| (r.fields.index, r.fields.tag, r.outcome.is_hit()))
            .collect();
        assert_eq!(
            fields,
            [(0, 0, false), (1, 0, false), (2, 0, false), (0, 0, true)]
        );
        assert_eq!(
            records.iter().map(|r| r.sequence).collect::<Vec<_>>(),
            [1, 2, 3, 4]
        );
        assert_eq!(records[3].totals, result.stats);

        assert_eq!(
            result.lines,
            [
                CacheLine { valid: true, tag: 0 },
                CacheLine { valid: true, tag: 0 },
                CacheLine { valid: true, tag: 0 },
                CacheLine::default(),
            ]
        );
    }

    #[test]
    fn same_index_same_tag_hits() {
        // 1 and 3 share line 0 with tag 0
        assert_eq!(outcomes(&config(), &[1, 3]), [false, true]);
    }

    #[test]
    fn conflict_overwrites() {
        // 0 and 16 both map to index 0 with tags 0 and 1
        let mut records = Vec::new();
        let result =
            simulate(&config(), "conflict", &[0, 16, 0], |r| records.push(*r)).unwrap();

        assert_eq!(
            records.iter().map(|r| r.outcome).collect::<Vec<_>>(),
            [
                CacheHit::Miss { prev: None },
                CacheHit::Miss { prev: Some(0) },
                CacheHit::Miss { prev: Some(1) },
            ]
        );
        assert_eq!(result.stats.cold_misses, 1);
        assert_eq!(result.stats.conflict_misses, 2);
        assert_eq!(result.lines[0], CacheLine { valid: true, tag: 0 });
    }

    #[test]
    fn first_access_to_every_index_misses() {
        let addresses: Vec<u64> = (0..4).map(|index| index * 4 + 64).collect();
        assert_eq!(outcomes(&config(), &addresses), [false; 4]);
    }

    #[test]
    fn out_of_range() {
        let mut seen = 0;
        let err = simulate(&config(), "range", &[0, 255, 256, 4], |_| seen += 1).unwrap_err();

        assert!(matches!(
            err,
            SimError::AddressOutOfRange {
                sequence: 3,
                address: 256,
                memory_bits: 8
            }
        ));
        assert_eq!(seen, 2);
    }

    #[test]
    fn invalid_config_before_any_access() {
        let config = CacheConfig {
            line_size: 3,
            ..config()
        };
        let mut seen = 0;
        let err = simulate(&config, "bad", &[0, 1], |_| seen += 1).unwrap_err();

        assert!(matches!(
            err,
            SimError::Configuration(ConfigError::NotDivisible { .. })
        ));
        assert_eq!(seen, 0);
    }

    #[test]
    fn oversized_cache_is_a_configuration_error() {
        let config = CacheConfig {
            memory_bits: 64,
            cache_size: 1 << 62,
            line_size: 1,
            ..config()
        };

        assert!(config.validate().is_err());
        assert!(matches!(
            Simulator::new(&config).unwrap_err(),
            SimError::Configuration(ConfigError::TooManyLines { .. })
        ));
    }

    #[test]
    fn empty_trace() {
        let result = simulate(&config(), "empty", &[], |_| {}).unwrap();
        assert_eq!(result.stats, RunStatistics::default());
        assert_eq!(result.report.amat, 0.0);
    }

    #[test]
    fn reset() {
        let config = config();
        let mut simulator = Simulator::new(&config).unwrap();
        simulator.run([0, 0], |_| {}).unwrap();
        assert_eq!(simulator.statistics().hits, 1);

        simulator.reset();
        assert_eq!(*simulator.statistics(), RunStatistics::default());
        assert!(!simulator.access(0).unwrap().outcome.is_hit());
    }

    #[test]
    fn deterministic_and_counted() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = CacheConfig {
            memory_bits: 16,
            cache_size: 256,
            line_size: 16,
            ..config()
        };

        for _ in 0..20 {
            let addresses: Vec<u64> = (0..500).map(|_| rng.random_range(0..1024)).collect();

            let first = outcomes(&config, &addresses);
            let second = outcomes(&config, &addresses);
            assert_eq!(first, second);

            let result = simulate(&config, "random", &addresses, |_| {}).unwrap();
            assert_eq!(
                result.stats.hits + result.stats.misses,
                result.stats.total_accesses
            );
            assert_eq!(result.stats.total_accesses, addresses.len() as u64);
            assert_eq!(
                result.stats.cold_misses + result.stats.conflict_misses,
                result.stats.misses
            );
        }
    }
}

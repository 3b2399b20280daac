use crate::config::CacheConfig;
use crate::error::SimError;
use crate::simulation::{AccessRecord, SimulationResult, simulate};
use crate::trace::Trace;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Instruction,
    Data,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Instruction => f.write_str("I-Cache"),
            StreamKind::Data => f.write_str("D-Cache"),
        }
    }
}

/// Results of a split instruction/data simulation.
///
/// Each side fails on its own; an error in one never discards the other.
#[derive(Debug)]
pub struct DualSimulation {
    pub instruction: Result<SimulationResult, SimError>,
    pub data: Result<SimulationResult, SimError>,
}

impl DualSimulation {
    pub fn get(&self, kind: StreamKind) -> &Result<SimulationResult, SimError> {
        match kind {
            StreamKind::Instruction => &self.instruction,
            StreamKind::Data => &self.data,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.instruction.is_ok() && self.data.is_ok()
    }
}

/// Simulates the instruction and data streams against two independent caches.
///
/// Both runs share only the read-only `config` and execute on their own
/// scoped thread. Every record of a stream goes to that stream's callback.
pub fn simulate_split<FI, FD>(
    config: &CacheConfig,
    instructions: &[u64],
    data: &[u64],
    on_instruction: FI,
    on_data: FD,
) -> DualSimulation
where
    FI: FnMut(&AccessRecord) + Send,
    FD: FnMut(&AccessRecord) + Send,
{
    std::thread::scope(|s| {
        let instruction = s.spawn(move || {
            simulate(
                config,
                &StreamKind::Instruction.to_string(),
                instructions,
                on_instruction,
            )
        });
        let data = s.spawn(move || simulate(config, &StreamKind::Data.to_string(), data, on_data));

        DualSimulation {
            instruction: join(instruction),
            data: join(data),
        }
    })
}

/// Like [`simulate_split`], but for traces that may have failed to load.
///
/// A stream whose trace is unavailable reports that error; the other stream
/// is still simulated.
pub fn simulate_traces<FI, FD>(
    config: &CacheConfig,
    instructions: Result<Trace, SimError>,
    data: Result<Trace, SimError>,
    on_instruction: FI,
    on_data: FD,
) -> DualSimulation
where
    FI: FnMut(&AccessRecord) + Send,
    FD: FnMut(&AccessRecord) + Send,
{
    match (instructions, data) {
        (Ok(instructions), Ok(data)) => simulate_split(
            config,
            instructions.addresses(),
            data.addresses(),
            on_instruction,
            on_data,
        ),
        (instructions, data) => DualSimulation {
            instruction: instructions.and_then(|trace| {
                let name = StreamKind::Instruction.to_string();
                simulate(config, &name, trace.addresses(), on_instruction)
            }),
            data: data.and_then(|trace| {
                let name = StreamKind::Data.to_string();
                simulate(config, &name, trace.addresses(), on_data)
            }),
        },
    }
}

fn join<T>(handle: std::thread::ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

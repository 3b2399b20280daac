use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use direct_mapped_sim::dual::{StreamKind, simulate_traces};
use direct_mapped_sim::trace::{Trace, TraceEncoding};
use direct_mapped_sim::{AccessRecord, CacheConfig, SimulationResult, simulate};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// simulate one trace against a single cache
    Run(RunArgs),
    /// simulate separate instruction and data traces against two caches
    Split(SplitArgs),
}

#[derive(Args, Debug)]
struct CacheArgs {
    /// JSON file with the cache parameters, individual flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of bits needed to address memory (16-40)
    #[arg(long)]
    memory_bits: Option<u32>,
    /// Memory access time in cycles (50-200)
    #[arg(long)]
    memory_cycles: Option<u32>,
    /// Total cache size S in bytes
    #[arg(long, short = 's')]
    cache_size: Option<u64>,
    /// Cache line size L in bytes
    #[arg(long, short = 'l')]
    line_size: Option<u64>,
    /// Cache access time in cycles (1-10)
    #[arg(long)]
    cache_cycles: Option<u32>,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// How addresses without a 0x/0b/0o prefix are read
    #[arg(short, long, value_enum, default_value_t = TraceEncoding::Decimal)]
    encoding: TraceEncoding,
    /// Also print address fields as fixed-width binary
    #[arg(short, long)]
    binary_fields: bool,
    /// Omit the per-access output
    #[arg(short, long)]
    quiet: bool,
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    cache: CacheArgs,
    #[command(flatten)]
    output: OutputArgs,
    /// File with the comma separated access sequence
    trace: PathBuf,
}

#[derive(Args, Debug)]
struct SplitArgs {
    #[command(flatten)]
    cache: CacheArgs,
    #[command(flatten)]
    output: OutputArgs,
    /// File with the instruction access sequence
    #[arg(short, long)]
    instructions: PathBuf,
    /// File with the data access sequence
    #[arg(short, long)]
    data: PathBuf,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    match args.command {
        Command::Run(RunArgs {
            cache,
            output,
            trace,
        }) => {
            init_logging(output.verbose);
            let config = cache.resolve()?;
            let layout = config.validate()?;
            let trace = Trace::from_file(trace, output.encoding)?;

            let result = simulate(&config, trace.name(), trace.addresses(), |record| {
                if !output.quiet {
                    println!("{}", record.format(&layout, output.binary_fields));
                }
            })?;
            print_result(&result, output.binary_fields);
            Ok(())
        }
        Command::Split(SplitArgs {
            cache,
            output,
            instructions,
            data,
        }) => {
            init_logging(output.verbose);
            let config = cache.resolve()?;
            let layout = config.validate()?;

            let mut instruction_log = Vec::new();
            let mut data_log = Vec::new();
            let on_instruction = |record: &AccessRecord| {
                if !output.quiet {
                    instruction_log.push(record.format(&layout, output.binary_fields));
                }
            };
            let on_data = |record: &AccessRecord| {
                if !output.quiet {
                    data_log.push(record.format(&layout, output.binary_fields));
                }
            };

            let outcome = simulate_traces(
                &config,
                Trace::from_file(instructions, output.encoding),
                Trace::from_file(data, output.encoding),
                on_instruction,
                on_data,
            );

            let mut failed = 0;
            for (kind, records) in [
                (StreamKind::Instruction, &instruction_log),
                (StreamKind::Data, &data_log),
            ] {
                println!("===== {kind} =====");
                for line in records {
                    println!("{line}");
                }
                match outcome.get(kind) {
                    Ok(result) => print_result(result, output.binary_fields),
                    Err(e) => {
                        failed += 1;
                        println!("error: {e}");
                    }
                }
                println!();
            }

            if failed > 0 {
                anyhow::bail!("{failed} of 2 simulations failed");
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::init();
    }
}

fn print_result(result: &SimulationResult, binary_fields: bool) {
    println!("\n{}", result.format_cache_state(binary_fields));
    println!("\n{}", result.format_summary());
}

impl CacheArgs {
    fn resolve(self) -> Result<CacheConfig> {
        let base = match &self.config {
            Some(path) => Some(read_config(path)?),
            None => None,
        };
        self.merge(base)
    }

    /// Flags win over the config file; a field missing from both is an error.
    fn merge(&self, base: Option<CacheConfig>) -> Result<CacheConfig> {
        Ok(CacheConfig {
            memory_bits: required(self.memory_bits, base.map(|c| c.memory_bits), "memory-bits")?,
            memory_cycles: required(
                self.memory_cycles,
                base.map(|c| c.memory_cycles),
                "memory-cycles",
            )?,
            cache_size: required(self.cache_size, base.map(|c| c.cache_size), "cache-size")?,
            line_size: required(self.line_size, base.map(|c| c.line_size), "line-size")?,
            cache_cycles: required(
                self.cache_cycles,
                base.map(|c| c.cache_cycles),
                "cache-cycles",
            )?,
        })
    }
}

fn read_config(path: &Path) -> Result<CacheConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = CacheConfig::from_json(&content)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    log::info!("loaded {config:?} from {}", path.display());
    Ok(config)
}

fn required<T>(flag: Option<T>, from_config: Option<T>, name: &str) -> Result<T> {
    flag.or(from_config)
        .with_context(|| format!("missing --{name} (or a --config file providing it)"))
}

#[cfg(test)]
mod test {
    use super::*;

    fn demo_config() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/config.json")
    }

    fn no_flags() -> CacheArgs {
        CacheArgs {
            config: None,
            memory_bits: None,
            memory_cycles: None,
            cache_size: None,
            line_size: None,
            cache_cycles: None,
        }
    }

    #[test]
    fn config_file() {
        let config = CacheArgs {
            config: Some(demo_config()),
            ..no_flags()
        }
        .resolve()
        .unwrap();

        assert_eq!(
            config,
            CacheConfig {
                memory_bits: 8,
                memory_cycles: 100,
                cache_size: 16,
                line_size: 4,
                cache_cycles: 2,
            }
        );
    }

    #[test]
    fn flag_overrides_config_file() {
        let config = CacheArgs {
            config: Some(demo_config()),
            memory_bits: Some(16),
            cache_cycles: Some(5),
            ..no_flags()
        }
        .resolve()
        .unwrap();

        assert_eq!(config.memory_bits, 16);
        assert_eq!(config.cache_cycles, 5);
        assert_eq!(config.memory_cycles, 100);
        assert_eq!(config.cache_size, 16);
    }

    #[test]
    fn flags_only() {
        let args = CacheArgs {
            memory_bits: Some(8),
            memory_cycles: Some(100),
            cache_size: Some(16),
            line_size: Some(4),
            cache_cycles: Some(2),
            ..no_flags()
        };
        assert_eq!(args.merge(None).unwrap().line_size, 4);
    }

    #[test]
    fn missing_field() {
        let args = CacheArgs {
            memory_bits: Some(8),
            ..no_flags()
        };
        let err = args.merge(None).unwrap_err();
        assert!(err.to_string().contains("missing --memory-cycles"), "{err}");
    }

    #[test]
    fn unreadable_config_file() {
        let args = CacheArgs {
            config: Some(PathBuf::from("does/not/exist.json")),
            ..no_flags()
        };
        assert!(args.resolve().is_err());
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from([
            "dmsim",
            "split",
            "--memory-bits",
            "8",
            "-c",
            "demos/config.json",
            "-i",
            "i.trace",
            "-d",
            "d.trace",
            "--encoding",
            "binary",
        ])
        .unwrap();

        let Command::Split(args) = cli.command else {
            panic!("expected split");
        };
        assert_eq!(args.cache.memory_bits, Some(8));
        assert_eq!(args.output.encoding, TraceEncoding::Binary);
        assert_eq!(args.instructions, PathBuf::from("i.trace"));
    }
}

//! Replay a text branch trace and report BTB and direction prediction
//! statistics.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use btbsim::*;
use btbsim::config::{FillPolicy, PredictorMode};
use btbsim::error::ConfigError;
use btbsim::stats::BranchData;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File path to the trace
    trace: PathBuf,
    /// Number of BTB entries
    #[arg(required_unless_present = "sweep")]
    capacity: Option<usize>,
    /// Replay once per BTB size instead (comma-separated; powers of two
    /// from 1 to 1024 when no sizes are given)
    #[arg(long, value_delimiter = ',', num_args = 0.., conflicts_with_all = ["capacity", "top"])]
    sweep: Option<Vec<usize>>,
    /// Direction predictors to run
    #[arg(long, value_enum, default_value_t = PredictorMode::Dynamic)]
    mode: PredictorMode,
    /// Rule used by the static predictor
    #[arg(long, value_enum, default_value_t = StaticRule::CachePresence)]
    static_rule: StaticRule,
    /// When resolved branches are written into the BTB
    #[arg(long, value_enum, default_value_t = FillPolicy::TakenOnly)]
    fill: FillPolicy,
    /// Number of two-bit counters (defaults to the BTB capacity)
    #[arg(long)]
    pht_size: Option<usize>,
    /// Starting state of every two-bit counter
    #[arg(long, value_enum, default_value_t = CounterState::WeaklyTaken)]
    initial_state: CounterState,
    /// Also list the N most frequent and N least predictable branches
    #[arg(long, default_value_t = 0)]
    top: usize,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self, capacity: usize) -> Result<SimConfig> {
        let cfg = SimConfig::new(capacity)?
            .with_mode(self.mode)
            .with_static_rule(self.static_rule)
            .with_fill(self.fill)
            .with_initial_state(self.initial_state);
        Ok(cfg)
    }

    fn pht_size(&self) -> Result<Option<NonZeroUsize>, ConfigError> {
        self.pht_size
            .map(|n| NonZeroUsize::new(n).ok_or(ConfigError::ZeroTableSize))
            .transpose()
    }
}

fn run_sweep(args: &Cli, trace: &TextTrace, capacities: &[usize]) -> Result<()> {
    let capacities = if capacities.is_empty() {
        btbsim::sweep::DEFAULT_CAPACITIES
    } else {
        capacities
    };
    let base = args.config(1)?;
    let report = SweepReport::run(trace.as_slice(), &base, capacities, args.pht_size()?)?;

    if args.json {
        let out = serde_json::json!({
            "trace": trace.name(),
            "mode": base.mode,
            "static_rule": base.static_rule,
            "fill": base.fill,
            "initial_state": base.initial_state,
            "sweep": report,
        });
        let text = serde_json::to_string_pretty(&out)
            .context("failed to serialize sweep")?;
        println!("{}", text);
    } else {
        println!("Trace file: {}", args.trace.display());
        println!();
        println!("{}", report);
    }
    Ok(())
}

fn print_branches(title: &str, branches: &[(u32, &BranchData)]) {
    println!("{}:", title);
    for (pc, data) in branches {
        println!("  {:08x} {:8}/{:8} hit {:6.2}% taken {:6.2}%",
            pc, data.hits, data.occ,
            data.hit_rate() * 100.0,
            data.taken_ratio() * 100.0,
        );
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .init();
    } else {
        env_logger::init();
    }

    let trace = TextTrace::from_file(&args.trace)?;
    log::info!("read {} records from {} ({} malformed)",
        trace.num_entries(), trace.name(), trace.malformed()
    );

    if let Some(capacities) = &args.sweep {
        return run_sweep(&args, &trace, capacities);
    }

    let capacity = args.capacity.context("missing BTB capacity")?;
    let mut cfg = args.config(capacity)?;
    if let Some(size) = args.pht_size()? {
        cfg.pht_size = size;
    }

    let mut sim = Simulator::from_config(&cfg);
    sim.run(trace.as_slice());
    let report = sim.report();

    if args.json {
        let out = serde_json::json!({
            "trace": trace.name(),
            "config": cfg,
            "report": report,
        });
        let text = serde_json::to_string_pretty(&out)
            .context("failed to serialize report")?;
        println!("{}", text);
        return Ok(());
    }

    println!("Trace file: {}", args.trace.display());
    println!("BTB size:   {} entries", cfg.btb_capacity);
    println!();
    println!("{}", report);

    if args.top > 0 {
        let branches = &sim.stats().branches;
        println!();
        print_branches("Most frequent branches", &branches.top_branches(args.top));
        println!();
        print_branches("Least predictable branches",
            &branches.hardest_branches(args.top, 2)
        );
    }
    Ok(())
}

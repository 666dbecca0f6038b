//! Write a synthetic text trace to stdout.

use std::io::{self, BufWriter, Write};
use anyhow::Result;
use clap::Parser;
use btbsim::trace::synth::TraceSynthesizer;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Seed for site layout and execution order
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of records to generate
    #[arg(long, default_value_t = 10_000)]
    len: usize,
    /// Number of distinct branch sites
    #[arg(long, default_value_t = 64)]
    sites: usize,
    /// Address of the first site
    #[arg(long, default_value = "8000", value_parser = parse_hex)]
    base: u32,
}

fn parse_hex(s: &str) -> Result<u32, std::num::ParseIntError> {
    u32::from_str_radix(s.trim_start_matches("0x"), 16)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let mut synth = TraceSynthesizer::new(args.seed);
    synth.add_random_sites(args.sites, args.base);
    let records = synth.generate(args.len);
    log::info!("generated {} records over {} sites", records.len(), synth.num_sites());

    let mut out = BufWriter::new(io::stdout().lock());
    for record in &records {
        writeln!(out, "{}", record)?;
    }
    out.flush()?;
    Ok(())
}

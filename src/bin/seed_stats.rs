//! Show which seeds were useful, useless or invalid in a fuzzing session.
//!
//! The verdicts are taken from the fuzzer's console log; since the fuzzer
//! copies seed files into its import directory under new names, the log must
//! contain the source and destination names of the copied seeds to map
//! seeds back to payloads.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tdvf_tools::{logging, seeds};

#[derive(Parser, Debug)]
#[command(
    name = "tdvf-seed-stats",
    about = "Show which seeds were useful, useless or invalid in a fuzzing session",
    long_about = None
)]
struct Opt {
    /// Path to the fuzzer log (default: $BKC_ROOT/scripts/fuzz.log)
    #[arg(short = 'l', value_name = "LOGFILE")]
    logfile: Option<PathBuf>,

    /// Also print the payload each seed was copied from
    #[arg(short = 'p')]
    payloads: bool,
}

fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let opt = Opt::parse();

    let log_path = match opt.logfile {
        Some(path) => path,
        None => std::env::var_os("BKC_ROOT")
            .map(|root| PathBuf::from(root).join("scripts/fuzz.log"))
            .context("no -l given and BKC_ROOT is not set")?,
    };

    let text = std::fs::read_to_string(&log_path)
        .with_context(|| format!("reading fuzzer log {}", log_path.display()))?;
    let stats = seeds::parse_log(&text);
    print!("{}", seeds::render(&stats, opt.payloads));
    Ok(())
}

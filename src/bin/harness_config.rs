//! Configure kAFL fuzzing harnesses for TDVF.
//!
//! Toggles the harness selection defines in the agent library header, inside
//! the sentinel-bounded configuration region. The TDVF tree is given either
//! on the command line or through the TDVF_ROOT environment variable.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tdvf_tools::harness::{self, HarnessFlag};
use tdvf_tools::logging;

#[derive(Parser, Debug)]
#[command(
    name = "tdvf-harness-config",
    about = "Configure kAFL fuzzing harnesses for TDVF",
    long_about = None,
    group(clap::ArgGroup::new("action").required(true).args(["enable", "disable", "print"]))
)]
struct Opt {
    /// Enable the harness selected by FLAG (e.g. FUZZ_BOOT_LOADER)
    #[arg(short, long, value_name = "FLAG")]
    enable: Option<String>,

    /// Disable the harness selected by FLAG
    #[arg(short, long, value_name = "FLAG")]
    disable: Option<String>,

    /// Print the current harness configuration
    #[arg(short, long)]
    print: bool,

    /// TDVF source tree to search for the agent header
    /// (default: $TDVF_ROOT)
    #[arg(long, value_name = "DIR")]
    tdvf_root: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let opt = Opt::parse();

    let tdvf_root = match opt.tdvf_root {
        Some(root) => root,
        None => std::env::var_os("TDVF_ROOT")
            .map(PathBuf::from)
            .context("no --tdvf-root given and TDVF_ROOT is not set")?,
    };

    let header_path = harness::find_agent_header(&tdvf_root)?;
    let header = std::fs::read_to_string(&header_path)
        .with_context(|| format!("reading {}", header_path.display()))?;

    if opt.print {
        for (flag, enabled) in harness::read_config(&header)? {
            let state = if enabled { "enabled" } else { "disabled" };
            println!("{}: {}", flag.name(), state);
        }
        return Ok(());
    }

    let (name, enabled) = match (&opt.enable, &opt.disable) {
        (Some(name), None) => (name, true),
        (None, Some(name)) => (name, false),
        _ => unreachable!("clap group guarantees exactly one action"),
    };
    let flag = HarnessFlag::from_name(name)?;

    let updated = harness::set_flag(&header, flag, enabled)?;
    std::fs::write(&header_path, updated)
        .with_context(|| format!("writing {}", header_path.display()))?;
    Ok(())
}

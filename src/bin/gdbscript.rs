//! Create a GDB script that imports module debug symbols, attaches to the
//! running qemu session, and optionally sets a hardware breakpoint.
//!
//! The module information comes from the JSON file written by
//! `tdvf-code-range -j`.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tdvf_tools::core::{Address, ModuleTable};
use tdvf_tools::{gdb, logging};

const DEFAULT_SCRIPT_FILE: &str = "gdbscript";

#[derive(Parser, Debug)]
#[command(
    name = "tdvf-gdbscript",
    about = "Generate a GDB script importing TDVF module debug symbols",
    long_about = None
)]
struct Opt {
    /// Path to the module json file created by tdvf-code-range
    #[arg(short = 'm', value_name = "MODULEFILE", default_value = "modules.json")]
    modules: PathBuf,

    /// 64-bit hex address at which a hardware breakpoint will be set
    #[arg(value_name = "BREAKPOINT")]
    address: Option<String>,

    /// Write the script to SCRIPTFILE instead of stdout
    #[arg(
        short = 's',
        value_name = "SCRIPTFILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_SCRIPT_FILE
    )]
    script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let opt = Opt::parse();

    let json = std::fs::read_to_string(&opt.modules)
        .with_context(|| format!("reading module file {}", opt.modules.display()))?;
    let table = ModuleTable::from_json(&json)?;

    let breakpoint = opt.address.as_deref().map(Address::parse).transpose()?;
    let script = gdb::build_script(&table, &gdb::GdbTarget::default(), breakpoint)?;

    match &opt.script {
        Some(path) => std::fs::write(path, script)
            .with_context(|| format!("writing script file {}", path.display()))?,
        None => print!("{script}"),
    }
    Ok(())
}

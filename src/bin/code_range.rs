//! Obtain IntelPT code ranges for TDVF modules loaded in a QEMU session.
//!
//! Which modules were loaded comes from a QEMU debug log; their `.text`
//! section information comes from the TDVF `.debug` build files.

use anyhow::{ensure, Context};
use clap::Parser;
use std::path::PathBuf;
use tdvf_tools::core::TdvfModule;
use tdvf_tools::{bootlog, build_tree, logging};

#[derive(Parser, Debug)]
#[command(
    name = "tdvf-code-range",
    about = "Obtain IntelPT code ranges for TDVF modules loaded in a qemu session",
    long_about = None
)]
struct Opt {
    /// Path to a file containing debug prints of a qemu TDVF session
    #[arg(value_name = "LOGFILE")]
    logfile: PathBuf,

    /// Path to the TDVF Build directory containing module .debug and FV map
    /// files (e.g. tdvf/Build)
    #[arg(value_name = "BUILDDIR")]
    builddir: PathBuf,

    /// Modules whose code range should be displayed (default: all loaded
    /// modules)
    #[arg(value_name = "MODULE")]
    module: Vec<String>,

    /// Print the module information as a table instead of the short form
    #[arg(short, long, conflicts_with = "json")]
    table: bool,

    /// Store the module information in a json file
    #[arg(short = 'j', value_name = "FILENAME")]
    json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let opt = Opt::parse();

    ensure!(opt.logfile.is_file(), "no such log file: {}", opt.logfile.display());
    ensure!(opt.builddir.is_dir(), "no such build directory: {}", opt.builddir.display());

    // modules and base addresses announced in the boot log
    let mut table = bootlog::scan_boot_log(&opt.logfile)
        .with_context(|| format!("parsing boot log {}", opt.logfile.display()))?;

    // SecMain is not announced; its base is in the SEC FV map file
    let map_path = build_tree::find_fv_map(&opt.builddir)?;
    let sec_base = bootlog::secmain_base(&map_path)
        .with_context(|| format!("parsing FV map {}", map_path.display()))?;
    table.insert(TdvfModule::new(bootlog::SEC_MAIN_NAME, sec_base));

    let module_paths = build_tree::find_debug_files(&opt.builddir)?;
    build_tree::assign_debug_paths(&mut table, &module_paths)?;
    table.fill_text_info()?;

    if let Some(json_path) = &opt.json {
        table.write_json(&opt.module, json_path)?;
    } else if opt.table {
        print!("{}", table.render_table(&opt.module)?);
    } else {
        print!("{}", table.render_short(&opt.module)?);
    }
    Ok(())
}

//! Count occurrences of the different exception types for fuzzing session
//! findings (crash, kasan, timeout).
//!
//! Log files can be given directly or through the log-file directory of a
//! kAFL workdir (e.g. $KAFL_WORKDIR/logs).

use anyhow::{bail, ensure};
use clap::Parser;
use std::path::PathBuf;
use tdvf_tools::{findings, logging};

#[derive(Parser, Debug)]
#[command(
    name = "tdvf-exceptions",
    about = "Count exception types in fuzzing session findings",
    long_about = None
)]
struct Opt {
    /// Paths to findings log files (e.g. crash_12345.log)
    #[arg(value_name = "LOGFILE")]
    logfile: Vec<PathBuf>,

    /// Directory containing the findings log files
    #[arg(short = 'd', value_name = "LOGDIR")]
    logdir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let opt = Opt::parse();

    if opt.logfile.is_empty() && opt.logdir.is_none() {
        bail!("specify at least one log file or a logfile directory");
    }

    let files = match &opt.logdir {
        Some(dir) => {
            ensure!(dir.is_dir(), "no such directory: {}", dir.display());
            findings::log_files_in(dir)?
        }
        None => opt.logfile,
    };

    let counts = findings::count_files(&files)?;
    print!("{}", findings::render(&counts));
    Ok(())
}

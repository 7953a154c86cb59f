//! Populate the CodeQL queries for Pio, Mmio, Msr and Cr accessors from the
//! query template of the code-locations pack.

use anyhow::ensure;
use clap::Parser;
use std::path::PathBuf;
use tdvf_tools::{codeql, logging};

#[derive(Parser, Debug)]
#[command(
    name = "tdvf-ql-queries",
    about = "Populate CodeQL I/O queries from the pack template",
    long_about = None
)]
struct Opt {
    /// Query pack directory holding query.template; generated .ql files
    /// land here too
    #[arg(long, value_name = "DIR", default_value = "./io-pack")]
    pack_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let opt = Opt::parse();

    ensure!(opt.pack_dir.is_dir(), "no such pack directory: {}", opt.pack_dir.display());
    let template = opt.pack_dir.join("query.template");
    ensure!(template.is_file(), "no query template: {}", template.display());

    let written = codeql::populate_standard_queries(&template, &opt.pack_dir)?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

//! Developer-support tooling for the TDVF/kAFL fuzzing workflow.
//!
//! The heart of the crate is the module/address registry: a small catalog
//! mapping firmware module names to their load address, debug file, and
//! derived `.text` code range. It is populated from a QEMU boot log and the
//! SEC flash-volume map, enriched from the ELF debug files of the build
//! tree, and rendered as a table, a compact range, a JSON interchange
//! document, or a GDB import script.
//!
//! Around it sit the smaller session helpers: harness flag toggling in the
//! agent header, crash exception summaries, seed usefulness statistics, and
//! CodeQL query templating. Each ships as an independent binary under
//! `src/bin/`.

/// Core data types: Address, TdvfModule, ModuleTable
pub mod core;

/// QEMU boot-log and FV map-file scanning
pub mod bootlog;
/// Debug-file discovery in the TDVF build tree
pub mod build_tree;
/// CodeQL query templating
pub mod codeql;
/// `.text` section extraction from ELF debug files
pub mod elf;
/// Error types shared by all tools
pub mod error;
/// Crash exception summaries
pub mod findings;
/// GDB script generation
pub mod gdb;
/// Harness flag configuration in the agent header
pub mod harness;
/// Tracing setup for the binaries
pub mod logging;
/// Seed usefulness statistics
pub mod seeds;

pub use error::{Result, TdvfError};

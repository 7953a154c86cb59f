//! Crash exception summaries for fuzzing session findings.
//!
//! Findings logs (crash, kasan, timeout) contain the guest exception frame
//! dump; the `Exception Type - NN` token identifies the x86 exception
//! vector. This module counts vector occurrences across one or many logs.

use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// x86 exception vector names, indexed by vector number.
// obtained from https://wiki.osdev.org/Exceptions
pub const EXCEPTION_NAMES: [&str; 32] = [
    "Division Error",
    "Debug",
    "Non-maskable Interrupt",
    "Breakpoint",
    "Overflow",
    "Bound Range Exceeded",
    "Invalid Opcode",
    "Device Not Available",
    "Double Fault",
    "Coprocessor Segment Overrun",
    "Invalid TSS",
    "Segment Not Present",
    "Stack-Segment Fault",
    "General Protection Fault",
    "Page Fault",
    "Reserved",
    "x87 Floating-Point Exception",
    "Alignment Check",
    "Machine Check",
    "SIMD Floating-Point Exception",
    "Virtualization Exception",
    "Control Protection Exception",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Hypervisor Injection Exception",
    "VMM Communication Exception",
    "Security Exception",
    "Reserved",
];

/// Name for an exception vector, `Unknown` past the architectural range.
pub fn exception_name(code: u8) -> &'static str {
    EXCEPTION_NAMES
        .get(code as usize)
        .copied()
        .unwrap_or("Unknown")
}

static EXCEPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Exception Type - ([0-9A-F]{1,2})").unwrap());

/// Count per-vector exception occurrences in log text.
pub fn count_in(text: &str) -> BTreeMap<u8, u64> {
    let mut counts = BTreeMap::new();
    for caps in EXCEPTION_RE.captures_iter(text) {
        // the pattern only admits 1-2 hex digits, so this always fits a u8
        if let Ok(code) = u8::from_str_radix(&caps[1], 16) {
            *counts.entry(code).or_insert(0) += 1;
        }
    }
    counts
}

/// Merge exception counts across several findings logs.
pub fn count_files<P: AsRef<Path>>(paths: &[P]) -> Result<BTreeMap<u8, u64>> {
    let mut totals = BTreeMap::new();
    for path in paths {
        let text = std::fs::read_to_string(path)?;
        for (code, count) in count_in(&text) {
            *totals.entry(code).or_insert(0) += count;
        }
    }
    Ok(totals)
}

/// List the `*.log` findings files of a workdir log directory.
pub fn log_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "log"))
        .collect();
    files.sort();
    Ok(files)
}

/// Render the counts sorted by vector: `Name (0xN): count` lines.
pub fn render(counts: &BTreeMap<u8, u64>) -> String {
    let mut out = String::new();
    for (code, count) in counts {
        out.push_str(&format!("{} ({:#x}): {}\n", exception_name(*code), code, count));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
!!!! X64 Exception Type - 0E(#PF - Page Fault)  CPU Apic ID - 00000000 !!!!
register dump follows
!!!! X64 Exception Type - 0E(#PF - Page Fault)  CPU Apic ID - 00000000 !!!!
!!!! X64 Exception Type - 6(#UD - Invalid Opcode)  CPU Apic ID - 00000000 !!!!
";

    #[test]
    fn test_count_in() {
        let counts = count_in(LOG);
        assert_eq!(counts.get(&0x0e), Some(&2));
        assert_eq!(counts.get(&0x06), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_render_sorted_by_code() {
        let counts = count_in(LOG);
        assert_eq!(
            render(&counts),
            "Invalid Opcode (0x6): 1\nPage Fault (0xe): 2\n"
        );
    }

    #[test]
    fn test_exception_name_bounds() {
        assert_eq!(exception_name(0x0), "Division Error");
        assert_eq!(exception_name(0x1f), "Reserved");
        assert_eq!(exception_name(0x20), "Unknown");
    }

    #[test]
    fn test_count_files_merges() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("crash_1.log");
        let b = tmp.path().join("crash_2.log");
        std::fs::write(&a, "Exception Type - 0D extra\n").unwrap();
        std::fs::write(&b, "Exception Type - 0D\nException Type - 0E\n").unwrap();

        let counts = count_files(&[a, b]).unwrap();
        assert_eq!(counts.get(&0x0d), Some(&2));
        assert_eq!(counts.get(&0x0e), Some(&1));
    }

    #[test]
    fn test_log_files_in_filters_extension() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("crash_1.log"), "").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "").unwrap();
        let files = log_files_in(tmp.path()).unwrap();
        assert_eq!(files.len(), 1);
    }
}

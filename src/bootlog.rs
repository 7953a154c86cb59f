//! QEMU boot-log and FV map-file scanning.
//!
//! The boot log announces every driver the firmware loads; the DXE core and
//! the SEC phase entry module are special. Driver lines look like
//!
//! ```text
//! Loading driver at 0x00007E61C000 EntryPoint=0x00007E624AC6 VirtioBlkDxe.efi
//! ```
//!
//! while the DXE core announces itself without a filename token and SecMain
//! is not announced at all; its base comes from the `BaseAddress=` line of
//! the SEC flash-volume map file.

use crate::core::{Address, ModuleTable, TdvfModule};
use crate::error::{Result, TdvfError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

/// Synthetic name for the DXE core entry (its log line has no `.efi` token).
pub const DXE_CORE_NAME: &str = "DxeCore";
/// Synthetic name for the SEC phase module (announced in the FV map file).
pub const SEC_MAIN_NAME: &str = "SecMain";

// Memory addresses in the log have 8 to 16 significant hex digits.
static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"0x[0-9a-fA-F]{8,16}").unwrap());
static DRIVER_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Loading driver at 0x.*EntryPoint=0x.*\.efi").unwrap());
static DXE_CORE_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Loading DXE CORE at 0x").unwrap());
static MODULE_FILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\.efi$").unwrap());
static BASE_ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"BaseAddress=(0x[0-9a-fA-F]{8,16})").unwrap());

fn module_name_from_line(line: &str) -> Result<String> {
    let caps = MODULE_FILE_RE
        .captures(line)
        .ok_or_else(|| TdvfError::NotFound(format!("module name in line {line:?}")))?;
    Ok(caps[1].to_string())
}

fn module_address_from_line(line: &str) -> Result<Address> {
    let m = ADDRESS_RE
        .find(line)
        .ok_or_else(|| TdvfError::NotFound(format!("module address in line {line:?}")))?;
    Address::parse(m.as_str())
}

/// Scan boot-log text for loaded-driver announcements.
///
/// Lines matching neither the driver nor the DXE core pattern are ignored;
/// a log without any driver line yields a smaller (possibly empty) table,
/// which is not an error by itself. A later line for the same module name
/// replaces the earlier entry.
pub fn parse_boot_log(text: &str) -> Result<ModuleTable> {
    let mut table = ModuleTable::new();
    for line in text.lines().map(str::trim) {
        let (name, address) = if DRIVER_LINE_RE.is_match(line) {
            let name = module_name_from_line(line)?;
            if name.contains("HelloWorld") {
                // HelloWorld.efi is the harness smoke-test payload, not firmware
                continue;
            }
            (name, module_address_from_line(line)?)
        } else if DXE_CORE_LINE_RE.is_match(line) {
            (DXE_CORE_NAME.to_string(), module_address_from_line(line)?)
        } else {
            continue;
        };
        debug!(module = %name, base = %address, "found loaded module");
        table.insert(TdvfModule::new(name, address));
    }
    if table.is_empty() {
        warn!("boot log contains no loaded-driver lines");
    }
    Ok(table)
}

/// Scan a boot-log file for loaded-driver announcements.
pub fn scan_boot_log(path: &Path) -> Result<ModuleTable> {
    parse_boot_log(&std::fs::read_to_string(path)?)
}

/// Extract the SecMain base address from FV map-file text.
///
/// The first `BaseAddress=<hex>` token wins; a map file without one is a
/// `NotFound` error.
pub fn parse_secmain_base(text: &str) -> Result<Address> {
    let caps = text
        .lines()
        .find_map(|line| BASE_ADDRESS_RE.captures(line))
        .ok_or_else(|| TdvfError::NotFound("BaseAddress= line in FV map file".to_string()))?;
    Address::parse(&caps[1])
}

/// Extract the SecMain base address from an FV map file.
pub fn secmain_base(map_path: &Path) -> Result<Address> {
    parse_secmain_base(&std::fs::read_to_string(map_path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
InstallProtocolInterface: 5B1B31A1-9562-11D2-8E3F-00A0C969723B 7E61C540
Loading driver at 0x00007E61C000 EntryPoint=0x00007E624AC6 Foo.efi
Loading DXE CORE at 0x0000010000000 EntryPoint=0x000001000A124
some unrelated diagnostic output
";

    #[test]
    fn test_driver_and_core_lines() {
        let table = parse_boot_log(LOG).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get("Foo").unwrap().img_base,
            Address::parse("0x00007E61C000").unwrap()
        );
        assert_eq!(
            table.get(DXE_CORE_NAME).unwrap().img_base,
            Address::parse("0x0000010000000").unwrap()
        );
    }

    #[test]
    fn test_zero_driver_lines_is_not_an_error() {
        let table =
            parse_boot_log("Loading DXE CORE at 0x0000010000000 EntryPoint=0x000001000A124\n")
                .unwrap();
        assert_eq!(table.len(), 1);

        let empty = parse_boot_log("nothing of interest\n").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_hello_world_is_skipped() {
        let log = "Loading driver at 0x00007E61C000 EntryPoint=0x00007E624AC6 HelloWorld.efi\n";
        let table = parse_boot_log(log).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_later_line_replaces_earlier_entry() {
        let log = "\
Loading driver at 0x00007E61C000 EntryPoint=0x00007E624AC6 Foo.efi
Loading driver at 0x00007F000000 EntryPoint=0x00007F004AC6 Foo.efi
";
        let table = parse_boot_log(log).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("Foo").unwrap().img_base.value(), 0x7f00_0000);
    }

    #[test]
    fn test_secmain_base() {
        let map = "\
SecMain (Fixed Flash Address, BaseAddress=0x00fffcc000, EntryPoint=0x00fffcc94a, Type=PE)
EFI_SECTION_PE32
";
        let base = parse_secmain_base(map).unwrap();
        assert_eq!(base.value(), 0xfffc_c000);
    }

    #[test]
    fn test_secmain_base_missing() {
        assert!(matches!(
            parse_secmain_base("no base address here\n"),
            Err(TdvfError::NotFound(_))
        ));
    }
}

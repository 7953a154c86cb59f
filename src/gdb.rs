//! GDB script generation.
//!
//! Builds the command script that imports every module's debug symbols,
//! attaches to the waiting QEMU gdbserver, and optionally places one
//! hardware breakpoint. Everything here is a pure transformation over the
//! module table; writing the script is the caller's single output call.

use crate::core::{Address, ModuleTable, TdvfModule};
use crate::error::Result;

/// Remote target the generated script attaches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GdbTarget {
    pub host: String,
    pub port: u16,
}

impl Default for GdbTarget {
    fn default() -> Self {
        // qemu's gdbserver listens on localhost:1234 by default
        Self {
            host: "localhost".to_string(),
            port: 1234,
        }
    }
}

/// One `add-symbol-file` command for a module.
///
/// Requires a resolved debug path; the base address is rendered in
/// canonical form so GDB and the boot log agree digit for digit.
pub fn import_line(module: &TdvfModule) -> Result<String> {
    let debug_path = module.debug_path()?;
    Ok(format!(
        "add-symbol-file {} {}",
        debug_path.display(),
        module.img_base.to_hex(true)
    ))
}

/// `target remote` attach command.
pub fn attach_line(target: &GdbTarget) -> String {
    format!("target remote {}:{}", target.host, target.port)
}

/// `hbreak` command for a hardware breakpoint at `addr`.
pub fn break_line(addr: Address) -> String {
    format!("hbreak *{}", addr.to_hex(true))
}

/// Assemble the full script: one import per module (in name order), the
/// attach command, and an optional breakpoint.
pub fn build_script(
    table: &ModuleTable,
    target: &GdbTarget,
    breakpoint: Option<Address>,
) -> Result<String> {
    let mut lines = Vec::with_capacity(table.len() + 2);
    for module in table.iter() {
        lines.push(import_line(module)?);
    }
    lines.push(attach_line(target));
    if let Some(addr) = breakpoint {
        lines.push(break_line(addr));
    }
    Ok(lines.join("\n") + "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TdvfError;

    fn module(name: &str, base: u64, path: Option<&str>) -> TdvfModule {
        let mut m = TdvfModule::new(name, Address::new(base));
        m.d_path = path.map(Into::into);
        m
    }

    #[test]
    fn test_import_line() {
        let m = module("CpuDxe", 0x7e61c000, Some("/build/CpuDxe.debug"));
        assert_eq!(
            import_line(&m).unwrap(),
            "add-symbol-file /build/CpuDxe.debug 0x000000007e61c000"
        );
    }

    #[test]
    fn test_import_line_without_debug_path() {
        let m = module("CpuDxe", 0x7e61c000, None);
        assert!(matches!(import_line(&m), Err(TdvfError::NotFound(_))));
    }

    #[test]
    fn test_attach_line_default_target() {
        assert_eq!(
            attach_line(&GdbTarget::default()),
            "target remote localhost:1234"
        );
    }

    #[test]
    fn test_full_script() {
        let table: ModuleTable = [
            module("SecMain", 0xfffcc000, Some("/build/SecMain.debug")),
            module("CpuDxe", 0x7e61c000, Some("/build/CpuDxe.debug")),
        ]
        .into_iter()
        .collect();

        let script = build_script(
            &table,
            &GdbTarget::default(),
            Some(Address::parse("0xfffcc94a").unwrap()),
        )
        .unwrap();

        let lines: Vec<_> = script.lines().collect();
        assert_eq!(
            lines,
            [
                "add-symbol-file /build/CpuDxe.debug 0x000000007e61c000",
                "add-symbol-file /build/SecMain.debug 0x00000000fffcc000",
                "target remote localhost:1234",
                "hbreak *0x00000000fffcc94a",
            ]
        );
        assert!(script.ends_with('\n'));
    }
}

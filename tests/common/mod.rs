//! Shared fixtures for the integration tests.
//!
//! Builds the minimal on-disk shape of a TDVF fuzzing session: a QEMU boot
//! log, an EDK2-style build tree with `.debug` ELF files and the SEC FV map,
//! all inside a temp directory.

use std::fs;
use std::path::{Path, PathBuf};

/// Build a minimal ELF64 relocatable image with a single `.text` section at
/// the given file offset and size.
///
/// Layout: ELF header, padding up to `text_offset`, the `.text` bytes, the
/// `.shstrtab` payload, then the section header table (null, `.text`,
/// `.shstrtab`).
pub fn minimal_elf(text_offset: u64, text_size: u64) -> Vec<u8> {
    assert!(text_offset >= 0x40, "text section cannot overlap the ELF header");

    let shstrtab: &[u8] = b"\0.text\0.shstrtab\0";
    let shstr_offset = text_offset + text_size;
    let shoff = (shstr_offset + shstrtab.len() as u64 + 7) & !7;

    let mut elf = Vec::new();
    // e_ident: magic, 64-bit, little-endian, version 1, SysV
    elf.extend_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1, 0]);
    elf.extend_from_slice(&[0u8; 8]);
    push_u16(&mut elf, 1); // e_type = ET_REL
    push_u16(&mut elf, 0x3e); // e_machine = EM_X86_64
    push_u32(&mut elf, 1); // e_version
    push_u64(&mut elf, 0); // e_entry
    push_u64(&mut elf, 0); // e_phoff
    push_u64(&mut elf, shoff); // e_shoff
    push_u32(&mut elf, 0); // e_flags
    push_u16(&mut elf, 64); // e_ehsize
    push_u16(&mut elf, 0); // e_phentsize
    push_u16(&mut elf, 0); // e_phnum
    push_u16(&mut elf, 64); // e_shentsize
    push_u16(&mut elf, 3); // e_shnum
    push_u16(&mut elf, 2); // e_shstrndx

    elf.resize(text_offset as usize, 0);
    elf.resize((text_offset + text_size) as usize, 0x90); // nop sled
    elf.extend_from_slice(shstrtab);
    elf.resize(shoff as usize, 0);

    // section headers: name, type, flags, addr, offset, size, link, info,
    // addralign, entsize
    push_section(&mut elf, 0, 0, 0, 0, 0, 0, 0); // SHT_NULL
    push_section(&mut elf, 1, 1, 6, text_offset, text_size, 16, 0); // .text PROGBITS AX
    push_section(&mut elf, 7, 3, 0, shstr_offset, shstrtab.len() as u64, 1, 0); // .shstrtab STRTAB

    elf
}

#[allow(clippy::too_many_arguments)]
fn push_section(
    elf: &mut Vec<u8>,
    name: u32,
    sh_type: u32,
    flags: u64,
    offset: u64,
    size: u64,
    addralign: u64,
    entsize: u64,
) {
    push_u32(elf, name);
    push_u32(elf, sh_type);
    push_u64(elf, flags);
    push_u64(elf, 0); // sh_addr
    push_u64(elf, offset);
    push_u64(elf, size);
    push_u32(elf, 0); // sh_link
    push_u32(elf, 0); // sh_info
    push_u64(elf, addralign);
    push_u64(elf, entsize);
}

fn push_u16(v: &mut Vec<u8>, x: u16) {
    v.extend_from_slice(&x.to_le_bytes());
}
fn push_u32(v: &mut Vec<u8>, x: u32) {
    v.extend_from_slice(&x.to_le_bytes());
}
fn push_u64(v: &mut Vec<u8>, x: u64) {
    v.extend_from_slice(&x.to_le_bytes());
}

/// Create an EDK2-style build tree under `root`.
///
/// Writes one minimal `.debug` ELF per `(module file name, text offset,
/// text size)` entry and the SEC FV map declaring `secmain_base`.
pub fn make_build_tree(root: &Path, modules: &[(&str, u64, u64)], secmain_base: u64) -> PathBuf {
    let x64 = root.join("IntelTdx/DEBUG_GCC5/X64");
    let fv = root.join("IntelTdx/DEBUG_GCC5/FV");
    fs::create_dir_all(&x64).unwrap();
    fs::create_dir_all(&fv).unwrap();

    for (file_name, offset, size) in modules {
        fs::write(x64.join(file_name), minimal_elf(*offset, *size)).unwrap();
    }
    fs::write(
        fv.join("SECFV.Fv.map"),
        format!(
            "SecMain (Fixed Flash Address, BaseAddress={:#012x}, EntryPoint=0x00fffcc94a, Type=PE)\n",
            secmain_base
        ),
    )
    .unwrap();
    x64
}

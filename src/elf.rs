//! `.text` section extraction from module debug files.
//!
//! The EDK2 `.debug` files are plain ELF images; the code range of a module
//! is the first section whose name starts with `.text`, shifted by the
//! module's image base. Files are memory-mapped and parsed read-only.

use crate::error::{Result, TdvfError};
use memmap2::Mmap;
use object::read::{Object, ObjectSection};
use std::fs::File;
use std::path::Path;
use tracing::trace;

/// File offset and size of a `.text` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSection {
    pub offset: u64,
    pub size: u64,
}

/// Find the first `.text*` section in an in-memory ELF image.
pub fn text_section_in(data: &[u8]) -> Result<TextSection> {
    let obj = object::read::File::parse(data)?;
    for section in obj.sections() {
        let Ok(name) = section.name() else { continue };
        if !name.starts_with(".text") {
            continue;
        }
        if let Some((offset, size)) = section.file_range() {
            trace!(section = name, offset, size, "located text section");
            return Ok(TextSection { offset, size });
        }
    }
    Err(TdvfError::NotFound(".text section".to_string()))
}

/// Find the first `.text*` section of an ELF debug file on disk.
pub fn text_section(path: &Path) -> Result<TextSection> {
    let file = File::open(path)?;
    // Safety: read-only mapping of a regular file opened above.
    let mmap = unsafe { Mmap::map(&file)? };
    text_section_in(&mmap).map_err(|err| match err {
        TdvfError::NotFound(_) => {
            TdvfError::NotFound(format!(".text section in {}", path.display()))
        }
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_a_parse_error() {
        let err = text_section_in(b"not an elf").unwrap_err();
        assert!(matches!(err, TdvfError::Object(_)));
    }
}

//! Per-module record of the registry.
//!
//! A `TdvfModule` is created with a name and the image base discovered in a
//! boot log or map file, later enriched with the path of its debug file and
//! the derived `.text` range, and never mutated after that.

use crate::core::address::Address;
use crate::error::{Result, TdvfError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Derived `.text` code range of a module.
///
/// `start` is the image base plus the section's in-file offset; `end` is
/// `start + size`. These values must be bit-exact: GDB commands and the
/// fuzzer's IntelPT configuration depend on them matching the addresses the
/// guest actually executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    #[serde(rename = "t_start")]
    pub start: Address,
    #[serde(rename = "t_end")]
    pub end: Address,
    #[serde(rename = "t_size")]
    pub size: u64,
}

impl TextRange {
    /// Compute the range from an image base and the `.text` section's file
    /// offset and size.
    pub fn derive(img_base: Address, offset: u64, size: u64) -> Result<Self> {
        let start = img_base
            .checked_add(offset)
            .ok_or_else(|| TdvfError::Format(format!("{img_base} + {offset:#x} overflows")))?;
        let end = start
            .checked_add(size)
            .ok_or_else(|| TdvfError::Format(format!("{start} + {size:#x} overflows")))?;
        Ok(Self { start, end, size })
    }
}

/// A loadable firmware component with a name, load address and debug symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TdvfModule {
    /// Module name, unique within a table (e.g. `CpuDxe`, `SecMain`)
    pub name: String,
    /// Address at which the module is loaded into guest memory
    pub img_base: Address,
    /// Path to the module's ELF debug file, once resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d_path: Option<PathBuf>,
    /// Derived `.text` range, once filled
    #[serde(flatten)]
    pub text: Option<TextRange>,
}

impl TdvfModule {
    /// Create a module as discovered in a boot log or map file.
    pub fn new(name: impl Into<String>, img_base: Address) -> Self {
        Self {
            name: name.into(),
            img_base,
            d_path: None,
            text: None,
        }
    }

    /// The resolved debug file path, or `NotFound` if resolution has not
    /// happened yet.
    pub fn debug_path(&self) -> Result<&PathBuf> {
        self.d_path
            .as_ref()
            .ok_or_else(|| TdvfError::NotFound(format!("debug file for module {}", self.name)))
    }

    /// The derived text range, or `NotFound` if it has not been filled.
    pub fn text_range(&self) -> Result<&TextRange> {
        self.text
            .as_ref()
            .ok_or_else(|| TdvfError::NotFound(format!(".text info for module {}", self.name)))
    }

    /// Enrich this module with its `.text` range, given the section's file
    /// offset and size.
    pub fn fill_text(&mut self, offset: u64, size: u64) -> Result<()> {
        self.text = Some(TextRange::derive(self.img_base, offset, size)?);
        Ok(())
    }
}

//! Debug-file discovery in the TDVF build tree.
//!
//! The EDK2 build drops one `<Module>.debug` ELF per firmware module under
//! `**/DEBUG_GCC5/X64/`, and the SEC flash-volume map under
//! `**/DEBUG_GCC5/FV/`. Some modules are built twice and get a GUID glued
//! into the file name (`CpuDxe_<guid>.debug`); the GUID is stripped for
//! matching and, to keep the choice deterministic, candidates are taken in
//! lexical path order with first match winning.

use crate::core::ModuleTable;
use crate::error::{Result, TdvfError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

static GUID_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"_[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

fn find_path_with_suffix(root: &Path, suffix: &Path, want_dir: bool) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir() == want_dir)
        .map(|entry| entry.into_path())
        .filter(|path| path.ends_with(suffix))
        .collect();
    candidates.sort();
    candidates.into_iter().next().ok_or_else(|| {
        TdvfError::NotFound(format!("{} under {}", suffix.display(), root.display()))
    })
}

/// Locate the `DEBUG_GCC5/X64` module output directory.
pub fn find_debug_dir(build_dir: &Path) -> Result<PathBuf> {
    find_path_with_suffix(build_dir, Path::new("DEBUG_GCC5/X64"), true)
}

/// Locate the SEC flash-volume map file.
pub fn find_fv_map(build_dir: &Path) -> Result<PathBuf> {
    find_path_with_suffix(build_dir, Path::new("DEBUG_GCC5/FV/SECFV.Fv.map"), false)
}

/// Map module names to their `.debug` file paths.
///
/// File names lose the `.debug` extension and any embedded GUID suffix.
/// When two build variants collapse to the same stripped name the lexically
/// first path wins and the collision is logged.
pub fn find_debug_files(build_dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let debug_dir = find_debug_dir(build_dir)?;

    let mut paths: Vec<PathBuf> = std::fs::read_dir(&debug_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "debug"))
        .collect();
    if paths.is_empty() {
        return Err(TdvfError::NotFound(format!(
            "module debug files in {}",
            debug_dir.display()
        )));
    }
    paths.sort();

    let mut module_paths = BTreeMap::new();
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let name = GUID_SUFFIX_RE.replace(stem, "").into_owned();
        let path = path.canonicalize().unwrap_or(path);
        match module_paths.get(&name) {
            None => {
                debug!(module = %name, path = %path.display(), "found debug file");
                module_paths.insert(name, path);
            }
            Some(existing) => {
                warn!(
                    module = %name,
                    kept = %existing.display(),
                    skipped = %path.display(),
                    "several debug files map to one module, keeping first in lexical order"
                );
            }
        }
    }
    Ok(module_paths)
}

/// Attach debug file paths to every module in the table.
///
/// A module without a matching debug file is a `NotFound` error.
pub fn assign_debug_paths(
    table: &mut ModuleTable,
    module_paths: &BTreeMap<String, PathBuf>,
) -> Result<()> {
    for module in table.iter_mut() {
        let path = module_paths.get(&module.name).ok_or_else(|| {
            TdvfError::NotFound(format!("debug file for module {}", module.name))
        })?;
        module.d_path = Some(path.clone());
    }
    Ok(())
}

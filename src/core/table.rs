//! Name-ordered module table.
//!
//! The table owns its modules exclusively and keeps them keyed by unique
//! name. Inserting a module under an existing name replaces the previous
//! entry: last write wins. That is the documented policy for collisions
//! between the boot-log and map-file sources, not an accident.

use crate::core::module::TdvfModule;
use crate::error::{Result, TdvfError};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Ordered-by-name collection of [`TdvfModule`] records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleTable {
    modules: BTreeMap<String, TdvfModule>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of modules in the table.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Insert a module, replacing any existing entry with the same name.
    pub fn insert(&mut self, module: TdvfModule) {
        if let Some(old) = self.modules.insert(module.name.clone(), module) {
            debug!(module = %old.name, "replaced existing table entry");
        }
    }

    /// Look up a module by name. An absent name is an error, never a
    /// default record.
    pub fn get(&self, name: &str) -> Result<&TdvfModule> {
        self.modules
            .get(name)
            .ok_or_else(|| TdvfError::NotFound(format!("module {name}")))
    }

    /// Iterate modules in name order.
    pub fn iter(&self) -> impl Iterator<Item = &TdvfModule> {
        self.modules.values()
    }

    /// Mutable iteration, used by the enrichment passes.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TdvfModule> {
        self.modules.values_mut()
    }

    /// Enrich every module with its `.text` range.
    ///
    /// `read_text` maps a debug file path to the `.text` section's
    /// (file offset, size) pair; the production reader lives in
    /// [`crate::elf`]. Every module must have a resolved debug path.
    pub fn fill_text_info_with<F>(&mut self, mut read_text: F) -> Result<()>
    where
        F: FnMut(&Path) -> Result<(u64, u64)>,
    {
        for module in self.modules.values_mut() {
            let path = module.debug_path()?.clone();
            let (offset, size) = read_text(&path)?;
            module.fill_text(offset, size)?;
        }
        Ok(())
    }

    /// Enrich every module by reading its ELF debug file.
    pub fn fill_text_info(&mut self) -> Result<()> {
        self.fill_text_info_with(|path| {
            let section = crate::elf::text_section(path)?;
            Ok((section.offset, section.size))
        })
    }

    /// Select modules for presentation. An empty filter selects the whole
    /// table; a filter naming an unknown module is `NotFound`.
    pub fn select(&self, filter: &[String]) -> Result<Vec<&TdvfModule>> {
        if filter.is_empty() {
            return Ok(self.modules.values().collect());
        }
        let mut selected = Vec::with_capacity(filter.len());
        for name in filter {
            selected.push(self.get(name)?);
        }
        Ok(selected)
    }

    /// Render a fixed-width table with name/base/start/end/size columns.
    pub fn render_table(&self, filter: &[String]) -> Result<String> {
        let selected = self.select(filter)?;
        let name_width = selected
            .iter()
            .map(|m| m.name.len())
            .chain(std::iter::once("Module".len()))
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        out.push_str(&format!(
            "{:<name_width$}  {:<18}  {:<18}  {:<18}  {}\n",
            "Module", "Base", ".text Start", ".text End", ".text Size"
        ));
        for module in selected {
            let range = module.text_range()?;
            out.push_str(&format!(
                "{:<name_width$}  {}  {}  {}  {:#x}\n",
                module.name,
                module.img_base.to_hex(true),
                range.start.to_hex(true),
                range.end.to_hex(true),
                range.size
            ));
        }
        Ok(out)
    }

    /// Render the compact per-module form: `name base start-end`, one line
    /// per selected module. The `start-end` token can be pasted straight
    /// into the fuzzer command line.
    pub fn render_short(&self, filter: &[String]) -> Result<String> {
        let selected = self.select(filter)?;
        let mut out = String::new();
        for module in selected {
            let range = module.text_range()?;
            out.push_str(&format!(
                "{} {} {}-{}\n",
                module.name,
                module.img_base.to_hex(true),
                range.start.to_hex(true),
                range.end.to_hex(true)
            ));
        }
        Ok(out)
    }

    /// Serialize the selected modules as a JSON array.
    pub fn to_json(&self, filter: &[String]) -> Result<String> {
        let selected = self.select(filter)?;
        Ok(serde_json::to_string_pretty(&selected)?)
    }

    /// Rebuild a table from its JSON array form.
    pub fn from_json(json: &str) -> Result<Self> {
        let modules: Vec<TdvfModule> = serde_json::from_str(json)?;
        let mut table = Self::new();
        for module in modules {
            table.insert(module);
        }
        Ok(table)
    }

    /// Write the JSON document to a file.
    pub fn write_json(&self, filter: &[String], path: &Path) -> Result<()> {
        let json = self.to_json(filter)?;
        std::fs::write(path, json + "\n")?;
        Ok(())
    }
}

impl FromIterator<TdvfModule> for ModuleTable {
    fn from_iter<I: IntoIterator<Item = TdvfModule>>(iter: I) -> Self {
        let mut table = Self::new();
        for module in iter {
            table.insert(module);
        }
        table
    }
}

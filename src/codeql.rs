//! CodeQL query templating for guest I/O primitives.
//!
//! The code-locations query pack carries one template with `<q-*>`
//! placeholders; a query file is stamped out per (component, action) pair,
//! covering the width-suffixed accessor family of each primitive
//! (`IoRead8/16/32/64`, `AsmReadMsr64`, `AsmWriteCr3`, ...).

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const KW_ID: &str = "<q-id>";
pub const KW_NAME: &str = "<q-name>";
pub const KW_ACTION: &str = "<q-action>";
pub const KW_TAG: &str = "<q-tag>";
pub const KW_FNAMES: [&str; 4] = ["<q-fname-1>", "<q-fname-2>", "<q-fname-3>", "<q-fname-4>"];

/// Order of component and action in the generated accessor names:
/// `IoRead` style vs `AsmReadMsr` style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameOrder {
    ComponentAction,
    ActionComponent,
}

/// Recipe for one family of generated queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub order: NameOrder,
    pub f_prefix: &'static str,
    pub f_postfix: &'static str,
    /// Accessor width suffixes (bit widths, or CR register numbers)
    pub f_counters: [u32; 4],
    pub id_prefix: &'static str,
}

const BIT_WIDTHS: [u32; 4] = [8, 16, 32, 64];

impl QuerySpec {
    /// Plain port/MMIO accessors (`IoRead8` ...).
    pub fn io_std() -> Self {
        Self {
            order: NameOrder::ComponentAction,
            f_prefix: "",
            f_postfix: "",
            f_counters: BIT_WIDTHS,
            id_prefix: "",
        }
    }

    /// Buffer-variant accessors (`MmioReadBuffer8` ...).
    pub fn io_buf(id_prefix: &'static str) -> Self {
        Self {
            f_postfix: "Buffer",
            id_prefix,
            ..Self::io_std()
        }
    }

    /// S3 boot-script accessors (`S3IoRead8` ...).
    pub fn s3_std(id_prefix: &'static str) -> Self {
        Self {
            f_prefix: "S3",
            id_prefix,
            ..Self::io_std()
        }
    }

    /// TD-guest accessors (`TdMmioRead8` ...).
    pub fn td(id_prefix: &'static str) -> Self {
        Self {
            f_prefix: "Td",
            id_prefix,
            ..Self::io_std()
        }
    }

    /// MSR accessors, action first (`AsmReadMsr64` ...).
    pub fn msr() -> Self {
        Self {
            order: NameOrder::ActionComponent,
            f_prefix: "Asm",
            ..Self::io_std()
        }
    }

    /// Control-register accessors, numbered CR0/2/3/4 (`AsmReadCr0` ...).
    pub fn cr() -> Self {
        Self {
            f_counters: [0, 2, 3, 4],
            ..Self::msr()
        }
    }

    /// The keyword replacements for one (component, action) pair.
    pub fn replacements(&self, component: &str, action: &str) -> Vec<(&'static str, String)> {
        let uc_comp = capitalize(component);
        let uc_action = capitalize(action);
        let tag = component.to_uppercase();

        let fname = match self.order {
            NameOrder::ComponentAction => {
                format!("{}{}{}{}", self.f_prefix, uc_comp, uc_action, self.f_postfix)
            }
            NameOrder::ActionComponent => {
                format!("{}{}{}{}", self.f_prefix, uc_action, uc_comp, self.f_postfix)
            }
        };

        let mut repl = vec![
            (KW_ID, format!("{}{component}-{action}", self.id_prefix)),
            (KW_NAME, format!("{tag} {uc_action}")),
            (KW_ACTION, action.to_string()),
            (KW_TAG, tag),
        ];
        for (kw, counter) in KW_FNAMES.iter().copied().zip(self.f_counters) {
            repl.push((kw, format!("{fname}{counter}")));
        }
        repl
    }

    /// Stamp the template for one (component, action) pair.
    pub fn apply(&self, template: &str, component: &str, action: &str) -> String {
        let mut out = template.to_string();
        for (keyword, replacement) in self.replacements(component, action) {
            out = out.replace(keyword, &replacement);
        }
        out
    }

    /// Write one `.ql` file per (component, action) pair into the pack
    /// directory, returning the created paths.
    pub fn populate(
        &self,
        template_path: &Path,
        pack_dir: &Path,
        components: &[&str],
        actions: &[&str],
    ) -> Result<Vec<PathBuf>> {
        let template = std::fs::read_to_string(template_path)?;
        let mut written = Vec::new();
        for component in components {
            for action in actions {
                let path = pack_dir.join(format!("{}{component}-{action}.ql", self.id_prefix));
                std::fs::write(&path, self.apply(&template, component, action))?;
                debug!(path = %path.display(), "populated query");
                written.push(path);
            }
        }
        Ok(written)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// The actions every query family covers.
pub const IO_ACTIONS: [&str; 2] = ["read", "write"];

/// Populate the full standard query set: PIO, MMIO (plain and TD-guest),
/// MSR and CR accessors.
pub fn populate_standard_queries(template_path: &Path, pack_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    written.extend(QuerySpec::io_std().populate(template_path, pack_dir, &["pio"], &IO_ACTIONS)?);
    written.extend(QuerySpec::td("td-").populate(template_path, pack_dir, &["mmio"], &IO_ACTIONS)?);
    written.extend(QuerySpec::io_std().populate(template_path, pack_dir, &["mmio"], &IO_ACTIONS)?);
    written.extend(QuerySpec::msr().populate(template_path, pack_dir, &["msr"], &IO_ACTIONS)?);
    written.extend(QuerySpec::cr().populate(template_path, pack_dir, &["cr"], &IO_ACTIONS)?);
    Ok(written)
}

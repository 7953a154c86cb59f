//! Core data types for the TDVF module registry.
//!
//! This module contains the shared data model of the code-range tools: the
//! Address value type, the per-module record, and the name-ordered module
//! table the tools populate, enrich, and render.

pub mod address;
pub mod module;
pub mod table;

pub use address::Address;
pub use module::{TdvfModule, TextRange};
pub use table::ModuleTable;

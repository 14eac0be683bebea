//! Loading of reference tables from disk.
//!
//! Species and ions come from CSV files with one record per row; plasma
//! configurations come from a TOML file with one table per named
//! configuration.

pub mod reference;

pub use reference::ParamLoadError;

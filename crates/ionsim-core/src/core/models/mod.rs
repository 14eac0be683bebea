//! # Core Models Module
//!
//! Plain data records consumed and produced by the simulation.
//!
//! ## Key Components
//!
//! - [`species`] - Target-material records with optional explicit potential parameters
//! - [`ion`] - Projectile ion records
//! - [`config`] - Plasma chamber, exposure and override settings for a run
//! - [`site`] - Lattice sites produced by the lattice generator
//! - [`tables`] - Arena-backed reference tables and the [`tables::ReferenceStore`] lookup trait
//! - [`ids`] - Stable keys into the reference tables

pub mod config;
pub mod ids;
pub mod ion;
pub mod site;
pub mod species;
pub mod tables;

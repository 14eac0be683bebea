//! # ionsim Core Library
//!
//! Simulation of ion bombardment of crystalline surfaces: how much energy an
//! incoming ion hands to the lattice, how that energy relaxes as heat, and how
//! it drives enhanced diffusion into the material.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Immutable reference records (`AtomSpecies`,
//!   `IonSpecies`, `SimulationConfig`), arena-backed reference tables, and pure
//!   physics: the piecewise pair potential, binary collisions, lattice
//!   generation, resonance, surface relief and plasma parameters.
//!
//! - **[`engine`]: The Logic Core.** Time integrators and iteration over many
//!   sites: the diffusion and thermal solvers, the parallel collision loop, and
//!   the run configuration, context and progress plumbing.
//!
//! - **[`workflows`]: The Public API.** [`workflows::simulate::run`] executes a
//!   complete run; [`workflows::operations`] exposes each stage on its own.
//!
//! ## Features
//!
//! - `parallel` (default): runs the per-site collision loop on rayon workers.
//!   Results are identical with and without it for a fixed seed.

pub mod core;
pub mod engine;
pub mod workflows;

//! # Workflows Module
//!
//! Public entry points of the ion-bombardment simulation.
//!
//! ## Overview
//!
//! [`simulate::run`] sequences a complete run, from resolving the reference
//! records through lattice generation, collisions, thermal relaxation and
//! diffusion, and returns a plain [`simulate::SimulationResult`]. The
//! [`operations`] module exposes the individual stages for callers that need
//! only one of them.
//!
//! ## Architecture
//!
//! - **Simulation Workflow** ([`simulate`]) - The staged run with progress reporting
//! - **Leaf Operations** ([`operations`]) - Potential, collision, lattice, diffusion, thermal, resonance and relief on their own

pub mod operations;
pub mod simulate;

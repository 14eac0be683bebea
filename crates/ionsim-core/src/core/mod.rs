//! # Core Module
//!
//! Stateless building blocks of the ion-bombardment simulation: data models,
//! closed-form physics and small numerical kernels.
//!
//! ## Overview
//!
//! Everything in this layer is a pure function of its inputs or an immutable
//! record. Randomness is injected by the caller, and failures are reported as
//! [`error::InputError`] for inputs that have no physical meaning. Numerical
//! guard conditions are clamped in place and never surface as errors.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Species, ions, plasma configurations, lattice sites and reference tables
//! - **File I/O** ([`io`]) - Loading reference tables from CSV and TOML files
//! - **Crystal Lattices** ([`lattice`]) - Structure lookup tables and lattice generation
//! - **Pair Potential** ([`potential`]) - Piecewise Coulomb / Born-Mayer / Morse potential with stiffness
//! - **Collisions** ([`collision`]) - Binary-collision energy, momentum and damage transfer
//! - **Resonance** ([`resonance`]) - Amplification near the lattice's natural frequency
//! - **Surface Relief** ([`relief`]) - Neighbour-difference roughness operator
//! - **Discharge** ([`plasma`]) - Derived plasma parameters and ion energy
//! - **Ion Flight** ([`trajectory`]) - RK4 Lorentz-force trajectory integration
//! - **Surface Treatment** ([`treatment`]) - Flux, fluence, layer thickness and uniformity penalty
//! - **Numerics** ([`numerics`]) - Thomas solver, Simpson quadrature and finite-value guards
//!
//! ## Units
//!
//! SI throughout, with three exceptions carried over from the reference
//! tables: lattice constants in ångström, cohesive and binding energies in eV,
//! and electron temperature in eV.

pub mod collision;
pub mod constants;
pub mod error;
pub mod io;
pub mod lattice;
pub mod models;
pub mod numerics;
pub mod plasma;
pub mod potential;
pub mod relief;
pub mod resonance;
pub mod trajectory;
pub mod treatment;

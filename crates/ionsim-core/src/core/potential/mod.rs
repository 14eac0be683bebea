//! # Interatomic Potential
//!
//! A piecewise pair potential covering five separation regimes measured in
//! units of `l0 = a/2`:
//!
//! - `r < 0.7 l0` screened Coulomb core
//! - `0.7 l0 ≤ r < 1.35 l0` Born-Mayer repulsive wall
//! - `1.35 l0 ≤ r < 2.0 l0` Morse well
//! - `2.0 l0 ≤ r < 2.5 l0` Morse faded out by a cubic Hermite switch
//! - `r ≥ 2.5 l0` cut off
//!
//! [`forms`] holds the closed-form pieces; [`model::PotentialModel`] binds
//! them to a species and fills in missing parameters.

pub mod forms;
pub mod model;

pub use model::{PotentialEvaluation, PotentialModel, PotentialRegime};

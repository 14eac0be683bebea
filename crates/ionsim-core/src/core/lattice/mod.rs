//! Crystal structures and lattice generation.
//!
//! [`structure::CrystalStructure`] is a closed enum whose per-structure
//! quantities (basis, packing factor, nearest-neighbour distance, collision,
//! diffusion and conductivity factors) are pure lookup functions.
//! [`generator::generate_lattice`] turns a structure and lattice constant into
//! a deterministic list of sites.

pub mod generator;
pub mod structure;

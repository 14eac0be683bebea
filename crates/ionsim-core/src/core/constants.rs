//! Physical constants in SI units (CODATA 2018 exact values where defined).

/// Elementary charge [C]; also the J/eV conversion factor.
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
/// Vacuum permittivity [F/m].
pub const VACUUM_PERMITTIVITY: f64 = 8.854_187_812_8e-12;
/// Boltzmann constant [J/K].
pub const BOLTZMANN: f64 = 1.380_649e-23;
/// Reduced Planck constant [J·s].
pub const HBAR: f64 = 1.054_571_817e-34;
/// Avogadro constant [1/mol].
pub const AVOGADRO: f64 = 6.022_140_76e23;
/// Molar gas constant [J/(mol·K)].
pub const GAS_CONSTANT: f64 = 8.314_462_618;
/// Electron rest mass [kg].
pub const ELECTRON_MASS: f64 = 9.109_383_56e-31;

pub const ANGSTROM: f64 = 1e-10;

#[inline]
pub fn ev_to_joule(ev: f64) -> f64 {
    ev * ELEMENTARY_CHARGE
}

#[inline]
pub fn joule_to_ev(joule: f64) -> f64 {
    joule / ELEMENTARY_CHARGE
}

/// Converts a per-atom energy in eV to a molar energy in J/mol.
#[inline]
pub fn ev_per_atom_to_joule_per_mol(ev: f64) -> f64 {
    ev * ELEMENTARY_CHARGE * AVOGADRO
}

use crate::core::constants::{ANGSTROM, AVOGADRO, ev_to_joule};
use crate::core::lattice::structure::CrystalStructure;
use serde::{Deserialize, Serialize};

/// Explicit interatomic potential parameters. Any field left empty falls back
/// to the heuristics in [`crate::core::potential`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PotentialParams {
    /// Morse well depth [eV].
    pub morse_well_depth_ev: Option<f64>,
    /// Morse range parameter α [1/m].
    pub morse_alpha: Option<f64>,
    /// Morse equilibrium distance [m].
    pub equilibrium_distance: Option<f64>,
    /// Born-Mayer amplitude [J].
    pub born_mayer_amplitude: Option<f64>,
    /// Born-Mayer decay length [m].
    pub born_mayer_length: Option<f64>,
}

/// An immutable target-material record.
///
/// Units follow the reference tables: lattice constant in ångström, mass in
/// kilograms per atom, cohesive energies in eV per atom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomSpecies {
    pub name: String,
    pub mass: f64,
    pub lattice_constant: f64,
    pub debye_temperature: Option<f64>,
    #[serde(default = "default_valence")]
    pub valence: u32,
    pub structure: CrystalStructure,
    pub cohesive_energy_1: Option<f64>,
    pub cohesive_energy_2: Option<f64>,
    pub screening_length: Option<f64>,
    pub diffusion_prefactor_1: Option<f64>,
    pub diffusion_prefactor_2: Option<f64>,
    pub packing_factor: Option<f64>,
    #[serde(default)]
    pub potential: PotentialParams,
    /// Molar mass [kg/mol]; derived from `mass` when absent.
    pub molar_mass: Option<f64>,
    /// Bulk density [kg/m³].
    pub density: Option<f64>,
    /// Thermal conductivity at 300 K [W/(m·K)].
    pub thermal_conductivity: Option<f64>,
}

fn default_valence() -> u32 {
    1
}

impl AtomSpecies {
    /// Builds a species with only the mandatory fields set.
    pub fn new(name: &str, mass: f64, lattice_constant: f64, structure: CrystalStructure) -> Self {
        Self {
            name: name.to_string(),
            mass,
            lattice_constant,
            debye_temperature: None,
            valence: default_valence(),
            structure,
            cohesive_energy_1: None,
            cohesive_energy_2: None,
            screening_length: None,
            diffusion_prefactor_1: None,
            diffusion_prefactor_2: None,
            packing_factor: None,
            potential: PotentialParams::default(),
            molar_mass: None,
            density: None,
            thermal_conductivity: None,
        }
    }

    /// Lattice constant in metres.
    #[inline]
    pub fn lattice_constant_m(&self) -> f64 {
        self.lattice_constant * ANGSTROM
    }

    #[inline]
    pub fn nearest_neighbor_distance_m(&self) -> f64 {
        self.structure
            .nearest_neighbor_distance(self.lattice_constant_m())
    }

    pub fn packing_factor(&self) -> f64 {
        self.packing_factor
            .unwrap_or_else(|| self.structure.packing_factor())
    }

    pub fn molar_mass(&self) -> f64 {
        self.molar_mass.unwrap_or(self.mass * AVOGADRO)
    }

    /// Morse well depth in joules: explicit value first, then the first
    /// cohesive energy.
    pub fn well_depth_j(&self) -> Option<f64> {
        self.potential
            .morse_well_depth_ev
            .or(self.cohesive_energy_1)
            .map(ev_to_joule)
    }
}

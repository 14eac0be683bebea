use crate::core::constants::{BOLTZMANN, GAS_CONSTANT, ev_per_atom_to_joule_per_mol};
use crate::core::error::InputError;
use crate::core::lattice::structure::CrystalStructure;
use crate::core::models::config::DiffusionOverrides;
use crate::core::models::species::AtomSpecies;
use crate::core::numerics::guards::{clamp_finite, guarded_exp};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const MIN_COEFFICIENT: f64 = 1e-40;
pub const MAX_COEFFICIENT: f64 = 1e-6;
pub const MIN_TEMPERATURE: f64 = 1.0;

pub const DEFAULT_D1: f64 = 1e-18;
pub const DEFAULT_D2: f64 = 1e-19;
pub const DEFAULT_Q1: f64 = 8e4;
pub const DEFAULT_Q2: f64 = 1.5e5;

const Q1_COHESIVE_FRACTION: f64 = 0.25;
const Q2_COHESIVE_FRACTION: f64 = 0.45;
const ACTIVATION_STIFFNESS_WEIGHT: f64 = 0.25;
const PREFACTOR_STIFFNESS_DECAY: f64 = 1e-3;
const COLLISION_EXPONENT_CAP: f64 = 20.0;
const COLLISION_ENERGY_DIVISOR: f64 = 20.0;
const MIN_ENERGY_SCALE: f64 = 1e-21;
const RELIEF_GAIN: f64 = 0.05;
const MAX_RELIEF: f64 = 10.0;
const MAX_RESONANCE: f64 = 50.0;
/// Attempt frequency used to turn a damage power into a rate [1/s].
const ATTEMPT_FREQUENCY: f64 = 1e13;

/// Prefactors [m²/s] and activation energies [J/mol] of the two Arrhenius
/// channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrheniusChannels {
    pub d1: f64,
    pub d2: f64,
    pub q1: f64,
    pub q2: f64,
}

impl Default for ArrheniusChannels {
    fn default() -> Self {
        Self {
            d1: DEFAULT_D1,
            d2: DEFAULT_D2,
            q1: DEFAULT_Q1,
            q2: DEFAULT_Q2,
        }
    }
}

impl ArrheniusChannels {
    /// Resolves each channel from the run overrides, then the species record,
    /// then the defaults.
    pub fn for_species(
        species: &AtomSpecies,
        overrides: &DiffusionOverrides,
    ) -> Result<Self, InputError> {
        let d1 = match overrides.d1.or(species.diffusion_prefactor_1) {
            Some(d) if !(d.is_finite() && d > 0.0) => {
                return Err(InputError::NonPositive {
                    name: "diffusion_prefactor_1",
                    value: d,
                });
            }
            Some(d) => d,
            None => DEFAULT_D1,
        };
        let d2 = match overrides.d2.or(species.diffusion_prefactor_2) {
            Some(d) if !(d.is_finite() && d >= 0.0) => {
                return Err(InputError::OutOfRange {
                    name: "diffusion_prefactor_2",
                    value: d,
                    min: 0.0,
                    max: f64::MAX,
                });
            }
            Some(d) => d,
            None => DEFAULT_D2,
        };
        let q1 = overrides.q1.unwrap_or_else(|| {
            species
                .cohesive_energy_1
                .map_or(DEFAULT_Q1, |e| Q1_COHESIVE_FRACTION * ev_per_atom_to_joule_per_mol(e))
        });
        let q2 = overrides.q2.unwrap_or_else(|| {
            species
                .cohesive_energy_2
                .map_or(DEFAULT_Q2, |e| Q2_COHESIVE_FRACTION * ev_per_atom_to_joule_per_mol(e))
        });
        Ok(Self { d1, d2, q1, q2 })
    }
}

/// Everything besides the channels that the coefficient chain depends on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientInputs {
    /// Lattice temperature [K].
    pub temperature: f64,
    /// Potential stiffness at the nearest-neighbour distance [N/m].
    pub stiffness: f64,
    /// Equilibrium distance [m].
    pub equilibrium_distance: f64,
    /// Energy available to activate hops [J].
    pub collision_energy: f64,
    pub global_relief: f64,
    pub resonance_factor: f64,
    /// Power going into lattice damage [W]; enables the radiation term.
    pub damage_power: Option<f64>,
    pub structure: Option<CrystalStructure>,
}

impl Default for CoefficientInputs {
    fn default() -> Self {
        Self {
            temperature: 300.0,
            stiffness: 0.0,
            equilibrium_distance: 0.0,
            collision_energy: 0.0,
            global_relief: 0.0,
            resonance_factor: 1.0,
            damage_power: None,
            structure: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiffusionCoefficients {
    pub thermal: f64,
    pub collision: f64,
    pub relief: f64,
    pub effective: f64,
}

#[inline]
fn clamp_coefficient(d: f64) -> f64 {
    clamp_finite(d, MIN_COEFFICIENT, MAX_COEFFICIENT)
}

/// Runs the coefficient chain thermal → collision → relief → resonance →
/// radiation. Each stage is clamped to `[1e-40, 1e-6]` m²/s.
pub fn evaluate_coefficients(
    channels: &ArrheniusChannels,
    inputs: &CoefficientInputs,
) -> DiffusionCoefficients {
    let t = if inputs.temperature.is_finite() {
        inputs.temperature.max(MIN_TEMPERATURE)
    } else {
        warn!(temperature = inputs.temperature, "Non-finite temperature; using the floor.");
        MIN_TEMPERATURE
    };
    let k = if inputs.stiffness.is_finite() {
        inputs.stiffness.max(0.0)
    } else {
        0.0
    };
    let bond_energy = k * inputs.equilibrium_distance.max(0.0);
    let q1 = channels.q1 + ACTIVATION_STIFFNESS_WEIGHT * bond_energy;
    let q2 = channels.q2 + ACTIVATION_STIFFNESS_WEIGHT * bond_energy;
    let rt = GAS_CONSTANT * t;

    let structure_factor = inputs
        .structure
        .map_or(1.0, CrystalStructure::diffusion_factor);
    let arrhenius = channels.d1 * guarded_exp(-q1 / rt, "arrhenius channel 1")
        + channels.d2 * guarded_exp(-q2 / rt, "arrhenius channel 2");
    let thermal = clamp_coefficient(
        structure_factor
            * arrhenius
            * guarded_exp(-PREFACTOR_STIFFNESS_DECAY * k, "stiffness prefactor"),
    );

    let energy_scale = (BOLTZMANN * t).max(MIN_ENERGY_SCALE);
    let collision_exponent = (inputs.collision_energy.max(0.0)
        / (COLLISION_ENERGY_DIVISOR * energy_scale))
        .min(COLLISION_EXPONENT_CAP);
    if collision_exponent >= COLLISION_EXPONENT_CAP {
        debug!("Collision enhancement saturated.");
    }
    let collision = clamp_coefficient(thermal * clamp_finite(collision_exponent, 0.0, COLLISION_EXPONENT_CAP).exp());

    let relief_factor = 1.0 + RELIEF_GAIN * clamp_finite(inputs.global_relief, 0.0, MAX_RELIEF);
    let relief = clamp_coefficient(collision * relief_factor);

    let xi = clamp_finite(inputs.resonance_factor, 0.0, MAX_RESONANCE);
    let mut effective = relief * xi.ln_1p().max(1.0);

    if let Some(power) = inputs.damage_power.filter(|p| p.is_finite() && *p > 0.0) {
        let rate = power / (BOLTZMANN * t * ATTEMPT_FREQUENCY);
        effective *= 1.0 + rate.ln_1p();
    }
    let effective = clamp_coefficient(effective);

    DiffusionCoefficients {
        thermal,
        collision,
        relief,
        effective,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iron() -> AtomSpecies {
        let mut fe = AtomSpecies::new("Fe", 9.273e-26, 2.8665, CrystalStructure::Bcc);
        fe.cohesive_energy_1 = Some(4.28);
        fe
    }

    #[test]
    fn activation_energies_come_from_cohesive_energies_or_defaults() {
        let channels = ArrheniusChannels::for_species(&iron(), &DiffusionOverrides::default()).unwrap();
        assert!((channels.q1 - 0.25 * 4.28 * 96_485.332).abs() < 1.0);
        assert_eq!(channels.q2, DEFAULT_Q2);
        assert_eq!(channels.d1, DEFAULT_D1);
        assert_eq!(channels.d2, DEFAULT_D2);
    }

    #[test]
    fn overrides_win_over_species_values() {
        let mut fe = iron();
        fe.diffusion_prefactor_1 = Some(2e-4);
        let overrides = DiffusionOverrides {
            d1: Some(5e-5),
            q1: Some(1.2e5),
            ..Default::default()
        };
        let channels = ArrheniusChannels::for_species(&fe, &overrides).unwrap();
        assert_eq!(channels.d1, 5e-5);
        assert_eq!(channels.q1, 1.2e5);
    }

    #[test]
    fn explicit_non_positive_prefactor_is_rejected() {
        let overrides = DiffusionOverrides {
            d1: Some(0.0),
            ..Default::default()
        };
        assert!(matches!(
            ArrheniusChannels::for_species(&iron(), &overrides),
            Err(InputError::NonPositive { name: "diffusion_prefactor_1", .. })
        ));
    }

    #[test]
    fn coefficients_stay_in_bounds_for_extreme_inputs() {
        let channels = ArrheniusChannels {
            d1: 1e3,
            d2: 1e3,
            q1: 0.0,
            q2: 0.0,
        };
        for temperature in [0.0, -5.0, 1.0, 300.0, 1e6, f64::NAN, f64::INFINITY] {
            for energy in [0.0, 1e-15, 1e10] {
                let inputs = CoefficientInputs {
                    temperature,
                    collision_energy: energy,
                    global_relief: 1e9,
                    resonance_factor: 1e9,
                    damage_power: Some(1e30),
                    ..Default::default()
                };
                let d = evaluate_coefficients(&channels, &inputs);
                for value in [d.thermal, d.collision, d.relief, d.effective] {
                    assert!((MIN_COEFFICIENT..=MAX_COEFFICIENT).contains(&value), "{value}");
                }
            }
        }
    }

    #[test]
    fn cold_lattice_hits_the_lower_clamp() {
        let d = evaluate_coefficients(
            &ArrheniusChannels::default(),
            &CoefficientInputs {
                temperature: 1.0,
                ..Default::default()
            },
        );
        assert_eq!(d.effective, MIN_COEFFICIENT);
    }

    #[test]
    fn chain_multiplies_the_documented_factors() {
        let channels = ArrheniusChannels {
            d1: 1e-6,
            d2: 0.0,
            q1: 1.0e5,
            q2: 1.0e5,
        };
        let inputs = CoefficientInputs {
            temperature: 1000.0,
            global_relief: 2.0,
            resonance_factor: 5.0,
            ..Default::default()
        };
        let d = evaluate_coefficients(&channels, &inputs);
        let thermal = 1e-6 * (-1.0e5 / (GAS_CONSTANT * 1000.0)).exp();
        assert!((d.thermal / thermal - 1.0).abs() < 1e-12);
        assert_eq!(d.collision, d.thermal);
        assert!((d.relief / (thermal * 1.1) - 1.0).abs() < 1e-12);
        assert!((d.effective / (thermal * 1.1 * 6f64.ln()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn damage_power_increases_effective_coefficient() {
        let channels = ArrheniusChannels {
            d1: 1e-6,
            ..Default::default()
        };
        let base = CoefficientInputs {
            temperature: 800.0,
            ..Default::default()
        };
        let damaged = CoefficientInputs {
            damage_power: Some(1.0),
            ..base
        };
        assert!(
            evaluate_coefficients(&channels, &damaged).effective
                > evaluate_coefficients(&channels, &base).effective
        );
    }

    #[test]
    fn structure_factor_scales_thermal_coefficient() {
        let channels = ArrheniusChannels {
            d1: 1e-6,
            ..Default::default()
        };
        let plain = CoefficientInputs {
            temperature: 900.0,
            ..Default::default()
        };
        let fcc = CoefficientInputs {
            structure: Some(CrystalStructure::Fcc),
            ..plain
        };
        let ratio = evaluate_coefficients(&channels, &fcc).thermal
            / evaluate_coefficients(&channels, &plain).thermal;
        assert!((ratio - 0.75).abs() < 1e-12);
    }
}

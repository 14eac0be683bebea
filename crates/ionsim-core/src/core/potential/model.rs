use super::forms::{
    born_mayer, born_mayer_stiffness, hermite_switch, morse, morse_stiffness, screened_coulomb,
};
use crate::core::constants::{ELEMENTARY_CHARGE, VACUUM_PERMITTIVITY};
use crate::core::error::{InputError, require_positive};
use crate::core::lattice::structure::CrystalStructure;
use crate::core::models::species::AtomSpecies;
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt;
use tracing::debug;

const R1_FACTOR: f64 = 0.7;
const R2_FACTOR: f64 = 1.35;
const R3_FACTOR: f64 = 2.0;
const R4_FACTOR: f64 = 2.5;
const MORSE_ALPHA_TIMES_A: f64 = 4.0;
const BORN_MAYER_LENGTH_OVER_A: f64 = 0.3;
const STIFFNESS_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PotentialRegime {
    ScreenedCoulomb,
    BornMayer,
    Morse,
    MorseSwitched,
    Cutoff,
}

impl PotentialRegime {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScreenedCoulomb => "screened-coulomb",
            Self::BornMayer => "born-mayer",
            Self::Morse => "morse",
            Self::MorseSwitched => "morse-switched",
            Self::Cutoff => "cutoff",
        }
    }
}

impl fmt::Display for PotentialRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PotentialEvaluation {
    /// Pair energy [J].
    pub value: f64,
    /// Effective stiffness [N/m], already scaled by the packing factor.
    pub stiffness: f64,
    /// Equilibrium distance [m].
    pub equilibrium_distance: f64,
    pub regime: PotentialRegime,
}

/// Regime boundaries in metres, derived from `l0 = a/2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeBoundaries {
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub r4: f64,
}

impl RegimeBoundaries {
    pub fn for_lattice_constant(a_m: f64) -> Self {
        let l0 = a_m / 2.0;
        Self {
            r1: R1_FACTOR * l0,
            r2: R2_FACTOR * l0,
            r3: R3_FACTOR * l0,
            r4: R4_FACTOR * l0,
        }
    }

    pub fn classify(&self, r: f64) -> PotentialRegime {
        if r < self.r1 {
            PotentialRegime::ScreenedCoulomb
        } else if r < self.r2 {
            PotentialRegime::BornMayer
        } else if r < self.r3 {
            PotentialRegime::Morse
        } else if r < self.r4 {
            PotentialRegime::MorseSwitched
        } else {
            PotentialRegime::Cutoff
        }
    }
}

/// A piecewise pair potential parameterized for one species.
///
/// Parameters the species does not provide are derived so that adjacent
/// pieces join: the Born-Mayer amplitude matches Morse at `r2` and the
/// screening length matches Born-Mayer at `r1`. When the bare Coulomb term is
/// already weaker than the repulsive wall at `r1`, screening is disabled and
/// the effective charge is raised to meet the wall instead.
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialModel {
    structure: CrystalStructure,
    boundaries: RegimeBoundaries,
    well_depth: Option<f64>,
    alpha: f64,
    equilibrium_distance: f64,
    born_mayer_amplitude: Option<f64>,
    born_mayer_length: f64,
    coulomb_coupling: f64,
    screening_length: Option<f64>,
    stiffness_scale: f64,
}

impl PotentialModel {
    pub fn for_species(species: &AtomSpecies) -> Result<Self, InputError> {
        let a = require_positive("lattice_constant", species.lattice_constant_m())?;
        let structure = species.structure;
        let boundaries = RegimeBoundaries::for_lattice_constant(a);
        let explicit = &species.potential;

        let well_depth = species.well_depth_j();
        let alpha = explicit.morse_alpha.unwrap_or(MORSE_ALPHA_TIMES_A / a);
        let equilibrium_distance = explicit
            .equilibrium_distance
            .unwrap_or_else(|| structure.nearest_neighbor_distance(a));
        let born_mayer_length = explicit
            .born_mayer_length
            .unwrap_or(BORN_MAYER_LENGTH_OVER_A * a);

        let born_mayer_amplitude = explicit.born_mayer_amplitude.or_else(|| {
            well_depth.map(|de| {
                let target = morse(boundaries.r2, de, alpha, equilibrium_distance);
                target * (boundaries.r2 / born_mayer_length).exp()
            })
        });

        let base_coupling = species.valence.max(1) as f64 * ELEMENTARY_CHARGE * ELEMENTARY_CHARGE
            / (4.0 * PI * VACUUM_PERMITTIVITY);

        let (coulomb_coupling, screening_length) = match species.screening_length {
            Some(lambda) => (base_coupling, Some(lambda)),
            None => match born_mayer_amplitude {
                Some(amplitude) => fit_screening(
                    boundaries.r1,
                    base_coupling,
                    born_mayer(boundaries.r1, amplitude, born_mayer_length),
                ),
                None => (base_coupling, None),
            },
        };

        let stiffness_scale = 1.0 + 0.2 * (species.packing_factor() - 0.5);

        debug!(
            species = %species.name,
            %structure,
            alpha,
            equilibrium_distance,
            born_mayer_amplitude,
            screening_length,
            "Potential parameterized."
        );

        Ok(Self {
            structure,
            boundaries,
            well_depth,
            alpha,
            equilibrium_distance,
            born_mayer_amplitude,
            born_mayer_length,
            coulomb_coupling,
            screening_length,
            stiffness_scale,
        })
    }

    pub fn structure(&self) -> CrystalStructure {
        self.structure
    }

    pub fn boundaries(&self) -> RegimeBoundaries {
        self.boundaries
    }

    pub fn equilibrium_distance(&self) -> f64 {
        self.equilibrium_distance
    }

    /// `None` stands for an unscreened Coulomb core.
    pub fn screening_length(&self) -> Option<f64> {
        self.screening_length.filter(|l| l.is_finite())
    }

    pub fn evaluate(&self, r: f64) -> Result<PotentialEvaluation, InputError> {
        let r = require_positive("r", r)?;
        let regime = self.boundaries.classify(r);

        let (value, raw_stiffness) = match regime {
            PotentialRegime::ScreenedCoulomb => {
                let lambda = self.screening_length.unwrap_or(f64::INFINITY);
                let v = screened_coulomb(r, self.coulomb_coupling, lambda);
                (v, v.abs() / (r * r))
            }
            PotentialRegime::BornMayer => {
                let amplitude = self.born_mayer_amplitude.ok_or(InputError::MissingParameter {
                    regime: "Born-Mayer",
                    name: "well depth or Born-Mayer amplitude",
                })?;
                let v = born_mayer(r, amplitude, self.born_mayer_length);
                (v, born_mayer_stiffness(v, self.born_mayer_length))
            }
            PotentialRegime::Morse => {
                let de = self.require_well_depth()?;
                (
                    morse(r, de, self.alpha, self.equilibrium_distance),
                    morse_stiffness(r, de, self.alpha, self.equilibrium_distance),
                )
            }
            PotentialRegime::MorseSwitched => {
                let de = self.require_well_depth()?;
                let b = self.boundaries;
                let h = hermite_switch((r - b.r3) / (b.r4 - b.r3));
                (
                    morse(r, de, self.alpha, self.equilibrium_distance) * h,
                    morse_stiffness(r, de, self.alpha, self.equilibrium_distance)
                        * (STIFFNESS_FLOOR + (1.0 - STIFFNESS_FLOOR) * h),
                )
            }
            PotentialRegime::Cutoff => (0.0, 0.0),
        };

        Ok(PotentialEvaluation {
            value,
            stiffness: raw_stiffness * self.stiffness_scale,
            equilibrium_distance: self.equilibrium_distance,
            regime,
        })
    }

    /// Evaluation at the structure's nearest-neighbour distance.
    pub fn evaluate_at_nearest_neighbor(&self, a_m: f64) -> Result<PotentialEvaluation, InputError> {
        self.evaluate(self.structure.nearest_neighbor_distance(a_m))
    }

    fn require_well_depth(&self) -> Result<f64, InputError> {
        self.well_depth.ok_or(InputError::MissingParameter {
            regime: "Morse",
            name: "well depth",
        })
    }
}

/// Returns the Coulomb coupling and screening length that make the core meet
/// `wall` at `r1`.
fn fit_screening(r1: f64, coupling: f64, wall: f64) -> (f64, Option<f64>) {
    let bare = coupling / r1;
    if wall > 0.0 && bare > wall {
        (coupling, Some(r1 / (bare / wall).ln()))
    } else if wall > 0.0 {
        (wall * r1, None)
    } else {
        (coupling, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::ev_to_joule;

    fn iron() -> AtomSpecies {
        let mut fe = AtomSpecies::new("Fe", 9.273e-26, 2.8665, CrystalStructure::Bcc);
        fe.cohesive_energy_1 = Some(4.28);
        fe.valence = 2;
        fe
    }

    fn assert_continuous(model: &PotentialModel, r: f64) {
        let eps = r * 1e-9;
        let below = model.evaluate(r - eps).unwrap().value;
        let above = model.evaluate(r + eps).unwrap().value;
        let scale = below.abs().max(above.abs()).max(1e-22);
        assert!(
            (below - above).abs() / scale < 1e-5,
            "discontinuity at r = {r:e}: {below:e} vs {above:e}"
        );
    }

    #[test]
    fn heuristic_potential_is_continuous_at_every_boundary() {
        for structure in CrystalStructure::ALL {
            let mut species = iron();
            species.structure = structure;
            let model = PotentialModel::for_species(&species).unwrap();
            let b = model.boundaries();
            for r in [b.r1, b.r2, b.r3, b.r4] {
                assert_continuous(&model, r);
            }
        }
    }

    #[test]
    fn weak_coulomb_core_disables_screening_and_stays_continuous() {
        let mut species = iron();
        species.cohesive_energy_1 = Some(500.0);
        let model = PotentialModel::for_species(&species).unwrap();
        assert!(model.screening_length().is_none());
        assert_continuous(&model, model.boundaries().r1);
    }

    #[test]
    fn regimes_follow_boundary_order() {
        let model = PotentialModel::for_species(&iron()).unwrap();
        let b = model.boundaries();
        let regime = |r: f64| model.evaluate(r).unwrap().regime;
        assert_eq!(regime(0.5 * b.r1), PotentialRegime::ScreenedCoulomb);
        assert_eq!(regime(b.r1), PotentialRegime::BornMayer);
        assert_eq!(regime(b.r2), PotentialRegime::Morse);
        assert_eq!(regime(b.r3), PotentialRegime::MorseSwitched);
        assert_eq!(regime(b.r4), PotentialRegime::Cutoff);
    }

    #[test]
    fn cutoff_region_has_zero_value_and_stiffness() {
        let model = PotentialModel::for_species(&iron()).unwrap();
        let eval = model.evaluate(1e-9).unwrap();
        assert_eq!(eval.value, 0.0);
        assert_eq!(eval.stiffness, 0.0);
    }

    #[test]
    fn stiffness_decays_to_floor_at_outer_switch_edge() {
        let model = PotentialModel::for_species(&iron()).unwrap();
        let b = model.boundaries();
        let r = b.r4 * (1.0 - 1e-12);
        let eval = model.evaluate(r).unwrap();
        let de = ev_to_joule(4.28);
        let a = iron().lattice_constant_m();
        let raw = morse_stiffness(r, de, 4.0 / a, model.equilibrium_distance());
        let scale = 1.0 + 0.2 * (0.68 - 0.5);
        assert!((eval.stiffness / (raw * scale) - STIFFNESS_FLOOR).abs() < 1e-6);
        assert!(eval.value.abs() < 1e-25);
    }

    #[test]
    fn morse_stiffness_at_nearest_neighbor_includes_packing_scale() {
        let species = iron();
        let model = PotentialModel::for_species(&species).unwrap();
        let eval = model
            .evaluate_at_nearest_neighbor(species.lattice_constant_m())
            .unwrap();
        let a = species.lattice_constant_m();
        let expected = 2.0 * ev_to_joule(4.28) * (4.0 / a).powi(2) * (1.0 + 0.2 * 0.18);
        assert_eq!(eval.regime, PotentialRegime::Morse);
        assert!((eval.stiffness - expected).abs() / expected < 1e-12);
        assert!(eval.value.abs() < 1e-30);
    }

    #[test]
    fn non_positive_or_non_finite_separation_is_rejected() {
        let model = PotentialModel::for_species(&iron()).unwrap();
        assert!(matches!(model.evaluate(0.0), Err(InputError::NonPositive { .. })));
        assert!(matches!(model.evaluate(-1e-10), Err(InputError::NonPositive { .. })));
        assert!(matches!(model.evaluate(f64::NAN), Err(InputError::NonFinite { .. })));
    }

    #[test]
    fn missing_well_depth_fails_only_in_regimes_that_need_it() {
        let bare = AtomSpecies::new("X", 1e-25, 3.0, CrystalStructure::Sc);
        let model = PotentialModel::for_species(&bare).unwrap();
        let b = model.boundaries();

        assert!(model.evaluate(0.5 * b.r1).is_ok());
        assert!(matches!(
            model.evaluate(0.5 * (b.r1 + b.r2)),
            Err(InputError::MissingParameter { regime: "Born-Mayer", .. })
        ));
        assert!(matches!(
            model.evaluate(0.5 * (b.r2 + b.r3)),
            Err(InputError::MissingParameter { regime: "Morse", .. })
        ));
        assert!(model.evaluate(2.0 * b.r4).is_ok());
    }

    #[test]
    fn explicit_parameters_are_used_as_given() {
        let mut species = iron();
        species.screening_length = Some(5e-11);
        species.potential.born_mayer_amplitude = Some(1e-16);
        let model = PotentialModel::for_species(&species).unwrap();
        assert_eq!(model.screening_length(), Some(5e-11));

        let b = model.boundaries();
        let r = 0.5 * (b.r1 + b.r2);
        let expected = born_mayer(r, 1e-16, 0.3 * species.lattice_constant_m());
        assert!((model.evaluate(r).unwrap().value - expected).abs() / expected < 1e-12);
    }
}

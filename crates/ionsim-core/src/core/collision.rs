//! Binary-collision energy transfer between an incoming ion and one lattice
//! atom.

use crate::core::error::{InputError, require_finite, require_in_range, require_positive};
use crate::core::lattice::structure::CrystalStructure;
use crate::core::potential::{PotentialEvaluation, PotentialRegime};
use rand::Rng;
use serde::Serialize;

/// Stiffness at which the lattice halves the transferred energy [N/m].
pub const STIFFNESS_SCALE: f64 = 1e3;
const NOISE_AMPLITUDE: f64 = 0.01;
const DAMAGE_FRACTION: f64 = 0.8;
const DAMAGE_THRESHOLD_FACTOR: f64 = 2.0;
const MIN_STIFFNESS: f64 = 1e-16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInput {
    /// Kinetic energy of the incoming ion [J].
    pub ion_energy: f64,
    pub ion_mass: f64,
    pub target_mass: f64,
    /// Angle to the surface normal [deg], in `[0, 180]`.
    pub incidence_angle_deg: f64,
    /// Resonance amplification, `≥ 1`.
    pub resonance_factor: f64,
    /// Surface binding energy [J].
    pub surface_binding_energy: f64,
    pub structure: CrystalStructure,
    /// Separation the potential was evaluated at [m].
    pub separation: f64,
    pub potential: PotentialEvaluation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CollisionOutcome {
    /// Energy handed to the lattice atom [J].
    pub transferred_energy: f64,
    /// Momentum transferred in the centre-of-mass frame [kg·m/s].
    pub momentum: f64,
    /// Energy that goes into displacing the atom [J].
    pub damage_energy: f64,
    /// Elastic displacement estimate [m].
    pub displacement: f64,
    pub regime: PotentialRegime,
    pub separation: f64,
    pub equilibrium_distance: f64,
    pub stiffness: f64,
}

/// Kinematic transfer factor `4 m1 m2 / (m1 + m2)²`, at most 1.
#[inline]
pub fn kinematic_factor(m1: f64, m2: f64) -> f64 {
    4.0 * m1 * m2 / ((m1 + m2) * (m1 + m2))
}

/// Energy of the normal velocity component. Grazing and back-side incidence
/// (`θ ≥ 90°`) projects to zero.
#[inline]
pub fn projected_energy(energy: f64, incidence_angle_deg: f64) -> f64 {
    let cos = incidence_angle_deg.to_radians().cos().max(0.0);
    energy * cos * cos
}

pub fn simulate_collision(
    input: &CollisionInput,
    rng: &mut impl Rng,
) -> Result<CollisionOutcome, InputError> {
    let m1 = require_positive("ion_mass", input.ion_mass)?;
    let m2 = require_positive("target_mass", input.target_mass)?;
    let energy = require_in_range("ion_energy", input.ion_energy, 0.0, f64::MAX)?;
    let theta = require_in_range("incidence_angle", input.incidence_angle_deg, 0.0, 180.0)?;
    let xi = require_in_range("resonance_factor", input.resonance_factor, 1.0, f64::MAX)?;
    let binding = require_in_range(
        "surface_binding_energy",
        input.surface_binding_energy,
        0.0,
        f64::MAX,
    )?;
    let k = require_finite("stiffness", input.potential.stiffness)?.max(0.0);

    let base = kinematic_factor(m1, m2) * projected_energy(energy, theta)
        * input.structure.collision_factor()
        / (1.0 + k / STIFFNESS_SCALE);
    let noise = 1.0 + rng.gen_range(-NOISE_AMPLITUDE..NOISE_AMPLITUDE);
    let transferred = (base * xi * noise).clamp(0.0, energy * xi);

    let reduced_mass = m1 * m2 / (m1 + m2);
    let momentum = (2.0 * reduced_mass * transferred).sqrt();
    let damage_energy = if transferred > DAMAGE_THRESHOLD_FACTOR * binding {
        DAMAGE_FRACTION * transferred
    } else {
        0.0
    };
    let displacement = if k > MIN_STIFFNESS {
        (2.0 * damage_energy / k).sqrt()
    } else {
        0.0
    };

    Ok(CollisionOutcome {
        transferred_energy: transferred,
        momentum,
        damage_energy,
        displacement,
        regime: input.potential.regime,
        separation: input.separation,
        equilibrium_distance: input.potential.equilibrium_distance,
        stiffness: k,
    })
}

//! Leaf operations callable without running a full simulation.
//!
//! Each operation resolves whatever reference records it needs through a
//! [`ReferenceStore`] and delegates to the corresponding core or engine
//! routine, reporting failures as [`EngineError`].

use crate::core::collision::{self, CollisionInput, CollisionOutcome};
use crate::core::error::require_positive;
use crate::core::lattice::generator;
use crate::core::models::ids::{ConfigId, IonId, SpeciesId};
use crate::core::models::site::LatticeSite;
use crate::core::models::species::AtomSpecies;
use crate::core::models::tables::ReferenceStore;
use crate::core::plasma::{self, PlasmaParameters};
use crate::core::potential::{PotentialEvaluation, PotentialModel};
use crate::core::relief::{self, ReliefParams, ReliefResult};
use crate::core::resonance::{self, ResonanceInput};
use crate::core::trajectory::{self, Trajectory, TrajectoryInput};
use crate::core::treatment::{self, FluxVelocityParams};
use crate::engine::diffusion::{self, DiffusionInput, DiffusionProfile};
use crate::engine::error::EngineError;
use crate::engine::thermal::{self, ThermalInput, ThermalTrace};
use rand::Rng;
use tracing::instrument;

fn species<S>(store: &S, id: SpeciesId) -> Result<&AtomSpecies, EngineError>
where
    S: ReferenceStore + ?Sized,
{
    store.species(id).ok_or(EngineError::SpeciesNotFound(id))
}

/// Potential, stiffness and regime of `species_id` at separation `r` [m].
pub fn compute_potential<S>(
    store: &S,
    species_id: SpeciesId,
    r: f64,
) -> Result<PotentialEvaluation, EngineError>
where
    S: ReferenceStore + ?Sized,
{
    let model = PotentialModel::for_species(species(store, species_id)?)?;
    Ok(model.evaluate(r)?)
}

/// Evaluates `points` equally spaced separations in `[r_min, r_max]`.
#[instrument(skip(store), name = "potential_scan")]
pub fn scan_potential<S>(
    store: &S,
    species_id: SpeciesId,
    r_min: f64,
    r_max: f64,
    points: usize,
) -> Result<Vec<(f64, PotentialEvaluation)>, EngineError>
where
    S: ReferenceStore + ?Sized,
{
    let model = PotentialModel::for_species(species(store, species_id)?)?;
    let spacing = if points > 1 {
        (r_max - r_min) / (points - 1) as f64
    } else {
        0.0
    };
    (0..points)
        .map(|i| {
            let r = r_min + i as f64 * spacing;
            Ok((r, model.evaluate(r)?))
        })
        .collect()
}

pub fn simulate_collision(
    input: &CollisionInput,
    rng: &mut impl Rng,
) -> Result<CollisionOutcome, EngineError> {
    Ok(collision::simulate_collision(input, rng)?)
}

/// `count` sites of the species' crystal structure and lattice constant.
pub fn generate_lattice<S>(
    store: &S,
    species_id: SpeciesId,
    count: usize,
) -> Result<Vec<LatticeSite>, EngineError>
where
    S: ReferenceStore + ?Sized,
{
    let species = species(store, species_id)?;
    Ok(generator::generate_lattice(
        species.structure,
        species.lattice_constant_m(),
        count,
    )?)
}

pub fn calculate_diffusion_profile(input: &DiffusionInput) -> Result<DiffusionProfile, EngineError> {
    Ok(diffusion::calculate_diffusion_profile(input)?)
}

pub fn simulate_cooling(input: &ThermalInput) -> Result<ThermalTrace, EngineError> {
    Ok(thermal::simulate_cooling(input)?)
}

/// Resonance amplification for the species' Debye frequency.
pub fn compute_xi<S>(
    store: &S,
    species_id: SpeciesId,
    input: &ResonanceInput,
) -> Result<f64, EngineError>
where
    S: ReferenceStore + ?Sized,
{
    let species = species(store, species_id)?;
    Ok(resonance::compute_xi(input, species.debye_temperature))
}

pub fn compute_slr(field: &[Vec<f64>], params: &ReliefParams) -> Result<ReliefResult, EngineError> {
    Ok(relief::compute_slr(field, params)?)
}

pub fn compute_plasma<S>(
    store: &S,
    config_id: ConfigId,
    ion_id: IonId,
) -> Result<PlasmaParameters, EngineError>
where
    S: ReferenceStore + ?Sized,
{
    let config = store
        .configuration(config_id)
        .ok_or(EngineError::ConfigurationNotFound(config_id))?;
    let ion = store.ion(ion_id).ok_or(EngineError::IonNotFound(ion_id))?;
    Ok(plasma::compute_plasma(config, ion)?)
}

pub fn integrate_trajectory(input: &TrajectoryInput) -> Result<Trajectory, EngineError> {
    Ok(trajectory::integrate_trajectory(input)?)
}

/// Thickness grown at one surface point: the local flux velocity is held for
/// `steps` intervals of `dt`, integrated to a fluence and scaled by the dose,
/// angle and temperature factors.
pub fn estimate_layer_thickness(
    params: &FluxVelocityParams,
    steps: usize,
    dt: f64,
    dose_factor: f64,
    angle_factor: f64,
    temperature_factor: f64,
) -> Result<f64, EngineError> {
    let dt = require_positive("dt", dt)?;
    let velocity = treatment::local_flux_velocity(params)?;
    let fluence = treatment::integrate_fluence(&vec![velocity; steps], dt);
    Ok(treatment::layer_thickness(
        fluence,
        dose_factor,
        angle_factor,
        temperature_factor,
    ))
}

/// Uniformity cost of a thickness map plus the weighted squared worst-case
/// shortfall below each minimum-thickness constraint.
pub fn evaluate_uniformity(
    uniformity_cost: f64,
    thickness: &[Vec<f64>],
    constraints: &[f64],
    weights: &[f64],
) -> Result<f64, EngineError> {
    Ok(treatment::regularized_functional(
        uniformity_cost,
        thickness,
        constraints,
        weights,
    )?)
}

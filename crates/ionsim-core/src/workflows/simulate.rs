use crate::core::constants::BOLTZMANN;
use crate::core::lattice::generator::generate_lattice;
use crate::core::models::ids::{ConfigId, IonId, SpeciesId};
use crate::core::models::site::LatticeSite;
use crate::core::models::tables::ReferenceStore;
use crate::core::plasma::{PlasmaParameters, compute_plasma};
use crate::core::potential::{PotentialEvaluation, PotentialModel};
use crate::core::relief::{ReliefParams, ReliefResult, compute_slr, surface_field};
use crate::core::resonance::compute_xi;
use crate::core::trajectory::{TrajectoryInput, integrate_trajectory};
use crate::engine::config::RunRequest;
use crate::engine::context::RunContext;
use crate::engine::diffusion::coefficients::{
    ArrheniusChannels, CoefficientInputs, DiffusionCoefficients, evaluate_coefficients,
};
use crate::engine::diffusion::{DiffusionInput, DiffusionMode, DiffusionProfile, calculate_diffusion_profile};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::collision_loop::{self, CollisionSetup, CollisionSummary};
use crate::engine::thermal::{ThermalInput, ThermalTrace, simulate_cooling};
use nalgebra::{Point3, Vector3};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

const FALLBACK_DENSITY: f64 = 7874.0;
const FALLBACK_CONDUCTIVITY: f64 = 50.0;
const POTENTIAL_CONDUCTIVITY_SCALE: f64 = 1e-20;
const DEFAULT_SURFACE_CONCENTRATION: f64 = 1.0;

/// Everything a run produces, ready to be persisted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    #[serde(skip)]
    pub species_id: SpeciesId,
    #[serde(skip)]
    pub ion_id: IonId,
    #[serde(skip)]
    pub config_id: ConfigId,
    pub species: String,
    pub ion: String,
    pub site_count: usize,
    /// Kinetic energy of each incoming ion [J].
    pub ion_energy: f64,
    pub total_transferred_energy: f64,
    pub average_transferred_energy: f64,
    pub total_momentum: f64,
    pub total_damage_energy: f64,
    pub total_displacement: f64,
    pub resonance_factor: f64,
    pub global_relief: f64,
    /// `T_env + ⟨E⟩ / 3k_B` [K].
    pub initial_temperature: f64,
    pub final_temperature: f64,
    pub min_temperature: f64,
    pub avg_temperature: f64,
    pub max_temperature: f64,
    /// Potential at the nearest-neighbour distance.
    pub nearest_neighbor_potential: PotentialEvaluation,
    pub coefficients: DiffusionCoefficients,
    pub plasma: PlasmaParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectory: Option<TrajectorySummary>,
    pub site_energies: Vec<f64>,
    pub diffusion: DiffusionProfile,
    pub thermal: ThermalTrace,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectorySummary {
    pub arc_length: f64,
    pub work: f64,
    pub steps: usize,
    pub reached_target: bool,
}

/// Runs one complete bombardment simulation.
///
/// Stages run in a fixed order: lattice, plasma, resonance, collisions,
/// aggregation, thermal relaxation, diffusion. Reference records are resolved
/// once through `store`; nothing is written back.
#[instrument(skip_all, name = "simulation_workflow")]
pub fn run<S>(
    store: &S,
    request: &RunRequest,
    reporter: &ProgressReporter,
) -> Result<SimulationResult, EngineError>
where
    S: ReferenceStore + ?Sized,
{
    // === Phase 0: Resolve reference records ===
    let context = reporter.phase("Loading Inputs", || {
        RunContext::resolve(store, request, reporter)
    })?;
    info!(
        species = %context.species.name,
        ion = %context.ion.name,
        "Simulation inputs resolved."
    );
    let model = PotentialModel::for_species(context.species)?;

    // === Phase 1: Lattice ===
    let sites = build_lattice(&context)?;

    // === Phase 2: Plasma and ion energy ===
    let (plasma, trajectory) = compute_ion_energy(&context)?;

    // === Phase 3: Resonance ===
    let resonance_factor = compute_xi(
        &request.collision.resonance,
        context.species.debye_temperature,
    );
    debug!(resonance_factor, "Resonance factor computed.");

    // === Phase 4: Per-site collisions ===
    let summary = run_collisions(&context, &model, &sites, &plasma, resonance_factor)?;

    // === Phase 5: Aggregation and surface relief ===
    let relief = aggregate_relief(&context, &sites, &summary, &plasma)?;
    let nearest = model.evaluate_at_nearest_neighbor(context.species.lattice_constant_m())?;

    // === Phase 6: Thermal relaxation ===
    let thermal = relax_temperature(&context, &summary, &nearest, relief.global)?;

    // === Phase 7: Diffusion profile ===
    let conditions = CoefficientInputs {
        temperature: thermal.final_temperature(),
        stiffness: nearest.stiffness,
        equilibrium_distance: nearest.equilibrium_distance,
        collision_energy: summary.average_transferred + plasma.ion_energy,
        global_relief: relief.global,
        resonance_factor,
        damage_power: Some(summary.total_damage / context.exposure_time()),
        structure: Some(context.species.structure),
    };
    let (diffusion, coefficients) = diffuse(&context, conditions, &thermal)?;

    // === Phase 8: Assemble ===
    let result = SimulationResult {
        species_id: request.species_id,
        ion_id: request.ion_id,
        config_id: request.config_id,
        species: context.species.name.clone(),
        ion: context.ion.name.clone(),
        site_count: sites.len(),
        ion_energy: plasma.ion_energy,
        total_transferred_energy: summary.total_transferred,
        average_transferred_energy: summary.average_transferred,
        total_momentum: summary.total_momentum,
        total_damage_energy: summary.total_damage,
        total_displacement: summary.total_displacement,
        resonance_factor,
        global_relief: relief.global,
        initial_temperature: thermal.temperatures.first().copied().unwrap_or(thermal.avg),
        final_temperature: thermal.final_temperature(),
        min_temperature: thermal.min,
        avg_temperature: thermal.avg,
        max_temperature: thermal.max,
        nearest_neighbor_potential: nearest,
        coefficients,
        plasma,
        trajectory,
        site_energies: summary.site_energies(),
        diffusion,
        thermal,
    };

    info!(
        total_transferred = result.total_transferred_energy,
        final_temperature = result.final_temperature,
        mean_depth = result.diffusion.mean_depth,
        "Simulation complete."
    );
    Ok(result)
}

fn build_lattice(context: &RunContext) -> Result<Vec<LatticeSite>, EngineError> {
    context.reporter.phase("Generating Lattice", || {
        let structure = context.species.structure;
        let sites = match context.request.lattice {
            Some(options) => generate_lattice(
                structure,
                context.species.lattice_constant_m(),
                options.count,
            )?,
            None => vec![LatticeSite::at_rest(Vector3::zeros(), structure)],
        };
        info!(sites = sites.len(), structure = %structure, "Lattice ready.");
        Ok(sites)
    })
}

fn compute_ion_energy(
    context: &RunContext,
) -> Result<(PlasmaParameters, Option<TrajectorySummary>), EngineError> {
    context.reporter.phase("Computing Plasma", || {
        let mut plasma = compute_plasma(context.config, context.ion)?;
        let options = context.request.plasma;

        if !options.use_trajectory {
            return Ok((plasma, None));
        }
        if context.config.ion_energy_override.is_some() {
            info!("Ion energy override set; skipping trajectory integration.");
            return Ok((plasma, None));
        }

        let trajectory = integrate_trajectory(&TrajectoryInput {
            start: Point3::origin(),
            end: Point3::new(0.0, 0.0, context.config.electrode_distance),
            voltage: context.config.voltage.abs(),
            magnetic_field: options.magnetic_field,
            ion_mass: context.ion.mass,
            ion_charge: context.ion.charge_c().abs(),
            initial_energy: 0.0,
            time_step: None,
        })?;
        let summary = TrajectorySummary {
            arc_length: trajectory.arc_length,
            work: trajectory.work,
            steps: trajectory.steps,
            reached_target: trajectory.reached_target,
        };

        if trajectory.reached_target {
            plasma.ion_energy = trajectory.work.max(0.0);
        } else {
            warn!(
                steps = trajectory.steps,
                "Ion did not reach the target; keeping the charge x voltage energy."
            );
        }
        Ok((plasma, Some(summary)))
    })
}

fn run_collisions(
    context: &RunContext,
    model: &PotentialModel,
    sites: &[LatticeSite],
    plasma: &PlasmaParameters,
    resonance_factor: f64,
) -> Result<CollisionSummary, EngineError> {
    context.reporter.phase("Collisions", || {
        let separation = context
            .request
            .collision
            .separation_override
            .unwrap_or_else(|| context.species.nearest_neighbor_distance_m());
        let setup = CollisionSetup {
            potential: model,
            separation,
            ion_energy: plasma.ion_energy,
            resonance_factor,
        };
        collision_loop::run(context, sites, &setup)
    })
}

fn aggregate_relief(
    context: &RunContext,
    sites: &[LatticeSite],
    summary: &CollisionSummary,
    plasma: &PlasmaParameters,
) -> Result<ReliefResult, EngineError> {
    context.reporter.phase("Surface Relief", || {
        let mean = summary.average_transferred;
        let samples: Vec<(f64, f64, f64)> = sites
            .iter()
            .zip(&summary.outcomes)
            .map(|(site, outcome)| {
                let normalized = if mean > 0.0 {
                    outcome.transferred_energy / mean
                } else {
                    0.0
                };
                (site.position.x, site.position.y, normalized)
            })
            .collect();
        let params = ReliefParams {
            exponent: context.request.relief.exponent,
            incidence_angle_deg: Some(context.config.incidence_angle),
            fluence: Some(plasma.fluence),
        };
        let relief = compute_slr(&surface_field(&samples), &params)?;
        debug!(global_relief = relief.global, "Surface relief computed.");
        Ok(relief)
    })
}

fn relax_temperature(
    context: &RunContext,
    summary: &CollisionSummary,
    nearest: &PotentialEvaluation,
    global_relief: f64,
) -> Result<ThermalTrace, EngineError> {
    context.reporter.phase("Thermal Relaxation", || {
        let species = context.species;
        let overrides = context.config.thermal;
        let options = context.request.thermal;
        let ambient = context.ambient_temperature();
        let exposure = context.exposure_time();

        let initial_temperature = ambient + summary.average_transferred / (3.0 * BOLTZMANN);
        let input = ThermalInput {
            initial_temperature,
            total_time: options.total_time.unwrap_or(exposure),
            dt: options.dt,
            thickness: options.thickness,
            area: options.area,
            density: overrides
                .density
                .or(species.density)
                .unwrap_or(FALLBACK_DENSITY),
            conductivity: overrides
                .conductivity
                .or(species.thermal_conductivity)
                .unwrap_or(FALLBACK_CONDUCTIVITY),
            debye_temperature: species.debye_temperature,
            molar_mass: species.molar_mass(),
            structure_factor: species.structure.thermal_conductivity_factor(),
            potential_factor: 1.0 / (1.0 + POTENTIAL_CONDUCTIVITY_SCALE * nearest.stiffness),
            relief_factor: global_relief,
            power_input: summary.total_transferred / exposure,
            ambient_temperature: ambient,
            mode: options.mode,
            relaxation_rate: options.relaxation_rate,
        };
        debug!(initial_temperature, power = input.power_input, "Thermal input prepared.");
        Ok(simulate_cooling(&input)?)
    })
}

fn diffuse(
    context: &RunContext,
    conditions: CoefficientInputs,
    thermal: &ThermalTrace,
) -> Result<(DiffusionProfile, DiffusionCoefficients), EngineError> {
    context.reporter.phase("Diffusion", || {
        let options = context.request.diffusion;
        let overrides = context.config.diffusion;
        let channels = ArrheniusChannels::for_species(context.species, &overrides)?;
        let coefficients = evaluate_coefficients(&channels, &conditions);

        let grid_mode = options.mode != DiffusionMode::Analytic;
        let mut input = DiffusionInput::new(channels, conditions, context.exposure_time());
        input.mode = options.mode;
        input.depth = options.depth;
        input.dx = options.dx;
        input.dt = options.dt;
        input.surface_concentration = overrides
            .surface_concentration
            .unwrap_or(DEFAULT_SURFACE_CONCENTRATION);
        if grid_mode && options.follow_thermal_trace {
            input.temperature_profile = Some(thermal.temperatures.clone());
        }

        let profile = calculate_diffusion_profile(&input)?;
        for adjustment in &profile.adjustments {
            context
                .reporter
                .report(Progress::Message(format!("Diffusion grid adjusted: {adjustment:?}")));
        }
        Ok((profile, coefficients))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::InputError;
    use crate::core::lattice::structure::CrystalStructure;
    use crate::core::models::config::SimulationConfig;
    use crate::core::models::ion::IonSpecies;
    use crate::core::models::species::AtomSpecies;
    use crate::core::models::tables::ReferenceTables;
    use crate::engine::config::{LatticeOptions, PlasmaOptions, RunRequestBuilder};
    use std::sync::Mutex;

    fn iron() -> AtomSpecies {
        let mut fe = AtomSpecies::new("Fe", 9.273e-26, 2.86, CrystalStructure::Bcc);
        fe.debye_temperature = Some(470.0);
        fe.cohesive_energy_1 = Some(4.28);
        fe.cohesive_energy_2 = Some(4.28);
        fe
    }

    fn setup(config: SimulationConfig) -> (ReferenceTables, RunRequestBuilder) {
        let mut tables = ReferenceTables::new();
        let species = tables.add_species(iron());
        let ion = tables.add_ion(IonSpecies::new("Ar+", 6.634e-26, 1));
        let config = tables.add_configuration("glow", config);
        let builder = RunRequestBuilder::new()
            .species(species)
            .ion(ion)
            .configuration(config);
        (tables, builder)
    }

    #[test]
    fn single_site_run_produces_finite_result() {
        let (tables, builder) = setup(SimulationConfig::glow_discharge(500.0, 10.0));
        let request = builder.build().unwrap();
        let result = run(&tables, &request, &ProgressReporter::new()).unwrap();

        assert_eq!(result.site_count, 1);
        assert_eq!(result.site_energies.len(), 1);
        assert!(result.total_transferred_energy > 0.0);
        assert_eq!(result.global_relief, 0.0);
        assert!(result.initial_temperature > 300.0);
        assert!(result.final_temperature.is_finite());
        assert!(result.diffusion.mean_depth > 0.0);
        assert!(result.trajectory.is_none());
    }

    #[test]
    fn phases_are_reported_in_order() {
        let (tables, builder) = setup(SimulationConfig::glow_discharge(500.0, 10.0));
        let request = builder.lattice(LatticeOptions { count: 8 }).build().unwrap();
        let phases = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::PhaseStart { name } = event {
                phases.lock().unwrap().push(name);
            }
        }));
        run(&tables, &request, &reporter).unwrap();
        drop(reporter);

        assert_eq!(
            phases.into_inner().unwrap(),
            vec![
                "Loading Inputs",
                "Generating Lattice",
                "Computing Plasma",
                "Collisions",
                "Surface Relief",
                "Thermal Relaxation",
                "Diffusion",
            ]
        );
    }

    #[test]
    fn trajectory_energy_matches_charge_times_voltage() {
        let (tables, builder) = setup(SimulationConfig::glow_discharge(500.0, 10.0));
        let request = builder
            .plasma(PlasmaOptions {
                use_trajectory: true,
                ..Default::default()
            })
            .build()
            .unwrap();
        let result = run(&tables, &request, &ProgressReporter::new()).unwrap();

        let trajectory = result.trajectory.unwrap();
        assert!(trajectory.reached_target);
        let expected = 500.0 * crate::core::constants::ELEMENTARY_CHARGE;
        assert!((result.ion_energy / expected - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ion_energy_override_wins_over_voltage() {
        let mut config = SimulationConfig::glow_discharge(500.0, 10.0);
        config.ion_energy_override = Some(50.0);
        let (tables, builder) = setup(config);
        let request = builder.build().unwrap();
        let result = run(&tables, &request, &ProgressReporter::new()).unwrap();
        let expected = crate::core::constants::ev_to_joule(50.0);
        assert!((result.ion_energy - expected).abs() < 1e-30);
    }

    #[test]
    fn degenerate_prefactor_is_rejected() {
        let mut config = SimulationConfig::glow_discharge(500.0, 10.0);
        config.diffusion.d1 = Some(0.0);
        let (tables, builder) = setup(config);
        let request = builder.build().unwrap();
        let result = run(&tables, &request, &ProgressReporter::new());
        assert!(matches!(
            result,
            Err(EngineError::InvalidInput {
                source: InputError::NonPositive {
                    name: "diffusion_prefactor_1",
                    ..
                }
            })
        ));
    }

    #[test]
    fn non_positive_depth_is_rejected_in_grid_modes() {
        let (tables, builder) = setup(SimulationConfig::glow_discharge(500.0, 10.0));
        let request = builder
            .diffusion(crate::engine::config::DiffusionOptions {
                mode: DiffusionMode::Explicit,
                depth: 0.0,
                ..Default::default()
            })
            .build()
            .unwrap();
        assert!(matches!(
            run(&tables, &request, &ProgressReporter::new()),
            Err(EngineError::InvalidInput { .. })
        ));
    }
}

use crate::core::models::ids::{ConfigId, IonId, SpeciesId};
use crate::core::resonance::ResonanceInput;
use crate::engine::diffusion::{DEFAULT_DEPTH, DEFAULT_DX, DiffusionMode};
use crate::engine::thermal::ThermalMode;
use nalgebra::Vector3;
use thiserror::Error;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_LAYER_THICKNESS: f64 = 1e-6;
pub const DEFAULT_EXCHANGE_AREA: f64 = 1e-4;
pub const DEFAULT_THERMAL_STEP: f64 = 0.1;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlasmaOptions {
    /// Derive the ion energy from an RK4 flight through the gap instead of
    /// `Z·e·V`. An ion-energy override in the configuration still wins.
    pub use_trajectory: bool,
    /// Uniform magnetic field for the trajectory [T].
    pub magnetic_field: Vector3<f64>,
}

impl Default for PlasmaOptions {
    fn default() -> Self {
        Self {
            use_trajectory: false,
            magnetic_field: Vector3::zeros(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticeOptions {
    /// Number of sites to generate.
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionOptions {
    pub seed: u64,
    /// Separation for the potential evaluation [m]; the nearest-neighbour
    /// distance when absent.
    pub separation_override: Option<f64>,
    pub resonance: ResonanceInput,
}

impl Default for CollisionOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            separation_override: None,
            resonance: ResonanceInput::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusionOptions {
    pub mode: DiffusionMode,
    pub depth: f64,
    pub dx: f64,
    pub dt: Option<f64>,
    /// Feed the thermal trace to the grid solvers as a temperature profile.
    pub follow_thermal_trace: bool,
}

impl Default for DiffusionOptions {
    fn default() -> Self {
        Self {
            mode: DiffusionMode::default(),
            depth: DEFAULT_DEPTH,
            dx: DEFAULT_DX,
            dt: None,
            follow_thermal_trace: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalOptions {
    pub mode: ThermalMode,
    pub dt: f64,
    /// Simulated time [s]; the exposure time when absent.
    pub total_time: Option<f64>,
    pub thickness: f64,
    pub area: f64,
    pub relaxation_rate: Option<f64>,
}

impl Default for ThermalOptions {
    fn default() -> Self {
        Self {
            mode: ThermalMode::default(),
            dt: DEFAULT_THERMAL_STEP,
            total_time: None,
            thickness: DEFAULT_LAYER_THICKNESS,
            area: DEFAULT_EXCHANGE_AREA,
            relaxation_rate: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReliefOptions {
    pub exponent: f64,
}

impl Default for ReliefOptions {
    fn default() -> Self {
        Self { exponent: 1.0 }
    }
}

/// Everything one simulation run needs besides the reference records.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub species_id: SpeciesId,
    pub ion_id: IonId,
    pub config_id: ConfigId,
    pub plasma: PlasmaOptions,
    /// Generated lattice; a single site at the origin when absent.
    pub lattice: Option<LatticeOptions>,
    pub collision: CollisionOptions,
    pub diffusion: DiffusionOptions,
    pub thermal: ThermalOptions,
    pub relief: ReliefOptions,
}

#[derive(Default)]
pub struct RunRequestBuilder {
    species_id: Option<SpeciesId>,
    ion_id: Option<IonId>,
    config_id: Option<ConfigId>,
    plasma: Option<PlasmaOptions>,
    lattice: Option<LatticeOptions>,
    collision: Option<CollisionOptions>,
    diffusion: Option<DiffusionOptions>,
    thermal: Option<ThermalOptions>,
    relief: Option<ReliefOptions>,
}

impl RunRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn species(mut self, id: SpeciesId) -> Self {
        self.species_id = Some(id);
        self
    }
    pub fn ion(mut self, id: IonId) -> Self {
        self.ion_id = Some(id);
        self
    }
    pub fn configuration(mut self, id: ConfigId) -> Self {
        self.config_id = Some(id);
        self
    }
    pub fn plasma(mut self, options: PlasmaOptions) -> Self {
        self.plasma = Some(options);
        self
    }
    pub fn lattice(mut self, options: LatticeOptions) -> Self {
        self.lattice = Some(options);
        self
    }
    pub fn collision(mut self, options: CollisionOptions) -> Self {
        self.collision = Some(options);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.collision.get_or_insert_with(CollisionOptions::default).seed = seed;
        self
    }
    pub fn diffusion(mut self, options: DiffusionOptions) -> Self {
        self.diffusion = Some(options);
        self
    }
    pub fn thermal(mut self, options: ThermalOptions) -> Self {
        self.thermal = Some(options);
        self
    }
    pub fn relief(mut self, options: ReliefOptions) -> Self {
        self.relief = Some(options);
        self
    }

    pub fn build(self) -> Result<RunRequest, ConfigError> {
        Ok(RunRequest {
            species_id: self
                .species_id
                .ok_or(ConfigError::MissingParameter("species_id"))?,
            ion_id: self.ion_id.ok_or(ConfigError::MissingParameter("ion_id"))?,
            config_id: self
                .config_id
                .ok_or(ConfigError::MissingParameter("config_id"))?,
            plasma: self.plasma.unwrap_or_default(),
            lattice: self.lattice,
            collision: self.collision.unwrap_or_default(),
            diffusion: self.diffusion.unwrap_or_default(),
            thermal: self.thermal.unwrap_or_default(),
            relief: self.relief.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::EngineError;
    use crate::core::lattice::structure::CrystalStructure;
    use crate::core::models::config::SimulationConfig;
    use crate::core::models::ion::IonSpecies;
    use crate::core::models::species::AtomSpecies;
    use crate::core::models::tables::ReferenceTables;

    fn ids() -> (SpeciesId, IonId, ConfigId) {
        let mut tables = ReferenceTables::new();
        let species = tables.add_species(AtomSpecies::new(
            "Fe",
            9.273e-26,
            2.86,
            CrystalStructure::Bcc,
        ));
        let ion = tables.add_ion(IonSpecies::new("Ar+", 6.634e-26, 1));
        let config = tables.add_configuration("glow", SimulationConfig::glow_discharge(500.0, 10.0));
        (species, ion, config)
    }

    #[test]
    fn builder_fills_defaults_for_optional_groups() {
        let (species, ion, config) = ids();
        let request = RunRequestBuilder::new()
            .species(species)
            .ion(ion)
            .configuration(config)
            .build()
            .unwrap();

        assert_eq!(request.lattice, None);
        assert_eq!(request.collision, CollisionOptions::default());
        assert_eq!(request.diffusion.mode, DiffusionMode::Analytic);
        assert_eq!(request.thermal.dt, DEFAULT_THERMAL_STEP);
        assert_eq!(request.relief.exponent, 1.0);
    }

    #[test]
    fn builder_seed_keeps_other_collision_options() {
        let (species, ion, config) = ids();
        let request = RunRequestBuilder::new()
            .species(species)
            .ion(ion)
            .configuration(config)
            .collision(CollisionOptions {
                separation_override: Some(3e-10),
                ..Default::default()
            })
            .seed(7)
            .build()
            .unwrap();

        assert_eq!(request.collision.seed, 7);
        assert_eq!(request.collision.separation_override, Some(3e-10));
    }

    #[test]
    fn builder_fails_without_ids() {
        let (species, ion, _) = ids();
        let result = RunRequestBuilder::new().species(species).ion(ion).build();
        assert_eq!(result, Err(ConfigError::MissingParameter("config_id")));

        let result = RunRequestBuilder::new().build();
        assert_eq!(result, Err(ConfigError::MissingParameter("species_id")));
    }

    #[test]
    fn missing_id_converts_into_engine_config_error() {
        fn build(builder: RunRequestBuilder) -> Result<RunRequest, EngineError> {
            Ok(builder.build()?)
        }
        let err = build(RunRequestBuilder::new()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config {
                source: ConfigError::MissingParameter("species_id")
            }
        ));
        assert!(err.to_string().contains("species_id"));
    }
}

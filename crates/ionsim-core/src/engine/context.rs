use super::config::RunRequest;
use super::error::EngineError;
use super::progress::ProgressReporter;
use crate::core::error::require_positive;
use crate::core::models::config::SimulationConfig;
use crate::core::models::ion::IonSpecies;
use crate::core::models::species::AtomSpecies;
use crate::core::models::tables::ReferenceStore;

/// The resolved, read-only inputs of one run, threaded through every stage.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub species: &'a AtomSpecies,
    pub ion: &'a IonSpecies,
    pub config: &'a SimulationConfig,
    pub request: &'a RunRequest,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> RunContext<'a> {
    pub fn new(
        species: &'a AtomSpecies,
        ion: &'a IonSpecies,
        config: &'a SimulationConfig,
        request: &'a RunRequest,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            species,
            ion,
            config,
            request,
            reporter,
        }
    }

    /// Looks up the records named by `request` and checks the run-level
    /// invariants that no later stage can recover from.
    pub fn resolve<S>(
        store: &'a S,
        request: &'a RunRequest,
        reporter: &'a ProgressReporter<'a>,
    ) -> Result<Self, EngineError>
    where
        S: ReferenceStore + ?Sized,
    {
        let species = store
            .species(request.species_id)
            .ok_or(EngineError::SpeciesNotFound(request.species_id))?;
        let ion = store
            .ion(request.ion_id)
            .ok_or(EngineError::IonNotFound(request.ion_id))?;
        let config = store
            .configuration(request.config_id)
            .ok_or(EngineError::ConfigurationNotFound(request.config_id))?;

        require_positive("lattice_constant", species.lattice_constant)?;
        require_positive("target_mass", species.mass)?;
        require_positive("exposure_time", config.exposure_time)?;

        Ok(Self::new(species, ion, config, request, reporter))
    }

    #[inline]
    pub fn exposure_time(&self) -> f64 {
        self.config.exposure_time
    }

    #[inline]
    pub fn ambient_temperature(&self) -> f64 {
        self.config
            .thermal
            .ambient_temperature
            .unwrap_or(DEFAULT_AMBIENT_TEMPERATURE)
    }
}

pub const DEFAULT_AMBIENT_TEMPERATURE: f64 = 300.0;

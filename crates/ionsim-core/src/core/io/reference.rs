use crate::core::lattice::structure::CrystalStructure;
use crate::core::models::config::SimulationConfig;
use crate::core::models::ion::IonSpecies;
use crate::core::models::species::{AtomSpecies, PotentialParams};
use crate::core::models::tables::ReferenceTables;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid record '{name}' in '{path}': {reason}")]
    InvalidRecord {
        path: String,
        name: String,
        reason: String,
    },
}

/// One row of `species.csv`. Empty cells deserialize to `None`.
#[derive(Debug, Deserialize)]
struct SpeciesRecord {
    name: String,
    mass: f64,
    lattice_constant: f64,
    structure: CrystalStructure,
    debye_temperature: Option<f64>,
    valence: Option<u32>,
    cohesive_energy_1: Option<f64>,
    cohesive_energy_2: Option<f64>,
    screening_length: Option<f64>,
    diffusion_prefactor_1: Option<f64>,
    diffusion_prefactor_2: Option<f64>,
    packing_factor: Option<f64>,
    morse_well_depth_ev: Option<f64>,
    morse_alpha: Option<f64>,
    equilibrium_distance: Option<f64>,
    born_mayer_amplitude: Option<f64>,
    born_mayer_length: Option<f64>,
    molar_mass: Option<f64>,
    density: Option<f64>,
    thermal_conductivity: Option<f64>,
}

impl From<SpeciesRecord> for AtomSpecies {
    fn from(r: SpeciesRecord) -> Self {
        let mut species = AtomSpecies::new(&r.name, r.mass, r.lattice_constant, r.structure);
        species.debye_temperature = r.debye_temperature;
        if let Some(valence) = r.valence {
            species.valence = valence;
        }
        species.cohesive_energy_1 = r.cohesive_energy_1;
        species.cohesive_energy_2 = r.cohesive_energy_2;
        species.screening_length = r.screening_length;
        species.diffusion_prefactor_1 = r.diffusion_prefactor_1;
        species.diffusion_prefactor_2 = r.diffusion_prefactor_2;
        species.packing_factor = r.packing_factor;
        species.potential = PotentialParams {
            morse_well_depth_ev: r.morse_well_depth_ev,
            morse_alpha: r.morse_alpha,
            equilibrium_distance: r.equilibrium_distance,
            born_mayer_amplitude: r.born_mayer_amplitude,
            born_mayer_length: r.born_mayer_length,
        };
        species.molar_mass = r.molar_mass;
        species.density = r.density;
        species.thermal_conductivity = r.thermal_conductivity;
        species
    }
}

#[derive(Debug, Deserialize)]
struct IonRecord {
    name: String,
    mass: f64,
    charge: i32,
}

impl ReferenceTables {
    /// Loads the three reference files into a fresh set of tables.
    pub fn load(
        species_path: &Path,
        ions_path: &Path,
        configurations_path: &Path,
    ) -> Result<Self, ParamLoadError> {
        let mut tables = Self::new();
        for species in load_species_csv(species_path)? {
            tables.add_species(species);
        }
        for ion in load_ions_csv(ions_path)? {
            tables.add_ion(ion);
        }
        for (name, config) in load_configurations_toml(configurations_path)? {
            tables.add_configuration(&name, config);
        }
        info!(
            species = tables.species_count(),
            ions = tables.ion_count(),
            configurations = tables.configuration_count(),
            "Reference tables loaded."
        );
        Ok(tables)
    }
}

pub fn load_species_csv(path: &Path) -> Result<Vec<AtomSpecies>, ParamLoadError> {
    let records: Vec<SpeciesRecord> = read_csv(path)?;
    let mut species = Vec::with_capacity(records.len());
    for record in records {
        if !(record.lattice_constant.is_finite() && record.lattice_constant > 0.0) {
            return Err(invalid(path, &record.name, "lattice_constant must be positive"));
        }
        if !(record.mass.is_finite() && record.mass > 0.0) {
            return Err(invalid(path, &record.name, "mass must be positive"));
        }
        debug!(name = %record.name, structure = %record.structure, "Loaded species record.");
        species.push(record.into());
    }
    Ok(species)
}

pub fn load_ions_csv(path: &Path) -> Result<Vec<IonSpecies>, ParamLoadError> {
    let records: Vec<IonRecord> = read_csv(path)?;
    records
        .into_iter()
        .map(|r| {
            if !(r.mass.is_finite() && r.mass > 0.0) {
                return Err(invalid(path, &r.name, "mass must be positive"));
            }
            Ok(IonSpecies::new(&r.name, r.mass, r.charge))
        })
        .collect()
}

/// Reads `[<name>]` tables, returned in name order.
pub fn load_configurations_toml(
    path: &Path,
) -> Result<BTreeMap<String, SimulationConfig>, ParamLoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

fn read_csv<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, ParamLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| ParamLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

    reader
        .deserialize::<T>()
        .map(|result| {
            result.map_err(|e| ParamLoadError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })
        })
        .collect()
}

fn invalid(path: &Path, name: &str, reason: &str) -> ParamLoadError {
    ParamLoadError::InvalidRecord {
        path: path.to_string_lossy().to_string(),
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use ionsim::core::resonance::ResonanceInput;
use ionsim::engine::config as core_config;
use ionsim::engine::diffusion::DiffusionMode;
use ionsim::engine::thermal::ThermalMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialReferenceConfig {
    species_table: Option<PathBuf>,
    ion_table: Option<PathBuf>,
    configurations: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSelectionConfig {
    species: Option<String>,
    ion: Option<String>,
    config_id: Option<String>,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialPlasmaConfig {
    use_trajectory: Option<bool>,
    magnetic_field: Option<[f64; 3]>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialLatticeConfig {
    count: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialCollisionConfig {
    separation: Option<f64>,
    external_frequency: Option<f64>,
    natural_frequency: Option<f64>,
    empirical_gain: Option<f64>,
    damping: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialDiffusionConfig {
    mode: Option<DiffusionMode>,
    depth: Option<f64>,
    dx: Option<f64>,
    dt: Option<f64>,
    follow_thermal_trace: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialThermalConfig {
    mode: Option<ThermalMode>,
    dt: Option<f64>,
    total_time: Option<f64>,
    thickness: Option<f64>,
    area: Option<f64>,
    relaxation_rate: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialReliefConfig {
    exponent: Option<f64>,
}

/// The run file as written by the user; every field is optional until
/// merged with the command line.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    reference: Option<PartialReferenceConfig>,
    run: Option<PartialSelectionConfig>,
    plasma: Option<PartialPlasmaConfig>,
    lattice: Option<PartialLatticeConfig>,
    collision: Option<PartialCollisionConfig>,
    diffusion: Option<PartialDiffusionConfig>,
    thermal: Option<PartialThermalConfig>,
    relief: Option<PartialReliefConfig>,
    #[serde(skip)]
    base_dir: PathBuf,
}

/// A fully resolved run: reference file paths, record names, and the option
/// groups of the core run request.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub species_table: PathBuf,
    pub ion_table: PathBuf,
    pub configurations: PathBuf,
    pub species: String,
    pub ion: String,
    pub config_id: String,
    pub plasma: core_config::PlasmaOptions,
    pub lattice: Option<core_config::LatticeOptions>,
    pub collision: core_config::CollisionOptions,
    pub diffusion: core_config::DiffusionOptions,
    pub thermal: core_config::ThermalOptions,
    pub relief: core_config::ReliefOptions,
}

impl RunPlan {
    /// A request builder carrying every option group; the record ids are
    /// added once the reference tables are loaded.
    pub fn request_builder(&self) -> core_config::RunRequestBuilder {
        let builder = core_config::RunRequestBuilder::new()
            .plasma(self.plasma)
            .collision(self.collision)
            .diffusion(self.diffusion)
            .thermal(self.thermal)
            .relief(self.relief);
        match self.lattice {
            Some(lattice) => builder.lattice(lattice),
            None => builder,
        }
    }
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading run configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn merge_with_cli(mut self, args: &RunArgs) -> Result<RunPlan> {
        let reference = self.reference.take().unwrap_or_default();
        let selection = self.run.take().unwrap_or_default();

        let resolve_path = |path: Option<PathBuf>, key: &str| -> Result<PathBuf> {
            let path = path.ok_or_else(|| {
                CliError::Config(format!("`reference.{key}` is required in the run file."))
            })?;
            let resolved = if path.is_absolute() {
                path
            } else {
                self.base_dir.join(path)
            };
            if !resolved.exists() {
                return Err(CliError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Reference file does not exist: {}", resolved.display()),
                )));
            }
            Ok(resolved)
        };

        let species_table = resolve_path(reference.species_table, "species-table")?;
        let ion_table = resolve_path(reference.ion_table, "ion-table")?;
        let configurations = resolve_path(reference.configurations, "configurations")?;

        let required = |cli: &Option<String>, file: Option<String>, key: &str| -> Result<String> {
            cli.clone().or(file).ok_or_else(|| {
                CliError::Config(format!(
                    "A value for '{key}' is required either in the run file or via CLI argument."
                ))
            })
        };
        let species = required(&args.species, selection.species, "run.species")?;
        let ion = required(&args.ion, selection.ion, "run.ion")?;
        let config_id = required(&args.config_id, selection.config_id, "run.config-id")?;

        let plasma = Self::merge_plasma(self.plasma.take());
        let lattice = self
            .lattice
            .take()
            .and_then(|l| l.count)
            .map(|count| core_config::LatticeOptions { count });
        let collision = Self::merge_collision(
            self.collision.take(),
            args.seed.or(selection.seed),
        )?;
        let diffusion = Self::merge_diffusion(self.diffusion.take(), args.mode.map(Into::into));
        let thermal = Self::merge_thermal(self.thermal.take())?;
        let relief = core_config::ReliefOptions {
            exponent: self
                .relief
                .take()
                .and_then(|r| r.exponent)
                .unwrap_or(core_config::ReliefOptions::default().exponent),
        };

        Ok(RunPlan {
            species_table,
            ion_table,
            configurations,
            species,
            ion,
            config_id,
            plasma,
            lattice,
            collision,
            diffusion,
            thermal,
            relief,
        })
    }

    fn merge_plasma(partial: Option<PartialPlasmaConfig>) -> core_config::PlasmaOptions {
        let partial = partial.unwrap_or_default();
        let defaults = core_config::PlasmaOptions::default();
        core_config::PlasmaOptions {
            use_trajectory: partial.use_trajectory.unwrap_or(defaults.use_trajectory),
            magnetic_field: partial
                .magnetic_field
                .map(Into::into)
                .unwrap_or(defaults.magnetic_field),
        }
    }

    fn merge_collision(
        partial: Option<PartialCollisionConfig>,
        seed: Option<u64>,
    ) -> Result<core_config::CollisionOptions> {
        let partial = partial.unwrap_or_default();
        if let Some(separation) = partial.separation {
            if !(separation.is_finite() && separation > 0.0) {
                return Err(CliError::Config(format!(
                    "`collision.separation` must be a positive length in metres, got {separation}"
                )));
            }
        }
        let defaults = ResonanceInput::default();
        Ok(core_config::CollisionOptions {
            seed: seed.unwrap_or(core_config::DEFAULT_SEED),
            separation_override: partial.separation,
            resonance: ResonanceInput {
                external_frequency: partial
                    .external_frequency
                    .unwrap_or(defaults.external_frequency),
                natural_frequency: partial.natural_frequency,
                empirical_gain: partial.empirical_gain.unwrap_or(defaults.empirical_gain),
                damping: partial.damping.unwrap_or(defaults.damping),
            },
        })
    }

    fn merge_diffusion(
        partial: Option<PartialDiffusionConfig>,
        cli_mode: Option<DiffusionMode>,
    ) -> core_config::DiffusionOptions {
        let partial = partial.unwrap_or_default();
        let defaults = core_config::DiffusionOptions::default();
        core_config::DiffusionOptions {
            mode: cli_mode.or(partial.mode).unwrap_or(defaults.mode),
            depth: partial.depth.unwrap_or(defaults.depth),
            dx: partial.dx.unwrap_or(defaults.dx),
            dt: partial.dt.or(defaults.dt),
            follow_thermal_trace: partial
                .follow_thermal_trace
                .unwrap_or(defaults.follow_thermal_trace),
        }
    }

    fn merge_thermal(partial: Option<PartialThermalConfig>) -> Result<core_config::ThermalOptions> {
        let partial = partial.unwrap_or_default();
        let defaults = core_config::ThermalOptions::default();
        if let Some(total_time) = partial.total_time {
            if !(total_time.is_finite() && total_time > 0.0) {
                return Err(CliError::Config(format!(
                    "`thermal.total-time` must be positive, got {total_time}"
                )));
            }
        }
        Ok(core_config::ThermalOptions {
            mode: partial.mode.unwrap_or(defaults.mode),
            dt: partial.dt.unwrap_or(defaults.dt),
            total_time: partial.total_time.or(defaults.total_time),
            thickness: partial.thickness.unwrap_or(defaults.thickness),
            area: partial.area.unwrap_or(defaults.area),
            relaxation_rate: partial.relaxation_rate.or(defaults.relaxation_rate),
        })
    }
}

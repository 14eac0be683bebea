use crate::cli::RunArgs;
use crate::commands::open_output;
use crate::config::{PartialRunConfig, RunPlan};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use ionsim::core::constants::joule_to_ev;
use ionsim::core::models::tables::ReferenceTables;
use ionsim::engine::config::RunRequest;
use ionsim::engine::error::EngineError;
use ionsim::engine::progress::ProgressReporter;
use ionsim::workflows::simulate::{self, SimulationResult};
use std::io::Write;
use tracing::info;

pub fn run(args: RunArgs, show_progress: bool) -> Result<()> {
    let partial_config = PartialRunConfig::from_file(&args.config)?;
    info!("Merging run configuration from file and CLI arguments...");
    let plan = partial_config.merge_with_cli(&args)?;

    info!("Loading reference tables...");
    let tables = ReferenceTables::load(&plan.species_table, &plan.ion_table, &plan.configurations)?;
    let request = build_request(&plan, &tables)?;

    let progress_handler = if show_progress {
        CliProgressHandler::new()
    } else {
        CliProgressHandler::hidden()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    eprintln!(
        "Simulating {} bombardment of {} ({})...",
        plan.ion, plan.species, plan.config_id
    );
    let result = simulate::run(&tables, &request, &reporter)?;

    let serialized = toml::to_string_pretty(&result)?;
    let mut out = open_output(args.output.as_deref())?;
    out.write_all(serialized.as_bytes())?;
    out.flush()?;

    print_summary(&result);
    if let Some(path) = &args.output {
        eprintln!("✓ Result written to: {}", path.display());
    }
    Ok(())
}

pub(crate) fn build_request(plan: &RunPlan, tables: &ReferenceTables) -> Result<RunRequest> {
    let species = tables
        .species_id(&plan.species)
        .ok_or_else(|| CliError::Config(format!("Unknown species '{}'", plan.species)))?;
    let ion = tables
        .ion_id(&plan.ion)
        .ok_or_else(|| CliError::Config(format!("Unknown ion '{}'", plan.ion)))?;
    let config = tables.configuration_id(&plan.config_id).ok_or_else(|| {
        CliError::Config(format!("Unknown configuration '{}'", plan.config_id))
    })?;

    plan.request_builder()
        .species(species)
        .ion(ion)
        .configuration(config)
        .build()
        .map_err(|e| EngineError::from(e).into())
}

fn print_summary(result: &SimulationResult) {
    eprintln!("  Sites:                {}", result.site_count);
    eprintln!(
        "  Transferred energy:   {:.3} eV total, {:.3} eV per site",
        joule_to_ev(result.total_transferred_energy),
        joule_to_ev(result.average_transferred_energy)
    );
    eprintln!(
        "  Temperature:          {:.1} K -> {:.1} K",
        result.initial_temperature, result.final_temperature
    );
    eprintln!(
        "  Effective diffusion:  {:.3e} m²/s, mean depth {:.3e} m",
        result.diffusion.effective_coefficient, result.diffusion.mean_depth
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;

    const SPECIES_CSV: &str = "\
name,mass,lattice_constant,structure,debye_temperature,valence,cohesive_energy_1,cohesive_energy_2,screening_length,diffusion_prefactor_1,diffusion_prefactor_2,packing_factor,morse_well_depth_ev,morse_alpha,equilibrium_distance,born_mayer_amplitude,born_mayer_length,molar_mass,density,thermal_conductivity
Fe,9.273e-26,2.86,BCC,470,2,4.28,4.28,,2e-4,5e-5,,,,,,,55.845e-3,7874,80.4
";

    const IONS_CSV: &str = "\
name,mass,charge
Ar+,6.634e-26,1
";

    const CONFIGURATIONS_TOML: &str = r#"
[glow]
voltage = 500.0
current = 0.5
pressure = 100.0
electron_temperature = 2.0
chamber_width = 0.1
chamber_height = 0.1
chamber_depth = 0.1
electrode_distance = 0.05
exposure_time = 10.0
"#;

    const RUN_TOML: &str = r#"
[reference]
species-table = "species.csv"
ion-table = "ions.csv"
configurations = "configurations.toml"

[run]
species = "Fe"
ion = "Ar+"
config-id = "glow"
seed = 3

[lattice]
count = 27
"#;

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("species.csv"), SPECIES_CSV).unwrap();
        fs::write(dir.path().join("ions.csv"), IONS_CSV).unwrap();
        fs::write(dir.path().join("configurations.toml"), CONFIGURATIONS_TOML).unwrap();
        fs::write(dir.path().join("run.toml"), RUN_TOML).unwrap();
        dir
    }

    fn args(dir: &tempfile::TempDir, extra: &[&str]) -> RunArgs {
        let config = dir.path().join("run.toml");
        let output = dir.path().join("result.toml");
        let mut argv = vec![
            "ionsim".to_string(),
            "run".to_string(),
            "-c".to_string(),
            config.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Run(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn run_writes_a_toml_result() {
        let dir = workspace();
        run(args(&dir, &[]), false).unwrap();

        let content = fs::read_to_string(dir.path().join("result.toml")).unwrap();
        let value: toml::Table = toml::from_str(&content).unwrap();
        assert_eq!(value["species"].as_str(), Some("Fe"));
        assert_eq!(value["site_count"].as_integer(), Some(27));
        assert!(value["total_transferred_energy"].as_float().unwrap() > 0.0);
        assert!(value.contains_key("diffusion"));
        assert!(value.contains_key("thermal"));
    }

    #[test]
    fn unknown_species_is_reported_by_name() {
        let dir = workspace();
        let result = run(args(&dir, &["--species", "Cu"]), false);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("'Cu'")));
    }

    #[test]
    fn grid_mode_override_reaches_the_result() {
        let dir = workspace();
        run(args(&dir, &["--mode", "crank-nicolson"]), false).unwrap();
        let content = fs::read_to_string(dir.path().join("result.toml")).unwrap();
        let value: toml::Table = toml::from_str(&content).unwrap();
        assert_eq!(value["diffusion"]["mode"].as_str(), Some("crank-nicolson"));
    }
}

use crate::cli::PotentialArgs;
use crate::commands::open_output;
use crate::error::{CliError, Result};
use ionsim::core::io::reference::load_species_csv;
use ionsim::core::models::tables::ReferenceTables;
use ionsim::workflows::operations;
use serde::Serialize;
use tracing::info;

const METERS_PER_ANGSTROM: f64 = 1e-10;

#[derive(Debug, Serialize)]
struct PotentialRow {
    r_angstrom: f64,
    value_j: f64,
    stiffness_n_per_m: f64,
    regime: &'static str,
}

pub fn run(args: PotentialArgs) -> Result<()> {
    if !(args.r_min > 0.0 && args.r_max >= args.r_min) {
        return Err(CliError::Argument(format!(
            "separation range must satisfy 0 < r-min <= r-max (got {} .. {})",
            args.r_min, args.r_max
        )));
    }

    let mut tables = ReferenceTables::new();
    for species in load_species_csv(&args.species_table)? {
        tables.add_species(species);
    }
    let species_id = tables
        .species_id(&args.species)
        .ok_or_else(|| CliError::Config(format!("Unknown species '{}'", args.species)))?;

    info!(species = %args.species, points = args.points, "Scanning pair potential.");
    let scan = operations::scan_potential(
        &tables,
        species_id,
        args.r_min * METERS_PER_ANGSTROM,
        args.r_max * METERS_PER_ANGSTROM,
        args.points,
    )?;

    let mut writer = csv::Writer::from_writer(open_output(args.output.as_deref())?);
    for (r, evaluation) in scan {
        writer.serialize(PotentialRow {
            r_angstrom: r / METERS_PER_ANGSTROM,
            value_j: evaluation.value,
            stiffness_n_per_m: evaluation.stiffness,
            regime: evaluation.regime.as_str(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

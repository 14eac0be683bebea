use crate::cli::LatticeArgs;
use crate::commands::open_output;
use crate::error::Result;
use ionsim::core::lattice::generator::generate_lattice;
use ionsim::engine::error::EngineError;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct SiteRow {
    x: f64,
    y: f64,
    z: f64,
    structure: &'static str,
}

/// Writes the generated sites as CSV, positions in metres.
pub fn run(args: LatticeArgs) -> Result<()> {
    info!(structure = %args.structure, count = args.count, "Generating lattice sites.");
    let sites = generate_lattice(args.structure, args.lattice_constant * 1e-10, args.count)
        .map_err(EngineError::from)?;

    let mut writer = csv::Writer::from_writer(open_output(args.output.as_deref())?);
    for site in &sites {
        writer.serialize(SiteRow {
            x: site.position.x,
            y: site.position.y,
            z: site.position.z,
            structure: site.structure.as_str(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use ionsim::core::lattice::structure::CrystalStructure;

    #[test]
    fn writes_requested_number_of_sites() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("sites.csv");
        run(LatticeArgs {
            structure: CrystalStructure::Fcc,
            lattice_constant: 3.615,
            count: 10,
            output: Some(output.clone()),
        })
        .unwrap();

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 10);
        assert_eq!(&rows[0][0], "0.0");
        assert_eq!(&rows[0][3], CrystalStructure::Fcc.as_str());
    }

    #[test]
    fn non_positive_lattice_constant_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(LatticeArgs {
            structure: CrystalStructure::Sc,
            lattice_constant: 0.0,
            count: 4,
            output: Some(dir.path().join("sites.csv")),
        });
        assert!(matches!(result, Err(CliError::Engine(_))));
    }
}

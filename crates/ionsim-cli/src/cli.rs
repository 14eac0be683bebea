use clap::{Args, Parser, Subcommand, ValueEnum};
use ionsim::core::lattice::structure::CrystalStructure;
use ionsim::engine::diffusion::DiffusionMode;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "ionsim - simulate ion bombardment of crystalline surfaces: energy transfer, thermal relaxation and enhanced diffusion.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for the per-site collision loop.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a complete bombardment simulation and write the result as TOML.
    Run(RunArgs),
    /// Scan the pair potential of a species over a range of separations.
    Potential(PotentialArgs),
    /// Generate lattice sites for a crystal structure.
    Lattice(LatticeArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the run configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Path for the result file. The result is printed to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    // --- Reference Overrides ---
    /// Override the target species name from the config file.
    #[arg(long, value_name = "NAME")]
    pub species: Option<String>,

    /// Override the ion name from the config file.
    #[arg(long, value_name = "NAME")]
    pub ion: Option<String>,

    /// Override the plasma configuration id from the config file.
    #[arg(long, value_name = "ID")]
    pub config_id: Option<String>,

    // --- Run Overrides ---
    /// Override the random seed of the collision loop.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Override the diffusion profile mode.
    #[arg(short, long, value_enum, value_name = "MODE")]
    pub mode: Option<ModeArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Analytic,
    Explicit,
    CrankNicolson,
}

impl From<ModeArg> for DiffusionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Analytic => DiffusionMode::Analytic,
            ModeArg::Explicit => DiffusionMode::Explicit,
            ModeArg::CrankNicolson => DiffusionMode::CrankNicolson,
        }
    }
}

/// Arguments for the `potential` subcommand.
#[derive(Args, Debug)]
pub struct PotentialArgs {
    /// Path to the species table (CSV).
    #[arg(short = 't', long, required = true, value_name = "PATH")]
    pub species_table: PathBuf,

    /// Name of the species to evaluate.
    #[arg(short, long, required = true, value_name = "NAME")]
    pub species: String,

    /// Smallest separation in ångström.
    #[arg(long, default_value_t = 0.5, value_name = "FLOAT")]
    pub r_min: f64,

    /// Largest separation in ångström.
    #[arg(long, default_value_t = 8.0, value_name = "FLOAT")]
    pub r_max: f64,

    /// Number of separations to evaluate.
    #[arg(short = 'n', long, default_value_t = 200, value_name = "INT")]
    pub points: usize,

    /// Path for the CSV output. Written to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `lattice` subcommand.
#[derive(Args, Debug)]
pub struct LatticeArgs {
    /// Crystal structure (sc, bcc, fcc, hcp or a long name such as body-centered-cubic).
    #[arg(short, long, required = true, value_name = "STRUCTURE")]
    pub structure: CrystalStructure,

    /// Lattice constant in ångström.
    #[arg(short = 'a', long, required = true, value_name = "FLOAT")]
    pub lattice_constant: f64,

    /// Number of sites to generate.
    #[arg(short = 'n', long, required = true, value_name = "INT")]
    pub count: usize,

    /// Path for the CSV output. Written to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

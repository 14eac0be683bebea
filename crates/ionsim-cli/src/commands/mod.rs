pub mod lattice;
pub mod potential;
pub mod run;

use crate::error::Result;
use std::io::Write;
use std::path::Path;

/// Opens `path` for writing, or stdout when no path is given.
pub(crate) fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    })
}

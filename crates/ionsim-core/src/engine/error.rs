use thiserror::Error;

use super::config::ConfigError;
use crate::core::error::InputError;
use crate::core::models::ids::{ConfigId, IonId, SpeciesId};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {source}")]
    InvalidInput {
        #[from]
        source: InputError,
    },

    #[error("Species not found in reference tables: {0:?}")]
    SpeciesNotFound(SpeciesId),

    #[error("Ion not found in reference tables: {0:?}")]
    IonNotFound(IonId),

    #[error("Configuration not found in reference tables: {0:?}")]
    ConfigurationNotFound(ConfigId),

    #[error("Invalid run configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}

use super::config::ConfigError;
use crate::core::error::InputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Malformed input: {0}")]
    Input(#[from] InputError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Computation was cancelled")]
    Cancelled,
}

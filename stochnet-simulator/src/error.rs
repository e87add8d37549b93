use stochnet_config::ConfigError;
use stochnet_core::BuildError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Model error: {0}")]
    Build(#[from] BuildError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Replay diverged!\nExpected: {expected}\nActual: {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("Scenario carries no expected digest")]
    MissingDigest,
}

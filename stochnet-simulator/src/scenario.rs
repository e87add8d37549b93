//! Scenario loading: model files to ready-to-run simulations.

use std::path::Path;

use stochnet_config::ModelConfig;
use tracing::debug;

use crate::{Simulation, SimulationError};

/// Loads and validates a model file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ModelConfig, SimulationError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading scenario");
    Ok(ModelConfig::load_from_path(path)?)
}

impl Simulation {
    /// Builds the network described by `config` and prepares its run.
    pub fn from_config(config: &ModelConfig) -> Result<Self, SimulationError> {
        let network = config.to_builder().build()?;
        let simulation =
            Simulation::new(network, config.horizon, config.seed)?.with_step_order(config.step_order);
        Ok(simulation)
    }
}

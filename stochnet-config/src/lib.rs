//! # Stochnet Configuration
//!
//! Declarative description of a stochastic Petri net model and its run
//! parameters.
//!
//! Values are layered in this order, later layers winning:
//! 1. Built-in defaults
//! 2. A YAML model file
//! 3. `STOCHNET_*` environment variables (`__` separates nested keys)

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use stochnet_core::distribution::Distribution;
use stochnet_core::elements::FiringPolicy;
use stochnet_core::time::{SimTime, StepOrder};
use stochnet_core::NetworkBuilder;
use validator::Validate;

mod distribution;
mod error;
mod model;
mod telemetry;
mod validation;

pub use distribution::DistributionConfig;
pub use error::ConfigError;
pub use model::{
    ArcConfig, ComparisonOp, ConditionConfig, GeneratorConfig, PlaceConfig, TransitionConfig,
};
pub use telemetry::TelemetryConfig;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "STOCHNET_";

/// Complete model and run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ModelConfig {
    /// Last simulated time unit.
    #[serde(default = "default_horizon")]
    #[validate(range(min = 1))]
    pub horizon: SimTime,

    /// Seed of the single random source of a run.
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub step_order: StepOrder,

    #[serde(default)]
    pub firing_policy: FiringPolicy,

    /// Register the reserved `Generator` element.
    #[serde(default = "default_true")]
    pub default_generator: bool,

    /// Register the reserved `Terminator` element.
    #[serde(default = "default_true")]
    pub default_terminator: bool,

    /// Inter-arrival law of the reserved generator.
    #[serde(default)]
    #[validate(custom(function = validation::validate_distribution))]
    pub inter_arrival: DistributionConfig,

    #[serde(default)]
    #[validate(nested)]
    pub generators: Vec<GeneratorConfig>,

    #[serde(default)]
    #[validate(custom(function = validation::validate_identifiers))]
    pub terminators: Vec<String>,

    #[serde(default)]
    #[validate(nested)]
    pub places: Vec<PlaceConfig>,

    #[serde(default)]
    #[validate(nested)]
    pub transitions: Vec<TransitionConfig>,

    #[serde(default)]
    #[validate(nested)]
    pub arcs: Vec<ArcConfig>,

    /// BLAKE3 digest a replay of this model must reproduce.
    #[serde(default)]
    #[validate(custom(function = validation::validate_digest))]
    pub expected_digest: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

fn default_horizon() -> SimTime {
    100
}

fn default_seed() -> u64 {
    42
}

fn default_true() -> bool {
    true
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            seed: default_seed(),
            step_order: StepOrder::default(),
            firing_policy: FiringPolicy::default(),
            default_generator: true,
            default_terminator: true,
            inter_arrival: DistributionConfig::default(),
            generators: Vec::new(),
            terminators: Vec::new(),
            places: Vec::new(),
            transitions: Vec::new(),
            arcs: Vec::new(),
            expected_digest: None,
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl ModelConfig {
    /// Load a model file, apply `STOCHNET_*` overrides and validate.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::from(Serialized::defaults(ModelConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Parse and validate a model from YAML text. Environment overrides are
    /// not applied.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::from(Serialized::defaults(ModelConfig::default()))
            .merge(Yaml::string(yaml))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Translate the declarations into builder calls. Identifier resolution
    /// and structural checks happen in [`NetworkBuilder::build`].
    pub fn to_builder(&self) -> NetworkBuilder {
        let mut builder = NetworkBuilder::new();
        builder.firing_policy(self.firing_policy);

        if self.default_generator {
            builder.default_generator(Distribution::from(&self.inter_arrival));
        }
        if self.default_terminator {
            builder.default_terminator();
        }
        for generator in &self.generators {
            builder.add_generator(
                generator.id.as_str(),
                Distribution::from(&generator.inter_arrival),
            );
        }
        builder.add_terminators(self.terminators.iter().map(String::as_str));
        for place in &self.places {
            builder.add_place(place.id.as_str(), place.capacity(), place.initial_load);
        }
        for transition in &self.transitions {
            let delay = Distribution::from(&transition.delay);
            match &transition.condition {
                Some(condition) => builder.add_conditional_transition(
                    transition.id.as_str(),
                    delay,
                    transition.priority,
                    condition.place.as_str(),
                    condition.predicate(),
                ),
                None => builder.add_transition(transition.id.as_str(), delay, transition.priority),
            };
        }
        for arc in &self.arcs {
            builder.add_arc(arc.from.as_str(), arc.to.as_str(), arc.multiplicity);
        }
        builder
    }
}

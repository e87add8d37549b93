//! Command-line overrides shared by every subcommand that runs a model.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use stochnet_config::ModelConfig;
use stochnet_core::elements::FiringPolicy;
use stochnet_core::time::StepOrder;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOrderArg {
    ProcessThenCheck,
    CheckThenProcess,
}

impl From<StepOrderArg> for StepOrder {
    fn from(arg: StepOrderArg) -> Self {
        match arg {
            StepOrderArg::ProcessThenCheck => StepOrder::ProcessThenCheck,
            StepOrderArg::CheckThenProcess => StepOrder::CheckThenProcess,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringPolicyArg {
    RawMinimum,
    MultiplicityBatches,
}

impl From<FiringPolicyArg> for FiringPolicy {
    fn from(arg: FiringPolicyArg) -> Self {
        match arg {
            FiringPolicyArg::RawMinimum => FiringPolicy::RawMinimum,
            FiringPolicyArg::MultiplicityBatches => FiringPolicy::MultiplicityBatches,
        }
    }
}

/// Model file plus the run parameters that may be overridden from the shell.
#[derive(Args, Debug, Clone)]
pub struct SimulatorCli {
    /// Path to the YAML model file
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// Seed for the simulation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Last simulated time unit
    #[arg(long)]
    pub horizon: Option<u64>,

    /// When to stop relative to processing the last timestamp
    #[arg(long, value_enum)]
    pub step_order: Option<StepOrderArg>,

    /// How arc multiplicity limits a firing
    #[arg(long, value_enum)]
    pub firing_policy: Option<FiringPolicyArg>,
}

impl SimulatorCli {
    /// Applies the given overrides on top of a loaded model.
    pub fn apply(&self, config: &mut ModelConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(horizon) = self.horizon {
            config.horizon = horizon;
        }
        if let Some(order) = self.step_order {
            config.step_order = order.into();
        }
        if let Some(policy) = self.firing_policy {
            config.firing_policy = policy.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        sim: SimulatorCli,
    }

    #[test]
    fn test_overrides_apply() {
        let harness = Harness::parse_from([
            "stochnet",
            "model.yaml",
            "--seed",
            "9",
            "--step-order",
            "check-then-process",
            "--firing-policy",
            "multiplicity-batches",
        ]);
        let mut config = ModelConfig::default();
        harness.sim.apply(&mut config);
        assert_eq!(config.seed, 9);
        assert_eq!(config.horizon, 100);
        assert_eq!(config.step_order, StepOrder::CheckThenProcess);
        assert_eq!(config.firing_policy, FiringPolicy::MultiplicityBatches);
        assert_eq!(harness.sim.model, PathBuf::from("model.yaml"));
    }
}

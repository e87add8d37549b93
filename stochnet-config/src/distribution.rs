//! Delay distribution parameters.
//!
//! Only the parametric laws can be written in a file; function-backed delays
//! are available through the builder API.

use serde::{Deserialize, Serialize};
use stochnet_core::distribution::Distribution;

/// Distribution parameters tagged by `kind`.
///
/// ```yaml
/// delay: { kind: exponential, mean: 4.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionConfig {
    Constant { value: u64 },
    Normal { mean: f64, std_dev: f64 },
    Exponential { mean: f64 },
    Uniform { low: f64, high: f64 },
}

impl Default for DistributionConfig {
    fn default() -> Self {
        DistributionConfig::Constant { value: 1 }
    }
}

impl From<&DistributionConfig> for Distribution {
    fn from(config: &DistributionConfig) -> Self {
        match *config {
            DistributionConfig::Constant { value } => Distribution::constant(value),
            DistributionConfig::Normal { mean, std_dev } => Distribution::normal(mean, std_dev),
            DistributionConfig::Exponential { mean } => Distribution::exponential(mean),
            DistributionConfig::Uniform { low, high } => Distribution::uniform(low, high),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stochnet_core::distribution::DistributionKind;

    #[test]
    fn parses_tagged_kinds() {
        let parsed: DistributionConfig =
            serde_yaml::from_str("{ kind: normal, mean: 10.0, std_dev: 2.5 }").unwrap();
        assert_eq!(
            parsed,
            DistributionConfig::Normal {
                mean: 10.0,
                std_dev: 2.5
            }
        );
        assert_eq!(Distribution::from(&parsed).kind(), DistributionKind::Normal);

        let parsed: DistributionConfig = serde_yaml::from_str("kind: constant\nvalue: 3").unwrap();
        assert_eq!(parsed, DistributionConfig::Constant { value: 3 });
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(serde_yaml::from_str::<DistributionConfig>("{ kind: weibull }").is_err());
    }
}

//! Element declarations.
//!
//! Each entry mirrors one builder call; cross-references between elements
//! are resolved when the network is built, not here.

use serde::{Deserialize, Serialize};
use stochnet_core::elements::{Capacity, Predicate};
use validator::Validate;

use crate::distribution::DistributionConfig;
use crate::validation;

/// A named token source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GeneratorConfig {
    #[validate(custom(function = validation::validate_identifier))]
    pub id: String,

    /// Law of the gap between consecutive arrivals.
    #[serde(default)]
    #[validate(custom(function = validation::validate_distribution))]
    pub inter_arrival: DistributionConfig,
}

/// A buffer holding tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PlaceConfig {
    #[validate(custom(function = validation::validate_identifier))]
    pub id: String,

    /// Maximum load; omitted means unbounded.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub capacity: Option<u64>,

    #[serde(default)]
    pub initial_load: u64,
}

impl PlaceConfig {
    pub fn capacity(&self) -> Capacity {
        Capacity::from(self.capacity)
    }
}

/// Comparison applied to a place load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// Guard of a conditional transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ConditionConfig {
    /// Place whose load is tested.
    #[validate(custom(function = validation::validate_identifier))]
    pub place: String,
    pub op: ComparisonOp,
    pub value: u64,
}

impl ConditionConfig {
    pub fn predicate(&self) -> Predicate {
        match self.op {
            ComparisonOp::Lt => Predicate::Below(self.value),
            ComparisonOp::Le => Predicate::AtMost(self.value),
            ComparisonOp::Gt => Predicate::Above(self.value),
            ComparisonOp::Ge => Predicate::AtLeast(self.value),
            ComparisonOp::Eq => Predicate::Equals(self.value),
            ComparisonOp::Ne => Predicate::NotEquals(self.value),
        }
    }
}

/// A timed activity moving tokens between places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TransitionConfig {
    #[validate(custom(function = validation::validate_identifier))]
    pub id: String,

    #[serde(default)]
    #[validate(custom(function = validation::validate_distribution))]
    pub delay: DistributionConfig,

    /// Lower values fire first.
    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    #[validate(nested)]
    pub condition: Option<ConditionConfig>,
}

/// A directed arc between two elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ArcConfig {
    #[validate(custom(function = validation::validate_identifier))]
    pub from: String,

    #[validate(custom(function = validation::validate_identifier))]
    pub to: String,

    #[serde(default = "default_multiplicity")]
    #[validate(range(min = 1))]
    pub multiplicity: u32,
}

fn default_multiplicity() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_multiplicity_defaults_to_one() {
        let arc: ArcConfig = serde_yaml::from_str("{ from: Generator, to: queue }").unwrap();
        assert_eq!(arc.multiplicity, 1);
        assert!(arc.validate().is_ok());
    }

    #[test]
    fn test_zero_multiplicity_rejected() {
        let arc = ArcConfig {
            from: "a".into(),
            to: "b".into(),
            multiplicity: 0,
        };
        assert!(arc.validate().is_err());
    }

    #[test]
    fn test_condition_maps_to_predicate() {
        let condition: ConditionConfig =
            serde_yaml::from_str("{ place: buffer, op: lt, value: 4 }").unwrap();
        let predicate = condition.predicate();
        assert!(predicate.holds(3));
        assert!(!predicate.holds(4));

        let condition = ConditionConfig {
            op: ComparisonOp::Ne,
            ..condition
        };
        assert!(condition.predicate().holds(0));
        assert!(!condition.predicate().holds(4));
    }

    #[test]
    fn test_place_capacity() {
        let place: PlaceConfig = serde_yaml::from_str("{ id: queue, capacity: 5 }").unwrap();
        assert_eq!(place.capacity(), Capacity::Bounded(5));
        assert_eq!(place.initial_load, 0);

        let place: PlaceConfig = serde_yaml::from_str("{ id: queue }").unwrap();
        assert_eq!(place.capacity(), Capacity::Unbounded);

        let place = PlaceConfig {
            capacity: Some(0),
            ..place
        };
        assert!(place.validate().is_err());
    }

    #[test]
    fn test_bad_identifier_rejected() {
        let transition = TransitionConfig {
            id: "serve now".into(),
            delay: DistributionConfig::default(),
            priority: 0,
            condition: None,
        };
        assert!(transition.validate().is_err());
    }
}

//! Custom validation functions for configuration.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::distribution::DistributionConfig;

lazy_static! {
    static ref IDENTIFIER: Regex =
        Regex::new("^[A-Za-z0-9_.-]+$").expect("identifier pattern is valid");
}

/// Validate that an element identifier is non-empty and made of safe characters.
pub fn validate_identifier(id: &str) -> Result<(), ValidationError> {
    if IDENTIFIER.is_match(id) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_identifier"))
    }
}

/// Validate every identifier of a list.
pub fn validate_identifiers(ids: &[String]) -> Result<(), ValidationError> {
    ids.iter().try_for_each(|id| validate_identifier(id))
}

/// Validate log level names accepted by the subscriber filter.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["trace", "debug", "info", "warn", "error"]
        .contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

/// Validate distribution parameters before they reach the sampler.
pub fn validate_distribution(distribution: &DistributionConfig) -> Result<(), ValidationError> {
    let valid = match *distribution {
        DistributionConfig::Constant { .. } => true,
        DistributionConfig::Normal { mean, std_dev } => {
            mean.is_finite() && std_dev.is_finite() && std_dev >= 0.0
        }
        DistributionConfig::Exponential { mean } => mean.is_finite() && mean > 0.0,
        DistributionConfig::Uniform { low, high } => {
            low.is_finite() && high.is_finite() && low <= high
        }
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_distribution_parameters"))
    }
}

/// Validate an optional BLAKE3 hex digest.
pub fn validate_digest(digest: &str) -> Result<(), ValidationError> {
    if digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_digest"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(validate_identifier("queue_1").is_ok());
        assert!(validate_identifier("stage-2.in").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("has space").is_err());
        assert!(validate_identifiers(&["a".into(), "b c".into()]).is_err());
    }

    #[test]
    fn distributions() {
        assert!(validate_distribution(&DistributionConfig::Exponential { mean: 0.0 }).is_err());
        assert!(validate_distribution(&DistributionConfig::Uniform { low: 3.0, high: 1.0 }).is_err());
        assert!(validate_distribution(&DistributionConfig::Normal { mean: 5.0, std_dev: 1.0 }).is_ok());
    }

    #[test]
    fn digests() {
        assert!(validate_digest(&"ab".repeat(32)).is_ok());
        assert!(validate_digest("xyz").is_err());
    }
}

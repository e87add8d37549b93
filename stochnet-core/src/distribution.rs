//! # Delay Distributions
//!
//! Integer delays for generators (inter-arrival gaps) and transitions
//! (service times).
//!
//! ## Laws:
//! - `Constant`: always the same delay.
//! - `Normal`, `Exponential`, `Uniform`: continuous laws from `rand_distr`,
//!   rounded to the nearest integer. Negative draws are clamped to zero.
//! - `Custom`: a caller-supplied function of no arguments.
//! - `LoadDependent`: a caller-supplied function of a place's current load.
//!
//! A [`Distribution`] is the declarative description handed to the builder.
//! Building a network validates it and resolves place references into a
//! [`Sampler`], which is what elements hold at run time.

use std::fmt;
use std::sync::Arc;

use rand::distr::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp, Normal};
use serde::{Deserialize, Serialize};

use crate::elements::{NetElement, Place};
use crate::error::BuildError;
use crate::time::SimTime;

/// The single random source of a simulation run.
pub type SimRng = StdRng;

/// Creates the seeded generator that drives every random draw of a run.
pub fn seeded_rng(seed: u64) -> SimRng {
    StdRng::seed_from_u64(seed)
}

pub type DelayFn = Arc<dyn Fn() -> SimTime + Send + Sync>;
pub type LoadDelayFn = Arc<dyn Fn(u64) -> SimTime + Send + Sync>;

/// Kind tag of a distribution, used in reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKind {
    Constant,
    Normal,
    Exponential,
    Uniform,
    Custom,
    LoadDependent,
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DistributionKind::Constant => "constant",
            DistributionKind::Normal => "normal",
            DistributionKind::Exponential => "exponential",
            DistributionKind::Uniform => "uniform",
            DistributionKind::Custom => "custom",
            DistributionKind::LoadDependent => "load_dependent",
        };
        f.write_str(name)
    }
}

/// Declarative delay distribution.
#[derive(Clone)]
pub enum Distribution {
    Constant(SimTime),
    Normal { mean: f64, std_dev: f64 },
    Exponential { mean: f64 },
    /// Continuous uniform law over `[low, high]`.
    Uniform { low: f64, high: f64 },
    Custom(DelayFn),
    LoadDependent { place: String, f: LoadDelayFn },
}

impl Distribution {
    pub fn constant(delay: SimTime) -> Self {
        Distribution::Constant(delay)
    }

    pub fn normal(mean: f64, std_dev: f64) -> Self {
        Distribution::Normal { mean, std_dev }
    }

    pub fn exponential(mean: f64) -> Self {
        Distribution::Exponential { mean }
    }

    pub fn uniform(low: f64, high: f64) -> Self {
        Distribution::Uniform { low, high }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn() -> SimTime + Send + Sync + 'static,
    {
        Distribution::Custom(Arc::new(f))
    }

    /// Delay computed from the current load of `place` at sampling time.
    ///
    /// Only valid for transition delays. Generator schedules are drawn before
    /// the run starts, so the builder rejects this law for generators.
    pub fn load_dependent<F>(place: impl Into<String>, f: F) -> Self
    where
        F: Fn(u64) -> SimTime + Send + Sync + 'static,
    {
        Distribution::LoadDependent {
            place: place.into(),
            f: Arc::new(f),
        }
    }

    pub fn kind(&self) -> DistributionKind {
        match self {
            Distribution::Constant(_) => DistributionKind::Constant,
            Distribution::Normal { .. } => DistributionKind::Normal,
            Distribution::Exponential { .. } => DistributionKind::Exponential,
            Distribution::Uniform { .. } => DistributionKind::Uniform,
            Distribution::Custom(_) => DistributionKind::Custom,
            Distribution::LoadDependent { .. } => DistributionKind::LoadDependent,
        }
    }
}

impl fmt::Debug for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Constant(delay) => f.debug_tuple("Constant").field(delay).finish(),
            Distribution::Normal { mean, std_dev } => f
                .debug_struct("Normal")
                .field("mean", mean)
                .field("std_dev", std_dev)
                .finish(),
            Distribution::Exponential { mean } => {
                f.debug_struct("Exponential").field("mean", mean).finish()
            }
            Distribution::Uniform { low, high } => f
                .debug_struct("Uniform")
                .field("low", low)
                .field("high", high)
                .finish(),
            Distribution::Custom(_) => f.write_str("Custom(..)"),
            Distribution::LoadDependent { place, .. } => f
                .debug_struct("LoadDependent")
                .field("place", place)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Clone)]
enum Law {
    Constant(SimTime),
    Normal(Normal<f64>),
    Exponential(Exp<f64>),
    Uniform(Uniform<f64>),
    Custom(DelayFn),
    LoadDependent { place: usize, f: LoadDelayFn },
}

/// Validated, ready-to-draw distribution.
#[derive(Clone)]
pub struct Sampler {
    kind: DistributionKind,
    law: Law,
}

impl Sampler {
    /// Validates `distribution` for `element` and resolves any place reference
    /// through `resolve_place`, which yields a place index.
    pub fn resolve<F>(
        element: &str,
        distribution: &Distribution,
        resolve_place: F,
    ) -> Result<Self, BuildError>
    where
        F: FnOnce(&str) -> Result<usize, BuildError>,
    {
        let invalid = |reason: String| BuildError::InvalidDistribution {
            element: element.to_string(),
            reason,
        };

        let law = match distribution {
            Distribution::Constant(delay) => Law::Constant(*delay),
            Distribution::Normal { mean, std_dev } => {
                if !mean.is_finite() {
                    return Err(invalid(format!("normal mean {mean} is not finite")));
                }
                Law::Normal(Normal::new(*mean, *std_dev).map_err(|e| invalid(e.to_string()))?)
            }
            Distribution::Exponential { mean } => {
                if !(mean.is_finite() && *mean > 0.0) {
                    return Err(invalid(format!(
                        "exponential mean must be positive, got {mean}"
                    )));
                }
                Law::Exponential(Exp::new(1.0 / mean).map_err(|e| invalid(e.to_string()))?)
            }
            Distribution::Uniform { low, high } => Law::Uniform(
                Uniform::new_inclusive(*low, *high)
                    .map_err(|e| invalid(format!("uniform [{low}, {high}]: {e}")))?,
            ),
            Distribution::Custom(f) => Law::Custom(Arc::clone(f)),
            Distribution::LoadDependent { place, f } => Law::LoadDependent {
                place: resolve_place(place)?,
                f: Arc::clone(f),
            },
        };

        Ok(Self {
            kind: distribution.kind(),
            law,
        })
    }

    pub fn kind(&self) -> DistributionKind {
        self.kind
    }

    /// Draws one non-negative integer delay.
    pub fn sample<R: Rng>(&self, rng: &mut R, places: &[Place]) -> SimTime {
        match &self.law {
            Law::Constant(delay) => *delay,
            Law::Normal(normal) => to_delay(rng.sample(normal)),
            Law::Exponential(exp) => to_delay(rng.sample(exp)),
            Law::Uniform(uniform) => to_delay(rng.sample(uniform)),
            Law::Custom(f) => f(),
            Law::LoadDependent { place, f } => {
                let load = places.get(*place).map_or(0, |p| p.load());
                f(load)
            }
        }
    }
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sampler").field("kind", &self.kind).finish()
    }
}

/// Rounds a continuous draw to the nearest integer, clamping at zero.
#[inline]
fn to_delay(value: f64) -> SimTime {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.round() as SimTime
    }
}

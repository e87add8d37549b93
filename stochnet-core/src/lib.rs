//! # stochnet-core
//!
//! Event-driven execution engine for stochastic Petri nets modelling
//! queueing and production networks.
//!
//! Tokens enter through generators, wait in places, are moved by timed
//! transitions and leave through terminators. All randomness comes from a
//! single seeded generator, so identical inputs give identical runs.
//!
//! ### Key Submodules:
//! - `time`: integer simulated time and the pending-event queue
//! - `distribution`: delay laws and the sampler elements draw from
//! - `elements`: places, generators, terminators, transitions and guards
//! - `network`: the element arena
//! - `builder`: identifier resolution and model validation
//! - `monitor`: per-step observation hook

pub mod builder;
pub mod distribution;
pub mod elements;
pub mod error;
pub mod monitor;
pub mod network;
pub mod time;

pub mod prelude {
    pub use crate::builder::NetworkBuilder;
    pub use crate::distribution::{seeded_rng, Distribution, DistributionKind, Sampler, SimRng};
    pub use crate::elements::{
        Capacity, ElementId, FiringPolicy, Generator, NetElement, Place, Predicate, Terminator,
        Transition,
    };
    pub use crate::error::BuildError;
    pub use crate::monitor::{NoopMonitor, StateMonitor};
    pub use crate::network::{Network, DEFAULT_GENERATOR, DEFAULT_TERMINATOR};
    pub use crate::time::{SimTime, StepOrder, TimeQueue};
}

pub use builder::NetworkBuilder;
pub use error::BuildError;
pub use network::Network;

//! ## stochnet-core::elements
//! **Network elements and the token-flow contract they share**
//!
//! ### Key Submodules:
//! - `place`: capacity-bounded buffers
//! - `generator`: token sources driven by an inter-arrival distribution
//! - `terminator`: unbounded sinks
//! - `transition`: timed (optionally guarded) gates and their firing engine
//! - `guard`: predicates over a monitored place's load
//!
//! Elements never own each other. Arcs store [`ElementId`] handles into the
//! arena held by [`crate::network::Network`].

use std::fmt;

use serde::{Deserialize, Serialize};

mod generator;
mod guard;
mod place;
mod terminator;
mod transition;

pub use generator::Generator;
pub use guard::{Guard, Predicate};
pub use place::Place;
pub use terminator::Terminator;
pub use transition::{FiringPolicy, Transition};

/// Stable handle of an element inside the network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Generator(usize),
    Place(usize),
    Transition(usize),
    Terminator(usize),
}

impl ElementId {
    pub fn kind(&self) -> &'static str {
        match self {
            ElementId::Generator(_) => "generator",
            ElementId::Place(_) => "place",
            ElementId::Transition(_) => "transition",
            ElementId::Terminator(_) => "terminator",
        }
    }
}

/// A weighted arc endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub endpoint: ElementId,
    pub multiplicity: u32,
}

/// Maximum number of tokens an element may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    #[default]
    Unbounded,
    Bounded(u64),
}

impl Capacity {
    /// Whether `load` tokens fit.
    #[inline]
    pub fn admits(&self, load: u64) -> bool {
        match self {
            Capacity::Unbounded => true,
            Capacity::Bounded(limit) => load <= *limit,
        }
    }

    pub fn limit(&self) -> Option<u64> {
        match self {
            Capacity::Unbounded => None,
            Capacity::Bounded(limit) => Some(*limit),
        }
    }
}

impl From<Option<u64>> for Capacity {
    fn from(limit: Option<u64>) -> Self {
        limit.map_or(Capacity::Unbounded, Capacity::Bounded)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Unbounded => f.write_str("inf"),
            Capacity::Bounded(limit) => write!(f, "{limit}"),
        }
    }
}

/// Ordered input and output arcs of one element.
#[derive(Debug, Clone, Default)]
pub struct Arcs {
    inputs: Vec<Edge>,
    outputs: Vec<Edge>,
}

/// Token-flow contract shared by places, generators, terminators and transitions.
///
/// Parallel arcs between the same pair of elements are allowed; each one is
/// kept as its own entry.
pub trait NetElement {
    fn id(&self) -> &str;
    fn capacity(&self) -> Capacity;
    fn load(&self) -> u64;
    fn arcs(&self) -> &Arcs;
    fn arcs_mut(&mut self) -> &mut Arcs;

    fn inputs(&self) -> &[Edge] {
        &self.arcs().inputs
    }

    fn outputs(&self) -> &[Edge] {
        &self.arcs().outputs
    }

    fn add_input(&mut self, source: ElementId, multiplicity: u32) {
        self.arcs_mut().inputs.push(Edge {
            endpoint: source,
            multiplicity,
        });
    }

    fn add_output(&mut self, destination: ElementId, multiplicity: u32) {
        self.arcs_mut().outputs.push(Edge {
            endpoint: destination,
            multiplicity,
        });
    }
}

/// Mutable view over the elements that can receive tokens.
pub struct TokenSinks<'a> {
    pub places: &'a mut [Place],
    pub terminators: &'a mut [Terminator],
}

impl TokenSinks<'_> {
    /// Pushes `n` tokens into `destination`. Returns `false` when a place
    /// rejects them for lack of capacity.
    pub fn push(&mut self, destination: ElementId, n: u64) -> bool {
        match destination {
            ElementId::Place(i) => self.places[i].try_append(n),
            ElementId::Terminator(i) => {
                self.terminators[i].absorb(n);
                true
            }
            ElementId::Generator(_) | ElementId::Transition(_) => {
                debug_assert!(false, "{} cannot receive tokens", destination.kind());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_admits() {
        assert!(Capacity::Unbounded.admits(u64::MAX));
        assert!(Capacity::Bounded(5).admits(5));
        assert!(!Capacity::Bounded(5).admits(6));
        assert_eq!(Capacity::from(Some(3)), Capacity::Bounded(3));
        assert_eq!(Capacity::from(None), Capacity::Unbounded);
        assert_eq!(Capacity::Unbounded.to_string(), "inf");
    }

    #[test]
    fn test_parallel_arcs_are_kept() {
        let mut place = Place::new("a", Capacity::Unbounded, 0);
        place.add_output(ElementId::Transition(0), 1);
        place.add_output(ElementId::Transition(0), 1);
        assert_eq!(place.outputs().len(), 2);
        assert!(place.inputs().is_empty());
    }

    #[test]
    fn test_sinks_route_by_kind() {
        let mut places = vec![Place::new("p", Capacity::Bounded(2), 0)];
        let mut terminators = vec![Terminator::new("out")];
        let mut sinks = TokenSinks {
            places: &mut places,
            terminators: &mut terminators,
        };
        assert!(sinks.push(ElementId::Place(0), 2));
        assert!(!sinks.push(ElementId::Place(0), 1));
        assert!(sinks.push(ElementId::Terminator(0), 7));
        assert_eq!(places[0].load(), 2);
        assert_eq!(places[0].rejected(), 1);
        assert_eq!(terminators[0].load(), 7);
    }
}

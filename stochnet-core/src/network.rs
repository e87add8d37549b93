//! ## stochnet-core::network
//! **Element arena**
//!
//! The network owns every element in flat per-kind vectors. Arcs refer to
//! elements through [`ElementId`] handles, and identifiers are resolved once,
//! at build time, through the `index` map.

use std::collections::HashMap;

use rand::Rng;

use crate::elements::{
    ElementId, FiringPolicy, Generator, NetElement, Place, TokenSinks, Terminator, Transition,
};
use crate::time::SimTime;

/// Reserved identifier of the default generator.
pub const DEFAULT_GENERATOR: &str = "Generator";
/// Reserved identifier of the default terminator.
pub const DEFAULT_TERMINATOR: &str = "Terminator";

#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) generators: Vec<Generator>,
    pub(crate) places: Vec<Place>,
    pub(crate) terminators: Vec<Terminator>,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) index: HashMap<String, ElementId>,
    pub(crate) firing_order: Vec<usize>,
    pub(crate) policy: FiringPolicy,
}

impl Network {
    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Terminators, in registration order (default terminator first).
    pub fn stocks(&self) -> &[Terminator] {
        &self.terminators
    }

    /// Transitions in registration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Transition indices sorted by ascending priority, ties in registration
    /// order.
    pub fn firing_order(&self) -> &[usize] {
        &self.firing_order
    }

    pub fn policy(&self) -> FiringPolicy {
        self.policy
    }

    /// Resolves an identifier to its handle.
    pub fn lookup(&self, id: &str) -> Option<ElementId> {
        self.index.get(id).copied()
    }

    pub fn element(&self, id: ElementId) -> &dyn NetElement {
        match id {
            ElementId::Generator(i) => &self.generators[i],
            ElementId::Place(i) => &self.places[i],
            ElementId::Transition(i) => &self.transitions[i],
            ElementId::Terminator(i) => &self.terminators[i],
        }
    }

    pub fn place(&self, id: &str) -> Option<&Place> {
        match self.lookup(id)? {
            ElementId::Place(i) => self.places.get(i),
            _ => None,
        }
    }

    pub fn terminator(&self, id: &str) -> Option<&Terminator> {
        match self.lookup(id)? {
            ElementId::Terminator(i) => self.terminators.get(i),
            _ => None,
        }
    }

    pub fn transition(&self, id: &str) -> Option<&Transition> {
        match self.lookup(id)? {
            ElementId::Transition(i) => self.transitions.get(i),
            _ => None,
        }
    }

    pub fn generator(&self, id: &str) -> Option<&Generator> {
        match self.lookup(id)? {
            ElementId::Generator(i) => self.generators.get(i),
            _ => None,
        }
    }

    /// Tokens currently resident in places.
    pub fn total_load(&self) -> u64 {
        self.places.iter().map(|p| p.load()).sum()
    }

    /// Arrival events emitted by all generators.
    pub fn total_arrivals(&self) -> u64 {
        self.generators.iter().map(|g| g.total_elements()).sum()
    }

    /// Tokens pushed by all generators onto their output arcs.
    pub fn tokens_emitted(&self) -> u64 {
        self.generators.iter().map(|g| g.tokens_emitted()).sum()
    }

    /// Tokens absorbed by all terminators.
    pub fn total_absorbed(&self) -> u64 {
        self.terminators.iter().map(|t| t.load()).sum()
    }

    /// Tokens turned away by full places.
    pub fn total_rejected(&self) -> u64 {
        self.places.iter().map(|p| p.rejected()).sum()
    }

    /// Service instances scheduled but not yet released, across transitions.
    pub fn pending_completions(&self) -> u64 {
        self.transitions.iter().map(|t| t.pending()).sum()
    }

    /// Draws every generator's arrival schedule and returns all timestamps,
    /// in generator order.
    pub fn generate_arrivals<R: Rng>(&mut self, horizon: SimTime, rng: &mut R) -> Vec<SimTime> {
        let places = &self.places;
        self.generators
            .iter_mut()
            .flat_map(|g| g.generate_arrivals(horizon, rng, places).to_vec())
            .collect()
    }

    /// Lets every generator emit if `now` is its next arrival. Returns the
    /// number of arrivals.
    pub fn process_generators(&mut self, now: SimTime) -> usize {
        let mut sinks = TokenSinks {
            places: &mut self.places,
            terminators: &mut self.terminators,
        };
        self.generators
            .iter_mut()
            .map(|g| g.process(now, &mut sinks))
            .filter(|&emitted| emitted)
            .count()
    }

    /// Runs the firing engine of transition `index` at `now`.
    pub fn step_transition<R: Rng>(
        &mut self,
        index: usize,
        now: SimTime,
        horizon: SimTime,
        rng: &mut R,
    ) -> Vec<SimTime> {
        let mut sinks = TokenSinks {
            places: &mut self.places,
            terminators: &mut self.terminators,
        };
        self.transitions[index].step(now, horizon, self.policy, &mut sinks, rng)
    }
}

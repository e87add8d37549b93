use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Arcs, Capacity, ElementId, Guard, NetElement, Place, TokenSinks};
use crate::distribution::Sampler;
use crate::time::SimTime;

/// How the batch size of a firing relates to input arc multiplicities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiringPolicy {
    /// Batch size is the smallest raw input load; multiplicities are ignored
    /// on the input side.
    #[default]
    RawMinimum,
    /// Batch size is the smallest `load / multiplicity`; each batch consumes
    /// `multiplicity` tokens per input arc.
    MultiplicityBatches,
}

/// A timed gate between places.
///
/// Each step first releases completions due now, then fires if every input
/// holds tokens (and the guard, if any, holds), scheduling one completion per
/// fired instance with its own sampled delay.
#[derive(Debug, Clone)]
pub struct Transition {
    id: String,
    delay: Sampler,
    priority: i32,
    guard: Option<Guard>,
    storage: BTreeMap<SimTime, u64>,
    fired: u64,
    completed: u64,
    arcs: Arcs,
}

impl Transition {
    pub fn new(id: impl Into<String>, delay: Sampler, priority: i32) -> Self {
        Self {
            id: id.into(),
            delay,
            priority,
            guard: None,
            storage: BTreeMap::new(),
            fired: 0,
            completed: 0,
            arcs: Arcs::default(),
        }
    }

    /// Turns this into a conditional transition gated by `guard`.
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Lower values fire first within a timestamp.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn guard(&self) -> Option<&Guard> {
        self.guard.as_ref()
    }

    pub fn is_conditional(&self) -> bool {
        self.guard.is_some()
    }

    pub fn delay(&self) -> &Sampler {
        &self.delay
    }

    /// Service instances started so far.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Service instances whose output has been released.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Instances scheduled but not yet released.
    pub fn pending(&self) -> u64 {
        self.storage.values().sum()
    }

    /// Scheduled completion times, with multiplicity, in ascending order.
    pub fn storage(&self) -> impl Iterator<Item = (SimTime, u64)> + '_ {
        self.storage.iter().map(|(&t, &n)| (t, n))
    }

    /// Runs one engine step at `now` and returns the pending completion times
    /// in `(now, horizon]` for the driver to enqueue.
    pub fn step<R: Rng>(
        &mut self,
        now: SimTime,
        horizon: SimTime,
        policy: FiringPolicy,
        sinks: &mut TokenSinks<'_>,
        rng: &mut R,
    ) -> Vec<SimTime> {
        self.release(now, sinks);

        if let Some(quantity) = self.hold(policy, sinks.places) {
            self.consume(quantity, policy, sinks.places);
            for _ in 0..quantity {
                let delay = self.delay.sample(rng, sinks.places);
                *self.storage.entry(now.saturating_add(delay)).or_insert(0) += 1;
            }
            self.fired += quantity;
            trace!(transition = %self.id, time = now, quantity, "Transition fired");

            // Zero-delay completions finish within the same step.
            self.release(now, sinks);
        }

        self.storage
            .range((Excluded(now), Included(horizon)))
            .map(|(&t, _)| t)
            .collect()
    }

    /// Applies every completion due at or before `now` to the output arcs,
    /// one unit release per instance.
    fn release(&mut self, now: SimTime, sinks: &mut TokenSinks<'_>) {
        while let Some(entry) = self.storage.first_entry() {
            if *entry.key() > now {
                break;
            }
            let instances = entry.remove();
            for _ in 0..instances {
                for edge in &self.arcs.outputs {
                    if !sinks.push(edge.endpoint, u64::from(edge.multiplicity)) {
                        trace!(transition = %self.id, time = now, "Completion rejected downstream");
                    }
                }
            }
            self.completed += instances;
            trace!(transition = %self.id, time = now, instances, "Completions released");
        }
    }

    /// Returns the number of instances that can fire now, if any.
    fn hold(&self, policy: FiringPolicy, places: &[Place]) -> Option<u64> {
        if let Some(guard) = &self.guard {
            let load = places.get(guard.place).map_or(0, |p| p.load());
            if !guard.predicate.holds(load) {
                return None;
            }
        }

        let quantity = self
            .demand(policy)
            .into_iter()
            .map(|(place, weight)| places[place].load() / weight)
            .min()?;
        (quantity > 0).then_some(quantity)
    }

    fn consume(&self, quantity: u64, policy: FiringPolicy, places: &mut [Place]) {
        for (place, weight) in self.demand(policy) {
            places[place].exclude(quantity * weight);
        }
    }

    /// Tokens one instance takes from each distinct input place. Parallel
    /// arcs from the same place add up.
    fn demand(&self, policy: FiringPolicy) -> Vec<(usize, u64)> {
        let mut demand: Vec<(usize, u64)> = Vec::with_capacity(self.arcs.inputs.len());
        for edge in &self.arcs.inputs {
            let ElementId::Place(place) = edge.endpoint else {
                continue;
            };
            let weight = match policy {
                FiringPolicy::RawMinimum => 1,
                FiringPolicy::MultiplicityBatches => u64::from(edge.multiplicity),
            };
            match demand.iter_mut().find(|(p, _)| *p == place) {
                Some((_, w)) => *w += weight,
                None => demand.push((place, weight)),
            }
        }
        demand
    }
}

impl NetElement for Transition {
    fn id(&self) -> &str {
        &self.id
    }

    fn capacity(&self) -> Capacity {
        Capacity::Unbounded
    }

    fn load(&self) -> u64 {
        self.pending()
    }

    fn arcs(&self) -> &Arcs {
        &self.arcs
    }

    fn arcs_mut(&mut self) -> &mut Arcs {
        &mut self.arcs
    }
}

use rand::Rng;
use tracing::trace;

use super::{Arcs, Capacity, NetElement, Place, TokenSinks};
use crate::distribution::Sampler;
use crate::time::SimTime;

/// A token source.
///
/// The whole arrival schedule is drawn up front by
/// [`Generator::generate_arrivals`]; afterwards the generator emits exactly
/// when the driver reaches its next scheduled arrival.
#[derive(Debug, Clone)]
pub struct Generator {
    id: String,
    inter_arrival: Sampler,
    arrivals: Vec<SimTime>,
    cursor: usize,
    total_elements: u64,
    tokens_emitted: u64,
    arcs: Arcs,
}

impl Generator {
    pub fn new(id: impl Into<String>, inter_arrival: Sampler) -> Self {
        Self {
            id: id.into(),
            inter_arrival,
            arrivals: Vec::new(),
            cursor: 0,
            total_elements: 0,
            tokens_emitted: 0,
            arcs: Arcs::default(),
        }
    }

    /// Draws the arrival schedule up to `horizon` and returns it.
    ///
    /// Gaps are at least one time unit, so the schedule is strictly
    /// increasing. The first arrival happens one gap after time zero. Calling
    /// this again discards the previous schedule and restarts emission.
    pub fn generate_arrivals<R: Rng>(
        &mut self,
        horizon: SimTime,
        rng: &mut R,
        places: &[Place],
    ) -> &[SimTime] {
        self.arrivals.clear();
        self.cursor = 0;

        let mut now: SimTime = 0;
        loop {
            let gap = self.inter_arrival.sample(rng, places).max(1);
            now = match now.checked_add(gap) {
                Some(next) if next <= horizon => next,
                _ => break,
            };
            self.arrivals.push(now);
        }
        trace!(generator = %self.id, arrivals = self.arrivals.len(), "Arrival schedule drawn");
        &self.arrivals
    }

    /// Emits one arrival if `now` is the next scheduled arrival time.
    ///
    /// Every output arc receives `multiplicity` tokens. Returns whether an
    /// arrival happened; rejected pushes are accounted by the receiving place.
    pub fn process(&mut self, now: SimTime, sinks: &mut TokenSinks<'_>) -> bool {
        if self.next_arrival() != Some(now) {
            return false;
        }
        self.cursor += 1;
        self.total_elements += 1;

        for edge in &self.arcs.outputs {
            let n = u64::from(edge.multiplicity);
            self.tokens_emitted += n;
            if !sinks.push(edge.endpoint, n) {
                trace!(generator = %self.id, time = now, "Arrival rejected downstream");
            }
        }
        true
    }

    pub fn next_arrival(&self) -> Option<SimTime> {
        self.arrivals.get(self.cursor).copied()
    }

    pub fn arrivals(&self) -> &[SimTime] {
        &self.arrivals
    }

    /// Arrival events emitted so far, whether or not downstream accepted them.
    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    /// Tokens pushed onto output arcs so far (arrivals scaled by multiplicity).
    pub fn tokens_emitted(&self) -> u64 {
        self.tokens_emitted
    }

    pub fn inter_arrival(&self) -> &Sampler {
        &self.inter_arrival
    }
}

impl NetElement for Generator {
    fn id(&self) -> &str {
        &self.id
    }

    fn capacity(&self) -> Capacity {
        Capacity::Unbounded
    }

    fn load(&self) -> u64 {
        0
    }

    fn arcs(&self) -> &Arcs {
        &self.arcs
    }

    fn arcs_mut(&mut self) -> &mut Arcs {
        &mut self.arcs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{seeded_rng, Distribution};
    use crate::elements::{ElementId, Terminator};
    use crate::error::BuildError;

    fn sampler(distribution: Distribution) -> Sampler {
        Sampler::resolve("gen", &distribution, |name| {
            Err(BuildError::UnknownElement(name.to_string()))
        })
        .unwrap()
    }

    #[test]
    fn test_constant_schedule() {
        let mut generator = Generator::new("gen", sampler(Distribution::constant(3)));
        let arrivals = generator
            .generate_arrivals(10, &mut seeded_rng(0), &[])
            .to_vec();
        assert_eq!(arrivals, vec![3, 6, 9]);
        assert_eq!(generator.next_arrival(), Some(3));
    }

    #[test]
    fn test_zero_gaps_still_increase() {
        let mut generator = Generator::new("gen", sampler(Distribution::constant(0)));
        let arrivals = generator
            .generate_arrivals(4, &mut seeded_rng(0), &[])
            .to_vec();
        assert_eq!(arrivals, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_random_schedule_is_strictly_increasing() {
        let mut generator = Generator::new("gen", sampler(Distribution::exponential(2.0)));
        let arrivals = generator
            .generate_arrivals(1_000, &mut seeded_rng(5), &[])
            .to_vec();
        assert!(!arrivals.is_empty());
        assert!(arrivals.windows(2).all(|w| w[0] < w[1]));
        assert!(arrivals.iter().all(|&t| (1..=1_000).contains(&t)));
    }

    #[test]
    fn test_process_emits_only_on_schedule() {
        let mut generator = Generator::new("gen", sampler(Distribution::constant(2)));
        generator.add_output(ElementId::Terminator(0), 3);
        generator.generate_arrivals(6, &mut seeded_rng(0), &[]);

        let mut places: Vec<Place> = Vec::new();
        let mut terminators = vec![Terminator::new("sink")];
        let mut sinks = TokenSinks {
            places: &mut places,
            terminators: &mut terminators,
        };

        assert!(!generator.process(1, &mut sinks));
        assert!(generator.process(2, &mut sinks));
        assert!(!generator.process(2, &mut sinks));
        assert!(generator.process(4, &mut sinks));

        assert_eq!(generator.total_elements(), 2);
        assert_eq!(generator.tokens_emitted(), 6);
        assert_eq!(terminators[0].load(), 6);
        assert_eq!(generator.next_arrival(), Some(6));
    }
}

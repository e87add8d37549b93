/*!
# Stochnet Simulator

Discrete-event driver for stochastic Petri nets built with `stochnet-core`.

A run draws every generator's arrival schedule up front, then repeatedly
pops the earliest pending timestamp and lets generators and transitions act
on it. Transitions are visited in priority order, so contested upstream
tokens always go to the same transition. All randomness comes from one
seeded generator; a [`Report`] digest identifies a run.

## Key Components:
- **Simulation:** the event loop.
- **Report:** terminal aggregates, textual summary and BLAKE3 digest.
- **Scenario:** turns a [`ModelConfig`](stochnet_config::ModelConfig) into a ready simulation.
- **Replay / Sweep:** digest verification and multi-seed runs.
*/

use std::iter;

use stochnet_core::distribution::{seeded_rng, SimRng};
use stochnet_core::monitor::{NoopMonitor, StateMonitor};
use stochnet_core::time::{SimTime, StepOrder, TimeQueue};
use stochnet_core::{BuildError, Network};
use tracing::{debug, info, warn};

pub mod cli;
pub mod error;
pub mod replay;
pub mod report;
pub mod scenario;

pub use error::SimulationError;
pub use replay::{replay, sweep, SweepEntry};
pub use report::{GapStats, Report};

/// Owns the network, the pending-event queue and the random source.
#[derive(Debug)]
pub struct Simulation {
    network: Network,
    queue: TimeQueue,
    rng: SimRng,
    seed: u64,
    step_order: StepOrder,
    now: SimTime,
    steps: u64,
    inter_arrival: Option<GapStats>,
    started: bool,
}

impl Simulation {
    /// Prepares a run of `network` up to `horizon`, drawing from `seed`.
    pub fn new(network: Network, horizon: SimTime, seed: u64) -> Result<Self, BuildError> {
        if horizon == 0 {
            return Err(BuildError::InvalidHorizon(horizon));
        }
        Ok(Self {
            network,
            queue: TimeQueue::new(horizon),
            rng: seeded_rng(seed),
            seed,
            step_order: StepOrder::default(),
            now: 0,
            steps: 0,
            inter_arrival: None,
            started: false,
        })
    }

    pub fn with_step_order(mut self, step_order: StepOrder) -> Self {
        self.step_order = step_order;
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn horizon(&self) -> SimTime {
        self.queue.horizon()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Last processed timestamp.
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Runs to completion without observation.
    pub fn run(&mut self) -> Report {
        self.run_with(NoopMonitor)
    }

    /// Runs to completion, calling `monitor` after every processed timestamp.
    ///
    /// A simulation runs once. Later calls return the report of the finished
    /// run without touching the network.
    pub fn run_with<M: StateMonitor>(&mut self, mut monitor: M) -> Report {
        if self.started {
            return self.report();
        }
        self.started = true;

        let horizon = self.queue.horizon();
        let arrivals = self.network.generate_arrivals(horizon, &mut self.rng);
        self.inter_arrival = GapStats::from_arrivals(&arrivals);
        // t = 0 lets an initial marking fire before the first arrival.
        self.queue.insert_many(iter::once(0).chain(arrivals));

        info!(
            horizon,
            seed = self.seed,
            scheduled = self.queue.len(),
            step_order = ?self.step_order,
            "Simulation started"
        );
        monitor.on_start(horizon, &self.network);

        let mut next = self.queue.pop_min();
        while let Some(now) = next {
            if self.step_order == StepOrder::CheckThenProcess && self.queue.is_empty() {
                break;
            }
            self.process(now);
            monitor.on_step(self.steps, now, &self.network);
            next = self.queue.pop_min();
        }

        monitor.on_finish(self.now, &self.network);
        let report = self.report();
        info!(
            final_time = report.final_time,
            steps = report.steps,
            arrivals = report.total_arrivals,
            absorbed = report.total_absorbed,
            "Simulation finished"
        );
        if report.total_rejected > 0 {
            warn!(rejected = report.total_rejected, "Full places rejected tokens");
        }
        report
    }

    /// Processes one popped timestamp: generators first, then transitions in
    /// firing order.
    fn process(&mut self, now: SimTime) {
        self.now = now;
        self.steps += 1;

        let horizon = self.queue.horizon();
        let arrivals = self.network.process_generators(now);
        let mut scheduled = 0;
        for position in 0..self.network.firing_order().len() {
            let index = self.network.firing_order()[position];
            let upcoming = self.network.step_transition(index, now, horizon, &mut self.rng);
            scheduled += self.queue.insert_many(upcoming);
        }

        debug!(
            step = self.steps,
            time = now,
            arrivals,
            scheduled,
            queued = self.queue.len(),
            "Processed timestamp"
        );
    }

    pub fn report(&self) -> Report {
        Report::collect(
            &self.network,
            self.seed,
            self.queue.horizon(),
            self.now,
            self.steps,
            self.inter_arrival,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stochnet_core::prelude::*;

    fn bounded_queue() -> Network {
        let mut builder = NetworkBuilder::new();
        builder
            .default_generator(Distribution::constant(1))
            .add_place("queue", Capacity::Bounded(5), 0)
            .add_arc(DEFAULT_GENERATOR, "queue", 1);
        builder.build().unwrap()
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let err = Simulation::new(bounded_queue(), 0, 1).unwrap_err();
        assert_eq!(err, BuildError::InvalidHorizon(0));
    }

    #[test]
    fn test_processes_origin_and_every_arrival() {
        let mut simulation = Simulation::new(bounded_queue(), 10, 1).unwrap();
        let report = simulation.run();
        assert_eq!(report.steps, 11);
        assert_eq!(report.final_time, 10);
        assert_eq!(report.place("queue").map(|p| p.load), Some(5));
    }

    #[test]
    fn test_check_then_process_skips_last_timestamp() {
        let mut simulation = Simulation::new(bounded_queue(), 10, 1)
            .unwrap()
            .with_step_order(StepOrder::CheckThenProcess);
        let report = simulation.run();
        assert_eq!(report.steps, 10);
        assert_eq!(report.final_time, 9);
        assert_eq!(report.total_arrivals, 9);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let mut simulation = Simulation::new(bounded_queue(), 10, 1).unwrap();
        let first = simulation.run();
        let second = simulation.run();
        assert_eq!(first, second);
    }

    #[derive(Default)]
    struct Recorder {
        started: bool,
        times: Vec<SimTime>,
        finished_at: Option<SimTime>,
    }

    impl StateMonitor for Recorder {
        fn on_start(&mut self, _horizon: SimTime, _network: &Network) {
            self.started = true;
        }

        fn on_step(&mut self, _step: u64, now: SimTime, _network: &Network) {
            self.times.push(now);
        }

        fn on_finish(&mut self, last: SimTime, _network: &Network) {
            self.finished_at = Some(last);
        }
    }

    #[test]
    fn test_monitor_sees_every_step() {
        let mut recorder = Recorder::default();
        let mut simulation = Simulation::new(bounded_queue(), 4, 1).unwrap();
        simulation.run_with(&mut recorder);
        assert!(recorder.started);
        assert_eq!(recorder.times, vec![0, 1, 2, 3, 4]);
        assert_eq!(recorder.finished_at, Some(4));
    }
}

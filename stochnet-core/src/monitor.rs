//! State-monitoring hook invoked by the driver after every processed timestamp.

use crate::network::Network;
use crate::time::SimTime;

/// Observer of simulation progress. Every method defaults to a no-op.
pub trait StateMonitor {
    /// Called once before the first step, after arrival schedules are drawn.
    fn on_start(&mut self, _horizon: SimTime, _network: &Network) {}

    /// Called after generators and transitions have processed `now`.
    fn on_step(&mut self, _step: u64, _now: SimTime, _network: &Network) {}

    /// Called once when the event loop stops.
    fn on_finish(&mut self, _last: SimTime, _network: &Network) {}
}

/// Monitor that observes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMonitor;

impl StateMonitor for NoopMonitor {}

impl<M: StateMonitor + ?Sized> StateMonitor for &mut M {
    fn on_start(&mut self, horizon: SimTime, network: &Network) {
        (**self).on_start(horizon, network)
    }

    fn on_step(&mut self, step: u64, now: SimTime, network: &Network) {
        (**self).on_step(step, now, network)
    }

    fn on_finish(&mut self, last: SimTime, network: &Network) {
        (**self).on_finish(last, network)
    }
}

impl<M: StateMonitor + ?Sized> StateMonitor for Box<M> {
    fn on_start(&mut self, horizon: SimTime, network: &Network) {
        (**self).on_start(horizon, network)
    }

    fn on_step(&mut self, step: u64, now: SimTime, network: &Network) {
        (**self).on_step(step, now, network)
    }

    fn on_finish(&mut self, last: SimTime, network: &Network) {
        (**self).on_finish(last, network)
    }
}

/// Fans every callback out to a list of monitors, in order.
impl<M: StateMonitor> StateMonitor for Vec<M> {
    fn on_start(&mut self, horizon: SimTime, network: &Network) {
        self.iter_mut().for_each(|m| m.on_start(horizon, network))
    }

    fn on_step(&mut self, step: u64, now: SimTime, network: &Network) {
        self.iter_mut().for_each(|m| m.on_step(step, now, network))
    }

    fn on_finish(&mut self, last: SimTime, network: &Network) {
        self.iter_mut().for_each(|m| m.on_finish(last, network))
    }
}

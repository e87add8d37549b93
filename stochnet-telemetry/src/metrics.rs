//! ## stochnet-telemetry::metrics
//! **Prometheus metrics for a simulation run**
//!
//! Network totals are cumulative, so counters advance by the difference
//! since the previous step.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use stochnet_core::elements::NetElement;
use stochnet_core::monitor::StateMonitor;
use stochnet_core::time::SimTime;
use stochnet_core::Network;

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub steps: IntCounter,
    pub arrivals: IntCounter,
    pub firings: IntCounter,
    pub absorbed: IntCounter,
    pub rejected: IntCounter,
    pub pending_completions: IntGauge,
    pub place_load: IntGaugeVec,
    pub step_interval: Histogram,
    seen: Totals,
    last_time: Option<SimTime>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    arrivals: u64,
    firings: u64,
    absorbed: u64,
    rejected: u64,
}

impl Totals {
    fn of(network: &Network) -> Self {
        Self {
            arrivals: network.total_arrivals(),
            firings: network.transitions().iter().map(|t| t.fired()).sum(),
            absorbed: network.total_absorbed(),
            rejected: network.total_rejected(),
        }
    }
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let steps = IntCounter::new("stochnet_steps_total", "Processed timestamps")?;
        let arrivals = IntCounter::new("stochnet_arrivals_total", "Generator arrivals")?;
        let firings = IntCounter::new("stochnet_firings_total", "Transition instances fired")?;
        let absorbed = IntCounter::new("stochnet_absorbed_total", "Tokens absorbed by terminators")?;
        let rejected = IntCounter::new("stochnet_rejected_total", "Tokens rejected by full places")?;
        let pending_completions = IntGauge::new(
            "stochnet_pending_completions",
            "Scheduled completions not yet released",
        )?;
        let place_load = IntGaugeVec::new(
            Opts::new("stochnet_place_load", "Tokens resident in a place"),
            &["place"],
        )?;
        let step_interval = Histogram::with_opts(
            HistogramOpts::new(
                "stochnet_step_interval",
                "Simulated time between consecutive processed timestamps",
            )
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 50.0, 100.0]),
        )?;

        registry.register(Box::new(steps.clone()))?;
        registry.register(Box::new(arrivals.clone()))?;
        registry.register(Box::new(firings.clone()))?;
        registry.register(Box::new(absorbed.clone()))?;
        registry.register(Box::new(rejected.clone()))?;
        registry.register(Box::new(pending_completions.clone()))?;
        registry.register(Box::new(place_load.clone()))?;
        registry.register(Box::new(step_interval.clone()))?;

        Ok(Self {
            registry,
            steps,
            arrivals,
            firings,
            absorbed,
            rejected,
            pending_completions,
            place_load,
            step_interval,
            seen: Totals::default(),
            last_time: None,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    fn sync(&mut self, network: &Network) {
        let now = Totals::of(network);
        self.arrivals.inc_by(now.arrivals - self.seen.arrivals);
        self.firings.inc_by(now.firings - self.seen.firings);
        self.absorbed.inc_by(now.absorbed - self.seen.absorbed);
        self.rejected.inc_by(now.rejected - self.seen.rejected);
        self.seen = now;

        self.pending_completions
            .set(gauge_value(network.pending_completions()));
        for place in network.places() {
            self.place_load
                .with_label_values(&[place.id()])
                .set(gauge_value(place.load()));
        }
    }
}

fn gauge_value(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl StateMonitor for MetricsRecorder {
    fn on_start(&mut self, _horizon: SimTime, network: &Network) {
        self.seen = Totals::of(network);
        self.last_time = None;
        self.sync(network);
    }

    fn on_step(&mut self, _step: u64, now: SimTime, network: &Network) {
        self.steps.inc();
        if let Some(last) = self.last_time {
            self.step_interval.observe((now - last) as f64);
        }
        self.last_time = Some(now);
        self.sync(network);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stochnet_core::prelude::*;

    fn network() -> Network {
        let mut builder = NetworkBuilder::new();
        builder
            .default_generator(Distribution::constant(2))
            .default_terminator()
            .add_place("queue", Capacity::Unbounded, 4)
            .add_transition("serve", Distribution::constant(1), 0)
            .set_arcs([
                (DEFAULT_GENERATOR, "queue", 1),
                ("queue", "serve", 1),
                ("serve", DEFAULT_TERMINATOR, 1),
            ]);
        builder.build().unwrap()
    }

    #[test]
    fn test_counters_follow_network_totals() {
        let mut network = network();
        let mut rng = seeded_rng(0);
        network.generate_arrivals(10, &mut rng);

        let mut recorder = MetricsRecorder::new().unwrap();
        recorder.on_start(10, &network);

        for now in 0..=2 {
            network.process_generators(now);
            for index in 0..network.transitions().len() {
                network.step_transition(index, now, 10, &mut rng);
            }
            recorder.on_step(now + 1, now, &network);
        }

        assert_eq!(recorder.steps.get(), 3);
        // Arrival at t=2; 4 initial tokens fire at t=0 and the arrival at t=2.
        assert_eq!(recorder.arrivals.get(), 1);
        assert_eq!(recorder.firings.get(), 5);
        assert_eq!(recorder.absorbed.get(), 4);
        assert_eq!(recorder.pending_completions.get(), 1);
        assert_eq!(recorder.place_load.with_label_values(&["queue"]).get(), 0);
        assert_eq!(recorder.step_interval.get_sample_count(), 2);
    }

    #[test]
    fn test_gather_metrics() {
        let recorder = MetricsRecorder::new().unwrap();
        recorder.steps.inc();
        let text = recorder.gather_metrics().unwrap();
        assert!(text.contains("stochnet_steps_total 1"));
        assert!(text.contains("stochnet_step_interval"));
    }
}

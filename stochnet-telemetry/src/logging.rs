//! ## stochnet-telemetry::logging
//! **Subscriber setup and a step-by-step tracing monitor**

use stochnet_core::elements::NetElement;
use stochnet_core::monitor::StateMonitor;
use stochnet_core::time::SimTime;
use stochnet_core::Network;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global fmt subscriber. `RUST_LOG` wins over `level`.
    ///
    /// # Panics
    /// If a global subscriber is already set.
    pub fn init(level: &str) {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
            )
            .with_target(false)
            .init()
    }
}

/// Logs the full network state after every `every`-th processed timestamp:
/// arrivals so far, each terminator, each place and the model total load.
#[derive(Debug, Clone)]
pub struct TracingMonitor {
    every: u64,
}

impl Default for TracingMonitor {
    fn default() -> Self {
        Self { every: 1 }
    }
}

impl TracingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only log steps whose counter is a multiple of `every` (minimum 1).
    pub fn every(every: u64) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl StateMonitor for TracingMonitor {
    fn on_start(&mut self, horizon: SimTime, network: &Network) {
        info!(
            horizon,
            generators = network.generators().len(),
            places = network.places().len(),
            transitions = network.transitions().len(),
            terminators = network.stocks().len(),
            "Monitoring simulation"
        );
    }

    fn on_step(&mut self, step: u64, now: SimTime, network: &Network) {
        if step % self.every != 0 {
            return;
        }
        info!(
            step,
            time = now,
            arrivals = network.total_arrivals(),
            "Simulation step"
        );
        for terminator in network.stocks() {
            info!(step, "{terminator}");
        }
        for place in network.places() {
            info!(step, "{place}");
        }
        info!(step, total_load = network.total_load(), "Model total load");
    }

    fn on_finish(&mut self, last: SimTime, network: &Network) {
        let absorbed: Vec<String> = network
            .stocks()
            .iter()
            .map(|t| format!("{}={}", t.id(), t.load()))
            .collect();
        info!(
            last_time = last,
            arrivals = network.total_arrivals(),
            absorbed = %absorbed.join(", "),
            "Monitoring finished"
        );
    }
}

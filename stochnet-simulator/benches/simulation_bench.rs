#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};
use stochnet_core::prelude::*;
use stochnet_simulator::Simulation;

/// Two-stage queue with a shared server pool, fed by an exponential source.
fn tandem_queue() -> Network {
    let mut builder = NetworkBuilder::new();
    builder
        .default_generator(Distribution::exponential(2.0))
        .default_terminator()
        .add_place("waiting", Capacity::Bounded(50), 0)
        .add_place("inspection", Capacity::Unbounded, 0)
        .add_transition("serve", Distribution::normal(3.0, 1.0), 0)
        .add_transition("inspect", Distribution::uniform(1.0, 4.0), 1)
        .set_arcs([
            (DEFAULT_GENERATOR, "waiting", 1),
            ("waiting", "serve", 1),
            ("serve", "inspection", 1),
            ("inspection", "inspect", 1),
            ("inspect", DEFAULT_TERMINATOR, 1),
        ]);
    builder.build().expect("benchmark model is valid")
}

/// Benchmark the simulation throughput over a long horizon.
fn benchmark_simulation_throughput(c: &mut Criterion) {
    let horizon = 100_000;
    let seed = 42;
    let network = tandem_queue();

    c.bench_function("simulation_throughput", |b| {
        b.iter(|| {
            let mut simulation =
                Simulation::new(network.clone(), horizon, seed).expect("positive horizon");
            black_box(simulation.run());
        })
    });
}

criterion_group!(benches, benchmark_simulation_throughput);
criterion_main!(benches);

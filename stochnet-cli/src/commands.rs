use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use stochnet_config::ModelConfig;
use stochnet_core::monitor::StateMonitor;
use stochnet_simulator::cli::SimulatorCli;
use stochnet_simulator::scenario::load_scenario;
use stochnet_simulator::{replay, sweep, Report, Simulation};
use stochnet_telemetry::{EventLogger, MetricsRecorder, TracingMonitor};
use tracing::info;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a model once and print its report
    Run(RunArgs),
    /// Re-run a model and check it reproduces its recorded digest
    Replay(ReplayArgs),
    /// Run a model for a range of seeds and list the digests
    Sweep(SweepArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub sim: SimulatorCli,
    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
    /// Print Prometheus metrics after the report
    #[arg(long, default_value_t = false)]
    pub metrics: bool,
    /// Log the network state after every step
    #[arg(long, default_value_t = false)]
    pub trace_steps: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub sim: SimulatorCli,
    /// Digest to check against instead of the model's `expected_digest`
    #[arg(long)]
    pub expect: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub sim: SimulatorCli,
    /// First seed of the sweep
    #[arg(long, default_value_t = 0)]
    pub from: u64,
    /// Number of seeds to run
    #[arg(long, default_value_t = 10)]
    pub count: u64,
    /// Print the results as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_model(args),
        Commands::Replay(args) => replay_model(args),
        Commands::Sweep(args) => sweep_model(args),
    }
}

/// Loads the model, applies shell overrides and installs logging at the
/// model's configured level.
fn prepare(sim: &SimulatorCli) -> anyhow::Result<ModelConfig> {
    let mut config = load_scenario(&sim.model)
        .with_context(|| format!("loading model {}", sim.model.display()))?;
    sim.apply(&mut config);
    EventLogger::init(&config.telemetry.log_level);
    Ok(config)
}

fn run_model(args: RunArgs) -> anyhow::Result<()> {
    let config = prepare(&args.sim)?;
    let mut simulation = Simulation::from_config(&config)?;

    let mut recorder = if args.metrics || config.telemetry.metrics {
        Some(MetricsRecorder::new()?)
    } else {
        None
    };
    let mut tracer = (args.trace_steps || config.telemetry.trace_steps).then(TracingMonitor::new);

    let mut monitors: Vec<Box<dyn StateMonitor + '_>> = Vec::new();
    if let Some(recorder) = recorder.as_mut() {
        monitors.push(Box::new(recorder));
    }
    if let Some(tracer) = tracer.as_mut() {
        monitors.push(Box::new(tracer));
    }
    let report = simulation.run_with(monitors);

    print_report(&report, args.json)?;
    if let Some(recorder) = recorder {
        println!("{}", recorder.gather_metrics()?);
    }
    Ok(())
}

fn replay_model(args: ReplayArgs) -> anyhow::Result<()> {
    let mut config = prepare(&args.sim)?;
    if let Some(expect) = args.expect {
        config.expected_digest = Some(expect);
    }
    let report = replay(&config)?;
    info!(digest = %report.digest(), "Replay successful");
    println!("Replay matched: {}", report.digest());
    Ok(())
}

fn sweep_model(args: SweepArgs) -> anyhow::Result<()> {
    let config = prepare(&args.sim)?;
    let end = args
        .from
        .checked_add(args.count)
        .context("seed range overflows u64")?;
    let entries = sweep(&config, args.from..end)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            println!(
                "seed={} arrivals={} absorbed={} rejected={} digest={}",
                entry.seed,
                entry.total_arrivals,
                entry.total_absorbed,
                entry.total_rejected,
                entry.digest
            );
        }
    }
    Ok(())
}

fn print_report(report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
        println!("Digest: {}", report.digest());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sweep_arguments() {
        let cli = Cli::parse_from(["stochnet", "sweep", "model.yaml", "--from", "5", "--count", "3"]);
        match cli.command {
            Commands::Sweep(args) => {
                assert_eq!(args.from, 5);
                assert_eq!(args.count, 3);
                assert!(!args.json);
            }
            _ => panic!("expected sweep"),
        }
    }
}

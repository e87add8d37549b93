//! ## stochnet-cli
//! **Command-line front end**
//!
//! Runs, replays and sweeps YAML-described stochastic Petri net models.

use clap::Parser;

mod commands;

use commands::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::run_command(cli)
}

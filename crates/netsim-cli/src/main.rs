use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use netsim_cli::report::{build_report, SimulationReport};
use netsim_cli::scenario::Scenario;
use netsim_cli::topology;

#[derive(Parser, Debug)]
#[command(author, version, about = "Wired-line network simulator")]
struct Args {
    /// Load a scenario from disk instead of running the built-in default.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Write a JSON trace of the finished simulation.
    #[arg(long)]
    trace_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();
    info!("netsim-cli starting…");

    let scenario = if let Some(path) = &args.scenario {
        load_scenario(path)?
    } else {
        Scenario::default()
    };

    info!(name = %scenario.name, stime_limit = scenario.stime_limit, "running scenario");
    let report = run_scenario(&scenario)?;

    if let Some(trace_path) = &args.trace_out {
        write_trace(trace_path, &report)?;
    }

    info!(
        final_time = report.final_time,
        stations = report.stations.len(),
        "simulation complete"
    );
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt::init();
}

fn run_scenario(scenario: &Scenario) -> Result<SimulationReport> {
    let (mut sim, topology) = topology::build(&scenario.topology, scenario.seed);
    sim.run_until(scenario.stime_limit)
        .context("simulation halted with an error before reaching stime_limit")?;
    Ok(build_report(&sim, &topology, scenario))
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    let scenario: Scenario = toml::from_str(&content).context("Failed to parse scenario file")?;
    Ok(scenario)
}

fn write_trace(path: &Path, report: &SimulationReport) -> Result<()> {
    let data = serde_json::to_vec_pretty(report).context("Failed to serialize simulation trace")?;
    fs::write(path, &data)
        .with_context(|| format!("Failed to write trace file {}", path.display()))?;
    Ok(())
}

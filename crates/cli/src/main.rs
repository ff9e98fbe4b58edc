//! Stream harness CLI.
//!
//! This binary runs JSON scenarios against the reference FIFO design. It performs:
//! 1. **Scenario run:** Build the tester, simulate, check outputs, print the report.
//! 2. **Schema dump:** Print the packed size and bit layout of every schema.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cyclebench_core::ScenarioConfig;
use cyclebench_core::sim::TestReport;

#[derive(Parser, Debug)]
#[command(
    name = "cyclebench",
    author,
    version,
    about = "Valid/ready stream harness for clocked designs",
    long_about = "Run a JSON scenario through the reference FIFO design and check the outputs against golden vectors.\n\nLogging follows RUST_LOG (default: info); --verbose forces debug.\n\nExamples:\n  cyclebench run scenarios/loopback.json\n  cyclebench run scenarios/loopback.json --cycles 200 --json\n  cyclebench schema scenarios/loopback.json"
)]
struct Cli {
    /// Log every handshake (equivalent to RUST_LOG=debug).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario and check its output streams.
    Run {
        /// Scenario file.
        path: PathBuf,

        /// Override the scenario's cycle count.
        #[arg(short, long)]
        cycles: Option<u64>,

        /// Print accepted transactions as JSON instead of the text report.
        #[arg(long)]
        json: bool,
    },

    /// Print the packed size and field layout of each schema in a scenario.
    Schema {
        /// Scenario file.
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { path, cycles, json } => cmd_run(&path, cycles, json),
        Commands::Schema { path } => cmd_schema(&path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Loads, builds and runs a scenario; the report goes to stdout.
fn cmd_run(path: &Path, cycles: Option<u64>, json: bool) -> Result<(), String> {
    let scenario = ScenarioConfig::from_path(path).map_err(|e| e.to_string())?;
    let cycles = cycles.unwrap_or(scenario.cycles);
    info!(scenario = %scenario.name, cycles, "loaded scenario");

    let mut tester = scenario.build().map_err(|e| e.to_string())?;
    let report = tester
        .run_test(cycles)
        .map_err(|e| format!("scenario `{}` failed: {e}", scenario.name))?;

    if json {
        println!("{}", report_json(&scenario.name, &report));
    } else {
        println!("scenario `{}` passed", scenario.name);
        print!("{report}");
    }
    Ok(())
}

fn cmd_schema(path: &Path) -> Result<(), String> {
    let scenario = ScenarioConfig::from_path(path).map_err(|e| e.to_string())?;
    for (name, schema) in &scenario.schemas {
        println!("{name}: {} bits", schema.size());
        for field in schema.layout() {
            println!(
                "  [{:>4}:{:<4}] {:<24} {}",
                field.lsb + field.width - 1,
                field.lsb,
                field.path,
                field.kind
            );
        }
    }
    Ok(())
}

fn report_json(name: &str, report: &TestReport) -> String {
    let streams: Vec<serde_json::Value> = report
        .streams
        .iter()
        .map(|s| {
            let transactions: Vec<serde_json::Value> = s
                .transactions
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "cycle": t.cycle,
                        "data": t.data.to_json(),
                        "metadata": t.metadata.as_ref().map(|m| m.to_json()),
                    })
                })
                .collect();
            serde_json::json!({
                "name": s.name,
                "direction": s.direction.label(),
                "accepted": s.stats.accepted,
                "stall_cycles": s.stats.stall_cycles,
                "transactions": transactions,
            })
        })
        .collect();

    serde_json::json!({
        "scenario": name,
        "cycles": report.cycles,
        "streams": streams,
    })
    .to_string()
}

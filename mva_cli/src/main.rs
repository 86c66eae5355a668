//! MAKVA command line tool
//!
//! Solves a closed queueing network through approximate MVA and prints
//! the total job response time, e.g. `R: 2.584088`.
//!
//! ```text
//! makva -N 4 -C 1 -e 2.5 -r response.txt -s demand.txt -o overlap.txt
//! ```
//!
//! Sample tables for a 3-task, 2-center network live in `demos/three_tasks`:
//!
//! ```text
//! makva -N 3 -C 2 -e 1e-6 -r demos/three_tasks/response.txt \
//!     -s demos/three_tasks/demand.txt -o demos/three_tasks/overlap.txt
//! ```

mod report;

use clap::Parser;
use mva_core::{ModelPaths, MvaError, MvaSolver, Solution, SolverConfig};
use report::SolveReport;
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Approximate Mean Value Analysis for closed queueing networks
#[derive(Parser, Debug)]
#[command(name = "makva")]
#[command(about = "Solve a closed queueing network through approximate MVA", long_about = None)]
struct Args {
    /// Number of tasks
    #[arg(short = 'N', long = "tasks")]
    tasks: usize,

    /// Number of service centers
    #[arg(short = 'C', long = "centers")]
    centers: usize,

    /// Error tolerance on the total response time
    #[arg(short = 'e', long = "epsilon", allow_negative_numbers = true)]
    epsilon: f64,

    /// File containing the initial response times of each task (N x C)
    #[arg(short = 'r', long = "response")]
    response: PathBuf,

    /// File containing the service demands of each task (N x C)
    #[arg(short = 's', long = "demand")]
    demand: PathBuf,

    /// File containing the task overlap matrix (N x N)
    #[arg(short = 'o', long = "overlap")]
    overlap: PathBuf,

    /// Give up after this many iterations
    #[arg(long, default_value_t = mva_core::config::DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Verbose output (per-iteration trace)
    #[arg(short, long)]
    verbose: bool,

    /// JSON output on stdout
    #[arg(long)]
    json: bool,

    /// Also write the JSON report to this file
    #[arg(long)]
    export: Option<PathBuf>,
}

impl Args {
    fn solver_config(&self) -> SolverConfig {
        SolverConfig::new(self.epsilon).with_max_iterations(self.max_iterations)
    }

    fn model_paths(&self) -> ModelPaths {
        ModelPaths::new(&self.response, &self.demand, &self.overlap)
    }
}

/// Validates the configuration, loads the tables and solves.
fn run(args: &Args) -> Result<Solution, MvaError> {
    let config = args.solver_config();
    config.validate()?;

    let model = args.model_paths().load(args.tasks, args.centers)?;
    MvaSolver::new(&model, config)?.solve()
}

/// 0 only when the solve converged and any requested export was written.
fn exit_status(outcome: &Result<Solution, MvaError>, export_failed: bool) -> i32 {
    if outcome.is_err() || export_failed {
        1
    } else {
        0
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let outcome = run(&args);
    let report = SolveReport::new(args.tasks, args.centers, args.epsilon, &outcome);

    let mut export_failed = false;
    if let Some(path) = &args.export {
        match report.write_to_file(path) {
            Ok(()) => info!("Exported report to {}", path.display()),
            Err(e) => {
                error!("Failed to write export: {:?}", e);
                eprintln!("Error: cannot write report to {}: {}", path.display(), e);
                export_failed = true;
            }
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize report: {}", e),
        }
    } else if let Some(line) = report.summary_line() {
        println!("{}", line);
    }

    if let Err(e) = &outcome {
        eprintln!("Error: {}", e);
    }

    let status = exit_status(&outcome, export_failed);
    if status != 0 {
        std::process::exit(status);
    }
}

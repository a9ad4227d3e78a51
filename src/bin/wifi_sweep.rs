use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use wlansim_rs::error::Result;
use wlansim_rs::scenario::{SweepSpec, run_sweep};

#[derive(Debug, Parser)]
#[command(
    name = "wifi-sweep",
    about = "Run the station-count sweep over data rates and packet sizes"
)]
struct Args {
    /// Sweep spec (JSON); omitted fields use the built-in grid
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Override output directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Override the number of scenarios run concurrently
    #[arg(long)]
    max_jobs: Option<usize>,

    /// Override simulation time in seconds
    #[arg(long)]
    time: Option<f64>,

    /// Override RNG seed shared by every run
    #[arg(long)]
    seed: Option<u64>,
}

fn run(args: &Args) -> Result<bool> {
    let mut spec: SweepSpec = match &args.spec {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => SweepSpec::default(),
    };
    if let Some(dir) = &args.out_dir {
        spec.out_dir = dir.clone();
    }
    if let Some(jobs) = args.max_jobs {
        spec.max_jobs = jobs;
    }
    if let Some(time) = args.time {
        spec.base.simulation_time_s = time;
    }
    if let Some(seed) = args.seed {
        spec.base.seed = seed;
    }

    info!(out_dir = %spec.out_dir.display(), max_jobs = spec.max_jobs, "🚀 wifi-sweep");
    let outcome = run_sweep(&spec)?;
    println!(
        "sweep finished: {} succeeded, {} failed",
        outcome.succeeded, outcome.failed
    );
    Ok(outcome.failed == 0)
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

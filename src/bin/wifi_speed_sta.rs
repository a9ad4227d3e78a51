use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use wlansim_rs::error::Result;
use wlansim_rs::scenario::{
    ScenarioConfig, append_csv_row, parse_data_rate, run_scenario, write_flow_diagnostics,
    write_overview,
};

#[derive(Debug, Parser)]
#[command(
    name = "wifi-speed-sta",
    about = "Uplink throughput of N stations sharing one 802.11b access point"
)]
struct Args {
    /// Simulation time in seconds
    #[arg(long)]
    time: Option<f64>,

    /// Number of stations
    #[arg(long)]
    stas: Option<u32>,

    /// Run number (selects an independent random stream under the same seed)
    #[arg(long)]
    run: Option<u64>,

    /// CSV file to append the result row to
    #[arg(long, default_value = "data.csv")]
    of: PathBuf,

    /// Application data rate per station, e.g. 5Mbps, 500Kbps
    #[arg(long)]
    dr: Option<String>,

    /// Application packet size in bytes
    #[arg(long)]
    ps: Option<u32>,

    /// RNG seed; defaults to the current wall-clock seconds
    #[arg(long)]
    seed: Option<u64>,

    /// Base scenario config (JSON); command-line flags override it
    #[arg(long)]
    config: Option<PathBuf>,
}

fn build_config(args: &Args) -> Result<ScenarioConfig> {
    let mut cfg = match &args.config {
        Some(path) => ScenarioConfig::from_json(&fs::read_to_string(path)?)?,
        None => ScenarioConfig::default(),
    };
    if let Some(time) = args.time {
        cfg.simulation_time_s = time;
    }
    if let Some(stas) = args.stas {
        cfg.sta_count = stas;
    }
    if let Some(run) = args.run {
        cfg.run = run;
    }
    if let Some(dr) = &args.dr {
        cfg.data_rate_bps = parse_data_rate(dr)?;
    }
    if let Some(ps) = args.ps {
        cfg.packet_size = ps;
    }
    cfg.seed = match args.seed {
        Some(seed) => seed,
        // 既没有 --seed 也没有配置文件：用当前时间
        None if args.config.is_none() => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default(),
        None => cfg.seed,
    };
    Ok(cfg)
}

fn run(args: &Args) -> Result<()> {
    let cfg = build_config(args)?;
    info!(
        time = cfg.simulation_time_s,
        stas = cfg.sta_count,
        run = cfg.run,
        seed = cfg.seed,
        data_rate_bps = cfg.data_rate_bps,
        packet_size = cfg.packet_size,
        "🚀 wifi-speed-sta"
    );

    let report = run_scenario(&cfg)?;
    let summary = report.summarize()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_flow_diagnostics(&mut out, &summary)?;
    write_overview(&mut out, cfg.simulation_time_s, cfg.sta_count, &summary)?;
    out.flush()?;

    append_csv_row(&args.of, cfg.simulation_time_s, cfg.sta_count, &summary)?;
    info!(path = %args.of.display(), "结果已追加");
    Ok(())
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

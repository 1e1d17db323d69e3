//! GreenFactory - machine efficiency monitoring service
//!
//! # Usage
//!
//! ```bash
//! # Run ten in-process simulated machines
//! cargo run --release -- --simulate 10
//!
//! # Score readings produced by the simulation harness
//! ./simulation --machines 10 | ./greenfactory --stdin
//! ```
//!
//! # Environment Variables
//!
//! - `GREENFACTORY_CONFIG`: Path to the factory configuration file
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use greenfactory::acquisition::SimulatedMachine;
use greenfactory::config::defaults::{DEFAULT_SIMULATION_INTERVAL_MS, DEFAULT_SIMULATED_MACHINES};
use greenfactory::pipeline::StdinSource;
use greenfactory::{FactoryConfig, FleetView, MachineId, PipelineCoordinator, SensorProfile};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "greenfactory")]
#[command(about = "GreenFactory machine efficiency monitoring")]
#[command(version)]
struct CliArgs {
    /// Read JSON readings from stdin, one per line
    /// Use with the harness: ./simulation | ./greenfactory --stdin
    #[arg(long, conflicts_with = "simulate")]
    stdin: bool,

    /// Run N in-process simulated machines (default when no input is given)
    #[arg(long, value_name = "N")]
    simulate: Option<usize>,

    /// Configuration file (overrides GREENFACTORY_CONFIG and ./factory_config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Sensor profile used when no configuration file is found
    #[arg(long, default_value = "analog")]
    profile: SensorProfile,

    /// Milliseconds between readings of a simulated machine
    #[arg(long, default_value_t = DEFAULT_SIMULATION_INTERVAL_MS)]
    interval_ms: u64,

    /// Seed for simulated machines (machine i uses seed + i)
    #[arg(long)]
    seed: Option<u64>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn load_config(args: &CliArgs) -> Result<FactoryConfig> {
    match &args.config {
        Some(path) => FactoryConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => FactoryConfig::load(args.profile).context("Failed to load configuration"),
    }
}

// ============================================================================
// Input modes
// ============================================================================

/// Pump stdin readings into the pipeline until EOF or cancellation.
async fn run_stdin(pipeline: &PipelineCoordinator, cancel_token: &CancellationToken) -> Result<()> {
    let mut source = StdinSource::new();
    let accepted = pipeline
        .ingest_from(&mut source, cancel_token)
        .await
        .context("Failed to read from stdin")?;
    info!(accepted, "stdin input finished");
    if source.rejected() > 0 {
        warn!(rejected = source.rejected(), "Malformed stdin lines were skipped");
    }
    Ok(())
}

/// Attach simulated machines and run until cancelled.
fn start_simulation(pipeline: &PipelineCoordinator, args: &CliArgs, machines: usize) -> Result<()> {
    let profile = pipeline.config().plant.profile;
    let interval = Duration::from_millis(args.interval_ms);
    for i in 0..machines {
        let machine_id = MachineId::new(format!("M{}", i + 1));
        let mut machine = SimulatedMachine::new(machine_id.clone(), profile, interval);
        if let Some(seed) = args.seed {
            machine = machine.with_seed(seed.wrapping_add(i as u64));
        }
        pipeline
            .attach_source(machine_id, machine)
            .context("Failed to attach simulated machine")?;
    }
    info!(machines, interval_ms = args.interval_ms, profile = profile.display_name(), "Simulation running");
    Ok(())
}

// ============================================================================
// Reporting
// ============================================================================

fn log_summary(view: &FleetView) {
    let summary = view.summary();
    info!(
        total = summary.total,
        normal = summary.normal,
        warning = summary.warning,
        critical = summary.critical,
        "Fleet summary"
    );
    for (machine_id, scored) in view.critical() {
        warn!(
            machine_id = %machine_id,
            efficiency = scored.efficiency,
            temperature = scored.reading.temperature,
            co2 = scored.reading.co2,
            vibration = scored.reading.vibration,
            "Machine CRITICAL"
        );
    }
}

fn spawn_reporter(view: FleetView, every: Duration, cancel_token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick completes immediately
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = ticker.tick() => log_summary(&view),
            }
        }
    })
}

fn print_snapshot(view: &FleetView) {
    println!("{:<12} {:>10} {:>8} {:>8} {:>8} {:>8} {:>8}  STATUS", "MACHINE", "EFFICIENCY", "TEMP", "CO2", "VIB", "ENERGY", "OUTPUT");
    for (machine_id, scored) in view.snapshot() {
        let r = &scored.reading;
        println!(
            "{:<12} {:>10.1} {:>8.1} {:>8.1} {:>8.2} {:>8.1} {:>8.1}  {}",
            machine_id.as_str(),
            scored.efficiency,
            r.temperature,
            r.co2,
            r.vibration,
            r.energy,
            r.output,
            scored.status
        );
    }
    let summary = view.summary();
    println!(
        "{} machines: {} normal, {} warning, {} critical (worst: {})",
        summary.total,
        summary.normal,
        summary.warning,
        summary.critical,
        summary.worst().map_or("n/a", |status| status.as_str())
    );
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_format);

    let config = load_config(&args)?;
    let report_every = Duration::from_secs(config.pipeline.report_interval_secs);

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  GreenFactory - Machine Efficiency Monitoring");
    info!("  Plant: {} | Profile: {}", config.plant.name, config.plant.profile.display_name());
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let pipeline = PipelineCoordinator::start(config).context("Pipeline refused to start")?;

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let reporter = spawn_reporter(pipeline.view(), report_every, cancel_token.clone());

    if args.stdin {
        info!("Input: stdin (JSON readings)");
        run_stdin(&pipeline, &cancel_token).await?;
    } else {
        let machines = args.simulate.unwrap_or(DEFAULT_SIMULATED_MACHINES);
        start_simulation(&pipeline, &args, machines)?;
        cancel_token.cancelled().await;
    }

    cancel_token.cancel();
    let stats = pipeline.shutdown().await;
    reporter.await.ok();

    info!(%stats, "Pipeline stopped");
    print_snapshot(&pipeline.view());
    Ok(())
}

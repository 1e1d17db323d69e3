//! GreenFactory Simulation Harness
//!
//! Emits simulated machine readings as JSON lines on stdout:
//!
//! ```bash
//! ./simulation --machines 10 --interval-ms 3000 | ./greenfactory --stdin
//! ```
//!
//! Every tick produces one reading per machine. Logs go to stderr so stdout
//! stays a clean reading stream.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tracing::info;

use greenfactory::acquisition::SimulatedMachine;
use greenfactory::config::defaults::{DEFAULT_SIMULATED_MACHINES, DEFAULT_SIMULATION_INTERVAL_MS};
use greenfactory::SensorProfile;

#[derive(Parser, Debug)]
#[command(name = "simulation")]
#[command(about = "Generate simulated GreenFactory machine readings")]
struct Args {
    /// Number of machines (ids M1..MN)
    #[arg(long, default_value_t = DEFAULT_SIMULATED_MACHINES)]
    machines: usize,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = DEFAULT_SIMULATION_INTERVAL_MS)]
    interval_ms: u64,

    /// Stop after this many ticks (runs forever when omitted)
    #[arg(long)]
    count: Option<u64>,

    /// Seed for reproducible output (machine i uses seed + i)
    #[arg(long)]
    seed: Option<u64>,

    /// Sensor profile of the generated readings
    #[arg(long, default_value = "analog")]
    profile: SensorProfile,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!(
        machines = args.machines,
        interval_ms = args.interval_ms,
        profile = args.profile.display_name(),
        "Simulation started"
    );

    let interval = Duration::from_millis(args.interval_ms);
    let mut machines: Vec<SimulatedMachine> = (0..args.machines)
        .map(|i| {
            let machine = SimulatedMachine::new(format!("M{}", i + 1), args.profile, interval);
            match args.seed {
                Some(seed) => machine.with_seed(seed.wrapping_add(i as u64)),
                None => machine,
            }
        })
        .collect();

    let mut ticker = tokio::time::interval(interval);
    let mut ticks = 0u64;
    let stdout = std::io::stdout();

    while args.count.map_or(true, |count| ticks < count) {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {}
        }

        let mut out = stdout.lock();
        for machine in &mut machines {
            let line = serde_json::to_string(&machine.generate()).context("Failed to encode reading")?;
            // A closed pipe means the consumer went away
            if writeln!(out, "{line}").is_err() {
                return Ok(());
            }
        }
        if out.flush().is_err() {
            return Ok(());
        }
        ticks += 1;
    }

    info!(ticks, "Simulation finished");
    Ok(())
}

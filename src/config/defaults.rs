//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Configuration Loading
// ============================================================================

/// Environment variable holding an explicit config file path.
pub const CONFIG_ENV_VAR: &str = "GREENFACTORY_CONFIG";

/// Config file looked up in the working directory when the env var is unset.
pub const DEFAULT_CONFIG_FILE: &str = "factory_config.toml";

/// Plant name used in logs when the config does not name one.
pub const DEFAULT_PLANT_NAME: &str = "GreenFactory";

// ============================================================================
// Pipeline
// ============================================================================

/// Per-machine ingestion queue depth (readings).
///
/// At a 5 s sensor cadence this is over five minutes of backlog.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Interval between fleet summary log lines in the service binary (seconds).
pub const DEFAULT_REPORT_INTERVAL_SECS: u64 = 5;

// ============================================================================
// Simulation
// ============================================================================

/// Machines simulated when no count is given.
pub const DEFAULT_SIMULATED_MACHINES: usize = 10;

/// Cadence of simulated readings (milliseconds).
pub const DEFAULT_SIMULATION_INTERVAL_MS: u64 = 3_000;

/// Probability that a simulated reading is drawn from the nominal regime.
pub const SIMULATION_NOMINAL_PROBABILITY: f64 = 0.85;

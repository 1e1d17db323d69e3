//! Health classification from a reading and its efficiency score.

use crate::config::LimitsConfig;
use crate::types::{HealthStatus, Reading, VibrationMode};

/// Classify a scored reading. First match wins:
///
/// 1. `CRITICAL` if temperature, CO2 or (analog) vibration exceeds its limit,
///    or efficiency is below `eff_critical`
/// 2. `WARNING` if efficiency is below `eff_warning`
/// 3. `NORMAL` otherwise
///
/// Raw-limit breaches dominate: a 95% efficient machine running over its
/// temperature limit is still CRITICAL.
pub fn classify(
    reading: &Reading,
    efficiency: f64,
    limits: &LimitsConfig,
    vibration_mode: VibrationMode,
) -> HealthStatus {
    if critical_trigger(reading, efficiency, limits, vibration_mode).is_some() {
        HealthStatus::Critical
    } else if efficiency < limits.eff_warning {
        HealthStatus::Warning
    } else {
        HealthStatus::Normal
    }
}

/// Name of the first CRITICAL condition a reading meets, if any.
pub fn critical_trigger(
    reading: &Reading,
    efficiency: f64,
    limits: &LimitsConfig,
    vibration_mode: VibrationMode,
) -> Option<&'static str> {
    if reading.temperature > limits.temp_limit {
        Some("temperature")
    } else if reading.co2 > limits.co2_limit {
        Some("co2")
    } else if vibration_mode == VibrationMode::Analog && reading.vibration > limits.vib_limit {
        Some("vibration")
    } else if efficiency < limits.eff_critical {
        Some("efficiency")
    } else {
        None
    }
}

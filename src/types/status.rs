//! Health status and vibration sensor mode

use serde::{Deserialize, Serialize};

/// Discrete machine health classification.
///
/// Ordered by severity so `max()` over a fleet yields the worst status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Upper-case label used in logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Normal => "NORMAL",
            HealthStatus::Warning => "WARNING",
            HealthStatus::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the `vibration` channel of a reading is interpreted.
///
/// This is a deployment choice, not something inferred from the data:
/// a digital sensor reports a 0/1 flag, an analog sensor a magnitude.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum VibrationMode {
    /// Binary vibration flag (0 = quiet, 1 = vibrating)
    Digital,
    /// Continuous vibration magnitude
    #[default]
    Analog,
}

impl std::fmt::Display for VibrationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VibrationMode::Digital => write!(f, "digital"),
            VibrationMode::Analog => write!(f, "analog"),
        }
    }
}

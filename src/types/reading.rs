//! Reading and scored-reading types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::HealthStatus;

/// Opaque identifier of one physical machine (e.g. "M1").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineId(String);

impl MachineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MachineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MachineId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MachineId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One sample from one machine at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub machine_id: MachineId,

    /// Capture time
    pub timestamp: DateTime<Utc>,

    /// Temperature (degrees)
    pub temperature: f64,

    /// CO2 concentration (ppm-equivalent index)
    pub co2: f64,

    /// Vibration flag (digital sensor) or magnitude (analog sensor)
    pub vibration: f64,

    /// Input power / consumption. Values <= 0 zero the output ratio.
    pub energy: f64,

    /// Produced output / throughput
    pub output: f64,
}

impl Reading {
    /// Build a reading stamped with the current time.
    pub fn now(
        machine_id: impl Into<MachineId>,
        temperature: f64,
        co2: f64,
        vibration: f64,
        energy: f64,
        output: f64,
    ) -> Self {
        Self {
            machine_id: machine_id.into(),
            timestamp: Utc::now(),
            temperature,
            co2,
            vibration,
            energy,
            output,
        }
    }

    /// Numeric channels as (name, value) pairs, in declaration order.
    pub fn channels(&self) -> [(&'static str, f64); 5] {
        [
            ("temperature", self.temperature),
            ("co2", self.co2),
            ("vibration", self.vibration),
            ("energy", self.energy),
            ("output", self.output),
        ]
    }
}

/// A reading plus its derived efficiency and health status.
///
/// Immutable once computed; a newer `ScoredReading` supersedes it in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredReading {
    #[serde(flatten)]
    pub reading: Reading,

    /// Efficiency score, clamped to [0, 100]
    pub efficiency: f64,

    pub status: HealthStatus,
}

impl ScoredReading {
    pub fn machine_id(&self) -> &MachineId {
        &self.reading.machine_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_json_shape() {
        let json = r#"{
            "machine_id": "M3",
            "timestamp": "2026-01-05T08:00:00Z",
            "temperature": 72.0,
            "co2": 20.0,
            "vibration": 1.0,
            "energy": 100.0,
            "output": 80.0
        }"#;
        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.machine_id, MachineId::from("M3"));
        assert_eq!(reading.energy, 100.0);
    }

    #[test]
    fn test_reading_missing_field_rejected() {
        let json = r#"{"machine_id": "M3", "timestamp": "2026-01-05T08:00:00Z", "temperature": 72.0}"#;
        assert!(serde_json::from_str::<Reading>(json).is_err());
    }

    #[test]
    fn test_scored_reading_flattens_reading() {
        let scored = ScoredReading {
            reading: Reading::now("M1", 70.0, 20.0, 1.0, 100.0, 80.0),
            efficiency: 74.0,
            status: HealthStatus::Warning,
        };
        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["machine_id"], "M1");
        assert_eq!(value["status"], "WARNING");
        assert_eq!(scored.machine_id().as_str(), "M1");
    }
}

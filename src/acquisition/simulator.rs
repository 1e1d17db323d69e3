//! Simulated machine feed
//!
//! Generates plausible readings for one machine. Most samples come from a
//! nominal regime; occasionally the machine runs hot, shakes and emits more,
//! which is what drives it into WARNING / CRITICAL.
//!
//! Ranges follow the sensor profile:
//! - analog: temperature 65-80 (stressed 85-100), vibration magnitude 0.5-1.5
//!   (1.8-2.8), CO2 index 15-25 (30-45), energy 90-140, output 60-120
//! - digital: temperature ~65 (stressed ~88), vibration flag 0 (1), CO2
//!   ~450 ppm (~900), energy fixed at 120, output 100 minus 10 per vibration flag

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::config::defaults::SIMULATION_NOMINAL_PROBABILITY;
use crate::config::SensorProfile;
use crate::pipeline::source::{ReadingSource, SourceEvent};
use crate::types::{MachineId, Reading};

/// One simulated machine producing readings at a fixed cadence.
pub struct SimulatedMachine {
    machine_id: MachineId,
    profile: SensorProfile,
    interval: Duration,
    rng: StdRng,
    /// Readings left to produce; `None` runs forever
    remaining: Option<u64>,
    yielded_first: bool,
}

impl SimulatedMachine {
    pub fn new(machine_id: impl Into<MachineId>, profile: SensorProfile, interval: Duration) -> Self {
        Self {
            machine_id: machine_id.into(),
            profile,
            interval,
            rng: StdRng::from_entropy(),
            remaining: None,
            yielded_first: false,
        }
    }

    /// Seed the generator for reproducible output.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Stop after `count` readings.
    pub fn with_limit(mut self, count: u64) -> Self {
        self.remaining = Some(count);
        self
    }

    pub fn machine_id(&self) -> &MachineId {
        &self.machine_id
    }

    /// Draw the next reading without waiting for the cadence.
    pub fn generate(&mut self) -> Reading {
        let nominal = self.rng.gen_bool(SIMULATION_NOMINAL_PROBABILITY);
        match self.profile {
            SensorProfile::Analog => self.analog_reading(nominal),
            SensorProfile::Digital => self.digital_reading(nominal),
        }
    }

    fn analog_reading(&mut self, nominal: bool) -> Reading {
        let (temperature, vibration, co2) = if nominal {
            (
                self.rng.gen_range(65.0..80.0),
                self.rng.gen_range(0.5..1.5),
                self.rng.gen_range(15.0..25.0),
            )
        } else {
            (
                self.rng.gen_range(85.0..100.0),
                self.rng.gen_range(1.8..2.8),
                self.rng.gen_range(30.0..45.0),
            )
        };
        Reading {
            machine_id: self.machine_id.clone(),
            timestamp: Utc::now(),
            temperature,
            co2,
            vibration,
            energy: self.rng.gen_range(90.0..140.0),
            output: self.rng.gen_range(60.0..120.0),
        }
    }

    fn digital_reading(&mut self, nominal: bool) -> Reading {
        let (temp_mean, co2_mean, vibration) = if nominal {
            (65.0, 450.0, 0.0)
        } else {
            (88.0, 900.0, 1.0)
        };
        Reading {
            machine_id: self.machine_id.clone(),
            timestamp: Utc::now(),
            temperature: self.gaussian(temp_mean, 3.0),
            co2: self.gaussian(co2_mean, 80.0).max(0.0).round(),
            vibration,
            energy: 120.0,
            output: 100.0 - vibration * 10.0,
        }
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        mean + std_dev * z
    }
}

#[async_trait]
impl ReadingSource for SimulatedMachine {
    async fn next_reading(&mut self) -> Result<SourceEvent> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Ok(SourceEvent::Eof);
            }
            *remaining -= 1;
        }
        // No delay before the first reading
        if self.yielded_first && !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
        self.yielded_first = true;
        Ok(SourceEvent::Reading(self.generate()))
    }

    fn source_name(&self) -> &str {
        "simulated"
    }
}

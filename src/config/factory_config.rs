//! Factory Configuration - scoring coefficients and classification limits
//!
//! Every baseline, coefficient and limit used by the scorer and classifier is
//! a field here; the scoring functions contain no constants of their own.
//! The two sensor profiles provide the preset values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults::{
    CONFIG_ENV_VAR, DEFAULT_CHANNEL_CAPACITY, DEFAULT_CONFIG_FILE, DEFAULT_PLANT_NAME,
    DEFAULT_REPORT_INTERVAL_SECS,
};
use crate::types::VibrationMode;

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Sensor Profiles
// ============================================================================

/// Preset families of coefficients matching the two sensor installations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SensorProfile {
    /// Continuous vibration magnitude, CO2 as a low-range emissions index
    #[default]
    Analog,
    /// Binary vibration flag, CO2 in ppm from an NDIR sensor
    Digital,
}

impl SensorProfile {
    pub fn display_name(&self) -> &'static str {
        match self {
            SensorProfile::Analog => "Analog vibration / CO2 index",
            SensorProfile::Digital => "Digital vibration / CO2 ppm",
        }
    }
}

impl std::str::FromStr for SensorProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "analog" => Ok(SensorProfile::Analog),
            "digital" => Ok(SensorProfile::Digital),
            other => Err(format!("unknown sensor profile '{other}' (expected analog or digital)")),
        }
    }
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a plant deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FactoryConfig {
    #[serde(default)]
    pub plant: PlantInfo,

    /// Efficiency penalty model
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Health classification limits
    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub pipeline: PipelineSettings,
}

impl FactoryConfig {
    /// Preset configuration for a sensor profile.
    pub fn for_profile(profile: SensorProfile) -> Self {
        Self {
            plant: PlantInfo {
                profile,
                ..PlantInfo::default()
            },
            scoring: ScoringConfig::for_profile(profile),
            limits: LimitsConfig::for_profile(profile),
            pipeline: PipelineSettings::default(),
        }
    }

    /// Load configuration using the standard search order:
    /// 1. `$GREENFACTORY_CONFIG`
    /// 2. `./factory_config.toml`
    /// 3. Preset values for `fallback_profile`
    ///
    /// A file that exists but fails to parse or validate is an error; the
    /// pipeline must not start on a configuration that would misclassify.
    pub fn load(fallback_profile: SensorProfile) -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                let config = Self::load_from_file(&p)?;
                info!(path = %p.display(), plant = %config.plant.name, "Loaded factory config from {}", CONFIG_ENV_VAR);
                return Ok(config);
            }
            warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            let config = Self::load_from_file(&local)?;
            info!(plant = %config.plant.name, "Loaded factory config from ./{}", DEFAULT_CONFIG_FILE);
            return Ok(config);
        }

        info!(
            profile = fallback_profile.display_name(),
            "No {} found, using built-in profile defaults", DEFAULT_CONFIG_FILE
        );
        let config = Self::for_profile(fallback_profile);
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a specific TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse a TOML document, overlaying it on its profile's presets, then validate.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let user: toml::Value = contents.parse()?;
        let profile = match user.get("plant").and_then(|plant| plant.get("profile")) {
            Some(value) => value.clone().try_into::<SensorProfile>()?,
            None => SensorProfile::default(),
        };

        let base = toml::Value::try_from(Self::for_profile(profile))?;
        let config: Self = super::validation::overlay_toml(base, user).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate coefficients and limits for internal consistency.
    ///
    /// Rules:
    /// - Every baseline, coefficient and limit is finite
    /// - Penalty coefficients are >= 0 (negative values would reward heat, vibration or emissions)
    /// - `0 <= eff_critical < eff_warning <= 100`
    /// - Channel capacity and report interval are > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scoring;
        let l = &self.limits;
        let mut errors: Vec<String> = Vec::new();

        let values: [(&str, f64); 11] = [
            ("scoring.temp_baseline", s.temp_baseline),
            ("scoring.temp_coefficient", s.temp_coefficient),
            ("scoring.vib_baseline", s.vib_baseline),
            ("scoring.vib_coefficient_digital", s.vib_coefficient_digital),
            ("scoring.vib_coefficient_analog", s.vib_coefficient_analog),
            ("scoring.co2_coefficient", s.co2_coefficient),
            ("limits.temp_limit", l.temp_limit),
            ("limits.co2_limit", l.co2_limit),
            ("limits.vib_limit", l.vib_limit),
            ("limits.eff_warning", l.eff_warning),
            ("limits.eff_critical", l.eff_critical),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                errors.push(format!("{name} must be a finite number (got {value})"));
            }
        }

        let coefficients = [
            ("scoring.temp_coefficient", s.temp_coefficient),
            ("scoring.vib_coefficient_digital", s.vib_coefficient_digital),
            ("scoring.vib_coefficient_analog", s.vib_coefficient_analog),
            ("scoring.co2_coefficient", s.co2_coefficient),
        ];
        for (name, value) in coefficients {
            if value < 0.0 {
                errors.push(format!("{name} ({value}) must be >= 0"));
            }
        }

        if l.eff_critical < 0.0 {
            errors.push(format!("limits.eff_critical ({:.1}) must be >= 0", l.eff_critical));
        }
        if l.eff_critical >= l.eff_warning {
            errors.push(format!(
                "limits.eff_critical ({:.1}) must be less than eff_warning ({:.1})",
                l.eff_critical, l.eff_warning
            ));
        }
        if l.eff_warning > 100.0 {
            errors.push(format!("limits.eff_warning ({:.1}) must be <= 100", l.eff_warning));
        }

        if self.pipeline.channel_capacity == 0 {
            errors.push("pipeline.channel_capacity must be > 0".to_string());
        }
        if self.pipeline.report_interval_secs == 0 {
            errors.push("pipeline.report_interval_secs must be > 0".to_string());
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Plant Info
// ============================================================================

/// Identification metadata; appears in logs only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantInfo {
    pub name: String,

    /// Sensor profile whose presets fill unset keys
    pub profile: SensorProfile,
}

impl Default for PlantInfo {
    fn default() -> Self {
        Self {
            name: DEFAULT_PLANT_NAME.to_string(),
            profile: SensorProfile::default(),
        }
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// Penalty model parameters for the efficiency scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Interpretation of the vibration channel
    pub vibration_mode: VibrationMode,

    /// Temperature above which the heat penalty starts (degrees)
    pub temp_baseline: f64,

    /// Penalty points per degree above `temp_baseline`
    pub temp_coefficient: f64,

    /// Analog vibration magnitude above which the penalty starts
    pub vib_baseline: f64,

    /// Penalty points per unit of digital vibration flag
    pub vib_coefficient_digital: f64,

    /// Penalty points per unit of analog vibration above `vib_baseline`
    pub vib_coefficient_analog: f64,

    /// Penalty points per unit of CO2
    pub co2_coefficient: f64,
}

impl ScoringConfig {
    pub fn analog() -> Self {
        Self {
            vibration_mode: VibrationMode::Analog,
            temp_baseline: 75.0,
            temp_coefficient: 0.5,
            vib_baseline: 1.5,
            vib_coefficient_digital: 10.0,
            vib_coefficient_analog: 5.0,
            co2_coefficient: 0.3,
        }
    }

    pub fn digital() -> Self {
        Self {
            vibration_mode: VibrationMode::Digital,
            temp_baseline: 70.0,
            co2_coefficient: 0.02,
            ..Self::analog()
        }
    }

    pub fn for_profile(profile: SensorProfile) -> Self {
        match profile {
            SensorProfile::Analog => Self::analog(),
            SensorProfile::Digital => Self::digital(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::analog()
    }
}

// ============================================================================
// Classification Limits
// ============================================================================

/// Thresholds for the health classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Temperature above this is CRITICAL regardless of efficiency
    pub temp_limit: f64,

    /// CO2 above this is CRITICAL regardless of efficiency
    pub co2_limit: f64,

    /// Analog vibration above this is CRITICAL (ignored in digital mode)
    pub vib_limit: f64,

    /// Efficiency below this is at least WARNING
    pub eff_warning: f64,

    /// Efficiency below this is CRITICAL
    pub eff_critical: f64,
}

impl LimitsConfig {
    pub fn analog() -> Self {
        Self {
            temp_limit: 90.0,
            co2_limit: 35.0,
            vib_limit: 2.2,
            eff_warning: 75.0,
            eff_critical: 60.0,
        }
    }

    pub fn digital() -> Self {
        Self {
            temp_limit: 85.0,
            co2_limit: 800.0,
            ..Self::analog()
        }
    }

    pub fn for_profile(profile: SensorProfile) -> Self {
        match profile {
            SensorProfile::Analog => Self::analog(),
            SensorProfile::Digital => Self::digital(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self::analog()
    }
}

// ============================================================================
// Pipeline Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Per-machine ingestion queue depth
    pub channel_capacity: usize,

    /// Seconds between fleet summary log lines
    pub report_interval_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            report_interval_secs: DEFAULT_REPORT_INTERVAL_SECS,
        }
    }
}

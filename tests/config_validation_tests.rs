//! Config Validation Tests
//!
//! Exercises loading, profile overlay, typo detection and range validation of
//! `factory_config.toml` independently from the pipeline.

#![allow(clippy::unwrap_used)]

use std::io::Write;

use greenfactory::config::validation::{
    known_config_keys, suggest_correction, validate_physical_ranges, validate_unknown_keys,
};
use greenfactory::config::{ConfigError, FactoryConfig, SensorProfile};
use greenfactory::VibrationMode;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_limits_warns_with_suggestion() {
    let toml_str = r#"
[limits]
eff_warnign = 70.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("eff_warnign"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("limits.eff_warning"));
}

#[test]
fn unknown_section_warns_without_close_match() {
    let toml_str = r#"
[dashboard]
refresh_rate_hz = 2
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 2, "section and its key are both unknown");
    assert!(warnings.iter().all(|w| w.field.starts_with("dashboard")));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[plant]
name = "Line 3"
profile = "digital"

[scoring]
vibration_mode = "digital"
temp_baseline = 70.0
co2_coefficient = 0.02

[limits]
temp_limit = 85.0
co2_limit = 800.0
eff_warning = 75.0
eff_critical = 60.0

[pipeline]
channel_capacity = 32
report_interval_secs = 10
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
}

#[test]
fn suggestion_requires_small_edit_distance() {
    let known = known_config_keys();
    assert_eq!(
        suggest_correction("scoring.temp_coeficient", &known).as_deref(),
        Some("scoring.temp_coefficient")
    );
    assert_eq!(suggest_correction("completely.unrelated.key", &known), None);
}

// ============================================================================
// Loading & Profile Overlay
// ============================================================================

#[test]
fn empty_file_yields_analog_defaults() {
    let file = write_config("");
    let config = FactoryConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config, FactoryConfig::for_profile(SensorProfile::Analog));
}

#[test]
fn digital_profile_file_gets_digital_presets() {
    let file = write_config(
        r#"
[plant]
profile = "digital"
"#,
    );
    let config = FactoryConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.scoring.vibration_mode, VibrationMode::Digital);
    assert_eq!(config.scoring.temp_baseline, 70.0);
    assert_eq!(config.scoring.co2_coefficient, 0.02);
    assert_eq!(config.limits.temp_limit, 85.0);
    assert_eq!(config.limits.co2_limit, 800.0);
}

#[test]
fn explicit_keys_override_profile_presets() {
    let file = write_config(
        r#"
[plant]
profile = "digital"

[limits]
co2_limit = 1000.0
"#,
    );
    let config = FactoryConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.limits.co2_limit, 1000.0);
    // Untouched keys keep the digital preset
    assert_eq!(config.limits.temp_limit, 85.0);
    assert_eq!(config.scoring.vibration_mode, VibrationMode::Digital);
}

#[test]
fn saved_config_round_trips_through_file() {
    let mut original = FactoryConfig::for_profile(SensorProfile::Digital);
    original.plant.name = "Line 7".to_string();
    original.pipeline.channel_capacity = 16;

    let file = write_config(&original.to_toml().unwrap());
    let loaded = FactoryConfig::load_from_file(file.path()).unwrap();
    assert_eq!(loaded, original);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FactoryConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn malformed_toml_is_parse_error() {
    let file = write_config("[limits\ntemp_limit = ");
    let err = FactoryConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn unknown_profile_is_parse_error() {
    let file = write_config(
        r#"
[plant]
profile = "quantum"
"#,
    );
    let err = FactoryConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn inverted_efficiency_thresholds_fail_validation() {
    let file = write_config(
        r#"
[limits]
eff_warning = 50.0
eff_critical = 60.0
"#,
    );
    match FactoryConfig::load_from_file(file.path()).unwrap_err() {
        ConfigError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.contains("eff_critical")), "{errors:?}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn negative_coefficient_fails_validation() {
    let file = write_config(
        r#"
[scoring]
co2_coefficient = -0.3
"#,
    );
    let err = FactoryConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn zero_channel_capacity_fails_validation() {
    let file = write_config(
        r#"
[pipeline]
channel_capacity = 0
"#,
    );
    let err = FactoryConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn every_error_is_reported_at_once() {
    let mut config = FactoryConfig::default();
    config.scoring.temp_coefficient = -1.0;
    config.limits.eff_warning = 120.0;
    config.pipeline.report_interval_secs = 0;
    match config.validate().unwrap_err() {
        ConfigError::Validation(errors) => assert_eq!(errors.len(), 3, "{errors:?}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn suspicious_limits_only_warn() {
    let mut config = FactoryConfig::default();
    config.limits.temp_limit = config.scoring.temp_baseline - 5.0;
    config.limits.vib_limit = config.scoring.vib_baseline;

    let (errors, warnings) = validate_physical_ranges(&config);
    assert!(errors.is_empty());
    assert_eq!(warnings.len(), 2);
    assert!(config.validate().is_ok());
}

#[test]
fn negative_co2_limit_is_an_error() {
    let mut config = FactoryConfig::default();
    config.limits.co2_limit = -1.0;
    let (errors, _) = validate_physical_ranges(&config);
    assert_eq!(errors.len(), 1);
    assert!(config.validate().is_err());
}

#[test]
fn presets_are_valid() {
    for profile in [SensorProfile::Analog, SensorProfile::Digital] {
        let config = FactoryConfig::for_profile(profile);
        assert!(config.validate().is_ok(), "{profile:?} preset failed validation");
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty() && warnings.is_empty(), "{profile:?}: {warnings:?}");
    }
}

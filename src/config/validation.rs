//! Config validation: unknown-key detection with Levenshtein suggestions,
//! profile overlay and physical range checks.
//!
//! Two-pass parse approach: first read the raw TOML into `toml::Value`, walk
//! the key tree, compare against known field names and emit warnings with
//! "did you mean?" suggestions. Then overlay the document on its profile's
//! presets and deserialize. Typo warnings never break a config.

use std::collections::HashSet;

use crate::types::VibrationMode;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `FactoryConfig`.
///
/// Maintained by hand to match the struct hierarchy in factory_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [plant]
        "plant",
        "plant.name",
        "plant.profile",
        // [scoring]
        "scoring",
        "scoring.vibration_mode",
        "scoring.temp_baseline",
        "scoring.temp_coefficient",
        "scoring.vib_baseline",
        "scoring.vib_coefficient_digital",
        "scoring.vib_coefficient_analog",
        "scoring.co2_coefficient",
        // [limits]
        "limits",
        "limits.temp_limit",
        "limits.co2_limit",
        "limits.vib_limit",
        "limits.eff_warning",
        "limits.eff_critical",
        // [pipeline]
        "pipeline",
        "pipeline.channel_capacity",
        "pipeline.report_interval_secs",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

/// Overlay `overlay` on `base`: tables merge key by key, any other value in
/// `overlay` replaces the one in `base`.
pub fn overlay_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => overlay_toml(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            toml::Value::Table(base)
        }
        (_, overlay) => overlay,
    }
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the lexicographically smallest key so output is stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; parse errors are reported later by
/// the real deserialization pass.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed `FactoryConfig`.
///
/// Returns (errors, warnings). Errors are impossible values that must
/// prevent startup; warnings are suspicious but not fatal.
pub fn validate_physical_ranges(
    config: &super::FactoryConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let s = &config.scoring;
    let l = &config.limits;

    // Concentrations cannot be negative
    if l.co2_limit < 0.0 {
        errors.push(format!("limits.co2_limit = {:.1} cannot be negative", l.co2_limit));
    }

    // A limit at or below the penalty baseline means machines go CRITICAL
    // before the efficiency score ever reacts
    if l.temp_limit <= s.temp_baseline {
        warnings.push(ValidationWarning {
            field: "limits.temp_limit".to_string(),
            message: format!(
                "temp_limit = {:.1} is not above scoring.temp_baseline = {:.1}",
                l.temp_limit, s.temp_baseline
            ),
            suggestion: None,
        });
    }

    if s.vibration_mode == VibrationMode::Analog && l.vib_limit <= s.vib_baseline {
        warnings.push(ValidationWarning {
            field: "limits.vib_limit".to_string(),
            message: format!(
                "vib_limit = {:.2} is not above scoring.vib_baseline = {:.2}",
                l.vib_limit, s.vib_baseline
            ),
            suggestion: None,
        });
    }

    // Digital mode with a zero flag coefficient silently ignores vibration
    if s.vibration_mode == VibrationMode::Digital && s.vib_coefficient_digital == 0.0 {
        warnings.push(ValidationWarning {
            field: "scoring.vib_coefficient_digital".to_string(),
            message: "vib_coefficient_digital = 0 disables the vibration penalty in digital mode"
                .to_string(),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

//! Console startup settings.
//!
//! These only seed the operator's input fields and the simulator; nothing
//! is written back.

use serde::Serialize;
use speedcam_core::speed::severity::{DEFAULT_CRITICAL_MARGIN, DEFAULT_WARNING_MARGIN};
use speedcam_core::source::DEFAULT_SIMULATION_SPREAD;
use speedcam_core::{Configuration, SeverityBands};
use validator::Validate;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a finite number, got {value:?}")]
    Parse { var: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Console configuration loaded from environment variables.
///
/// All fields have defaults matching the original operator window.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ConsoleConfig {
    /// Initial speed limit field value (default: `30`).
    #[validate(range(exclusive_min = 0.0))]
    pub speed_limit_mph: f64,
    /// Initial alert threshold field value (default: `5`).
    #[validate(range(min = 0.0))]
    pub alert_threshold_mph: f64,
    /// Margin above the limit for warning-level alerts (default: `5`).
    #[validate(range(min = 0.0))]
    pub warning_margin_mph: f64,
    /// Margin above the limit for critical-level alerts (default: `10`).
    #[validate(range(min = 0.0))]
    pub critical_margin_mph: f64,
    /// Width of the simulated speed range above the limit (default: `20`).
    #[validate(range(exclusive_min = 0.0))]
    pub simulation_spread_mph: f64,
    /// Fixed RNG seed for reproducible simulations (default: unset).
    pub simulation_seed: Option<u64>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            speed_limit_mph: Configuration::DEFAULT.speed_limit,
            alert_threshold_mph: Configuration::DEFAULT.threshold,
            warning_margin_mph: DEFAULT_WARNING_MARGIN,
            critical_margin_mph: DEFAULT_CRITICAL_MARGIN,
            simulation_spread_mph: DEFAULT_SIMULATION_SPREAD,
            simulation_seed: None,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `SPEED_LIMIT_MPH`       | `30`    |
    /// | `ALERT_THRESHOLD_MPH`   | `5`     |
    /// | `WARNING_MARGIN_MPH`    | `5`     |
    /// | `CRITICAL_MARGIN_MPH`   | `10`    |
    /// | `SIMULATION_SPREAD_MPH` | `20`    |
    /// | `SIMULATION_SEED`       | unset   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            speed_limit_mph: number(&lookup, "SPEED_LIMIT_MPH", defaults.speed_limit_mph)?,
            alert_threshold_mph: number(
                &lookup,
                "ALERT_THRESHOLD_MPH",
                defaults.alert_threshold_mph,
            )?,
            warning_margin_mph: number(
                &lookup,
                "WARNING_MARGIN_MPH",
                defaults.warning_margin_mph,
            )?,
            critical_margin_mph: number(
                &lookup,
                "CRITICAL_MARGIN_MPH",
                defaults.critical_margin_mph,
            )?,
            simulation_spread_mph: number(
                &lookup,
                "SIMULATION_SPREAD_MPH",
                defaults.simulation_spread_mph,
            )?,
            simulation_seed: match lookup("SIMULATION_SEED") {
                Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| ConfigError::Parse {
                    var: "SIMULATION_SEED",
                    value: raw.clone(),
                })?),
                None => None,
            },
        };

        config
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.severity_bands()?;

        Ok(config)
    }

    /// Configuration the input fields start with.
    pub fn initial_configuration(&self) -> Configuration {
        Configuration {
            speed_limit: self.speed_limit_mph,
            threshold: self.alert_threshold_mph,
        }
    }

    pub fn severity_bands(&self) -> Result<SeverityBands, ConfigError> {
        SeverityBands::new(self.warning_margin_mph, self.critical_margin_mph)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Read a finite `f64`, falling back to `default` when unset.
fn number<F>(lookup: &F, var: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ConfigError::Parse { var, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ConsoleConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConsoleConfig::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = load(&[]).expect("defaults are valid");
        assert_eq!(config.initial_configuration(), Configuration::DEFAULT);
        assert_eq!(config.simulation_spread_mph, 20.0);
        assert!(config.simulation_seed.is_none());
        assert_eq!(
            config.severity_bands().expect("valid bands"),
            SeverityBands::default()
        );
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("SPEED_LIMIT_MPH", "45"),
            ("ALERT_THRESHOLD_MPH", " 2.5 "),
            ("SIMULATION_SEED", "99"),
        ])
        .expect("valid overrides");
        assert_eq!(config.speed_limit_mph, 45.0);
        assert_eq!(config.alert_threshold_mph, 2.5);
        assert_eq!(config.simulation_seed, Some(99));
    }

    #[test]
    fn non_numeric_value_is_a_parse_error() {
        let err = load(&[("SPEED_LIMIT_MPH", "fast")]).unwrap_err();
        assert_matches!(err, ConfigError::Parse { var: "SPEED_LIMIT_MPH", .. });
    }

    #[test]
    fn non_finite_value_is_a_parse_error() {
        let err = load(&[("ALERT_THRESHOLD_MPH", "inf")]).unwrap_err();
        assert_matches!(err, ConfigError::Parse { var: "ALERT_THRESHOLD_MPH", .. });
    }

    #[test]
    fn non_positive_speed_limit_is_invalid() {
        assert_matches!(
            load(&[("SPEED_LIMIT_MPH", "0")]),
            Err(ConfigError::Invalid(_))
        );
        assert_matches!(
            load(&[("ALERT_THRESHOLD_MPH", "-1")]),
            Err(ConfigError::Invalid(_))
        );
    }

    #[test]
    fn inverted_margins_are_invalid() {
        assert_matches!(
            load(&[("WARNING_MARGIN_MPH", "12"), ("CRITICAL_MARGIN_MPH", "8")]),
            Err(ConfigError::Invalid(_))
        );
    }

    #[test]
    fn bad_seed_is_a_parse_error() {
        assert_matches!(
            load(&[("SIMULATION_SEED", "-3")]),
            Err(ConfigError::Parse {
                var: "SIMULATION_SEED",
                ..
            })
        );
    }
}

//! Operator-supplied monitoring configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Mph;

/// Which input field a configuration value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigField {
    SpeedLimit,
    Threshold,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpeedLimit => f.write_str("speed limit"),
            Self::Threshold => f.write_str("threshold"),
        }
    }
}

/// Speed limit plus the additive margin above it before an alert fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub speed_limit: Mph,
    pub threshold: Mph,
}

impl Configuration {
    /// Values shown in the input fields before the operator edits them.
    pub const DEFAULT: Self = Self {
        speed_limit: 30.0,
        threshold: 5.0,
    };

    /// Parse both fields from operator text.
    ///
    /// The speed limit is checked first, so when both fields are bad the
    /// error names the speed limit.
    pub fn parse(speed_limit_text: &str, threshold_text: &str) -> Result<Self, CoreError> {
        let speed_limit = parse_field(ConfigField::SpeedLimit, speed_limit_text)?;
        let threshold = parse_field(ConfigField::Threshold, threshold_text)?;
        Ok(Self {
            speed_limit,
            threshold,
        })
    }

    /// Detected speeds strictly above this value raise an alert.
    pub fn alert_above(&self) -> Mph {
        self.speed_limit + self.threshold
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parse a single field, rejecting blanks, `NaN` and infinities.
fn parse_field(field: ConfigField, input: &str) -> Result<Mph, CoreError> {
    let parse_error = || CoreError::Parse {
        field,
        input: input.to_string(),
    };

    let value: f64 = input.trim().parse().map_err(|_| parse_error())?;
    if !value.is_finite() {
        return Err(parse_error());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_plain_numbers() {
        let cfg = Configuration::parse("30", "5").expect("valid input");
        assert_eq!(cfg.speed_limit, 30.0);
        assert_eq!(cfg.threshold, 5.0);
        assert_eq!(cfg.alert_above(), 35.0);
    }

    #[test]
    fn parses_decimals_and_surrounding_whitespace() {
        let cfg = Configuration::parse("  42.5 ", "\t2.25").expect("valid input");
        assert_eq!(cfg.speed_limit, 42.5);
        assert_eq!(cfg.threshold, 2.25);
    }

    #[test]
    fn rejects_non_numeric_speed_limit() {
        let err = Configuration::parse("fast", "5").unwrap_err();
        assert_matches!(
            err,
            CoreError::Parse { field: ConfigField::SpeedLimit, ref input } if input == "fast"
        );
    }

    #[test]
    fn rejects_empty_threshold() {
        let err = Configuration::parse("30", "").unwrap_err();
        assert_eq!(err.field(), Some(ConfigField::Threshold));
    }

    #[test]
    fn speed_limit_is_reported_first_when_both_fields_are_bad() {
        let err = Configuration::parse("x", "y").unwrap_err();
        assert_eq!(err.field(), Some(ConfigField::SpeedLimit));
    }

    #[test]
    fn rejects_nan_and_infinity() {
        assert!(Configuration::parse("NaN", "5").is_err());
        assert!(Configuration::parse("30", "inf").is_err());
        assert!(Configuration::parse("-infinity", "5").is_err());
    }

    #[test]
    fn default_matches_initial_fields() {
        assert_eq!(Configuration::default(), Configuration::DEFAULT);
        assert_eq!(Configuration::DEFAULT.alert_above(), 35.0);
    }

    #[test]
    fn error_message_names_the_field() {
        let err = Configuration::parse("30", "abc").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid threshold: \"abc\" is not a finite number"
        );
    }
}

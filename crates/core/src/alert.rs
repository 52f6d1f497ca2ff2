//! Alert records and the in-memory alert log.
//!
//! The log is append-only and lives for the process lifetime. Nothing is
//! ever removed or persisted; unbounded growth is accepted.

use chrono::Utc;
use serde::Serialize;

use crate::speed::config::Configuration;
use crate::speed::monitor::DetectionOutcome;
use crate::speed::severity::SeverityBands;
use crate::types::{Mph, Timestamp};

/// Severity of an alert log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// State changes and detections that did not exceed the threshold.
    Info,
    /// Speed exceeded the alert threshold.
    Warning,
    /// Speed exceeded the critical margin.
    Critical,
    /// Operator input was rejected.
    Error,
}

impl AlertLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Error => "error",
        }
    }
}

/// A single formatted line in the alert log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub level: AlertLevel,
    pub message: String,
    pub timestamp: Timestamp,
}

impl AlertRecord {
    pub fn new(level: AlertLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn activated(configuration: &Configuration) -> Self {
        Self::new(AlertLevel::Info, activation_message(configuration))
    }

    pub fn deactivated() -> Self {
        Self::new(AlertLevel::Info, DEACTIVATED_MESSAGE)
    }

    pub fn activation_rejected() -> Self {
        Self::new(AlertLevel::Error, ACTIVATION_REJECTED_MESSAGE)
    }

    /// Record for an evaluated detection, graded with `bands`.
    pub fn for_outcome(outcome: &DetectionOutcome, bands: &SeverityBands) -> Self {
        let level = bands.level_for(outcome).unwrap_or(AlertLevel::Info);
        Self::new(level, outcome_message(outcome))
    }
}

pub const DEACTIVATED_MESSAGE: &str = "System deactivated";
pub const ACTIVATION_REJECTED_MESSAGE: &str =
    "ERROR: Please enter valid numbers for speed limit and threshold";
pub const INACTIVE_MESSAGE: &str = "System is inactive - cannot detect vehicles";

pub fn activation_message(configuration: &Configuration) -> String {
    format!(
        "System activated. Monitoring for speeds > {:?} mph",
        configuration.alert_above()
    )
}

pub fn alert_message(detected_speed: Mph, speed_limit: Mph) -> String {
    format!("ALERT! Vehicle detected at {detected_speed:.1} mph (Limit: {speed_limit:.1} mph)")
}

pub fn normal_message(detected_speed: Mph) -> String {
    format!("Vehicle detected at {detected_speed:.1} mph - no alert")
}

pub fn outcome_message(outcome: &DetectionOutcome) -> String {
    match outcome {
        DetectionOutcome::Inactive => INACTIVE_MESSAGE.to_string(),
        DetectionOutcome::Alert {
            detected_speed,
            speed_limit,
        } => alert_message(*detected_speed, *speed_limit),
        DetectionOutcome::Normal { detected_speed } => normal_message(*detected_speed),
    }
}

/// Append-only list of alert records, oldest first.
#[derive(Debug, Default)]
pub struct AlertLog {
    records: Vec<AlertRecord>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: AlertRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[AlertRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlertRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&AlertRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records at `Warning` or `Critical` level.
    pub fn alert_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.level, AlertLevel::Warning | AlertLevel::Critical))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_text_uses_one_decimal() {
        assert_eq!(
            alert_message(36.0, 30.0),
            "ALERT! Vehicle detected at 36.0 mph (Limit: 30.0 mph)"
        );
        assert_eq!(
            normal_message(34.04),
            "Vehicle detected at 34.0 mph - no alert"
        );
    }

    #[test]
    fn activation_text_shows_alert_boundary() {
        let cfg = Configuration {
            speed_limit: 30.0,
            threshold: 5.5,
        };
        assert_eq!(
            activation_message(&cfg),
            "System activated. Monitoring for speeds > 35.5 mph"
        );
    }

    #[test]
    fn activation_text_keeps_decimal_on_whole_numbers() {
        assert_eq!(
            activation_message(&Configuration::DEFAULT),
            "System activated. Monitoring for speeds > 35.0 mph"
        );
    }

    #[test]
    fn outcome_records_are_graded() {
        let bands = SeverityBands::default();

        let critical = AlertRecord::for_outcome(
            &DetectionOutcome::Alert {
                detected_speed: 45.0,
                speed_limit: 30.0,
            },
            &bands,
        );
        assert_eq!(critical.level, AlertLevel::Critical);

        let normal = AlertRecord::for_outcome(
            &DetectionOutcome::Normal {
                detected_speed: 20.0,
            },
            &bands,
        );
        assert_eq!(normal.level, AlertLevel::Info);

        let inactive = AlertRecord::for_outcome(&DetectionOutcome::Inactive, &bands);
        assert_eq!(inactive.message, INACTIVE_MESSAGE);
    }

    #[test]
    fn log_is_append_only_and_ordered() {
        let mut log = AlertLog::new();
        assert!(log.is_empty());

        log.append(AlertRecord::activated(&Configuration::DEFAULT));
        log.append(AlertRecord::new(AlertLevel::Warning, alert_message(36.0, 30.0)));
        log.append(AlertRecord::deactivated());

        assert_eq!(log.len(), 3);
        assert_eq!(log.alert_count(), 1);
        assert_eq!(log.records()[0].level, AlertLevel::Info);
        assert_eq!(log.last().map(|r| r.message.as_str()), Some(DEACTIVATED_MESSAGE));
    }

    #[test]
    fn alert_level_serializes_lowercase() {
        let json = serde_json::to_string(&AlertLevel::Critical).expect("serializable");
        assert_eq!(json, "\"critical\"");
    }
}

//! Severity bands for rendering alerts.
//!
//! Bands only grade an alert that [`SpeedMonitor::evaluate`] already
//! raised; they never change the classification itself.
//!
//! [`SpeedMonitor::evaluate`]: crate::speed::monitor::SpeedMonitor::evaluate

use serde::{Deserialize, Serialize};

use crate::alert::AlertLevel;
use crate::error::CoreError;
use crate::speed::monitor::DetectionOutcome;
use crate::types::Mph;

/// Default margin above the limit for a warning-level alert.
pub const DEFAULT_WARNING_MARGIN: Mph = 5.0;

/// Default margin above the limit for a critical-level alert.
pub const DEFAULT_CRITICAL_MARGIN: Mph = 10.0;

/// Margins above the speed limit at which alerts escalate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityBands {
    pub warning_margin: Mph,
    pub critical_margin: Mph,
}

impl Default for SeverityBands {
    fn default() -> Self {
        Self {
            warning_margin: DEFAULT_WARNING_MARGIN,
            critical_margin: DEFAULT_CRITICAL_MARGIN,
        }
    }
}

impl SeverityBands {
    /// Build bands, requiring `0 <= warning_margin <= critical_margin`.
    pub fn new(warning_margin: Mph, critical_margin: Mph) -> Result<Self, CoreError> {
        if !warning_margin.is_finite() || !critical_margin.is_finite() {
            return Err(CoreError::Validation(
                "severity margins must be finite".to_string(),
            ));
        }
        if warning_margin < 0.0 {
            return Err(CoreError::Validation(format!(
                "warning margin must be non-negative, got {warning_margin}"
            )));
        }
        if critical_margin < warning_margin {
            return Err(CoreError::Validation(format!(
                "critical margin ({critical_margin}) must not be below warning margin ({warning_margin})"
            )));
        }
        Ok(Self {
            warning_margin,
            critical_margin,
        })
    }

    /// Grade a raw speed against the limit, or `None` below the warning band.
    pub fn classify(&self, detected_speed: Mph, speed_limit: Mph) -> Option<AlertLevel> {
        if detected_speed >= speed_limit + self.critical_margin {
            Some(AlertLevel::Critical)
        } else if detected_speed >= speed_limit + self.warning_margin {
            Some(AlertLevel::Warning)
        } else {
            None
        }
    }

    /// Level for an evaluated outcome. Only alerts are graded, and an alert
    /// that fired below the warning band still counts as a warning.
    pub fn level_for(&self, outcome: &DetectionOutcome) -> Option<AlertLevel> {
        match outcome {
            DetectionOutcome::Alert {
                detected_speed,
                speed_limit,
            } => Some(
                self.classify(*detected_speed, *speed_limit)
                    .unwrap_or(AlertLevel::Warning),
            ),
            DetectionOutcome::Normal { .. } | DetectionOutcome::Inactive => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_grades_by_margin() {
        let bands = SeverityBands::default();
        assert_eq!(bands.classify(34.9, 30.0), None);
        assert_eq!(bands.classify(35.0, 30.0), Some(AlertLevel::Warning));
        assert_eq!(bands.classify(39.9, 30.0), Some(AlertLevel::Warning));
        assert_eq!(bands.classify(40.0, 30.0), Some(AlertLevel::Critical));
    }

    #[test]
    fn alerts_below_warning_band_are_still_warnings() {
        let bands = SeverityBands::default();
        let outcome = DetectionOutcome::Alert {
            detected_speed: 31.0,
            speed_limit: 30.0,
        };
        assert_eq!(bands.level_for(&outcome), Some(AlertLevel::Warning));
    }

    #[test]
    fn non_alerts_have_no_level() {
        let bands = SeverityBands::default();
        assert_eq!(
            bands.level_for(&DetectionOutcome::Normal {
                detected_speed: 60.0
            }),
            None
        );
        assert_eq!(bands.level_for(&DetectionOutcome::Inactive), None);
    }

    #[test]
    fn new_rejects_inverted_or_negative_margins() {
        assert!(SeverityBands::new(5.0, 10.0).is_ok());
        assert!(SeverityBands::new(5.0, 5.0).is_ok());
        assert!(SeverityBands::new(10.0, 5.0).is_err());
        assert!(SeverityBands::new(-1.0, 5.0).is_err());
        assert!(SeverityBands::new(f64::NAN, 5.0).is_err());
    }
}

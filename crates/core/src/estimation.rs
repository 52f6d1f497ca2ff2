//! Road speed estimation from tracked pixel displacement.
//!
//! Given how far a tracked vehicle moved between two frames (in pixels) and
//! the frame interval, converts to miles per hour using a pixels-per-meter
//! calibration. Successive readings are exponentially smoothed.
//!
//! Frame capture and object tracking are outside this crate; callers feed
//! displacements in and get [`SpeedReading`]s out.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::Mph;

/// Meters per second to miles per hour.
pub const MPS_TO_MPH: f64 = 2.23694;

/// Miles per hour to kilometers per hour.
pub const MPH_TO_KMH: f64 = 1.60934;

/// Calibration and filtering parameters for [`MotionSpeedEstimator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct EstimatorSettings {
    /// Pixels per meter at the measured calibration distance.
    #[validate(range(exclusive_min = 0.0))]
    pub px_per_meter: f64,
    /// Weight given to the newest sample; the rest goes to the previous
    /// smoothed value. `1.0` disables smoothing.
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub smoothing: f64,
    /// Smoothed speeds at or below this are treated as noise.
    #[validate(range(min = 0.0))]
    pub min_speed_mph: Mph,
    /// Multiplier applied to reported speeds.
    #[validate(range(exclusive_min = 0.0))]
    pub calibration_factor: f64,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            px_per_meter: 2022.5,
            smoothing: 0.7,
            min_speed_mph: 10.0,
            calibration_factor: 1.0,
        }
    }
}

/// A single estimated speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedReading {
    pub mph: Mph,
    pub kmh: f64,
}

impl SpeedReading {
    fn from_mph(mph: Mph) -> Self {
        Self {
            mph,
            kmh: mph * MPH_TO_KMH,
        }
    }
}

/// Converts pixel displacements into smoothed road speeds.
#[derive(Debug, Clone)]
pub struct MotionSpeedEstimator {
    settings: EstimatorSettings,
    last_speed: Option<Mph>,
}

impl MotionSpeedEstimator {
    /// Validate `settings` and build an estimator with no history.
    pub fn new(settings: EstimatorSettings) -> Result<Self, CoreError> {
        let all_finite = [
            settings.px_per_meter,
            settings.smoothing,
            settings.min_speed_mph,
            settings.calibration_factor,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(CoreError::Validation(
                "estimator settings must be finite".to_string(),
            ));
        }
        settings
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        Ok(Self {
            settings,
            last_speed: None,
        })
    }

    /// Feed one displacement sample.
    ///
    /// The first sample after construction or [`reset`](Self::reset) is
    /// reported as measured. This differs from the camera pipeline this
    /// estimator is modelled on, which seeds its history with `0.0` and so
    /// reports `smoothing * raw` for the first vehicle.
    ///
    /// Returns `None` when `frame_secs` is not a positive finite interval,
    /// or when the smoothed speed does not exceed the noise floor. The
    /// smoothing history is updated even for sub-floor samples.
    pub fn observe(&mut self, pixel_displacement: f64, frame_secs: f64) -> Option<SpeedReading> {
        if !frame_secs.is_finite() || frame_secs <= 0.0 || !pixel_displacement.is_finite() {
            tracing::debug!(pixel_displacement, frame_secs, "Discarding unusable sample");
            return None;
        }

        let meters = pixel_displacement.abs() / self.settings.px_per_meter;
        let raw_mph = meters / frame_secs * MPS_TO_MPH;

        let smoothed = match self.last_speed {
            Some(last) => {
                self.settings.smoothing * raw_mph + (1.0 - self.settings.smoothing) * last
            }
            None => raw_mph,
        };
        self.last_speed = Some(smoothed);

        if smoothed <= self.settings.min_speed_mph {
            return None;
        }

        Some(SpeedReading::from_mph(
            smoothed * self.settings.calibration_factor,
        ))
    }

    /// Forget the smoothing history, e.g. when a new vehicle enters the zone.
    pub fn reset(&mut self) {
        self.last_speed = None;
    }
}

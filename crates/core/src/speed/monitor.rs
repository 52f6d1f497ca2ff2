//! Activation state machine and over-limit classification.
//!
//! The monitor has two states. `Inactive -> Active` is guarded by a
//! successful configuration parse; `Active -> Inactive` is unconditional.
//! A rejected activation always leaves the monitor `Inactive` and keeps the
//! last good configuration. The live configuration only changes while the
//! monitor is inactive.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::speed::config::Configuration;
use crate::types::Mph;

/// Whether detection events are currently being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationState {
    #[default]
    Inactive,
    Active,
}

impl ActivationState {
    /// Upper-case label shown in the status line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Inactive => "INACTIVE",
            Self::Active => "ACTIVE",
        }
    }
}

/// Classification of a single detected speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DetectionOutcome {
    /// The monitor was not active; the speed was ignored.
    Inactive,
    /// The speed exceeded `speed_limit + threshold`.
    Alert { detected_speed: Mph, speed_limit: Mph },
    /// The speed was at or below `speed_limit + threshold`.
    Normal { detected_speed: Mph },
}

impl DetectionOutcome {
    pub fn is_alert(&self) -> bool {
        matches!(self, Self::Alert { .. })
    }

    /// The evaluated speed, or `None` when the monitor ignored it.
    pub fn detected_speed(&self) -> Option<Mph> {
        match self {
            Self::Inactive => None,
            Self::Alert { detected_speed, .. } | Self::Normal { detected_speed } => {
                Some(*detected_speed)
            }
        }
    }
}

/// Holds the configuration and activation state, and classifies speeds.
///
/// Not internally synchronised. Share it across threads through a mutex so
/// configuration changes and evaluations never interleave (see
/// `speedcam_events::MonitorHub`).
#[derive(Debug, Clone, Default)]
pub struct SpeedMonitor {
    configuration: Configuration,
    /// Edit accepted while active; applied on the next deactivation.
    pending: Option<Configuration>,
    state: ActivationState,
}

impl SpeedMonitor {
    /// An inactive monitor with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// An inactive monitor seeded with `configuration`.
    pub fn with_configuration(configuration: Configuration) -> Self {
        Self {
            configuration,
            pending: None,
            state: ActivationState::Inactive,
        }
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ActivationState::Active
    }

    pub fn configuration(&self) -> Configuration {
        self.configuration
    }

    /// Parse and store a new configuration.
    ///
    /// On failure the stored configuration is left untouched. While the
    /// monitor is active the parsed value is held back: evaluation keeps
    /// using the live configuration until the monitor is deactivated, and
    /// a later `activate` replaces the held value outright.
    pub fn set_configuration(
        &mut self,
        speed_limit_text: &str,
        threshold_text: &str,
    ) -> Result<Configuration, CoreError> {
        let configuration = Configuration::parse(speed_limit_text, threshold_text)?;
        if self.is_active() {
            tracing::debug!(?configuration, "Configuration held until deactivation");
            self.pending = Some(configuration);
        } else {
            self.configuration = configuration;
            self.pending = None;
        }
        Ok(configuration)
    }

    /// Apply a configuration and start monitoring.
    ///
    /// The monitor is forced `Inactive` before the parse, so a failure can
    /// never leave it `Active` with a stale or partial configuration.
    pub fn activate(
        &mut self,
        speed_limit_text: &str,
        threshold_text: &str,
    ) -> Result<(), CoreError> {
        self.state = ActivationState::Inactive;
        self.pending = None;

        match self.set_configuration(speed_limit_text, threshold_text) {
            Ok(configuration) => {
                self.state = ActivationState::Active;
                tracing::info!(
                    speed_limit = configuration.speed_limit,
                    threshold = configuration.threshold,
                    alert_above = configuration.alert_above(),
                    "Speed monitor activated",
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Speed monitor activation rejected");
                Err(e)
            }
        }
    }

    /// Stop monitoring. Always succeeds; repeated calls are no-ops.
    ///
    /// A configuration set while active takes effect here.
    pub fn deactivate(&mut self) {
        if self.state == ActivationState::Active {
            tracing::info!("Speed monitor deactivated");
        }
        self.state = ActivationState::Inactive;
        if let Some(configuration) = self.pending.take() {
            self.configuration = configuration;
        }
    }

    /// Classify a detected speed against `speed_limit + threshold`.
    ///
    /// The comparison is strict: a speed exactly on the boundary is `Normal`.
    /// A `NaN` speed is a caller contract violation; it never compares
    /// greater, so an active monitor reports it as `Normal`.
    pub fn evaluate(&self, detected_speed: Mph) -> DetectionOutcome {
        if self.state == ActivationState::Inactive {
            return DetectionOutcome::Inactive;
        }

        let Configuration {
            speed_limit,
            threshold,
        } = self.configuration;

        let outcome = if detected_speed > speed_limit + threshold {
            DetectionOutcome::Alert {
                detected_speed,
                speed_limit,
            }
        } else {
            DetectionOutcome::Normal { detected_speed }
        };

        tracing::debug!(detected_speed, speed_limit, threshold, ?outcome, "Evaluated detection");
        outcome
    }
}

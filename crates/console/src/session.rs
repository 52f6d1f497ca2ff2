//! Operator session: input fields, toggle and detection triggers.
//!
//! A [`Session`] plays the part of the original control window. It owns the
//! speed limit and threshold field text, which only reaches the monitor on
//! activation, and drives the shared [`MonitorHub`]. Alert lines are not
//! returned from here; they arrive through the event bus.

use std::sync::Arc;

use speedcam_core::estimation::MotionSpeedEstimator;
use speedcam_core::source::SpeedSource;
use speedcam_core::{ActivationState, AlertRecord, Configuration};
use speedcam_events::{MonitorHub, SharedAlertLog};

use crate::command::{Command, HELP};

/// What the console should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Print these lines (possibly none) and keep reading.
    Lines(Vec<String>),
    /// Leave the console.
    Quit,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Self::Lines(vec![text.into()])
    }

    fn none() -> Self {
        Self::Lines(Vec::new())
    }
}

pub struct Session {
    hub: Arc<MonitorHub>,
    log: SharedAlertLog,
    source: Box<dyn SpeedSource>,
    estimator: MotionSpeedEstimator,
    speed_limit_text: String,
    threshold_text: String,
}

impl Session {
    /// Start a session with the input fields showing `initial`.
    pub fn new(
        hub: Arc<MonitorHub>,
        log: SharedAlertLog,
        source: Box<dyn SpeedSource>,
        estimator: MotionSpeedEstimator,
        initial: Configuration,
    ) -> Self {
        Self {
            hub,
            log,
            source,
            estimator,
            speed_limit_text: format!("{:?}", initial.speed_limit),
            threshold_text: format!("{:?}", initial.threshold),
        }
    }

    /// Run a single operator command.
    pub async fn execute(&mut self, command: Command) -> Reply {
        tracing::debug!(?command, "Executing operator command");

        match command {
            Command::SetSpeedLimit(text) => {
                self.speed_limit_text = text;
                self.field_changed("Speed limit", &self.speed_limit_text)
                    .await
            }
            Command::SetThreshold(text) => {
                self.threshold_text = text;
                self.field_changed("Alert threshold", &self.threshold_text)
                    .await
            }
            Command::Activate => {
                self.activate().await;
                Reply::none()
            }
            Command::Deactivate => {
                self.hub.deactivate().await;
                Reply::none()
            }
            Command::Toggle => {
                if self.hub.snapshot().await.state == ActivationState::Active {
                    self.hub.deactivate().await;
                } else {
                    self.activate().await;
                }
                Reply::none()
            }
            Command::Simulate(count) => self.simulate(count).await,
            Command::Detect(speed) => {
                self.hub.evaluate(speed).await;
                Reply::none()
            }
            Command::Track { pixels, frame_secs } => self.track(pixels, frame_secs).await,
            Command::Status => Reply::Lines(self.status_lines().await),
            Command::Log => Reply::Lines(self.log_lines().await),
            Command::Help => Reply::Lines(HELP.iter().map(|l| l.to_string()).collect()),
            Command::Quit => Reply::Quit,
        }
    }

    async fn activate(&self) {
        // The rejection is published on the bus; nothing else to report.
        if let Err(e) = self
            .hub
            .activate(&self.speed_limit_text, &self.threshold_text)
            .await
        {
            tracing::debug!(error = %e, "Activation rejected");
        }
    }

    async fn field_changed(&self, field: &str, text: &str) -> Reply {
        let mut line = format!("{field} field set to {text:?}");
        if self.hub.snapshot().await.state == ActivationState::Active {
            line.push_str(" (applies on next activation)");
        }
        Reply::line(line)
    }

    async fn simulate(&mut self, count: u32) -> Reply {
        for _ in 0..count {
            if self.hub.evaluate_from(self.source.as_mut()).await.is_none() {
                return Reply::line("Speed source exhausted");
            }
        }
        Reply::none()
    }

    async fn track(&mut self, pixels: f64, frame_secs: f64) -> Reply {
        match self.estimator.observe(pixels, frame_secs) {
            Some(reading) => {
                self.hub.evaluate(reading.mph).await;
                Reply::line(format!(
                    "Estimated {:.1} mph ({:.1} km/h)",
                    reading.mph, reading.kmh
                ))
            }
            None => Reply::line("No vehicle speed above the noise floor"),
        }
    }

    async fn status_lines(&self) -> Vec<String> {
        let snapshot = self.hub.snapshot().await;
        let mut lines = vec![
            format!("System Status: {}", snapshot.state.label()),
            format!("Speed Limit (mph): {}", self.speed_limit_text),
            format!("Alert Threshold (mph): {}", self.threshold_text),
        ];
        if snapshot.state == ActivationState::Active {
            lines.push(format!(
                "Monitoring for speeds > {:?} mph",
                snapshot.alert_above()
            ));
        }
        lines.push(format!(
            "Alerts recorded: {}",
            self.log.lock().await.alert_count()
        ));
        lines
    }

    async fn log_lines(&self) -> Vec<String> {
        let log = self.log.lock().await;
        if log.is_empty() {
            return vec!["No alerts recorded".to_string()];
        }
        log.iter().map(format_record).collect()
    }
}

/// One alert-area line: UTC time of day, then the message.
pub fn format_record(record: &AlertRecord) -> String {
    format!(
        "[{}] {}",
        record.timestamp.format("%H:%M:%S"),
        record.message
    )
}

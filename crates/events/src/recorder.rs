//! Alert log recorder.
//!
//! [`AlertRecorder`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and appends one [`AlertRecord`] per event to the shared [`AlertLog`].
//! It is the single writer of the log, so records land in the same order
//! the hub published them. It runs as a long-lived background task and
//! shuts down when the bus sender is dropped.

use std::sync::Arc;

use speedcam_core::{AlertLog, AlertRecord, SeverityBands};
use tokio::sync::{broadcast, Mutex};

use crate::bus::{MonitorEvent, MonitorEventKind};

/// The alert log as shared between the recorder and the presentation layer.
pub type SharedAlertLog = Arc<Mutex<AlertLog>>;

/// Background service that renders monitor events into the alert log.
pub struct AlertRecorder;

impl AlertRecorder {
    /// Run the recording loop.
    ///
    /// Exits when the channel is closed (i.e. every [`EventBus`] handle has
    /// been dropped).
    ///
    /// [`EventBus`]: crate::bus::EventBus
    pub async fn run(
        mut receiver: broadcast::Receiver<MonitorEvent>,
        log: SharedAlertLog,
        bands: SeverityBands,
    ) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let record = Self::render(&event, &bands);
                    tracing::debug!(
                        event = event.name(),
                        level = record.level.as_str(),
                        message = %record.message,
                        "Recording alert log entry"
                    );
                    log.lock().await.append(record);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Alert recorder lagged, some events were not recorded"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, alert recorder shutting down");
                    break;
                }
            }
        }
    }

    /// Turn a single event into its alert log line.
    pub fn render(event: &MonitorEvent, bands: &SeverityBands) -> AlertRecord {
        let mut record = match &event.kind {
            MonitorEventKind::Activated { configuration } => AlertRecord::activated(configuration),
            MonitorEventKind::ActivationRejected { .. } => AlertRecord::activation_rejected(),
            MonitorEventKind::Deactivated => AlertRecord::deactivated(),
            MonitorEventKind::Detection { outcome } => AlertRecord::for_outcome(outcome, bands),
        };
        record.timestamp = event.timestamp;
        record
    }
}

#[cfg(test)]
mod tests {
    use speedcam_core::alert::{DEACTIVATED_MESSAGE, INACTIVE_MESSAGE};
    use speedcam_core::{AlertLevel, Configuration, DetectionOutcome};

    use super::*;

    #[test]
    fn render_keeps_event_timestamp() {
        let event = MonitorEvent::deactivated();
        let record = AlertRecorder::render(&event, &SeverityBands::default());
        assert_eq!(record.timestamp, event.timestamp);
        assert_eq!(record.message, DEACTIVATED_MESSAGE);
    }

    #[test]
    fn render_covers_every_event_kind() {
        let bands = SeverityBands::default();

        let activated =
            AlertRecorder::render(&MonitorEvent::activated(Configuration::DEFAULT), &bands);
        assert!(activated.message.starts_with("System activated."));

        let rejected = AlertRecorder::render(&MonitorEvent::activation_rejected("bad"), &bands);
        assert_eq!(rejected.level, AlertLevel::Error);

        let inactive =
            AlertRecorder::render(&MonitorEvent::detection(DetectionOutcome::Inactive), &bands);
        assert_eq!(inactive.message, INACTIVE_MESSAGE);
    }
}

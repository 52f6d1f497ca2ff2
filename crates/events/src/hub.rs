//! Shared access to a [`SpeedMonitor`].
//!
//! [`MonitorHub`] serialises every configuration change and evaluation
//! through a single `tokio::sync::Mutex`, and publishes the resulting
//! [`MonitorEvent`] while the lock is still held. Subscribers therefore see
//! events in exactly the order the monitor produced them, whichever task
//! called in.

use std::sync::Arc;

use serde::Serialize;
use speedcam_core::source::SpeedSource;
use speedcam_core::{ActivationState, Configuration, CoreError, DetectionOutcome, SpeedMonitor};
use tokio::sync::{broadcast, Mutex};

use crate::bus::{EventBus, MonitorEvent};

/// Point-in-time copy of the monitor state, for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonitorSnapshot {
    pub state: ActivationState,
    pub configuration: Configuration,
}

impl MonitorSnapshot {
    pub fn alert_above(&self) -> f64 {
        self.configuration.alert_above()
    }
}

/// Thread-safe monitor handle that publishes to an [`EventBus`].
///
/// Cheap to share via `Arc<MonitorHub>` between the sensor side and the
/// presentation side.
pub struct MonitorHub {
    monitor: Mutex<SpeedMonitor>,
    bus: Arc<EventBus>,
}

impl MonitorHub {
    pub fn new(monitor: SpeedMonitor, bus: Arc<EventBus>) -> Self {
        Self {
            monitor: Mutex::new(monitor),
            bus,
        }
    }

    /// Subscribe to the events this hub publishes.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.bus.subscribe()
    }

    pub async fn snapshot(&self) -> MonitorSnapshot {
        let monitor = self.monitor.lock().await;
        MonitorSnapshot {
            state: monitor.state(),
            configuration: monitor.configuration(),
        }
    }

    /// Activate with operator text; publishes `Activated` or
    /// `ActivationRejected`.
    pub async fn activate(
        &self,
        speed_limit_text: &str,
        threshold_text: &str,
    ) -> Result<Configuration, CoreError> {
        let mut monitor = self.monitor.lock().await;
        match monitor.activate(speed_limit_text, threshold_text) {
            Ok(()) => {
                let configuration = monitor.configuration();
                self.bus.publish(MonitorEvent::activated(configuration));
                Ok(configuration)
            }
            Err(e) => {
                self.bus
                    .publish(MonitorEvent::activation_rejected(e.to_string()));
                Err(e)
            }
        }
    }

    /// Deactivate. Publishes `Deactivated` only on an actual transition,
    /// so repeated calls are silent.
    pub async fn deactivate(&self) {
        let mut monitor = self.monitor.lock().await;
        let was_active = monitor.is_active();
        monitor.deactivate();
        if was_active {
            self.bus.publish(MonitorEvent::deactivated());
        }
    }

    /// Evaluate one detected speed and publish the outcome.
    ///
    /// An external detection while inactive is dropped: `Inactive` is
    /// returned and nothing reaches the bus.
    pub async fn evaluate(&self, detected_speed: f64) -> DetectionOutcome {
        let monitor = self.monitor.lock().await;
        let outcome = monitor.evaluate(detected_speed);
        if outcome == DetectionOutcome::Inactive {
            tracing::debug!(detected_speed, "Ignoring detection while inactive");
        } else {
            self.bus.publish(MonitorEvent::detection(outcome));
        }
        outcome
    }

    /// Pull the next speed from `source` and evaluate it.
    ///
    /// While inactive no speed is drawn and `Inactive` is published. Returns
    /// `None` once the source is exhausted.
    pub async fn evaluate_from<S>(&self, source: &mut S) -> Option<DetectionOutcome>
    where
        S: SpeedSource + ?Sized,
    {
        let monitor = self.monitor.lock().await;
        if !monitor.is_active() {
            let outcome = DetectionOutcome::Inactive;
            self.bus.publish(MonitorEvent::detection(outcome));
            return Some(outcome);
        }

        let speed = source.next_speed(&monitor.configuration())?;
        let outcome = monitor.evaluate(speed);
        self.bus.publish(MonitorEvent::detection(outcome));
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use speedcam_core::source::ScriptedSpeedSource;

    use super::*;
    use crate::bus::MonitorEventKind;

    fn hub() -> (MonitorHub, broadcast::Receiver<MonitorEvent>) {
        let bus = Arc::new(EventBus::default());
        let rx = bus.subscribe();
        (MonitorHub::new(SpeedMonitor::new(), bus), rx)
    }

    #[tokio::test]
    async fn activation_publishes_configuration() {
        let (hub, mut rx) = hub();
        let cfg = hub.activate("40", "2").await.expect("valid configuration");
        assert_eq!(cfg.alert_above(), 42.0);

        let event = rx.recv().await.expect("event published");
        assert_matches!(
            event.kind,
            MonitorEventKind::Activated { configuration } if configuration == cfg
        );
        assert_eq!(hub.snapshot().await.state, ActivationState::Active);
    }

    #[tokio::test]
    async fn rejected_activation_publishes_reason_and_stays_inactive() {
        let (hub, mut rx) = hub();
        assert!(hub.activate("forty", "2").await.is_err());

        let event = rx.recv().await.expect("event published");
        assert_matches!(
            event.kind,
            MonitorEventKind::ActivationRejected { ref reason } if reason.contains("speed limit")
        );
        assert_eq!(hub.snapshot().await.state, ActivationState::Inactive);
    }

    #[tokio::test]
    async fn repeated_deactivate_publishes_once() {
        let (hub, mut rx) = hub();
        hub.activate("30", "5").await.expect("valid configuration");
        hub.deactivate().await;
        hub.deactivate().await;
        hub.deactivate().await;

        assert_matches!(
            rx.recv().await.expect("activated").kind,
            MonitorEventKind::Activated { .. }
        );
        assert_eq!(rx.recv().await.expect("deactivated").kind, MonitorEventKind::Deactivated);
        assert_matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty));
    }

    #[tokio::test]
    async fn evaluate_while_inactive_publishes_nothing() {
        let (hub, mut rx) = hub();
        for speed in [40.0, 50.0, 60.0] {
            assert_eq!(hub.evaluate(speed).await, DetectionOutcome::Inactive);
        }
        assert_matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty));
    }

    #[tokio::test]
    async fn evaluate_from_skips_source_while_inactive() {
        let (hub, mut rx) = hub();
        let mut source = ScriptedSpeedSource::new([50.0]);
        assert_eq!(hub.evaluate_from(&mut source).await, Some(DetectionOutcome::Inactive));
        assert_eq!(source.remaining(), 1);
        assert_matches!(
            rx.recv().await.expect("inactive detection").kind,
            MonitorEventKind::Detection { outcome: DetectionOutcome::Inactive }
        );
    }

    #[tokio::test]
    async fn evaluate_from_reports_exhaustion() {
        let (hub, _rx) = hub();
        hub.activate("30", "5").await.expect("valid configuration");
        let mut source = ScriptedSpeedSource::new([36.0]);
        assert_matches!(hub.evaluate_from(&mut source).await, Some(DetectionOutcome::Alert { .. }));
        assert_eq!(hub.evaluate_from(&mut source).await, None);
    }
}

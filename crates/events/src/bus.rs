//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`MonitorEvent`]s.
//! It is designed to be shared via `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use speedcam_core::{Configuration, DetectionOutcome};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// MonitorEvent
// ---------------------------------------------------------------------------

/// What happened to the monitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEventKind {
    /// The monitor became active with this configuration.
    Activated { configuration: Configuration },
    /// An activation attempt failed to parse; the monitor is inactive.
    ActivationRejected { reason: String },
    /// The monitor went from active to inactive.
    Deactivated,
    /// A detected speed was evaluated.
    Detection { outcome: DetectionOutcome },
}

/// A timestamped monitor event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorEvent {
    #[serde(flatten)]
    pub kind: MonitorEventKind,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl MonitorEvent {
    pub fn new(kind: MonitorEventKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn activated(configuration: Configuration) -> Self {
        Self::new(MonitorEventKind::Activated { configuration })
    }

    pub fn activation_rejected(reason: impl Into<String>) -> Self {
        Self::new(MonitorEventKind::ActivationRejected {
            reason: reason.into(),
        })
    }

    pub fn deactivated() -> Self {
        Self::new(MonitorEventKind::Deactivated)
    }

    pub fn detection(outcome: DetectionOutcome) -> Self {
        Self::new(MonitorEventKind::Detection { outcome })
    }

    /// Short dotted name for log fields, e.g. `"monitor.detection"`.
    pub fn name(&self) -> &'static str {
        match self.kind {
            MonitorEventKind::Activated { .. } => "monitor.activated",
            MonitorEventKind::ActivationRejected { .. } => "monitor.activation_rejected",
            MonitorEventKind::Deactivated => "monitor.deactivated",
            MonitorEventKind::Detection { .. } => "monitor.detection",
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`MonitorEvent`].
///
/// # Usage
///
/// ```rust
/// use speedcam_events::bus::{EventBus, MonitorEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(MonitorEvent::deactivated());
/// ```
pub struct EventBus {
    sender: broadcast::Sender<MonitorEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: MonitorEvent) {
        tracing::trace!(event = event.name(), "Publishing monitor event");
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

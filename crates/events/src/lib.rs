//! Speed camera event plumbing.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`MonitorEvent`] -- the event envelope for activation changes and
//!   detection outcomes.
//! - [`MonitorHub`] -- shared, mutex-guarded access to a `SpeedMonitor`
//!   that publishes every state change and outcome in evaluation order.
//! - [`AlertRecorder`] -- background task that turns events into alert
//!   log lines on the presentation side.

pub mod bus;
pub mod hub;
pub mod recorder;

pub use bus::{EventBus, MonitorEvent, MonitorEventKind};
pub use hub::{MonitorHub, MonitorSnapshot};
pub use recorder::{AlertRecorder, SharedAlertLog};

//! Speed camera domain logic.
//!
//! Everything in this crate is pure: no I/O, no threads, no clocks beyond
//! stamping alert records. The presentation layer and the event plumbing
//! live in `speedcam-console` and `speedcam-events`.
//!
//! - [`speed`] -- configuration parsing, the [`SpeedMonitor`] and severity bands.
//! - [`alert`] -- alert records and the append-only alert log.
//! - [`source`] -- pluggable producers of detected speeds.
//! - [`estimation`] -- pixel displacement to road speed conversion.

pub mod alert;
pub mod error;
pub mod estimation;
pub mod source;
pub mod speed;
pub mod types;

pub use alert::{AlertLevel, AlertLog, AlertRecord};
pub use error::CoreError;
pub use speed::config::{ConfigField, Configuration};
pub use speed::monitor::{ActivationState, DetectionOutcome, SpeedMonitor};
pub use speed::severity::SeverityBands;

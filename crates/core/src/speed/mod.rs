//! Speed limit monitoring.
//!
//! Contains the operator configuration, the activation state machine and the
//! over-limit classification. All logic in this module is pure -- the caller
//! decides how outcomes are rendered, logged or published.

pub mod config;
pub mod monitor;
pub mod severity;

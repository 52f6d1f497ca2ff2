//! `speedcam-console` library crate.
//!
//! The operator-facing presentation layer. Re-exports internal modules for
//! integration testing; the binary entrypoint lives in `main.rs`.

pub mod command;
pub mod config;
pub mod session;

//! # potato-observability
//!
//! `tracing` subscriber setup with `EnvFilter`, plus one function per
//! workflow event so every call site logs the same fields.

pub mod events;
pub mod setup;

pub use setup::{init_tracing, LOG_ENV_VAR};

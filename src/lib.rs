#![deny(unused)]
//! Support Router - routes support questions to domain agents.
//!
//! The binary wires configuration, tracing, the model gateway, the four
//! domain agents and the orchestrator together.

pub mod telemetry;
pub mod wiring;

pub use telemetry::configure_tracing;
pub use wiring::{build_orchestrator, load_knowledge};

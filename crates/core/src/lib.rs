#![deny(unused)]
//! Core types, traits, and error definitions for the support router.
//!
//! This crate provides the building blocks shared by the agents, the model
//! gateway and the orchestration controller.

pub mod config;
pub mod error;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, Result};

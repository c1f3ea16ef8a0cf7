//! Core type definitions for the support router.
//!
//! Every record here is built fresh per request and never mutated after
//! it is handed on.

pub mod agent;
pub mod handoff;
pub mod intent;
pub mod memory;
pub mod merge;
pub mod response;

pub use agent::*;
pub use handoff::*;
pub use intent::*;
pub use memory::*;
pub use merge::*;
pub use response::*;

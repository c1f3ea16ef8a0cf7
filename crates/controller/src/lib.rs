#![deny(unused)]
//! Orchestration controller for the support router.
//!
//! This crate classifies questions, routes them to domain agents, runs
//! multi-topic fan-outs, merges their answers and follows agent handoffs.

pub mod builder;
pub mod classifier;
pub mod handoff;
pub mod history;
pub mod merger;
pub mod orchestrator;
pub mod prompts;
pub mod registry;
pub mod structured;

pub use builder::OrchestratorBuilder;
pub use classifier::{Classifier, MultiIntentOutcome};
pub use handoff::{HandoffChain, HandoffContext, DEFAULT_MAX_HANDOFF_DEPTH};
pub use history::{extract_history, ConversationBuffer, DEFAULT_HISTORY_LIMIT};
pub use merger::ResultMerger;
pub use orchestrator::{AgentSource, Orchestrator, FALLBACK_INTENT};
pub use registry::{AgentFactory, AgentRegistry};
pub use structured::generate_structured;

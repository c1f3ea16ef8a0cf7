//! Core traits for the support router.
//!
//! Traits sit at the seams to external collaborators:
//! - `llm`: generation capability (LlmClient)
//! - `agent`: domain answering pipelines (Agent)
//! - `memory`: conversation memory providers (ConversationMemory)
//! - `knowledge`: per-domain document retrieval (KnowledgeBase)

pub mod agent;
pub mod knowledge;
pub mod llm;
pub mod memory;

pub use agent::*;
pub use knowledge::*;
pub use llm::*;
pub use memory::*;

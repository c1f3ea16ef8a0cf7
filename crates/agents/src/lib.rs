#![deny(unused)]
//! Domain agents for the support router.
//!
//! Every agent is the same retrieval-and-generation pipeline
//! ([`DomainAgent`]) configured with a [`DomainProfile`] and bound to its
//! own [`KnowledgeBase`](support_router_core::traits::KnowledgeBase).

pub mod agent;
pub mod knowledge;
pub mod parser;
pub mod profile;

pub use agent::DomainAgent;
pub use knowledge::{Document, StaticKnowledgeBase};
pub use parser::{parse_reply, ParsedReply};
pub use profile::DomainProfile;

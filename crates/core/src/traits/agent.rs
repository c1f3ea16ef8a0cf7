//! Agent capability trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::ConversationMemory;
use crate::types::AgentResponse;

/// A domain-bound answering pipeline.
///
/// The orchestrator treats agents as opaque: it only needs a stable name
/// and `invoke`. Failures must be returned, never swallowed.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable routing identifier (`hr`, `it`, `finance`, `legal`).
    fn name(&self) -> &str;

    /// Human-readable description of the agent's domain.
    fn description(&self) -> &str {
        ""
    }

    /// Answer a query, optionally using conversation memory.
    async fn invoke(
        &self,
        query: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> Result<AgentResponse>;
}

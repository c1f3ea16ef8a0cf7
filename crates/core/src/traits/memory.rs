//! Conversation memory provider trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::MemoryTurn;

/// Source of prior conversation turns.
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    /// Stored turns, oldest first.
    async fn turns(&self) -> Result<Vec<MemoryTurn>>;
}

//! Conversation history extraction and an in-process memory buffer.

use async_trait::async_trait;
use tokio::sync::RwLock;

use support_router_core::{
    traits::ConversationMemory,
    types::{ChatTurn, MemoryTurn},
    Result,
};

/// Default number of turns given to the classifier.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Pull the most recent `limit` normalized turns from memory.
///
/// Read failures are logged and yield an empty history; classification
/// then proceeds without context.
pub async fn extract_history(memory: Option<&dyn ConversationMemory>, limit: usize) -> Vec<ChatTurn> {
    let Some(memory) = memory else {
        return Vec::new();
    };

    match memory.turns().await {
        Ok(turns) => {
            let stored = turns.len();
            let history = ChatTurn::normalize(turns, limit);
            tracing::debug!(stored, kept = history.len(), "Extracted conversation history");
            history
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to extract conversation history, continuing without it");
            Vec::new()
        }
    }
}

/// Render turns as a `role: content` transcript.
pub fn format_transcript(history: &[ChatTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append-only conversation memory held in process.
#[derive(Default)]
pub struct ConversationBuffer {
    turns: RwLock<Vec<MemoryTurn>>,
}

impl ConversationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn.
    pub async fn push(&self, turn: MemoryTurn) {
        self.turns.write().await.push(turn);
    }

    /// Append a question and its answer.
    pub async fn record_exchange(&self, question: &str, answer: &str) {
        let mut turns = self.turns.write().await;
        turns.push(MemoryTurn::user(question));
        turns.push(MemoryTurn::assistant(answer));
    }

    pub async fn len(&self) -> usize {
        self.turns.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.turns.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationMemory for ConversationBuffer {
    async fn turns(&self) -> Result<Vec<MemoryTurn>> {
        Ok(self.turns.read().await.clone())
    }
}

//! Knowledge base retrieval trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Source;

/// Document retrieval for a single domain.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Name of the collection this knowledge base serves.
    fn name(&self) -> &str;

    /// Return up to `limit` sources relevant to `query`, best first.
    async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<Source>>;
}

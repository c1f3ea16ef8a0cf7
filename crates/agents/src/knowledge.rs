//! In-memory knowledge base.
//!
//! Ranks documents by how many query terms they contain. It lets the
//! router run offline and in tests; production deployments plug a vector
//! store in behind the same `KnowledgeBase` trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use support_router_core::{traits::KnowledgeBase, types::Source, Error, Result};

/// Longest excerpt returned per source, in characters.
const MAX_EXCERPT_CHARS: usize = 600;

/// Query terms shorter than this are ignored.
const MIN_TERM_LEN: usize = 3;

/// A document in a static knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl Document {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            url: None,
        }
    }
}

/// Knowledge base backed by an in-memory document list.
#[derive(Debug, Clone)]
pub struct StaticKnowledgeBase {
    name: String,
    documents: Vec<Document>,
}

impl StaticKnowledgeBase {
    /// Create a knowledge base from documents.
    pub fn new(name: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            name: name.into(),
            documents,
        }
    }

    /// Create an empty knowledge base.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Load documents from a JSON array file (`[{ "title", "content", "url"? }]`).
    pub async fn load(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::knowledge_base(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let documents: Vec<Document> = serde_json::from_str(&content).map_err(|e| {
            Error::knowledge_base(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        Ok(Self::new(name, documents))
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn terms(text: &str) -> HashSet<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() >= MIN_TERM_LEN)
            .map(|t| t.to_lowercase())
            .collect()
    }

    fn excerpt(content: &str) -> String {
        if content.chars().count() <= MAX_EXCERPT_CHARS {
            content.to_string()
        } else {
            let cut: String = content.chars().take(MAX_EXCERPT_CHARS).collect();
            format!("{}...", cut)
        }
    }
}

#[async_trait]
impl KnowledgeBase for StaticKnowledgeBase {
    fn name(&self) -> &str {
        &self.name
    }

    async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<Source>> {
        let query_terms = Self::terms(query);
        if query_terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, &Document)> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let doc_terms = Self::terms(&format!("{} {}", doc.title, doc.content));
                let hits = query_terms.intersection(&doc_terms).count();
                if hits == 0 {
                    None
                } else {
                    Some((hits as f32 / query_terms.len() as f32, doc))
                }
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(limit);

        tracing::debug!(
            knowledge_base = %self.name,
            hits = scored.len(),
            "Retrieved sources"
        );

        Ok(scored
            .into_iter()
            .map(|(score, doc)| Source {
                title: doc.title.clone(),
                excerpt: Self::excerpt(&doc.content),
                location: doc.url.clone(),
                score: Some(score),
            })
            .collect())
    }
}

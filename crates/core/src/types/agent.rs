use serde::{Deserialize, Serialize};

use super::handoff::HandoffRequest;

// =============================================================================
// Agent Response Types
// =============================================================================

/// A retrieved document cited by an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Document title.
    pub title: String,
    /// Excerpt used as context.
    pub excerpt: String,
    /// Where the document lives (URL or path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Retrieval score, higher is better.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Source {
    /// Create a source with a title and excerpt.
    pub fn new(title: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            excerpt: excerpt.into(),
            location: None,
            score: None,
        }
    }
}

/// Token usage from a generation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Prompt tokens.
    pub prompt_tokens: u64,
    /// Completion tokens.
    pub completion_tokens: u64,
    /// Total tokens.
    pub total_tokens: u64,
}

impl std::ops::Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: Self) -> Self::Output {
        TokenUsage {
            prompt_tokens: self.prompt_tokens + rhs.prompt_tokens,
            completion_tokens: self.completion_tokens + rhs.completion_tokens,
            total_tokens: self.total_tokens + rhs.total_tokens,
        }
    }
}

/// Per-invocation timings, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTimings {
    pub retrieval_ms: u64,
    pub llm_generation_ms: u64,
    pub total_ms: u64,
}

/// Metadata attached to every agent response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetadata {
    /// Name of the agent that answered.
    pub agent: String,
    /// Model used for generation.
    pub model: String,
    /// Token usage, when the provider reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    pub timings: AgentTimings,
}

/// Result of one agent invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    /// Answer text.
    pub answer: String,
    /// Cited sources.
    pub sources: Vec<Source>,
    pub metadata: AgentMetadata,
    /// Present when the agent wants another agent to take over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff_request: Option<HandoffRequest>,
    /// Agent's own confidence in its answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl AgentResponse {
    /// Create a response with an answer and empty metadata for the given agent.
    pub fn new(agent: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sources: Vec::new(),
            metadata: AgentMetadata {
                agent: agent.into(),
                model: String::new(),
                token_usage: None,
                timings: AgentTimings::default(),
            },
            handoff_request: None,
            confidence: None,
        }
    }

    /// Attach sources.
    pub fn with_sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = sources;
        self
    }

    /// Set the reported model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.metadata.model = model.into();
        self
    }

    /// Set timings.
    pub fn with_timings(mut self, timings: AgentTimings) -> Self {
        self.metadata.timings = timings;
        self
    }

    /// Attach a handoff request.
    pub fn with_handoff(mut self, request: HandoffRequest) -> Self {
        self.handoff_request = Some(request);
        self
    }

    /// Name of the agent that produced this response.
    pub fn agent(&self) -> &str {
        &self.metadata.agent
    }
}

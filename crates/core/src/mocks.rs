//! Mock implementations of core traits for testing.
//!
//! These doubles are shared by unit and integration tests across the
//! workspace.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::{
    traits::{Agent, ChatMessage, ConversationMemory, KnowledgeBase, LlmClient, LlmResponse},
    types::{AgentResponse, AgentTimings, Intent, MemoryTurn, Source, TokenUsage},
    Error, Result,
};

// =============================================================================
// Mock LLM Client
// =============================================================================

/// Scripted mock LLM that returns predefined responses in a cycle.
pub struct MockLlm {
    responses: Vec<String>,
    fail_with: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockLlm {
    /// Create a new mock LLM with a queue of responses.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            fail_with: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn constant(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// Create a mock whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self {
            responses: Vec::new(),
            fail_with: Some(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Get the number of calls made to this mock.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    fn model_name(&self) -> &str {
        "mock-llm"
    }

    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        let idx = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };

        if let Some(message) = &self.fail_with {
            return Err(Error::model_provider(message.clone()));
        }

        let content = self
            .responses
            .get(idx % self.responses.len().max(1))
            .cloned()
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            finish_reason: "stop".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            },
        })
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse> {
        let prompt = messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n\n");
        self.complete(&prompt).await
    }
}

// =============================================================================
// Mock Agent
// =============================================================================

/// Agent double returning a fixed response and recording its queries.
pub struct MockAgent {
    name: String,
    response: Option<AgentResponse>,
    fail_with: Option<String>,
    delay: Option<Duration>,
    queries: Mutex<Vec<String>>,
}

impl MockAgent {
    /// Agent that answers every query with `answer`.
    pub fn answering(name: &str, answer: &str) -> Self {
        Self::with_response(
            name,
            AgentResponse::new(name, answer)
                .with_model("mock-llm")
                .with_sources(vec![Source::new(format!("{} handbook", name), answer)])
                .with_timings(AgentTimings {
                    retrieval_ms: 5,
                    llm_generation_ms: 20,
                    total_ms: 25,
                }),
        )
    }

    /// Agent that returns `response` for every query.
    pub fn with_response(name: &str, response: AgentResponse) -> Self {
        Self {
            name: name.to_string(),
            response: Some(response),
            fail_with: None,
            delay: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Agent whose every invocation fails.
    pub fn failing(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            response: None,
            fail_with: Some(message.to_string()),
            delay: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    /// Number of invocations so far.
    pub fn invocations(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl Agent for MockAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        query: &str,
        _memory: Option<&dyn ConversationMemory>,
    ) -> Result<AgentResponse> {
        self.queries.lock().unwrap().push(query.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.fail_with {
            return Err(Error::agent_invocation(&self.name, message.clone()));
        }

        self.response
            .clone()
            .ok_or_else(|| Error::internal("MockAgent has no response"))
    }
}

// =============================================================================
// Mock Conversation Memory
// =============================================================================

/// Memory double with a fixed transcript.
#[derive(Default)]
pub struct StaticMemory {
    turns: Vec<MemoryTurn>,
    fail: bool,
}

impl StaticMemory {
    pub fn new(turns: Vec<MemoryTurn>) -> Self {
        Self { turns, fail: false }
    }

    /// Memory whose reads always fail.
    pub fn failing() -> Self {
        Self {
            turns: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl ConversationMemory for StaticMemory {
    async fn turns(&self) -> Result<Vec<MemoryTurn>> {
        if self.fail {
            return Err(Error::Memory("memory backend unavailable".to_string()));
        }
        Ok(self.turns.clone())
    }
}

// =============================================================================
// Mock Knowledge Base
// =============================================================================

/// Knowledge base double returning the same sources for every query.
pub struct FixedKnowledgeBase {
    name: String,
    sources: Vec<Source>,
}

impl FixedKnowledgeBase {
    pub fn new(name: &str, sources: Vec<Source>) -> Self {
        Self {
            name: name.to_string(),
            sources,
        }
    }
}

#[async_trait]
impl KnowledgeBase for FixedKnowledgeBase {
    fn name(&self) -> &str {
        &self.name
    }

    async fn retrieve(&self, _query: &str, limit: usize) -> Result<Vec<Source>> {
        Ok(self.sources.iter().take(limit).cloned().collect())
    }
}

// =============================================================================
// Keyword Classifier LLM
// =============================================================================

const KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::Hr, &["insurance", "benefit", "leave", "vacation", "payroll", "salary", "onboarding"]),
    (Intent::It, &["password", "vpn", "laptop", "login", "email", "printer", "software"]),
    (Intent::Finance, &["refund", "invoice", "expense", "reimburse", "payment", "budget"]),
    (Intent::Legal, &["privacy", "gdpr", "contract", "terms", "compliance", "lawsuit"]),
];

/// Deterministic stand-in for a classification model.
///
/// Reads the `Question:` line of the prompt and answers with keyword-based
/// JSON. A question without keywords takes the domain of the latest `user:`
/// line in the prompt's transcript. Prompts carrying the multi-intent schema
/// are split on " and ".
#[derive(Default)]
pub struct KeywordLlm {
    prompts: Mutex<Vec<String>>,
}

impl KeywordLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Keyword intent of `text`, if any keyword occurs.
    pub fn keyword_intent(text: &str) -> Option<Intent> {
        let lower = text.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map(|(intent, _)| *intent)
    }

    fn classify(prompt: &str, text: &str) -> Intent {
        Self::keyword_intent(text)
            .or_else(|| {
                prompt
                    .lines()
                    .rev()
                    .filter_map(|l| l.strip_prefix("user: "))
                    .find_map(Self::keyword_intent)
            })
            .unwrap_or(Intent::General)
    }

    fn respond(prompt: &str) -> String {
        let question = prompt
            .lines()
            .find_map(|l| l.strip_prefix("Question: "))
            .unwrap_or_default()
            .trim();

        if !prompt.contains("requiresMultipleAgents") {
            let intent = Self::classify(prompt, question);
            return serde_json::json!({
                "intent": intent,
                "confidence": 0.9,
                "reasoning": "keyword match",
            })
            .to_string();
        }

        let mut items: Vec<serde_json::Value> = Vec::new();
        for part in question.split(" and ").map(str::trim).filter(|p| !p.is_empty()) {
            let intent = Self::classify(prompt, part);
            let mut sub_query = part.trim_end_matches('?').to_string();
            if let Some(first) = sub_query.get(..1) {
                sub_query = format!("{}{}?", first.to_uppercase(), &sub_query[1..]);
            }
            items.push(serde_json::json!({
                "intent": intent,
                "confidence": 0.85,
                "subQuery": sub_query,
            }));
        }

        let multiple = items.len() > 1;
        let primary = items.first().map(|i| i["intent"].clone());
        serde_json::json!({
            "intents": items,
            "requiresMultipleAgents": multiple,
            "primaryIntent": primary,
        })
        .to_string()
    }
}

#[async_trait]
impl LlmClient for KeywordLlm {
    fn model_name(&self) -> &str {
        "keyword-llm"
    }

    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(LlmResponse::text(Self::respond(prompt)))
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse> {
        let prompt = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.complete(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keyword_llm_single_and_multi() {
        let llm = KeywordLlm::new();

        let single = llm.complete("Question: How do I reset my password?").await.unwrap();
        assert!(single.content.contains("\"it\""));

        let multi = llm
            .complete("requiresMultipleAgents\nQuestion: What is my vacation balance and where is my refund?")
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&multi.content).unwrap();
        assert_eq!(value["intents"].as_array().unwrap().len(), 2);
        assert_eq!(value["intents"][1]["subQuery"], "Where is my refund?");
        assert_eq!(value["requiresMultipleAgents"], true);
        assert_eq!(llm.call_count(), 2);
    }
}

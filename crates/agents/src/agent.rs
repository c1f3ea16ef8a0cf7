//! Retrieval-augmented domain agent.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use support_router_core::{
    traits::{Agent, ChatMessage, ConversationMemory, KnowledgeBase, LlmClient},
    types::{AgentMetadata, AgentResponse, AgentTimings, ChatTurn, Role, Source},
    Error, Result,
};

use crate::parser::parse_reply;
use crate::profile::DomainProfile;

/// Default number of sources retrieved per query.
pub const DEFAULT_TOP_K: usize = 4;

/// Prior turns included in the answering prompt.
const HISTORY_TURNS: usize = 6;

/// An agent built from a domain profile, a knowledge base and a generator.
pub struct DomainAgent {
    profile: DomainProfile,
    llm: Arc<dyn LlmClient>,
    knowledge: Arc<dyn KnowledgeBase>,
    top_k: usize,
}

impl DomainAgent {
    /// Create a new domain agent.
    pub fn new(
        profile: DomainProfile,
        llm: Arc<dyn LlmClient>,
        knowledge: Arc<dyn KnowledgeBase>,
    ) -> Self {
        Self {
            profile,
            llm,
            knowledge,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the number of sources retrieved per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// The agent's profile.
    pub fn profile(&self) -> &DomainProfile {
        &self.profile
    }

    fn system_prompt(&self) -> String {
        let others = DomainProfile::all()
            .into_iter()
            .filter(|p| p.intent != self.profile.intent)
            .map(|p| format!("- {}: {}", p.name, p.description))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "You are {display}, a support assistant.\n\
             {instructions}\n\n\
             Answer only from the provided context. If the context does not cover the \
             question, say what you do know and what is missing.\n\n\
             After your answer you may add these lines:\n\
             CONFIDENCE: <number between 0 and 1>\n\
             HANDOFF: <domain> | <reason> | <what the other team needs to know>\n\
             Use HANDOFF only when another team is better placed to answer. \
             Valid reasons: out_of_scope, low_confidence, requires_expertise, user_request, \
             incomplete_answer.\n\
             Other domains:\n{others}",
            display = self.profile.display_name,
            instructions = self.profile.instructions,
            others = others,
        )
    }

    fn format_context(sources: &[Source]) -> String {
        if sources.is_empty() {
            return "No relevant documents were found.".to_string();
        }
        sources
            .iter()
            .enumerate()
            .map(|(i, s)| format!("[{}] {}\n{}", i + 1, s.title, s.excerpt))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    async fn history(&self, memory: Option<&dyn ConversationMemory>) -> Vec<ChatTurn> {
        let Some(memory) = memory else {
            return Vec::new();
        };
        match memory.turns().await {
            Ok(turns) => ChatTurn::normalize(turns, HISTORY_TURNS),
            Err(e) => {
                tracing::warn!(agent = %self.profile.name, error = %e, "Failed to read conversation memory");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Agent for DomainAgent {
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn description(&self) -> &str {
        &self.profile.description
    }

    async fn invoke(
        &self,
        query: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> Result<AgentResponse> {
        let started = Instant::now();
        let name = self.profile.name.as_str();

        let sources = self
            .knowledge
            .retrieve(query, self.top_k)
            .await
            .map_err(|e| Error::agent_invocation(name, format!("retrieval failed: {}", e)))?;
        let retrieval_ms = started.elapsed().as_millis() as u64;

        let mut messages = vec![ChatMessage::system(self.system_prompt())];
        for turn in self.history(memory).await {
            messages.push(match turn.role {
                Role::User => ChatMessage::user(turn.content),
                Role::Assistant => ChatMessage::assistant(turn.content),
                Role::System => ChatMessage::system(turn.content),
            });
        }
        messages.push(ChatMessage::user(format!(
            "Context:\n{}\n\nQuestion: {}",
            Self::format_context(&sources),
            query
        )));

        let generation_started = Instant::now();
        let reply = self
            .llm
            .chat(&messages)
            .await
            .map_err(|e| Error::agent_invocation(name, format!("generation failed: {}", e)))?;
        let llm_generation_ms = generation_started.elapsed().as_millis() as u64;

        let parsed = parse_reply(&reply.content, self.profile.intent);

        tracing::info!(
            agent = %name,
            sources = sources.len(),
            handoff = parsed.handoff.is_some(),
            retrieval_ms,
            llm_generation_ms,
            "Agent answered"
        );

        Ok(AgentResponse {
            answer: parsed.answer,
            sources,
            metadata: AgentMetadata {
                agent: name.to_string(),
                model: self.llm.model_name().to_string(),
                token_usage: Some(reply.usage),
                timings: AgentTimings {
                    retrieval_ms,
                    llm_generation_ms,
                    total_ms: started.elapsed().as_millis() as u64,
                },
            },
            handoff_request: parsed.handoff,
            confidence: parsed.confidence,
        })
    }
}

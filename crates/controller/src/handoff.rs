//! Agent-to-agent handoff with loop and depth protection.

use support_router_core::{
    traits::{Agent, ConversationMemory},
    types::{AgentResponse, HandoffRequest},
    Result,
};

use crate::prompts;

/// Default cap on agents per handoff chain, originating agent included.
pub const DEFAULT_MAX_HANDOFF_DEPTH: usize = 2;

/// What the target of a handoff needs to know about the previous step.
#[derive(Debug, Clone)]
pub struct HandoffContext {
    pub original_query: String,
    pub previous_agent: String,
    /// Answer the previous agent produced, possibly empty.
    pub previous_answer: String,
}

impl HandoffContext {
    pub fn new(
        original_query: impl Into<String>,
        previous_agent: impl Into<String>,
        previous_answer: impl Into<String>,
    ) -> Self {
        Self {
            original_query: original_query.into(),
            previous_agent: previous_agent.into(),
            previous_answer: previous_answer.into(),
        }
    }
}

/// Validates and executes handoffs.
///
/// Depth is checked against the chain recorded so far: with `max_depth = 2`
/// the originating agent may hand off once, and the target may not hand off
/// again.
#[derive(Debug, Clone)]
pub struct HandoffChain {
    max_depth: usize,
}

impl Default for HandoffChain {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HANDOFF_DEPTH)
    }
}

impl HandoffChain {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether `target` may receive a handoff given the chain so far.
    pub fn is_handoff_allowed(&self, target: &str, chain: &[String]) -> bool {
        if chain.iter().any(|agent| agent == target) {
            tracing::debug!(to = %target, ?chain, "Handoff rejected: target already in chain");
            return false;
        }
        if chain.len() >= self.max_depth {
            tracing::debug!(to = %target, ?chain, max_depth = self.max_depth, "Handoff rejected: depth exceeded");
            return false;
        }
        true
    }

    /// Prompt handed to the target agent.
    ///
    /// Uses the previous agent's answer, or the request's partial answer when
    /// the previous answer is empty.
    pub fn build_prompt(&self, request: &HandoffRequest, context: &HandoffContext) -> String {
        let partial = if context.previous_answer.trim().is_empty() {
            request.partial_answer.as_deref()
        } else {
            Some(context.previous_answer.as_str())
        };
        prompts::handoff(request, &context.original_query, &context.previous_agent, partial)
    }

    /// Invoke `target` with the handoff prompt and return its response verbatim.
    pub async fn process_handoff(
        &self,
        request: &HandoffRequest,
        context: &HandoffContext,
        target: &dyn Agent,
        memory: Option<&dyn ConversationMemory>,
    ) -> Result<AgentResponse> {
        tracing::info!(
            from = %context.previous_agent,
            to = %target.name(),
            reason = %request.reason,
            "Processing handoff"
        );
        let prompt = self.build_prompt(request, context);
        target.invoke(&prompt, memory).await
    }
}

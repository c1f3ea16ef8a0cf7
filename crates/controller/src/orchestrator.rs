//! Top-level request coordinator.
//!
//! `process` guards empty input, extracts history, classifies, then takes
//! either the single-topic path (one agent, optional handoffs) or the
//! multi-topic path (concurrent fan-out and merge).

use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use support_router_core::{
    traits::{Agent, ConversationMemory},
    types::{
        AgentOutput, AgentResponse, Classification, HandoffRequest, Intent, IntentClassification,
        MergeStrategy, MultiIntentClassification, OrchestratorResponse, RoutedTo, SubQuery,
    },
    Error, Result,
};

use crate::builder::OrchestratorBuilder;
use crate::classifier::Classifier;
use crate::handoff::{HandoffChain, HandoffContext};
use crate::history::extract_history;
use crate::merger::ResultMerger;
use crate::prompts::CLARIFICATION_PROMPT;
use crate::registry::AgentRegistry;

/// Intent whose agent serves fallbacks and empty input.
pub const FALLBACK_INTENT: Intent = Intent::It;

/// Where agents come from.
pub enum AgentSource {
    /// Pre-built agents, looked up by name.
    Eager(Vec<Arc<dyn Agent>>),
    /// Agents constructed on first reference.
    Lazy(Arc<AgentRegistry>),
}

/// Routes questions to domain agents.
pub struct Orchestrator {
    pub(crate) classifier: Classifier,
    pub(crate) merger: ResultMerger,
    pub(crate) handoff: HandoffChain,
    pub(crate) agents: AgentSource,
    pub(crate) merge_strategy: MergeStrategy,
    pub(crate) history_limit: usize,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Answer a question.
    ///
    /// Recoverable failures are handled locally. Anything else surfaces as
    /// [`Error::Orchestration`] carrying the original cause.
    pub async fn process(
        &self,
        question: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> Result<OrchestratorResponse> {
        let span = tracing::info_span!("orchestrate", request_id = %Uuid::new_v4());
        async move {
            if question.trim().is_empty() {
                return self.process_empty(memory).await;
            }

            let history = extract_history(memory, self.history_limit).await;

            let outcome = self
                .classifier
                .classify_multi_intent(question, &history)
                .await
                .map_err(|e| Error::orchestration("Classification failed", e))?;

            match outcome.into_classification() {
                Classification::Multi(multi) => self.process_multi_topic(question, &multi, memory).await,
                Classification::Single(single) => self.process_single_topic(question, single, memory).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn process_empty(&self, memory: Option<&dyn ConversationMemory>) -> Result<OrchestratorResponse> {
        tracing::info!("Empty question, asking the fallback agent for clarification");

        let agent = self.require_agent(FALLBACK_INTENT)?;
        let response = agent
            .invoke(CLARIFICATION_PROMPT, memory)
            .await
            .map_err(|e| Error::orchestration("Clarification request failed", e))?;

        let classification = IntentClassification::new(FALLBACK_INTENT, 0.5)
            .with_reasoning("Empty question; routed for clarification without classification");

        Ok(OrchestratorResponse {
            intent: FALLBACK_INTENT,
            intents: None,
            classification: Classification::Single(classification),
            routed_to: RoutedTo::Agent(agent.name().to_string()),
            agent_response: AgentOutput::Single(response),
            handoff_occurred: None,
            handoff_chain: None,
        })
    }

    /// Route a single-topic question to one agent, following handoffs.
    ///
    /// An intent without an agent falls back to the IT agent, with no
    /// handoff processing. A handoff that is disallowed, unresolvable or
    /// fails keeps the answer reached so far.
    pub async fn process_single_topic(
        &self,
        question: &str,
        classification: IntentClassification,
        memory: Option<&dyn ConversationMemory>,
    ) -> Result<OrchestratorResponse> {
        let intent = classification.intent;

        let (agent, fell_back) = match self.agent_by_intent(intent) {
            Some(agent) => (agent, false),
            None => {
                tracing::warn!(intent = %intent, "No agent for intent, falling back to IT");
                (self.require_agent(FALLBACK_INTENT)?, true)
            }
        };
        let agent_name = agent.name().to_string();

        tracing::info!(intent = %intent, agent = %agent_name, confidence = classification.confidence, "Routing question");

        let mut current = agent
            .invoke(question, memory)
            .await
            .map_err(|e| Error::orchestration(format!("Agent '{}' failed", agent_name), e))?;

        let mut chain = vec![agent_name.clone()];
        let mut attempted = false;

        if !fell_back {
            while let Some(request) = current.handoff_request.clone() {
                attempted = true;
                let previous = chain.last().cloned().unwrap_or_default();
                let next = self
                    .try_handoff(&request, question, &previous, &current, &chain, memory)
                    .await;
                match next {
                    Some((target, response)) => {
                        chain.push(target);
                        current = response;
                    }
                    None => break,
                }
            }
        }

        let (handoff_occurred, handoff_chain) = if chain.len() > 1 {
            (Some(true), Some(chain))
        } else if attempted {
            (Some(false), None)
        } else {
            (None, None)
        };

        Ok(OrchestratorResponse {
            intent,
            intents: None,
            classification: Classification::Single(classification),
            routed_to: RoutedTo::Agent(agent_name),
            agent_response: AgentOutput::Single(current),
            handoff_occurred,
            handoff_chain,
        })
    }

    async fn try_handoff(
        &self,
        request: &HandoffRequest,
        question: &str,
        previous_agent: &str,
        previous: &AgentResponse,
        chain: &[String],
        memory: Option<&dyn ConversationMemory>,
    ) -> Option<(String, AgentResponse)> {
        let requested = request.requested_agent;

        let Some(target_name) = requested.agent_name() else {
            tracing::warn!(requested = %requested, "Handoff to a domain without an agent, keeping previous answer");
            return None;
        };

        if !self.handoff.is_handoff_allowed(target_name, chain) {
            tracing::info!(from = %previous_agent, to = %target_name, ?chain, "Handoff not allowed, keeping previous answer");
            return None;
        }

        let Some(target) = self.agent(target_name) else {
            let e = Error::HandoffTargetUnavailable(target_name.to_string());
            tracing::warn!(error = %e, "Keeping previous answer");
            return None;
        };

        let context = HandoffContext::new(question, previous_agent, previous.answer.as_str());
        match self.handoff.process_handoff(request, &context, target.as_ref(), memory).await {
            Ok(response) => {
                tracing::info!(from = %previous_agent, to = %target.name(), "Handoff completed");
                Some((target.name().to_string(), response))
            }
            Err(e) => {
                tracing::warn!(to = %target.name(), error = %e, "Handoff target failed, keeping previous answer");
                None
            }
        }
    }

    /// Fan a multi-topic question out to one agent per intent and merge.
    ///
    /// Items sharing an intent are folded into one sub-query, so each intent
    /// is invoked once. Items without an agent are skipped. If any invoked
    /// agent fails, the whole batch fails and no merged response is produced.
    pub async fn process_multi_topic(
        &self,
        question: &str,
        classification: &MultiIntentClassification,
        memory: Option<&dyn ConversationMemory>,
    ) -> Result<OrchestratorResponse> {
        let classification = &classification.clone().folded();

        let mut resolved = Vec::with_capacity(classification.intents.len());
        for item in &classification.intents {
            match self.agent_by_intent(item.intent) {
                Some(agent) => resolved.push((item, agent)),
                None => tracing::warn!(intent = %item.intent, "No agent for sub-query, skipping"),
            }
        }

        if resolved.is_empty() {
            return Err(Error::orchestration("No agent available for any sub-query", Error::EmptyResultSet));
        }

        let routed: Vec<String> = resolved.iter().map(|(_, agent)| agent.name().to_string()).collect();
        tracing::info!(agents = ?routed, "Invoking agents concurrently");

        let responses = try_join_all(resolved.iter().map(|(item, agent)| async move {
            agent
                .invoke(&item.sub_query, memory)
                .await
                .map(|response| (item.intent, response))
        }))
        .await
        .map_err(|e| Error::orchestration("Multi-topic agent batch failed", e))?;

        let results: HashMap<Intent, AgentResponse> = responses.into_iter().collect();
        let sub_queries: Vec<SubQuery> = classification
            .intents
            .iter()
            .map(|item| SubQuery {
                intent: item.intent,
                sub_query: item.sub_query.clone(),
            })
            .collect();

        let merged = self
            .merger
            .merge(&results, question, &sub_queries, self.merge_strategy)
            .await
            .map_err(|e| Error::orchestration("Merging agent responses failed", e))?;

        Ok(OrchestratorResponse {
            intent: classification.reported_intent(),
            intents: Some(classification.intent_list()),
            classification: Classification::Multi(classification.clone()),
            routed_to: RoutedTo::Agents(routed),
            agent_response: AgentOutput::Merged(merged),
            handoff_occurred: None,
            handoff_chain: None,
        })
    }

    /// All agents. In lazy mode this constructs every registered agent.
    pub fn agents(&self) -> Vec<Arc<dyn Agent>> {
        match &self.agents {
            AgentSource::Eager(agents) => agents.clone(),
            AgentSource::Lazy(registry) => registry
                .names()
                .iter()
                .filter_map(|name| self.agent(name))
                .collect(),
        }
    }

    /// Agent by name, or `None` if it cannot be resolved.
    pub fn agent(&self, name: &str) -> Option<Arc<dyn Agent>> {
        match &self.agents {
            AgentSource::Eager(agents) => agents.iter().find(|a| a.name() == name).cloned(),
            AgentSource::Lazy(registry) if !registry.is_registered(name) => {
                tracing::debug!(agent = %name, "No factory registered");
                None
            }
            AgentSource::Lazy(registry) => match registry.resolve(name) {
                Ok(agent) => Some(agent),
                Err(e) => {
                    tracing::warn!(agent = %name, error = %e, "Agent could not be resolved");
                    None
                }
            },
        }
    }

    /// Agent serving `intent`, or `None`. `General` has no agent.
    pub fn agent_by_intent(&self, intent: Intent) -> Option<Arc<dyn Agent>> {
        intent.agent_name().and_then(|name| self.agent(name))
    }

    fn require_agent(&self, intent: Intent) -> Result<Arc<dyn Agent>> {
        self.agent_by_intent(intent).ok_or_else(|| {
            Error::orchestration(
                format!("Fallback agent '{}' is unavailable", intent),
                Error::AgentResolution(intent.to_string()),
            )
        })
    }
}

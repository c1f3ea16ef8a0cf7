//! Builder for Orchestrator.

use std::sync::Arc;

use support_router_core::config::OrchestratorConfig;
use support_router_core::traits::{Agent, LlmClient};
use support_router_core::types::MergeStrategy;
use support_router_core::{Error, Result};

use crate::classifier::Classifier;
use crate::handoff::{HandoffChain, DEFAULT_MAX_HANDOFF_DEPTH};
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::merger::ResultMerger;
use crate::orchestrator::{AgentSource, Orchestrator};
use crate::registry::AgentRegistry;

/// Builder for constructing an Orchestrator.
pub struct OrchestratorBuilder {
    classifier_llm: Option<Arc<dyn LlmClient>>,
    synthesis_llm: Option<Arc<dyn LlmClient>>,
    agents: Vec<Arc<dyn Agent>>,
    registry: Option<Arc<AgentRegistry>>,
    merge_strategy: MergeStrategy,
    max_handoff_depth: usize,
    history_limit: usize,
}

impl OrchestratorBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            classifier_llm: None,
            synthesis_llm: None,
            agents: Vec::new(),
            registry: None,
            merge_strategy: MergeStrategy::default(),
            max_handoff_depth: DEFAULT_MAX_HANDOFF_DEPTH,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Apply the orchestrator section of the application config.
    pub fn with_config(mut self, config: &OrchestratorConfig) -> Self {
        self.merge_strategy = config.merge_strategy;
        self.max_handoff_depth = config.max_handoff_depth;
        self.history_limit = config.history_limit;
        self
    }

    /// Set the model used for intent classification.
    pub fn with_classifier_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.classifier_llm = Some(llm);
        self
    }

    /// Set the model used by the synthesis merge strategy.
    pub fn with_synthesis_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.synthesis_llm = Some(llm);
        self
    }

    /// Add a pre-built agent.
    pub fn with_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add several pre-built agents.
    pub fn with_agents(mut self, agents: impl IntoIterator<Item = Arc<dyn Agent>>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Resolve agents lazily from a registry instead.
    pub fn with_registry(mut self, registry: Arc<AgentRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }

    pub fn with_max_handoff_depth(mut self, depth: usize) -> Self {
        self.max_handoff_depth = depth;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Build the Orchestrator.
    ///
    /// Fails when no classifier model is set, when no agent source is set,
    /// or when both eager agents and a registry are given.
    pub fn build(self) -> Result<Orchestrator> {
        let llm = self
            .classifier_llm
            .ok_or_else(|| Error::config("Orchestrator requires a classifier LLM"))?;

        let agents = match (self.registry, self.agents.is_empty()) {
            (Some(registry), true) => AgentSource::Lazy(registry),
            (None, false) => AgentSource::Eager(self.agents),
            (Some(_), false) => {
                return Err(Error::config("Use either eager agents or an agent registry, not both"))
            }
            (None, true) => return Err(Error::config("Orchestrator requires at least one agent")),
        };

        let mut merger = ResultMerger::new();
        if let Some(synthesis) = self.synthesis_llm {
            merger = merger.with_synthesis_llm(synthesis);
        }

        Ok(Orchestrator {
            classifier: Classifier::new(llm).with_history_limit(self.history_limit),
            merger,
            handoff: HandoffChain::new(self.max_handoff_depth),
            agents,
            merge_strategy: self.merge_strategy,
            history_limit: self.history_limit,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use support_router_core::mocks::{MockAgent, MockLlm};

    #[test]
    fn test_build_requires_agent_source() {
        let result = OrchestratorBuilder::new()
            .with_classifier_llm(Arc::new(MockLlm::constant("{}")))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_build_requires_classifier() {
        let result = OrchestratorBuilder::new()
            .with_agent(Arc::new(MockAgent::answering("it", "ok")))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_build_rejects_both_sources() {
        let result = OrchestratorBuilder::new()
            .with_classifier_llm(Arc::new(MockLlm::constant("{}")))
            .with_agent(Arc::new(MockAgent::answering("it", "ok")))
            .with_registry(Arc::new(AgentRegistry::new()))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_is_applied() {
        let config = OrchestratorConfig {
            max_handoff_depth: 3,
            merge_strategy: MergeStrategy::Structured,
            history_limit: 4,
            lazy_agents: false,
        };
        let orchestrator = OrchestratorBuilder::new()
            .with_config(&config)
            .with_classifier_llm(Arc::new(MockLlm::constant("{}")))
            .with_agent(Arc::new(MockAgent::answering("it", "ok")))
            .build()
            .unwrap();

        assert_eq!(orchestrator.handoff.max_depth(), 3);
        assert_eq!(orchestrator.merge_strategy, MergeStrategy::Structured);
        assert_eq!(orchestrator.history_limit, 4);
        assert_eq!(orchestrator.agents().len(), 1);
    }
}

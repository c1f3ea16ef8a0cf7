#![allow(dead_code)]

use std::sync::Arc;

use support_router_controller::{AgentRegistry, Orchestrator};
use support_router_core::mocks::{KeywordLlm, MockAgent};
use support_router_core::traits::Agent;
use support_router_core::types::{AgentResponse, AgentTimings, HandoffReason, HandoffRequest, Intent};

pub const HR_ANSWER: &str = "Employees get medical, dental and vision coverage.";
pub const IT_ANSWER: &str = "Reset your password from the self-service portal.";
pub const FINANCE_ANSWER: &str = "Refunds are issued within 5-7 business days.";
pub const LEGAL_ANSWER: &str = "We only process personal data with a lawful basis.";

pub fn domain_agents() -> Vec<Arc<MockAgent>> {
    vec![
        Arc::new(MockAgent::answering("hr", HR_ANSWER)),
        Arc::new(MockAgent::answering("it", IT_ANSWER)),
        Arc::new(MockAgent::answering("finance", FINANCE_ANSWER)),
        Arc::new(MockAgent::answering("legal", LEGAL_ANSWER)),
    ]
}

pub fn as_dyn(agents: &[Arc<MockAgent>]) -> Vec<Arc<dyn Agent>> {
    agents.iter().map(|a| a.clone() as Arc<dyn Agent>).collect()
}

pub fn eager(llm: Arc<KeywordLlm>, agents: &[Arc<MockAgent>]) -> Orchestrator {
    Orchestrator::builder()
        .with_classifier_llm(llm)
        .with_agents(as_dyn(agents))
        .build()
        .unwrap()
}

/// Agent that answers and asks to hand off to `target`.
pub fn handing_off(name: &str, answer: &str, target: Intent) -> Arc<MockAgent> {
    let response = AgentResponse::new(name, answer)
        .with_timings(AgentTimings {
            retrieval_ms: 5,
            llm_generation_ms: 20,
            total_ms: 25,
        })
        .with_handoff(
            HandoffRequest::new(target, HandoffReason::RequiresExpertise, format!("{} question", target))
                .with_partial_answer(answer),
        );
    Arc::new(MockAgent::with_response(name, response))
}

pub fn registry_of(agents: &[Arc<MockAgent>]) -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    for agent in agents {
        let name = agent.name().to_string();
        let agent = agent.clone();
        registry.register(name, move || Ok(agent.clone() as Arc<dyn Agent>));
    }
    registry
}

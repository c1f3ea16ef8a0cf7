use serde::Serialize;

use super::agent::AgentResponse;
use super::intent::{Classification, Intent};
use super::merge::MergedResponse;

/// Agent or agents a request was routed to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RoutedTo {
    Agent(String),
    Agents(Vec<String>),
}

impl RoutedTo {
    /// Agent names in routing order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Agent(name) => vec![name.as_str()],
            Self::Agents(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Answer payload: one agent's response or a merged one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AgentOutput {
    Single(AgentResponse),
    Merged(MergedResponse),
}

impl AgentOutput {
    pub fn answer(&self) -> &str {
        match self {
            Self::Single(r) => &r.answer,
            Self::Merged(r) => &r.answer,
        }
    }

    pub fn as_single(&self) -> Option<&AgentResponse> {
        match self {
            Self::Single(r) => Some(r),
            Self::Merged(_) => None,
        }
    }

    pub fn as_merged(&self) -> Option<&MergedResponse> {
        match self {
            Self::Merged(r) => Some(r),
            Self::Single(_) => None,
        }
    }
}

/// Caller-facing result of `Orchestrator::process`.
///
/// `intents` is only set on the multi-topic path; there `intent` holds the
/// primary intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorResponse {
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intents: Option<Vec<Intent>>,
    pub classification: Classification,
    pub routed_to: RoutedTo,
    pub agent_response: AgentOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff_occurred: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff_chain: Option<Vec<String>>,
}

impl OrchestratorResponse {
    /// Final answer text.
    pub fn answer(&self) -> &str {
        self.agent_response.answer()
    }

    /// Whether the multi-topic path produced this response.
    pub fn is_multi(&self) -> bool {
        self.intents.is_some()
    }
}

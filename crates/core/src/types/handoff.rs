use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::intent::Intent;
use crate::error::{Error, Result};

/// Why an agent is handing a query to another agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffReason {
    OutOfScope,
    LowConfidence,
    RequiresExpertise,
    UserRequest,
    IncompleteAnswer,
}

impl HandoffReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfScope => "out_of_scope",
            Self::LowConfidence => "low_confidence",
            Self::RequiresExpertise => "requires_expertise",
            Self::UserRequest => "user_request",
            Self::IncompleteAnswer => "incomplete_answer",
        }
    }
}

impl fmt::Display for HandoffReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandoffReason {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "out_of_scope" => Ok(Self::OutOfScope),
            "low_confidence" => Ok(Self::LowConfidence),
            "requires_expertise" => Ok(Self::RequiresExpertise),
            "user_request" => Ok(Self::UserRequest),
            "incomplete_answer" => Ok(Self::IncompleteAnswer),
            other => Err(Error::internal(format!("Unknown handoff reason: {}", other))),
        }
    }
}

/// Request from an agent to delegate the query to another agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffRequest {
    /// Domain that should take over.
    pub requested_agent: Intent,
    pub reason: HandoffReason,
    /// What the delegating agent wants the target to know.
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Whatever the delegating agent managed to answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_answer: Option<String>,
}

impl HandoffRequest {
    /// Create a handoff request.
    pub fn new(requested_agent: Intent, reason: HandoffReason, context: impl Into<String>) -> Self {
        Self {
            requested_agent,
            reason,
            context: context.into(),
            confidence: None,
            partial_answer: None,
        }
    }

    /// Attach a partial answer.
    pub fn with_partial_answer(mut self, answer: impl Into<String>) -> Self {
        self.partial_answer = Some(answer.into());
        self
    }
}

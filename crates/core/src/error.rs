//! Error types for the support router.

use thiserror::Error;

/// Result type alias using the router's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the support router.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Routing Errors
    // =========================================================================
    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("No agent resolvable for intent: {0}")]
    AgentResolution(String),

    #[error("Agent '{agent}' invocation failed: {message}")]
    AgentInvocation { agent: String, message: String },

    #[error("Handoff target unavailable: {0}")]
    HandoffTargetUnavailable(String),

    #[error("No agent could be resolved for any sub-query")]
    EmptyResultSet,

    /// Request-level failure with no safe partial answer.
    #[error("Orchestration failed: {message}")]
    Orchestration {
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("Model provider error: {0}")]
    ModelProvider(String),

    #[error("Merge failed: {0}")]
    Merge(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Memory error: {0}")]
    Memory(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a classification error.
    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification(msg.into())
    }

    /// Create an agent invocation error.
    pub fn agent_invocation(agent: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::AgentInvocation {
            agent: agent.into(),
            message: msg.into(),
        }
    }

    /// Create an orchestration error wrapping its cause.
    pub fn orchestration(msg: impl Into<String>, cause: Error) -> Self {
        Self::Orchestration {
            message: msg.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Create an orchestration error with no underlying cause.
    pub fn orchestration_msg(msg: impl Into<String>) -> Self {
        Self::Orchestration {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a model provider error.
    pub fn model_provider(msg: impl Into<String>) -> Self {
        Self::ModelProvider(msg.into())
    }

    /// Create a knowledge base error.
    pub fn knowledge_base(msg: impl Into<String>) -> Self {
        Self::KnowledgeBase(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this is the request-level orchestration error.
    pub fn is_orchestration(&self) -> bool {
        matches!(self, Self::Orchestration { .. })
    }

    /// The wrapped cause of an orchestration error, if any.
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Self::Orchestration { source, .. } => source.as_deref(),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orchestration_error_carries_cause() {
        let err = Error::orchestration(
            "agent batch failed",
            Error::agent_invocation("hr", "connection reset"),
        );

        assert!(err.is_orchestration());
        assert!(err.to_string().contains("agent batch failed"));
        match err.cause() {
            Some(Error::AgentInvocation { agent, .. }) => assert_eq!(agent, "hr"),
            other => panic!("Unexpected cause: {:?}", other),
        }
    }

    #[test]
    fn test_domain_errors_are_not_orchestration() {
        assert!(!Error::EmptyResultSet.is_orchestration());
        assert!(!Error::classification("bad json").is_orchestration());
        assert!(Error::orchestration_msg("no fallback").cause().is_none());
    }
}

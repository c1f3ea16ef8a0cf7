use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::agent::Source;
use super::intent::Intent;
use crate::error::{Error, Result};

/// How answers from several agents are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Labeled sections joined by a separator.
    #[default]
    Concatenation,
    /// One extra generation call writes a unified answer.
    LlmSynthesis,
    /// Summary header plus one markdown subsection per intent.
    Structured,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concatenation => "concatenation",
            Self::LlmSynthesis => "llm_synthesis",
            Self::Structured => "structured",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "concatenation" => Ok(Self::Concatenation),
            "llm_synthesis" | "synthesis" => Ok(Self::LlmSynthesis),
            "structured" => Ok(Self::Structured),
            other => Err(Error::config(format!("Unknown merge strategy: {}", other))),
        }
    }
}

/// The sub-query asked of one intent's agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubQuery {
    pub intent: Intent,
    pub sub_query: String,
}

/// Sources contributed by one intent's agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentSources {
    pub intent: Intent,
    pub agent: String,
    pub sources: Vec<Source>,
}

/// Merge timings, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeTimings {
    /// Sum of each agent's `total_ms`.
    pub execution_ms: u64,
    /// Wall-clock time spent merging.
    pub merge_ms: u64,
    /// `execution_ms + merge_ms`.
    pub total_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeMetadata {
    /// Agents that contributed, in sub-query order.
    pub agents: Vec<String>,
    /// Intents that contributed, in sub-query order.
    pub intents: Vec<Intent>,
    /// Strategy that produced the answer.
    pub merge_strategy: MergeStrategy,
    pub timings: MergeTimings,
}

/// Unified answer for a multi-topic question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedResponse {
    pub answer: String,
    pub sources: Vec<IntentSources>,
    pub metadata: MergeMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_config_string() {
        assert_eq!("llm_synthesis".parse::<MergeStrategy>().unwrap(), MergeStrategy::LlmSynthesis);
        assert_eq!("Structured".parse::<MergeStrategy>().unwrap(), MergeStrategy::Structured);
        assert_eq!(MergeStrategy::default(), MergeStrategy::Concatenation);
        assert!("zip".parse::<MergeStrategy>().is_err());
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// =============================================================================
// Intent
// =============================================================================

/// Closed set of support domains a question can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Benefits, leave, payroll policy, onboarding.
    Hr,
    /// Accounts, passwords, devices, software access.
    It,
    /// Refunds, invoices, expenses, reimbursements.
    Finance,
    /// Privacy, contracts, terms, compliance.
    Legal,
    /// Anything that fits none of the above.
    General,
}

impl Intent {
    /// Every intent, in declaration order.
    pub const ALL: [Intent; 5] = [
        Intent::Hr,
        Intent::It,
        Intent::Finance,
        Intent::Legal,
        Intent::General,
    ];

    /// Wire label of the intent.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hr => "hr",
            Self::It => "it",
            Self::Finance => "finance",
            Self::Legal => "legal",
            Self::General => "general",
        }
    }

    /// Name of the agent that serves this intent.
    ///
    /// `General` has no dedicated agent.
    pub fn agent_name(&self) -> Option<&'static str> {
        match self {
            Self::General => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hr" => Ok(Self::Hr),
            "it" => Ok(Self::It),
            "finance" => Ok(Self::Finance),
            "legal" => Ok(Self::Legal),
            "general" => Ok(Self::General),
            other => Err(Error::classification(format!("Unknown intent: {}", other))),
        }
    }
}

// =============================================================================
// Classification Results
// =============================================================================

/// Single-topic classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IntentClassification {
    /// Detected domain.
    pub intent: Intent,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// One-line justification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl IntentClassification {
    /// Create a classification, clamping confidence into [0, 1].
    pub fn new(intent: Intent, confidence: f64) -> Self {
        Self {
            intent,
            confidence: clamp_confidence(confidence),
            reasoning: None,
        }
    }

    /// Attach reasoning.
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    /// Clamp confidence after deserialization from model output.
    pub fn normalized(mut self) -> Self {
        self.confidence = clamp_confidence(self.confidence);
        self
    }
}

/// One sub-topic of a multi-topic question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MultiIntentItem {
    /// Domain of this sub-topic.
    pub intent: Intent,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Self-contained question for this sub-topic.
    pub sub_query: String,
    /// One-line justification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Multi-topic decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MultiIntentClassification {
    /// One item per distinct topic, in question order.
    pub intents: Vec<MultiIntentItem>,
    /// Whether more than one agent is needed.
    pub requires_multiple_agents: bool,
    /// Dominant topic, if the model named one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_intent: Option<Intent>,
}

impl MultiIntentClassification {
    /// Intents in sub-query order.
    pub fn intent_list(&self) -> Vec<Intent> {
        self.intents.iter().map(|i| i.intent).collect()
    }

    /// Intent reported at the top level of a response.
    pub fn reported_intent(&self) -> Intent {
        self.primary_intent
            .or_else(|| self.intents.first().map(|i| i.intent))
            .unwrap_or(Intent::General)
    }

    /// Fold items sharing an intent into one, leaving one item per intent.
    ///
    /// Sub-queries are joined in order and the highest confidence is kept.
    /// A `primary_intent` that no item carries is dropped.
    pub fn folded(self) -> Self {
        let mut folded: Vec<MultiIntentItem> = Vec::with_capacity(self.intents.len());
        for mut item in self.intents {
            item.confidence = clamp_confidence(item.confidence);
            item.sub_query = item.sub_query.trim().to_string();
            match folded.iter_mut().find(|f| f.intent == item.intent) {
                Some(existing) => {
                    if !item.sub_query.is_empty() {
                        if existing.sub_query.is_empty() {
                            existing.sub_query = item.sub_query;
                        } else {
                            existing.sub_query = format!("{} {}", existing.sub_query, item.sub_query);
                        }
                    }
                    existing.confidence = existing.confidence.max(item.confidence);
                }
                None => folded.push(item),
            }
        }

        let primary_intent = self
            .primary_intent
            .filter(|p| folded.iter().any(|i| i.intent == *p));

        Self {
            intents: folded,
            requires_multiple_agents: self.requires_multiple_agents,
            primary_intent,
        }
    }
}

/// A classification in exactly one of its two routable shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    /// Route to one agent.
    Single(IntentClassification),
    /// Fan out to several agents. Always holds two or more distinct intents.
    Multi(MultiIntentClassification),
}

impl Classification {
    /// Normalize raw model output into a routable classification.
    ///
    /// Items sharing an intent are folded together (sub-queries joined,
    /// highest confidence kept). One remaining intent yields `Single`
    /// regardless of `requires_multiple_agents`; two or more yield `Multi`.
    pub fn from_multi(raw: MultiIntentClassification) -> Result<Self> {
        if raw.intents.is_empty() {
            return Err(Error::classification("Multi-intent result has no intents"));
        }

        let raw = raw.folded();
        let mut folded = raw.intents;

        if folded.len() == 1 {
            let item = folded.remove(0);
            return Ok(Self::Single(IntentClassification {
                intent: item.intent,
                confidence: item.confidence,
                reasoning: item.reasoning,
            }));
        }

        if let Some(empty) = folded.iter().find(|i| i.sub_query.is_empty()) {
            return Err(Error::classification(format!(
                "Sub-query for intent '{}' is empty",
                empty.intent
            )));
        }

        Ok(Self::Multi(MultiIntentClassification {
            intents: folded,
            requires_multiple_agents: true,
            primary_intent: raw.primary_intent,
        }))
    }

    /// Whether this classification fans out to several agents.
    pub fn requires_multiple_agents(&self) -> bool {
        matches!(self, Self::Multi(_))
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

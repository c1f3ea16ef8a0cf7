//! Intent classification.
//!
//! Two entry points: [`Classifier::classify_intent`] picks exactly one
//! domain, [`Classifier::classify_multi_intent`] decomposes a question into
//! one self-contained sub-query per domain. A failed decomposition degrades
//! to single-intent classification and says so in its return type.

use std::sync::Arc;

use support_router_core::{
    traits::LlmClient,
    types::{ChatTurn, Classification, IntentClassification, MultiIntentClassification},
    Error, Result,
};

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::prompts;
use crate::structured::generate_structured;

/// Outcome of multi-intent classification.
#[derive(Debug)]
pub enum MultiIntentOutcome {
    /// The decomposition succeeded.
    Classified(Classification),
    /// The decomposition failed and single-intent classification was used.
    Fallback {
        classification: IntentClassification,
        cause: Error,
    },
}

impl MultiIntentOutcome {
    /// The routable classification, whichever way it was reached.
    pub fn into_classification(self) -> Classification {
        match self {
            Self::Classified(classification) => classification,
            Self::Fallback { classification, .. } => Classification::Single(classification),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Structured-output intent classifier.
pub struct Classifier {
    llm: Arc<dyn LlmClient>,
    history_limit: usize,
}

impl Classifier {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Cap the number of history turns shown to the model.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    fn recent<'a>(&self, history: &'a [ChatTurn]) -> &'a [ChatTurn] {
        let skip = history.len().saturating_sub(self.history_limit);
        &history[skip..]
    }

    /// Classify a question into exactly one intent.
    ///
    /// Any failure is returned as [`Error::Classification`]; it is not
    /// retried here.
    pub async fn classify_intent(
        &self,
        question: &str,
        history: &[ChatTurn],
    ) -> Result<IntentClassification> {
        let prompt = prompts::single_intent(question, self.recent(history));

        let classification = generate_structured::<IntentClassification>(self.llm.as_ref(), &prompt)
            .await
            .map_err(|e| {
                if matches!(e, Error::Classification(_)) {
                    e
                } else {
                    Error::classification(e.to_string())
                }
            })?
            .normalized();

        tracing::info!(
            intent = %classification.intent,
            confidence = classification.confidence,
            history_turns = history.len().min(self.history_limit),
            "Classified intent"
        );

        Ok(classification)
    }

    /// Decompose a question into per-intent sub-queries.
    ///
    /// A one-topic result comes back as [`Classification::Single`]. If the
    /// decomposition fails for any reason, falls back to
    /// [`classify_intent`](Self::classify_intent); only a failure of that
    /// fallback is returned as an error.
    pub async fn classify_multi_intent(
        &self,
        question: &str,
        history: &[ChatTurn],
    ) -> Result<MultiIntentOutcome> {
        match self.decompose(question, history).await {
            Ok(classification) => {
                if let Classification::Multi(multi) = &classification {
                    tracing::info!(
                        intents = ?multi.intent_list(),
                        primary = ?multi.primary_intent,
                        "Question spans multiple domains"
                    );
                }
                Ok(MultiIntentOutcome::Classified(classification))
            }
            Err(cause) => {
                tracing::warn!(
                    error = %cause,
                    "Multi-intent classification failed, falling back to single intent"
                );
                let classification = self.classify_intent(question, history).await?;
                Ok(MultiIntentOutcome::Fallback {
                    classification,
                    cause,
                })
            }
        }
    }

    async fn decompose(&self, question: &str, history: &[ChatTurn]) -> Result<Classification> {
        let prompt = prompts::multi_intent(question, self.recent(history));
        let raw = generate_structured::<MultiIntentClassification>(self.llm.as_ref(), &prompt).await?;
        Classification::from_multi(raw)
    }
}

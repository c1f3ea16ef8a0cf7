//! Merging of per-intent agent answers into one response.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use support_router_core::{
    traits::LlmClient,
    types::{
        AgentResponse, Intent, IntentSources, MergeMetadata, MergeStrategy, MergeTimings,
        MergedResponse, SubQuery,
    },
    Error, Result,
};

use crate::prompts;

/// Separator between concatenated sections.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Combines the answers of a multi-topic fan-out.
#[derive(Default)]
pub struct ResultMerger {
    synthesis_llm: Option<Arc<dyn LlmClient>>,
}

struct Section<'a> {
    intent: Intent,
    sub_query: &'a str,
    response: &'a AgentResponse,
}

impl ResultMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model used by [`MergeStrategy::LlmSynthesis`].
    pub fn with_synthesis_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.synthesis_llm = Some(llm);
        self
    }

    /// Merge `results` in the order of `sub_queries`.
    ///
    /// Sub-queries without a result are skipped. `execution_ms` is the sum of
    /// the included responses' `total_ms`. Synthesis that cannot run or fails
    /// degrades to concatenation, and the metadata reports the strategy that
    /// actually produced the answer.
    pub async fn merge(
        &self,
        results: &HashMap<Intent, AgentResponse>,
        original_query: &str,
        sub_queries: &[SubQuery],
        strategy: MergeStrategy,
    ) -> Result<MergedResponse> {
        let started = Instant::now();

        let sections: Vec<Section<'_>> = sub_queries
            .iter()
            .filter_map(|sq| {
                results.get(&sq.intent).map(|response| Section {
                    intent: sq.intent,
                    sub_query: sq.sub_query.as_str(),
                    response,
                })
            })
            .collect();

        if sections.is_empty() {
            return Err(Error::Merge("no agent responses to merge".to_string()));
        }

        let (answer, applied) = match strategy {
            MergeStrategy::Concatenation => (concatenate(&sections), strategy),
            MergeStrategy::Structured => (structured(&sections), strategy),
            MergeStrategy::LlmSynthesis => match self.synthesize(original_query, &sections).await {
                Ok(answer) => (answer, strategy),
                Err(e) => {
                    tracing::warn!(error = %e, "Synthesis unavailable, falling back to concatenation");
                    (concatenate(&sections), MergeStrategy::Concatenation)
                }
            },
        };

        let execution_ms = sections
            .iter()
            .map(|s| s.response.metadata.timings.total_ms)
            .sum::<u64>();

        let sources = sections
            .iter()
            .map(|s| IntentSources {
                intent: s.intent,
                agent: s.response.metadata.agent.clone(),
                sources: s.response.sources.clone(),
            })
            .collect();
        let agents = sections.iter().map(|s| s.response.metadata.agent.clone()).collect();
        let intents = sections.iter().map(|s| s.intent).collect();

        let merge_ms = started.elapsed().as_millis() as u64;

        tracing::debug!(
            strategy = %applied,
            sections = sections.len(),
            execution_ms,
            merge_ms,
            "Merged agent responses"
        );

        Ok(MergedResponse {
            answer,
            sources,
            metadata: MergeMetadata {
                agents,
                intents,
                merge_strategy: applied,
                timings: MergeTimings {
                    execution_ms,
                    merge_ms,
                    total_ms: execution_ms + merge_ms,
                },
            },
        })
    }

    async fn synthesize(&self, original_query: &str, sections: &[Section<'_>]) -> Result<String> {
        let llm = self
            .synthesis_llm
            .as_ref()
            .ok_or_else(|| Error::Merge("no synthesis model configured".to_string()))?;

        let labeled = sections
            .iter()
            .map(|s| {
                (
                    prompts::section_label(s.intent, s.sub_query),
                    s.response.metadata.agent.clone(),
                    s.response.answer.clone(),
                )
            })
            .collect::<Vec<_>>();

        let reply = llm.complete(&prompts::synthesis(original_query, &labeled)).await?;
        let answer = reply.content.trim();
        if answer.is_empty() {
            return Err(Error::Merge("synthesis returned an empty answer".to_string()));
        }
        Ok(answer.to_string())
    }
}

fn concatenate(sections: &[Section<'_>]) -> String {
    sections
        .iter()
        .map(|s| {
            format!(
                "{}\n\n{}",
                prompts::section_label(s.intent, s.sub_query),
                s.response.answer.trim()
            )
        })
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

fn structured(sections: &[Section<'_>]) -> String {
    let topics = sections
        .iter()
        .map(|s| s.intent.as_str().to_uppercase())
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = format!(
        "## Summary\n\nYour question covers {} topics: {}.\n",
        sections.len(),
        topics
    );
    for s in sections {
        out.push_str(&format!(
            "\n### {}: {}\n\n{}\n",
            s.intent.as_str().to_uppercase(),
            s.sub_query,
            s.response.answer.trim()
        ));
    }
    out
}

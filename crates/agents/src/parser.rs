//! Parser for domain agent replies.
//!
//! Agents answer in free text and may end the reply with marker lines:
//!
//! ```text
//! CONFIDENCE: 0.4
//! HANDOFF: legal | requires_expertise | Question about GDPR retention of payroll data
//! ```

use support_router_core::types::{HandoffReason, HandoffRequest, Intent};

const CONFIDENCE_MARKER: &str = "CONFIDENCE:";
const HANDOFF_MARKER: &str = "HANDOFF:";

/// A reply split into answer text and protocol markers.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub answer: String,
    pub confidence: Option<f64>,
    pub handoff: Option<HandoffRequest>,
}

/// Parse a raw reply from the agent serving `own_intent`.
///
/// A handoff naming the agent's own domain, `general`, or an unknown
/// domain or reason is dropped.
pub fn parse_reply(raw: &str, own_intent: Intent) -> ParsedReply {
    let mut answer_lines = Vec::new();
    let mut confidence = None;
    let mut handoff_fields: Option<(Intent, HandoffReason, String)> = None;

    for line in raw.lines() {
        let trimmed = line.trim();

        if let Some(value) = strip_marker(trimmed, CONFIDENCE_MARKER) {
            match value.parse::<f64>() {
                Ok(v) if (0.0..=1.0).contains(&v) => confidence = Some(v),
                _ => tracing::debug!(value = %value, "Ignoring malformed confidence marker"),
            }
            continue;
        }

        if let Some(value) = strip_marker(trimmed, HANDOFF_MARKER) {
            match parse_handoff(value) {
                Some((target, ..)) if target == own_intent || target == Intent::General => {
                    tracing::debug!(target = %target, "Ignoring handoff to non-delegable domain");
                }
                Some(fields) => handoff_fields = Some(fields),
                None => tracing::debug!(value = %value, "Ignoring malformed handoff marker"),
            }
            continue;
        }

        answer_lines.push(line);
    }

    let answer = answer_lines.join("\n").trim().to_string();

    let handoff = handoff_fields.map(|(target, reason, context)| {
        let mut request = HandoffRequest::new(target, reason, context);
        request.confidence = confidence;
        if !answer.is_empty() {
            request.partial_answer = Some(answer.clone());
        }
        request
    });

    ParsedReply {
        answer,
        confidence,
        handoff,
    }
}

fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let head = line.get(..marker.len())?;
    if head.eq_ignore_ascii_case(marker) {
        Some(line[marker.len()..].trim())
    } else {
        None
    }
}

fn parse_handoff(value: &str) -> Option<(Intent, HandoffReason, String)> {
    let mut parts = value.splitn(3, '|').map(str::trim);
    let target = parts.next()?.parse::<Intent>().ok()?;
    let reason = parts.next()?.parse::<HandoffReason>().ok()?;
    let context = parts.next().unwrap_or_default().to_string();
    Some((target, reason, context))
}

//! Prompt templates used by the classifier, the merger and the handoff chain.

use support_router_core::types::{ChatTurn, HandoffRequest, Intent};

use crate::history::format_transcript;

const DOMAIN_GUIDE: &str = "\
- hr: benefits, health insurance, leave and vacation, payroll policy, onboarding, performance reviews
- it: accounts, passwords, VPN, laptops and devices, software access, outages
- finance: refunds, invoices, expenses, reimbursements, payments, budgets
- legal: privacy, data protection, contracts, terms of service, compliance
- general: greetings or anything that fits none of the above";

/// Empty-input clarification prompt sent straight to the IT agent.
pub const CLARIFICATION_PROMPT: &str = "The user sent an empty message. \
Greet them briefly and ask them to describe the problem they need help with.";

fn history_block(history: &[ChatTurn]) -> String {
    if history.is_empty() {
        return String::new();
    }
    format!(
        "Conversation so far:\n{}\n\n\
         If the question is a short follow-up, classify it into the domain the \
         conversation is about.\n\n",
        format_transcript(history)
    )
}

/// Single-intent classification prompt.
pub fn single_intent(question: &str, history: &[ChatTurn]) -> String {
    format!(
        "You route employee and customer support questions.\n\
         Classify the question into exactly one domain.\n\n\
         Domains:\n{guide}\n\n\
         {history}\
         Give a confidence between 0 and 1 and one line of reasoning.\n\n\
         Question: {question}",
        guide = DOMAIN_GUIDE,
        history = history_block(history),
        question = question.trim(),
    )
}

/// Multi-intent decomposition prompt.
pub fn multi_intent(question: &str, history: &[ChatTurn]) -> String {
    format!(
        "You route employee and customer support questions.\n\
         Decide whether the question covers more than one domain.\n\n\
         Domains:\n{guide}\n\n\
         {history}\
         Return one item per distinct domain. Each item's subQuery must be a \
         self-contained question that can be answered without the rest of the \
         original message. If you are unsure whether the question is one topic \
         or two, split it. Set requiresMultipleAgents to true only when there is \
         more than one item, and name the dominant domain as primaryIntent.\n\n\
         Question: {question}",
        guide = DOMAIN_GUIDE,
        history = history_block(history),
        question = question.trim(),
    )
}

/// Label used for one intent's section in merged answers.
pub fn section_label(intent: Intent, sub_query: &str) -> String {
    format!("[{} - {}]", intent.as_str().to_uppercase(), sub_query)
}

/// Synthesis prompt over labeled per-agent answers.
pub fn synthesis(original_query: &str, labeled_answers: &[(String, String, String)]) -> String {
    let answers = labeled_answers
        .iter()
        .map(|(label, agent, answer)| format!("{} (answered by {})\n{}", label, agent, answer))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Several support specialists each answered part of one question.\n\n\
         Original question: {original_query}\n\n\
         Specialist answers:\n{answers}\n\n\
         Write one coherent answer to the original question. Cover every \
         sub-topic. Where the answers conflict, prefer the most specific one. \
         Remove repetition. Do not mention the specialists.",
    )
}

/// Prompt handed to the target of a handoff.
pub fn handoff(
    request: &HandoffRequest,
    original_query: &str,
    previous_agent: &str,
    partial_answer: Option<&str>,
) -> String {
    let partial = partial_answer
        .filter(|a| !a.trim().is_empty())
        .unwrap_or("(no answer was given)");

    format!(
        "This question was handed over to you by the {previous_agent} team.\n\n\
         Original question: {original_query}\n\
         Handoff reason: {reason}\n\
         Their answer so far: {partial}\n\
         Notes from {previous_agent}: {context}\n\n\
         Answer the original question from your own domain, building on what \
         was already said.",
        reason = request.reason,
        context = request.context,
    )
}

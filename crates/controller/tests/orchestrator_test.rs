mod common;

use std::sync::Arc;
use std::time::Duration;

use support_router_controller::{ConversationBuffer, Orchestrator};
use support_router_core::mocks::{KeywordLlm, MockAgent, MockLlm, StaticMemory};
use support_router_core::types::{
    Classification, Intent, MergeStrategy, MultiIntentClassification, MultiIntentItem, RoutedTo,
};
use support_router_core::Error;

use common::*;

fn item(intent: Intent, sub_query: &str) -> MultiIntentItem {
    MultiIntentItem {
        intent,
        confidence: 0.9,
        sub_query: sub_query.to_string(),
        reasoning: None,
    }
}

// =============================================================================
// Empty input
// =============================================================================

#[tokio::test]
async fn test_empty_question_goes_to_it_without_classification() {
    let llm = Arc::new(KeywordLlm::new());
    let agents = domain_agents();
    let orchestrator = eager(llm.clone(), &agents);

    for question in ["", "   "] {
        let response = orchestrator.process(question, None).await.unwrap();
        assert_eq!(response.intent, Intent::It);
        assert_eq!(response.routed_to, RoutedTo::Agent("it".to_string()));
        match &response.classification {
            Classification::Single(c) => {
                assert_eq!(c.confidence, 0.5);
                assert!(c.reasoning.is_some());
            }
            other => panic!("unexpected classification {:?}", other),
        }
    }

    assert_eq!(llm.call_count(), 0);
    assert_eq!(agents[1].invocations(), 2);
}

// =============================================================================
// Single-topic path
// =============================================================================

#[tokio::test]
async fn test_single_topic_routes_to_classified_agent() {
    let agents = domain_agents();
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &agents);

    let response = orchestrator
        .process("When will I receive my refund?", None)
        .await
        .unwrap();

    assert_eq!(response.intent, Intent::Finance);
    assert!(response.intents.is_none());
    assert_eq!(response.routed_to, RoutedTo::Agent("finance".to_string()));
    assert_eq!(response.answer(), FINANCE_ANSWER);
    assert_eq!(response.handoff_occurred, None);
    assert_eq!(agents[2].queries(), vec!["When will I receive my refund?".to_string()]);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["intent"], "finance");
    assert!(json.get("intents").is_none());
    assert!(json.get("handoffOccurred").is_none());
}

#[tokio::test]
async fn test_follow_up_uses_conversation_memory() {
    let agents = domain_agents();
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &agents);
    let memory = ConversationBuffer::new();
    memory
        .record_exchange("What are the health insurance benefits?", HR_ANSWER)
        .await;

    let response = orchestrator.process("How do I apply?", Some(&memory)).await.unwrap();

    assert_eq!(response.intent, Intent::Hr);
    assert_eq!(agents[0].invocations(), 1);
}

#[tokio::test]
async fn test_memory_failure_does_not_fail_request() {
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &domain_agents());
    let memory = StaticMemory::failing();

    let response = orchestrator
        .process("How do I reset my password?", Some(&memory))
        .await
        .unwrap();

    assert_eq!(response.intent, Intent::It);
}

#[tokio::test]
async fn test_unresolvable_intent_falls_back_to_it() {
    let it = Arc::new(MockAgent::answering("it", IT_ANSWER));
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &[it.clone()]);

    let response = orchestrator
        .process("What is your privacy policy?", None)
        .await
        .unwrap();

    assert_eq!(response.intent, Intent::Legal);
    assert_eq!(response.routed_to, RoutedTo::Agent("it".to_string()));
    assert_eq!(response.answer(), IT_ANSWER);
    assert_eq!(it.invocations(), 1);
}

#[tokio::test]
async fn test_general_intent_falls_back_to_it() {
    let agents = domain_agents();
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &agents);

    let response = orchestrator.process("Hello there!", None).await.unwrap();

    assert_eq!(response.intent, Intent::General);
    assert_eq!(response.routed_to, RoutedTo::Agent("it".to_string()));
}

#[tokio::test]
async fn test_fallback_path_ignores_handoff_requests() {
    let it = handing_off("it", "Not sure, ask legal.", Intent::Legal);
    let legal = Arc::new(MockAgent::answering("legal", LEGAL_ANSWER));
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &[it, legal.clone()]);

    let response = orchestrator.process("Hello there!", None).await.unwrap();

    assert_eq!(response.answer(), "Not sure, ask legal.");
    assert_eq!(response.handoff_occurred, None);
    assert_eq!(legal.invocations(), 0);
}

#[tokio::test]
async fn test_missing_fallback_agent_is_orchestration_error() {
    let hr = Arc::new(MockAgent::answering("hr", HR_ANSWER));
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &[hr]);

    let err = orchestrator
        .process("How do I reset my password?", None)
        .await
        .unwrap_err();

    assert!(err.is_orchestration());
    assert!(matches!(err.cause(), Some(Error::AgentResolution(name)) if name == "it"));
}

#[tokio::test]
async fn test_agent_failure_propagates_with_cause() {
    let it = Arc::new(MockAgent::failing("it", "upstream timeout"));
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &[it]);

    let err = orchestrator
        .process("How do I reset my password?", None)
        .await
        .unwrap_err();

    assert!(err.is_orchestration());
    assert!(matches!(err.cause(), Some(Error::AgentInvocation { agent, .. }) if agent == "it"));
}

#[tokio::test]
async fn test_classification_failure_is_fatal() {
    let orchestrator = Orchestrator::builder()
        .with_classifier_llm(Arc::new(MockLlm::failing("provider down")))
        .with_agents(as_dyn(&domain_agents()))
        .build()
        .unwrap();

    let err = orchestrator
        .process("How do I reset my password?", None)
        .await
        .unwrap_err();

    assert!(err.is_orchestration());
    assert!(matches!(err.cause(), Some(Error::Classification(_))));
}

// =============================================================================
// Multi-topic path
// =============================================================================

#[tokio::test]
async fn test_multi_topic_fans_out_and_merges() {
    let agents = domain_agents();
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &agents);

    let response = orchestrator
        .process(
            "What are the health insurance benefits and how do I reset my password?",
            None,
        )
        .await
        .unwrap();

    assert!(response.is_multi());
    assert_eq!(response.intent, Intent::Hr);
    assert_eq!(response.intents, Some(vec![Intent::Hr, Intent::It]));
    assert_eq!(
        response.routed_to,
        RoutedTo::Agents(vec!["hr".to_string(), "it".to_string()])
    );

    let merged = response.agent_response.as_merged().expect("merged response");
    assert!(merged.answer.contains(HR_ANSWER));
    assert!(merged.answer.contains(IT_ANSWER));
    assert_eq!(merged.sources.len(), 2);
    assert_eq!(merged.metadata.merge_strategy, MergeStrategy::Concatenation);
    assert_eq!(merged.metadata.timings.execution_ms, 50);

    assert_eq!(agents[0].queries(), vec!["What are the health insurance benefits?".to_string()]);
    assert_eq!(agents[1].queries(), vec!["How do I reset my password?".to_string()]);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["intents"], serde_json::json!(["hr", "it"]));
    assert_eq!(json["routedTo"], serde_json::json!(["hr", "it"]));
}

#[tokio::test]
async fn test_multi_topic_reports_primary_intent() {
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &domain_agents());
    let classification = MultiIntentClassification {
        intents: vec![item(Intent::Hr, "Q1"), item(Intent::Legal, "Q2")],
        requires_multiple_agents: true,
        primary_intent: Some(Intent::Legal),
    };

    let response = orchestrator
        .process_multi_topic("Q1 and Q2", &classification, None)
        .await
        .unwrap();

    assert_eq!(response.intent, Intent::Legal);
}

#[tokio::test]
async fn test_multi_topic_skips_unresolvable_items() {
    let hr = Arc::new(MockAgent::answering("hr", HR_ANSWER));
    let it = Arc::new(MockAgent::answering("it", IT_ANSWER));
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &[hr, it]);
    let classification = MultiIntentClassification {
        intents: vec![
            item(Intent::Hr, "Q1"),
            item(Intent::Finance, "Q2"),
            item(Intent::General, "Q3"),
        ],
        requires_multiple_agents: true,
        primary_intent: None,
    };

    let response = orchestrator
        .process_multi_topic("Q1 Q2 Q3", &classification, None)
        .await
        .unwrap();

    assert_eq!(response.routed_to, RoutedTo::Agents(vec!["hr".to_string()]));
    let merged = response.agent_response.as_merged().unwrap();
    assert_eq!(merged.metadata.intents, vec![Intent::Hr]);
}

#[tokio::test]
async fn test_multi_topic_folds_items_sharing_an_intent() {
    let agents = domain_agents();
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &agents);
    let classification = MultiIntentClassification {
        intents: vec![
            item(Intent::Hr, "How much leave do I get?"),
            item(Intent::It, "How do I reset my password?"),
            item(Intent::Hr, "How many sick days do I have?"),
        ],
        requires_multiple_agents: true,
        primary_intent: None,
    };

    let response = orchestrator
        .process_multi_topic("leave, password and sick days", &classification, None)
        .await
        .unwrap();

    assert_eq!(agents[0].invocations(), 1);
    assert_eq!(
        agents[0].queries(),
        vec!["How much leave do I get? How many sick days do I have?".to_string()]
    );
    assert_eq!(response.intents, Some(vec![Intent::Hr, Intent::It]));

    let merged = response.agent_response.as_merged().unwrap();
    assert_eq!(merged.metadata.intents, vec![Intent::Hr, Intent::It]);
    assert_eq!(merged.answer.matches(HR_ANSWER).count(), 1);
    assert_eq!(merged.metadata.timings.execution_ms, 50);
}

#[tokio::test]
async fn test_multi_topic_with_no_resolvable_agent_fails() {
    let it = Arc::new(MockAgent::answering("it", IT_ANSWER));
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &[it.clone()]);
    let classification = MultiIntentClassification {
        intents: vec![item(Intent::Hr, "Q1"), item(Intent::Legal, "Q2")],
        requires_multiple_agents: true,
        primary_intent: None,
    };

    let err = orchestrator
        .process_multi_topic("Q1 and Q2", &classification, None)
        .await
        .unwrap_err();

    assert!(err.is_orchestration());
    assert!(matches!(err.cause(), Some(Error::EmptyResultSet)));
    assert_eq!(it.invocations(), 0);
}

#[tokio::test]
async fn test_multi_topic_rejects_when_one_agent_fails() {
    let hr = Arc::new(MockAgent::answering("hr", HR_ANSWER));
    let it = Arc::new(MockAgent::failing("it", "vector store unreachable"));
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &[hr, it]);
    let classification = MultiIntentClassification {
        intents: vec![item(Intent::Hr, "Q1"), item(Intent::It, "Q2")],
        requires_multiple_agents: true,
        primary_intent: None,
    };

    let result = orchestrator
        .process_multi_topic("Q1 and Q2", &classification, None)
        .await;

    let err = result.unwrap_err();
    assert!(err.is_orchestration());
    assert!(matches!(err.cause(), Some(Error::AgentInvocation { agent, .. }) if agent == "it"));
}

#[tokio::test(start_paused = true)]
async fn test_multi_topic_agents_run_concurrently() {
    let hr = Arc::new(MockAgent::answering("hr", HR_ANSWER).with_delay(Duration::from_millis(200)));
    let it = Arc::new(MockAgent::answering("it", IT_ANSWER).with_delay(Duration::from_millis(200)));
    let finance = Arc::new(
        MockAgent::answering("finance", FINANCE_ANSWER).with_delay(Duration::from_millis(200)),
    );
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &[hr, it, finance]);
    let classification = MultiIntentClassification {
        intents: vec![
            item(Intent::Hr, "Q1"),
            item(Intent::It, "Q2"),
            item(Intent::Finance, "Q3"),
        ],
        requires_multiple_agents: true,
        primary_intent: None,
    };

    let started = tokio::time::Instant::now();
    orchestrator
        .process_multi_topic("Q1, Q2 and Q3", &classification, None)
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn test_failed_batch_does_not_wait_for_slow_sibling() {
    let slow = Arc::new(MockAgent::answering("hr", HR_ANSWER).with_delay(Duration::from_secs(60)));
    let failing = Arc::new(MockAgent::failing("it", "boom"));
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &[slow, failing]);
    let classification = MultiIntentClassification {
        intents: vec![item(Intent::Hr, "Q1"), item(Intent::It, "Q2")],
        requires_multiple_agents: true,
        primary_intent: None,
    };

    let started = tokio::time::Instant::now();
    let result = orchestrator
        .process_multi_topic("Q1 and Q2", &classification, None)
        .await;

    assert!(result.is_err());
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[tokio::test]
async fn test_structured_strategy_is_applied() {
    let orchestrator = Orchestrator::builder()
        .with_classifier_llm(Arc::new(KeywordLlm::new()))
        .with_agents(as_dyn(&domain_agents()))
        .with_merge_strategy(MergeStrategy::Structured)
        .build()
        .unwrap();

    let response = orchestrator
        .process("Where is my refund and what are the terms of my contract?", None)
        .await
        .unwrap();

    let merged = response.agent_response.as_merged().unwrap();
    assert!(merged.answer.starts_with("## Summary"));
    assert_eq!(merged.metadata.intents, vec![Intent::Finance, Intent::Legal]);
}

// =============================================================================
// Agent resolution
// =============================================================================

#[tokio::test]
async fn test_lazy_mode_constructs_only_referenced_agents() {
    let registry = Arc::new(registry_of(&domain_agents()));
    let orchestrator = Orchestrator::builder()
        .with_classifier_llm(Arc::new(KeywordLlm::new()))
        .with_registry(registry.clone())
        .build()
        .unwrap();

    assert!(registry.loaded().is_empty());

    let response = orchestrator
        .process("When will I receive my refund?", None)
        .await
        .unwrap();

    assert_eq!(response.answer(), FINANCE_ANSWER);
    assert_eq!(registry.loaded(), vec!["finance".to_string()]);

    assert_eq!(orchestrator.agents().len(), 4);
    assert_eq!(registry.loaded().len(), 4);
}

#[tokio::test]
async fn test_introspection() {
    let orchestrator = eager(Arc::new(KeywordLlm::new()), &domain_agents());

    let names: Vec<String> = orchestrator.agents().iter().map(|a| a.name().to_string()).collect();
    assert_eq!(names, vec!["hr", "it", "finance", "legal"]);

    assert_eq!(orchestrator.agent("legal").unwrap().name(), "legal");
    assert!(orchestrator.agent("marketing").is_none());
    assert_eq!(orchestrator.agent_by_intent(Intent::Hr).unwrap().name(), "hr");
    assert!(orchestrator.agent_by_intent(Intent::General).is_none());
}

#[tokio::test]
async fn test_lazy_lookup_of_unregistered_agent() {
    let agents = domain_agents();
    let registry = Arc::new(registry_of(&agents[..2]));
    let orchestrator = Orchestrator::builder()
        .with_classifier_llm(Arc::new(KeywordLlm::new()))
        .with_registry(registry.clone())
        .build()
        .unwrap();

    assert!(orchestrator.agent("legal").is_none());
    assert!(orchestrator.agent_by_intent(Intent::Finance).is_none());
    assert!(registry.loaded().is_empty());

    assert_eq!(orchestrator.agent("it").unwrap().name(), "it");
    assert_eq!(registry.loaded(), vec!["it".to_string()]);
}

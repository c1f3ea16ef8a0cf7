//! End-to-end tests of the wired application with scripted models.

use std::sync::Arc;

use support_router::{build_orchestrator, load_knowledge};
use support_router_controller::ConversationBuffer;
use support_router_core::config::AppConfig;
use support_router_core::mocks::{KeywordLlm, MockLlm};
use support_router_core::types::{Intent, MergeStrategy, RoutedTo};

fn config(lazy: bool) -> AppConfig {
    let mut config = AppConfig::default();
    config.agents.knowledge_dir = format!("{}/knowledge", env!("CARGO_MANIFEST_DIR"));
    config.orchestrator.lazy_agents = lazy;
    config
}

#[tokio::test]
async fn test_single_question_end_to_end() {
    for lazy in [true, false] {
        let config = config(lazy);
        let knowledge = load_knowledge(&config.agents).await.unwrap();
        let orchestrator = build_orchestrator(
            &config,
            Arc::new(MockLlm::constant("Use the self-service portal.\nCONFIDENCE: 0.9")),
            Arc::new(KeywordLlm::new()),
            knowledge,
        )
        .unwrap();

        let response = orchestrator
            .process("How do I reset my password?", None)
            .await
            .unwrap();

        assert_eq!(response.intent, Intent::It);
        assert_eq!(response.routed_to, RoutedTo::Agent("it".to_string()));
        assert_eq!(response.answer(), "Use the self-service portal.");

        let agent_response = response.agent_response.as_single().unwrap();
        assert_eq!(agent_response.confidence, Some(0.9));
        assert_eq!(agent_response.sources[0].title, "Password reset");
    }
}

#[tokio::test]
async fn test_multi_topic_question_end_to_end() {
    let config = config(true);
    let knowledge = load_knowledge(&config.agents).await.unwrap();
    let orchestrator = build_orchestrator(
        &config,
        Arc::new(MockLlm::constant("Here is what applies to you.")),
        Arc::new(KeywordLlm::new()),
        knowledge,
    )
    .unwrap();

    let response = orchestrator
        .process(
            "What are the health insurance benefits and how do I reset my password?",
            None,
        )
        .await
        .unwrap();

    assert_eq!(response.intents, Some(vec![Intent::Hr, Intent::It]));
    let merged = response.agent_response.as_merged().unwrap();
    assert_eq!(merged.metadata.merge_strategy, MergeStrategy::Concatenation);
    assert!(merged.answer.contains("[HR - What are the health insurance benefits?]"));
    assert!(merged.answer.contains("[IT - How do I reset my password?]"));
    assert_eq!(merged.sources[0].sources[0].title, "Health insurance benefits");
}

#[tokio::test]
async fn test_handoff_end_to_end() {
    let config = config(false);
    let knowledge = load_knowledge(&config.agents).await.unwrap();
    let orchestrator = build_orchestrator(
        &config,
        Arc::new(MockLlm::constant(
            "Payroll records are kept for seven years.\n\
             HANDOFF: legal | requires_expertise | Employee asks about the legal basis",
        )),
        Arc::new(KeywordLlm::new()),
        knowledge,
    )
    .unwrap();

    let response = orchestrator
        .process("How long is payroll data retained?", None)
        .await
        .unwrap();

    assert_eq!(response.intent, Intent::Hr);
    assert_eq!(response.handoff_occurred, Some(true));
    assert_eq!(
        response.handoff_chain,
        Some(vec!["hr".to_string(), "legal".to_string()])
    );
    assert_eq!(response.agent_response.as_single().unwrap().agent(), "legal");
}

#[tokio::test]
async fn test_follow_up_with_memory_end_to_end() {
    let config = config(true);
    let knowledge = load_knowledge(&config.agents).await.unwrap();
    let orchestrator = build_orchestrator(
        &config,
        Arc::new(MockLlm::constant("Enroll in the benefits portal.")),
        Arc::new(KeywordLlm::new()),
        knowledge,
    )
    .unwrap();

    let memory = ConversationBuffer::new();
    let first = orchestrator
        .process("What are the health insurance benefits?", Some(&memory))
        .await
        .unwrap();
    memory
        .record_exchange("What are the health insurance benefits?", first.answer())
        .await;

    let follow_up = orchestrator.process("How do I apply?", Some(&memory)).await.unwrap();
    assert_eq!(follow_up.intent, Intent::Hr);
}

#[tokio::test]
async fn test_missing_knowledge_dir_yields_empty_bases() {
    let mut config = config(true);
    config.agents.knowledge_dir = "does-not-exist".to_string();

    let knowledge = load_knowledge(&config.agents).await.unwrap();
    assert_eq!(knowledge.len(), 4);

    let orchestrator = build_orchestrator(
        &config,
        Arc::new(MockLlm::constant("I could not find that in our documents.")),
        Arc::new(KeywordLlm::new()),
        knowledge,
    )
    .unwrap();

    let response = orchestrator.process("Where is my refund?", None).await.unwrap();
    assert!(response.agent_response.as_single().unwrap().sources.is_empty());
}

#[tokio::test]
async fn test_malformed_knowledge_file_is_an_error() {
    let dir = std::env::temp_dir().join(format!("support-router-kb-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join("hr.json"), "{ not a list").await.unwrap();

    let mut config = config(true);
    config.agents.knowledge_dir = dir.display().to_string();

    let result = load_knowledge(&config.agents).await;
    tokio::fs::remove_dir_all(&dir).await.unwrap();

    assert!(result.is_err());
}

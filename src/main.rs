#![deny(unused)]
//! Support Router CLI.
//!
//! Answers one question given on the command line and prints the routing
//! result as JSON.

use std::sync::Arc;

use support_router::{build_orchestrator, configure_tracing, load_knowledge};
use support_router_core::config::AppConfig;
use support_router_core::traits::LlmClient;
use support_router_model_gateway::{create_classifier_client, create_client_from_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    configure_tracing(&config.logging)?;

    tracing::info!("Starting Support Router v{}", env!("CARGO_PKG_VERSION"));

    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");

    let llm: Arc<dyn LlmClient> = Arc::new(create_client_from_config(&config.model_gateway)?);
    let classifier_llm: Arc<dyn LlmClient> = Arc::new(create_classifier_client(&config.model_gateway)?);
    tracing::info!(
        provider = %config.model_gateway.provider,
        model = %llm.model_name(),
        classifier_model = %classifier_llm.model_name(),
        "Model gateway initialized"
    );

    let knowledge = load_knowledge(&config.agents).await?;
    let orchestrator = build_orchestrator(&config, llm, classifier_llm, knowledge)?;
    tracing::info!(
        lazy = config.orchestrator.lazy_agents,
        merge_strategy = %config.orchestrator.merge_strategy,
        max_handoff_depth = config.orchestrator.max_handoff_depth,
        "Orchestrator ready"
    );

    let response = orchestrator.process(&question, None).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

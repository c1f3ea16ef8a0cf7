//! Assembly of agents and the orchestrator from configuration.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use support_router_agents::{DomainAgent, DomainProfile, StaticKnowledgeBase};
use support_router_controller::{AgentRegistry, Orchestrator};
use support_router_core::config::{AgentsConfig, AppConfig};
use support_router_core::traits::{Agent, KnowledgeBase, LlmClient};
use support_router_core::types::Intent;
use support_router_core::Result;

/// Load `<knowledge_dir>/<domain>.json` for every domain.
///
/// A missing file yields an empty knowledge base; a malformed one is an error.
pub async fn load_knowledge(config: &AgentsConfig) -> Result<HashMap<Intent, Arc<dyn KnowledgeBase>>> {
    let mut bases: HashMap<Intent, Arc<dyn KnowledgeBase>> = HashMap::new();

    for profile in DomainProfile::all() {
        let path = Path::new(&config.knowledge_dir).join(format!("{}.json", profile.name));
        let base = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let base = StaticKnowledgeBase::load(profile.name.as_str(), &path).await?;
            tracing::info!(domain = %profile.name, documents = base.len(), "Loaded knowledge base");
            base
        } else {
            tracing::warn!(domain = %profile.name, path = %path.display(), "Knowledge file not found, using empty knowledge base");
            StaticKnowledgeBase::empty(profile.name.as_str())
        };
        bases.insert(profile.intent, Arc::new(base));
    }

    Ok(bases)
}

fn domain_agent(
    profile: DomainProfile,
    llm: &Arc<dyn LlmClient>,
    knowledge: &HashMap<Intent, Arc<dyn KnowledgeBase>>,
    top_k: usize,
) -> Arc<dyn Agent> {
    let base = knowledge
        .get(&profile.intent)
        .cloned()
        .unwrap_or_else(|| Arc::new(StaticKnowledgeBase::empty(profile.name.as_str())));
    Arc::new(DomainAgent::new(profile, llm.clone(), base).with_top_k(top_k))
}

/// Build the orchestrator with the four domain agents.
///
/// With `orchestrator.lazy_agents` the agents are registered as factories
/// and built on first use; otherwise they are built here.
pub fn build_orchestrator(
    config: &AppConfig,
    llm: Arc<dyn LlmClient>,
    classifier_llm: Arc<dyn LlmClient>,
    knowledge: HashMap<Intent, Arc<dyn KnowledgeBase>>,
) -> Result<Orchestrator> {
    let top_k = config.agents.top_k;
    let builder = Orchestrator::builder()
        .with_config(&config.orchestrator)
        .with_classifier_llm(classifier_llm)
        .with_synthesis_llm(llm.clone());

    let builder = if config.orchestrator.lazy_agents {
        let knowledge = Arc::new(knowledge);
        let mut registry = AgentRegistry::new();
        for profile in DomainProfile::all() {
            let llm = llm.clone();
            let knowledge = knowledge.clone();
            let name = profile.name.clone();
            registry.register(name, move || Ok(domain_agent(profile.clone(), &llm, &knowledge, top_k)));
        }
        tracing::info!(agents = registry.names().len(), "Registered agents for lazy construction");
        builder.with_registry(Arc::new(registry))
    } else {
        let agents = DomainProfile::all()
            .into_iter()
            .map(|profile| domain_agent(profile, &llm, &knowledge, top_k));
        builder.with_agents(agents)
    };

    builder.build()
}

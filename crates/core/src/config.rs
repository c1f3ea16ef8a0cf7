use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::types::MergeStrategy;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub orchestrator: OrchestratorConfig,
    pub model_gateway: ModelGatewayConfig,
    pub agents: AgentsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrchestratorConfig {
    /// Maximum agents in one request's handoff chain, originator included.
    pub max_handoff_depth: usize,
    pub merge_strategy: MergeStrategy,
    /// Most recent conversation turns given to the classifier.
    pub history_limit: usize,
    /// Build agents on first use instead of at startup.
    pub lazy_agents: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelGatewayConfig {
    /// `openai` or `anthropic`.
    pub provider: String,
    pub model: String,
    pub temperature: Option<f32>,
    /// Cheaper model for classification; falls back to `model`.
    pub classifier_model: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentsConfig {
    /// Sources retrieved per query.
    pub top_k: usize,
    /// Directory holding `<domain>.json` knowledge files.
    pub knowledge_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let env = std::env::var("SUPPORT_ROUTER_ENV").unwrap_or_else(|_| "development".into());

        let s = Self::with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__ORCHESTRATOR__MAX_HANDOFF_DEPTH=3 to orchestrator.max_handoff_depth
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(s.try_deserialize()?)
    }

    /// Seed a builder with `AppConfig::default()` so partial files still deserialize.
    fn with_defaults(builder: ConfigBuilder<DefaultState>) -> Result<ConfigBuilder<DefaultState>> {
        let d = Self::default();
        Ok(builder
            .set_default("orchestrator.max_handoff_depth", d.orchestrator.max_handoff_depth as i64)?
            .set_default("orchestrator.merge_strategy", d.orchestrator.merge_strategy.as_str())?
            .set_default("orchestrator.history_limit", d.orchestrator.history_limit as i64)?
            .set_default("orchestrator.lazy_agents", d.orchestrator.lazy_agents)?
            .set_default("model_gateway.provider", d.model_gateway.provider)?
            .set_default("model_gateway.model", d.model_gateway.model)?
            .set_default("model_gateway.temperature", d.model_gateway.temperature.map(f64::from))?
            .set_default("agents.top_k", d.agents.top_k as i64)?
            .set_default("agents.knowledge_dir", d.agents.knowledge_dir)?
            .set_default("logging.filter", d.logging.filter)?
            .set_default("logging.json", d.logging.json)?)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorConfig {
                max_handoff_depth: 2,
                merge_strategy: MergeStrategy::Concatenation,
                history_limit: 10,
                lazy_agents: true,
            },
            model_gateway: ModelGatewayConfig {
                provider: "openai".into(),
                model: "gpt-4o-mini".into(),
                temperature: Some(0.2),
                classifier_model: None,
            },
            agents: AgentsConfig {
                top_k: 4,
                knowledge_dir: "knowledge".into(),
            },
            logging: LoggingConfig {
                filter: "info,support_router=debug".into(),
                json: false,
            },
        }
    }
}

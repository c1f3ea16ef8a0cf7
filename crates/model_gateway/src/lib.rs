#![deny(unused)]
//! Model gateway for the support router.
//!
//! This crate provides the generation collaborator used by the classifier,
//! the synthesis merge strategy and the domain agents:
//! - Rig LLM client adapter (OpenAI, Anthropic)
//! - Client construction from configuration

pub mod rig_client;

pub use rig_client::{RigConfig, RigLlmClient, RigProvider};

use support_router_core::config::ModelGatewayConfig;

/// Create the answering client described by configuration.
pub fn create_client_from_config(config: &ModelGatewayConfig) -> support_router_core::Result<RigLlmClient> {
    let provider: RigProvider = config.provider.parse()?;
    let mut rig_cfg = RigConfig::new(provider, &config.model);
    if let Some(temperature) = config.temperature {
        rig_cfg = rig_cfg.with_temperature(temperature);
    }
    rig_cfg.ensure_api_key()?;
    Ok(RigLlmClient::new(rig_cfg))
}

/// Create the classification client, preferring `classifier_model` when set.
///
/// Classification runs at temperature 0 so repeated questions classify the same way.
pub fn create_classifier_client(config: &ModelGatewayConfig) -> support_router_core::Result<RigLlmClient> {
    let provider: RigProvider = config.provider.parse()?;
    let model = config.classifier_model.as_deref().unwrap_or(&config.model);
    let rig_cfg = RigConfig::new(provider, model).with_temperature(0.0);
    rig_cfg.ensure_api_key()?;
    Ok(RigLlmClient::new(rig_cfg))
}

//! Rig LLM client adapter.
//!
//! Wraps Rig's Agent for integration with our LlmClient trait.

use async_trait::async_trait;
use std::str::FromStr;

use support_router_core::{
    traits::{ChatMessage, LlmClient, LlmResponse},
    types::TokenUsage,
    Error, Result,
};

// Import required Rig traits
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;

/// Provider type for Rig clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigProvider {
    OpenAI,
    Anthropic,
}

impl RigProvider {
    /// Environment variable holding the provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl FromStr for RigProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(Error::model_provider(format!("Unsupported provider: {}", other))),
        }
    }
}

/// Configuration for Rig client.
#[derive(Debug, Clone)]
pub struct RigConfig {
    /// Provider to use.
    pub provider: RigProvider,
    /// Model name.
    pub model: String,
    /// System prompt.
    pub system_prompt: Option<String>,
    /// Temperature (0.0 - 1.0).
    pub temperature: Option<f32>,
    /// Max tokens.
    pub max_tokens: Option<u32>,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            provider: RigProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            system_prompt: None,
            temperature: Some(0.2),
            max_tokens: Some(2048),
        }
    }
}

impl RigConfig {
    /// Create config for a provider and model.
    pub fn new(provider: RigProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            ..Default::default()
        }
    }

    /// Create config for OpenAI.
    pub fn openai(model: impl Into<String>) -> Self {
        Self::new(RigProvider::OpenAI, model)
    }

    /// Create config for Anthropic.
    pub fn anthropic(model: impl Into<String>) -> Self {
        Self::new(RigProvider::Anthropic, model)
    }

    /// Set system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Fail early when the provider's API key is missing.
    ///
    /// Rig's `from_env` panics without it.
    pub fn ensure_api_key(&self) -> Result<()> {
        let var = self.provider.api_key_var();
        if std::env::var(var).is_err() {
            return Err(Error::ModelProvider(format!("{} not set", var)));
        }
        Ok(())
    }
}

/// Rig-based LLM client.
///
/// This client wraps Rig's provider clients to implement our LlmClient trait,
/// providing a unified interface for generation calls across the router.
pub struct RigLlmClient {
    config: RigConfig,
}

impl RigLlmClient {
    /// Create a new Rig client with the given configuration.
    pub fn new(config: RigConfig) -> Self {
        Self { config }
    }

    /// Build messages into a prompt string.
    fn build_prompt(&self, messages: &[ChatMessage]) -> String {
        let mut prompt = String::new();

        for msg in messages {
            match msg.role.as_str() {
                "system" => {
                    prompt.push_str(&format!("System: {}\n\n", msg.content));
                }
                "user" => {
                    prompt.push_str(&format!("User: {}\n\n", msg.content));
                }
                "assistant" => {
                    prompt.push_str(&format!("Assistant: {}\n\n", msg.content));
                }
                _ => {
                    prompt.push_str(&format!("{}: {}\n\n", msg.role, msg.content));
                }
            }
        }

        prompt
    }

    fn estimate_usage(prompt: &str, response: &str) -> TokenUsage {
        TokenUsage {
            prompt_tokens: (prompt.len() / 4) as u64,
            completion_tokens: (response.len() / 4) as u64,
            total_tokens: ((prompt.len() + response.len()) / 4) as u64,
        }
    }

    /// Call OpenAI via Rig.
    async fn call_openai(&self, prompt: &str) -> Result<LlmResponse> {
        use rig::providers::openai;

        self.config.ensure_api_key()?;
        let client = openai::Client::from_env();

        let mut agent_builder = client.agent(&self.config.model);
        if let Some(ref system) = self.config.system_prompt {
            agent_builder = agent_builder.preamble(system);
        }
        if let Some(temperature) = self.config.temperature {
            agent_builder = agent_builder.temperature(temperature as f64);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            agent_builder = agent_builder.max_tokens(max_tokens as u64);
        }
        let agent = agent_builder.build();

        let response: String = agent
            .prompt(prompt)
            .await
            .map_err(|e| Error::ModelProvider(format!("OpenAI error: {}", e)))?;

        Ok(LlmResponse {
            usage: Self::estimate_usage(prompt, &response),
            content: response,
            finish_reason: "stop".to_string(),
        })
    }

    /// Call Anthropic via Rig.
    async fn call_anthropic(&self, prompt: &str) -> Result<LlmResponse> {
        use rig::providers::anthropic;

        self.config.ensure_api_key()?;
        let client = anthropic::Client::from_env();

        let mut agent_builder = client.agent(&self.config.model);
        if let Some(ref system) = self.config.system_prompt {
            agent_builder = agent_builder.preamble(system);
        }
        if let Some(temperature) = self.config.temperature {
            agent_builder = agent_builder.temperature(temperature as f64);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            agent_builder = agent_builder.max_tokens(max_tokens as u64);
        }
        let agent = agent_builder.build();

        let response: String = agent
            .prompt(prompt)
            .await
            .map_err(|e| Error::ModelProvider(format!("Anthropic error: {}", e)))?;

        Ok(LlmResponse {
            usage: Self::estimate_usage(prompt, &response),
            content: response,
            finish_reason: "stop".to_string(),
        })
    }
}

#[async_trait]
impl LlmClient for RigLlmClient {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        tracing::debug!(
            provider = ?self.config.provider,
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Calling LLM"
        );

        match self.config.provider {
            RigProvider::OpenAI => self.call_openai(prompt).await,
            RigProvider::Anthropic => self.call_anthropic(prompt).await,
        }
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse> {
        let prompt = self.build_prompt(messages);
        self.complete(&prompt).await
    }
}

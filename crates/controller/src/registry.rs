//! Lazily constructed agent registry.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

use support_router_core::{traits::Agent, Error, Result};

/// Builds an agent on first use.
pub type AgentFactory = Box<dyn Fn() -> Result<Arc<dyn Agent>> + Send + Sync>;

/// Name-keyed agent factories with an append-only instance cache.
///
/// Each name is constructed at most once: construction runs under the
/// cache's entry lock, so concurrent first lookups of the same name wait for
/// a single factory call. Factories must not resolve from the same registry.
#[derive(Default)]
pub struct AgentRegistry {
    factories: HashMap<String, AgentFactory>,
    order: Vec<String>,
    instances: DashMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any earlier one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Arc<dyn Agent>> + Send + Sync + 'static,
    {
        let name = name.into();
        if !self.order.contains(&name) {
            self.order.push(name.clone());
        }
        self.factories.insert(name, Box::new(factory));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_factory<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Agent>> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Get the agent for `name`, constructing it on first use.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Agent>> {
        if let Some(agent) = self.instances.get(name) {
            return Ok(agent.value().clone());
        }

        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::AgentResolution(name.to_string()))?;

        let entry = self
            .instances
            .entry(name.to_string())
            .or_try_insert_with(|| {
                tracing::debug!(agent = %name, "Constructing agent");
                factory()
            })?;
        Ok(entry.value().clone())
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Whether a factory exists for `name`, constructed or not.
    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Names that have been constructed, in registration order.
    pub fn loaded(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| self.instances.contains_key(name.as_str()))
            .cloned()
            .collect()
    }
}

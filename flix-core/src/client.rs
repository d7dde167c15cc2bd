//! Generation client seam and its `rig`-backed implementation.

use async_trait::async_trait;
use rig::agent::Agent;
use rig::client::{ClientBuilderError, CompletionClient};
use rig::completion::Prompt;
use rig::providers::{gemini, openrouter};
use std::sync::Arc;
use tracing::info;

use crate::config::{LlmConfig, LlmProvider};
use crate::error::{RecommendationError, Result};

const PREAMBLE: &str = "You are a movie recommendation assistant. \
You always answer with a single valid JSON document and nothing else.";

/// One request/response exchange with a text-generation service
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Builds a ready-to-use client for each attempt.
/// Missing credentials surface here, before anything goes over the wire.
pub trait GenerationProvider: Send + Sync {
    fn client(&self) -> Result<Arc<dyn GenerationClient>>;
}

/// Creates `rig` agents for the configured provider
#[derive(Debug, Clone)]
pub struct RigProvider {
    config: LlmConfig,
}

impl RigProvider {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

impl GenerationProvider for RigProvider {
    fn client(&self) -> Result<Arc<dyn GenerationClient>> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            RecommendationError::Configuration(format!(
                "API key is not configured. Make sure the {} environment variable is set.",
                self.config.provider.key_env()
            ))
        })?;

        info!(
            provider = ?self.config.provider,
            model = %self.config.model,
            "Initializing LLM agent"
        );

        let agent = match self.config.provider {
            LlmProvider::Gemini => {
                let client = gemini::Client::builder(api_key)
                    .build()
                    .map_err(build_failed)?;
                RigAgent::Gemini(client.agent(&self.config.model).preamble(PREAMBLE).build())
            }
            LlmProvider::OpenRouter => {
                let client = openrouter::Client::builder(api_key)
                    .build()
                    .map_err(build_failed)?;
                RigAgent::OpenRouter(client.agent(&self.config.model).preamble(PREAMBLE).build())
            }
        };

        Ok(Arc::new(agent))
    }
}

fn build_failed(err: ClientBuilderError) -> RecommendationError {
    RecommendationError::Configuration(format!("Could not build LLM client: {}", err))
}

enum RigAgent {
    Gemini(Agent<gemini::completion::CompletionModel>),
    OpenRouter(Agent<openrouter::CompletionModel>),
}

#[async_trait]
impl GenerationClient for RigAgent {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = match self {
            RigAgent::Gemini(agent) => agent.prompt(prompt).await,
            RigAgent::OpenRouter(agent) => agent.prompt(prompt).await,
        };
        response.map_err(|e| RecommendationError::Transport(e.to_string()))
    }
}

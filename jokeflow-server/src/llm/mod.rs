// Copyright 2025 Jokeflow Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Opaque text-generation seam.
//!
//! The pipeline only ever sees `prompt in, text out`. Providers are built
//! once from config and registered by id; the configured default is what the
//! generation pipeline runs against.

use crate::config::LlmConfig;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

mod providers;
pub use providers::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub available: bool,
    pub models: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
    pub provider: String,              // e.g., "gemini", "openai"
    pub model: String,                 // Model that served the request
    pub input_tokens: Option<u32>,     // Prompt tokens, when reported
    pub output_tokens: Option<u32>,    // Completion tokens, when reported
    pub duration_ms: u32,
}

#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// One text-generation call. No retries; errors propagate to the caller.
    async fn generate(
        &self,
        prompt: &str,
        model: Option<String>,
    ) -> anyhow::Result<GenerationResponse>;

    fn list_models(&self) -> Vec<String>;
    fn name(&self) -> &str;
}

pub struct LlmProviderManager {
    providers: DashMap<String, Arc<dyn LlmProvider>>,
    default_provider: String,
}

impl LlmProviderManager {
    pub fn new(llm_config: &LlmConfig) -> anyhow::Result<Self> {
        let providers = DashMap::new();

        // Initialize Gemini if key present
        if let Some(key) = &llm_config.gemini_api_key {
            let provider = Arc::new(GeminiProvider::new(key.clone())?);
            providers.insert("gemini".to_string(), provider as Arc<dyn LlmProvider>);
            info!("Initialized Gemini provider");
        } else {
            warn!("GEMINI_API_KEY not set, Gemini provider disabled");
        }

        // Initialize OpenAI if key present
        if let Some(key) = &llm_config.openai_api_key {
            let provider = Arc::new(OpenAiProvider::new(key.clone())?);
            providers.insert("openai".to_string(), provider as Arc<dyn LlmProvider>);
            info!("Initialized OpenAI provider");
        } else {
            warn!("OPENAI_API_KEY not set, OpenAI provider disabled");
        }

        // Initialize Ollama (local, no key needed)
        if let Some(base_url) = &llm_config.ollama_base_url {
            let provider = Arc::new(OllamaProvider::new(base_url.clone())?);
            providers.insert("ollama".to_string(), provider as Arc<dyn LlmProvider>);
            info!("Initialized Ollama provider");
        }

        Ok(Self {
            providers,
            default_provider: llm_config.provider.clone(),
        })
    }

    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn LlmProvider>> {
        self.providers.get(provider_id).map(|p| p.clone())
    }

    /// The provider named by `llm.provider` in config.
    pub fn default_provider(&self) -> anyhow::Result<Arc<dyn LlmProvider>> {
        self.get(&self.default_provider).ok_or_else(|| {
            anyhow::anyhow!(
                "Configured provider '{}' is not available; check its API key",
                self.default_provider
            )
        })
    }

    pub fn list_providers(&self) -> Vec<ProviderInfo> {
        self.providers
            .iter()
            .map(|entry| {
                let (id, provider) = entry.pair();
                ProviderInfo {
                    id: id.clone(),
                    name: provider.name().to_string(),
                    available: true,
                    models: provider.list_models(),
                }
            })
            .collect()
    }
}

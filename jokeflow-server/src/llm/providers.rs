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

use super::{GenerationResponse, LlmProvider};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client as OpenAIClient,
};
use serde_json::json;
use std::time::Instant;

// Gemini Provider (Google Generative Language API)
pub struct GeminiProvider {
    api_key: String,
    client: reqwest::Client,
    models: Vec<String>,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Ok(Self {
            api_key,
            client: reqwest::Client::new(),
            models: vec![
                "gemma-3-27b-it".to_string(),
                "gemini-2.0-flash".to_string(),
                "gemini-1.5-pro".to_string(),
            ],
        })
    }
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(
        &self,
        prompt: &str,
        model: Option<String>,
    ) -> anyhow::Result<GenerationResponse> {
        let start = Instant::now();
        let model_name = model.unwrap_or_else(|| "gemma-3-27b-it".to_string());

        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
        });

        let response = self
            .client
            .post(format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                model_name
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let json: serde_json::Value = response.json().await?;

        let text = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("")
            .to_string();

        let input_tokens = json["usageMetadata"]["promptTokenCount"]
            .as_u64()
            .map(|t| t as u32);
        let output_tokens = json["usageMetadata"]["candidatesTokenCount"]
            .as_u64()
            .map(|t| t as u32);

        Ok(GenerationResponse {
            text,
            provider: "gemini".to_string(),
            model: model_name,
            input_tokens,
            output_tokens,
            duration_ms: start.elapsed().as_millis() as u32,
        })
    }

    fn list_models(&self) -> Vec<String> {
        self.models.clone()
    }

    fn name(&self) -> &str {
        "Gemini"
    }
}

// OpenAI Provider
pub struct OpenAiProvider {
    client: OpenAIClient<OpenAIConfig>,
    models: Vec<String>,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = OpenAIClient::with_config(config);

        Ok(Self {
            client,
            models: vec![
                "gpt-4o".to_string(),
                "gpt-4o-mini".to_string(),
                "gpt-4-turbo".to_string(),
            ],
        })
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(
        &self,
        prompt: &str,
        model: Option<String>,
    ) -> anyhow::Result<GenerationResponse> {
        let start = Instant::now();
        let model_name = model.unwrap_or_else(|| "gpt-4o-mini".to_string());

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(&model_name)
            .messages(vec![ChatCompletionRequestMessage::User(message)])
            .build()?;

        let response = self.client.chat().create(request).await?;

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        let (input_tokens, output_tokens) = if let Some(usage) = &response.usage {
            (Some(usage.prompt_tokens), Some(usage.completion_tokens))
        } else {
            (None, None)
        };

        Ok(GenerationResponse {
            text,
            provider: "openai".to_string(),
            model: model_name,
            input_tokens,
            output_tokens,
            duration_ms: start.elapsed().as_millis() as u32,
        })
    }

    fn list_models(&self) -> Vec<String> {
        self.models.clone()
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}

// Ollama Provider (Local)
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
    models: Vec<String>,
}

impl OllamaProvider {
    pub fn new(base_url: String) -> anyhow::Result<Self> {
        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
            models: vec![
                "llama3".to_string(),
                "mistral".to_string(),
                "gemma2".to_string(),
            ],
        })
    }
}

#[async_trait::async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(
        &self,
        prompt: &str,
        model: Option<String>,
    ) -> anyhow::Result<GenerationResponse> {
        let start = Instant::now();
        let model_name = model.unwrap_or_else(|| "llama3".to_string());

        let body = json!({
            "model": model_name,
            "prompt": prompt,
            "stream": false,
        });

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let json: serde_json::Value = response.json().await?;

        let text = json["response"].as_str().unwrap_or("").to_string();

        // Ollama reports eval counts rather than token usage
        let input_tokens = json["prompt_eval_count"].as_u64().map(|t| t as u32);
        let output_tokens = json["eval_count"].as_u64().map(|t| t as u32);

        Ok(GenerationResponse {
            text,
            provider: "ollama".to_string(),
            model: model_name,
            input_tokens,
            output_tokens,
            duration_ms: start.elapsed().as_millis() as u32,
        })
    }

    fn list_models(&self) -> Vec<String> {
        self.models.clone()
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}

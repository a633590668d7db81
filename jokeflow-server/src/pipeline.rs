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

//! Generation pipeline: the two ordered stages of the workflow.
//!
//! Stage 1 turns a topic into a joke, stage 2 turns a joke into an
//! explanation. Each stage is exactly one text-generation call with the raw
//! response passed through; the pause between the stages is imposed by the
//! session controller, not here — there is no branching and no loop.

use std::sync::Arc;

use jokeflow_core::WorkflowError;
use tracing::{debug, info};

use crate::llm::LlmProvider;

pub struct GenerationPipeline {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
}

impl GenerationPipeline {
    pub fn new(provider: Arc<dyn LlmProvider>, model: Option<String>) -> Self {
        Self { provider, model }
    }

    /// Stage 1: topic -> joke.
    pub async fn generate_joke(&self, topic: &str) -> Result<String, WorkflowError> {
        info!(topic, "Generating joke");
        let prompt = format!("Generate a funny joke about {topic}.");
        self.run_stage("generate_joke", prompt).await
    }

    /// Stage 2: joke -> explanation.
    pub async fn generate_explanation(&self, joke: &str) -> Result<String, WorkflowError> {
        info!("Generating explanation for joke");
        let prompt = format!("Explain why this joke is funny: {joke}");
        self.run_stage("generate_explanation", prompt).await
    }

    async fn run_stage(&self, stage: &str, prompt: String) -> Result<String, WorkflowError> {
        let response = self
            .provider
            .generate(&prompt, self.model.clone())
            .await
            .map_err(|e| WorkflowError::Generation(format!("{stage}: {e}")))?;

        debug!(
            stage,
            provider = response.provider,
            model = response.model,
            duration_ms = response.duration_ms,
            "Stage completed"
        );

        let text = response.text.trim().to_string();
        if text.is_empty() {
            // An empty joke/explanation would persist as "present" downstream
            return Err(WorkflowError::Generation(format!(
                "{stage}: provider returned empty text"
            )));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FailingProvider, ScriptedProvider};

    #[tokio::test]
    async fn joke_stage_passes_raw_text_through() {
        let provider = Arc::new(ScriptedProvider::new(vec!["why did the fish blush?"]));
        let pipeline = GenerationPipeline::new(provider.clone(), None);

        let joke = pipeline.generate_joke("water").await.unwrap();
        assert_eq!(joke, "why did the fish blush?");

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("water"));
    }

    #[tokio::test]
    async fn explanation_stage_embeds_the_joke() {
        let provider = Arc::new(ScriptedProvider::new(vec!["because it saw the sea weed"]));
        let pipeline = GenerationPipeline::new(provider.clone(), None);

        let explanation = pipeline
            .generate_explanation("why did the fish blush?")
            .await
            .unwrap();
        assert_eq!(explanation, "because it saw the sea weed");
        assert!(provider.prompts()[0].contains("why did the fish blush?"));
    }

    #[tokio::test]
    async fn provider_failure_maps_to_generation_error() {
        let pipeline = GenerationPipeline::new(Arc::new(FailingProvider), None);
        let err = pipeline.generate_joke("water").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Generation(_)));
    }

    #[tokio::test]
    async fn empty_response_is_a_generation_error() {
        let provider = Arc::new(ScriptedProvider::new(vec!["   "]));
        let pipeline = GenerationPipeline::new(provider, None);
        let err = pipeline.generate_joke("water").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Generation(_)));
    }
}

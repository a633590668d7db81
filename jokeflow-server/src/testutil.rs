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

//! Test doubles for the text-generation seam.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::llm::{GenerationResponse, LlmProvider};

/// Returns canned responses in order and records every prompt it saw.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new<S: Into<String>>(responses: Vec<S>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(
        &self,
        prompt: &str,
        model: Option<String>,
    ) -> anyhow::Result<GenerationResponse> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let text = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("scripted provider ran out of responses"))?;
        Ok(GenerationResponse {
            text,
            provider: "scripted".to_string(),
            model: model.unwrap_or_else(|| "scripted-model".to_string()),
            input_tokens: None,
            output_tokens: None,
            duration_ms: 0,
        })
    }

    fn list_models(&self) -> Vec<String> {
        vec!["scripted-model".to_string()]
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}

/// Always errors, as a stalled or unreachable provider would.
pub struct FailingProvider;

#[async_trait::async_trait]
impl LlmProvider for FailingProvider {
    async fn generate(
        &self,
        _prompt: &str,
        _model: Option<String>,
    ) -> anyhow::Result<GenerationResponse> {
        Err(anyhow::anyhow!("provider unreachable"))
    }

    fn list_models(&self) -> Vec<String> {
        vec![]
    }

    fn name(&self) -> &str {
        "Failing"
    }
}

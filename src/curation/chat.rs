//! OpenAI-compatible chat-completions curator

use crate::config::Config;
use crate::curation::prompts::{narrow_down_prompt, select_and_categorize_prompt, SYSTEM_PROMPT};
use crate::curation::response::{parse_curated_urls, parse_url_list};
use crate::curation::{CuratedUrl, Curator};
use crate::extract::HeadFragments;
use crate::{ConfigError, CurationError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Curator backed by a `/chat/completions` endpoint
///
/// Each call is a single stateless request carrying a system and a user
/// message. There are no retries.
#[derive(Clone)]
pub struct ChatCurator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    narrow_max_tokens: u32,
    select_max_tokens: u32,
    narrow_size: usize,
    final_size: usize,
}

impl ChatCurator {
    /// Creates a curator using the given API key
    pub fn new(client: Client, api_key: impl Into<String>, config: &Config) -> Self {
        Self {
            client,
            base_url: config.curation.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.curation.model.clone(),
            temperature: config.curation.temperature,
            narrow_max_tokens: config.curation.narrow_max_tokens,
            select_max_tokens: config.curation.select_max_tokens,
            narrow_size: config.discovery.narrow_size,
            final_size: config.discovery.final_size,
        }
    }

    /// Creates a curator reading the API key from the configured environment
    /// variable
    pub fn from_env(client: Client, config: &Config) -> Result<Self, ConfigError> {
        let var = &config.curation.api_key_env;
        let api_key = std::env::var(var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(var.clone()))?;
        Ok(Self::new(client, api_key, config))
    }

    /// Sends one prompt and returns the generated text
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, CurationError> {
        let started = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Curation request failed");
                CurationError::Llm(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, error = %error_text, "Curation API error");
            return Err(CurationError::Llm(format!(
                "curation API returned {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| CurationError::Llm(format!("invalid chat completion envelope: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CurationError::Llm("no completion returned".to_string()))?;

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            response_len = content.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Curation completion"
        );

        Ok(content)
    }
}

#[async_trait]
impl Curator for ChatCurator {
    async fn narrow_down(
        &self,
        urls: &[String],
        category: &str,
    ) -> Result<Vec<String>, CurationError> {
        let prompt = narrow_down_prompt(urls, category, self.narrow_size);
        let text = self.complete(&prompt, self.narrow_max_tokens).await?;
        parse_url_list(&text)
    }

    async fn select_and_categorize(
        &self,
        urls: &[String],
        heads: &HeadFragments,
        category: &str,
    ) -> Result<Vec<CuratedUrl>, CurationError> {
        let prompt = select_and_categorize_prompt(urls, heads, category, self.final_size);
        let text = self.complete(&prompt, self.select_max_tokens).await?;
        parse_curated_urls(&text)
    }
}

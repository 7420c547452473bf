use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::RefineConfig;
use crate::error::{Result, SafeHorizonError};

/// Post-edits a machine translation for fluency via a chat completion model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationRefiner: Send + Sync {
    async fn refine(&self, text: &str, target_language: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

pub struct OpenAiRefiner {
    client: Client,
    config: RefineConfig,
    api_key: String,
}

impl OpenAiRefiner {
    pub fn new(config: RefineConfig, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            config,
            api_key,
        }
    }

    fn build_refinement_prompt(text: &str, target_language: &str) -> String {
        format!(
            "You are a professional localization editor. Refine the following {} translation \
             to be culturally appropriate, fluent, and professional. Only return the refined \
             text. Translation to refine: \"{}\"",
            target_language, text
        )
    }
}

#[async_trait]
impl TranslationRefiner for OpenAiRefiner {
    async fn refine(&self, text: &str, target_language: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.endpoint);
        let prompt = Self::build_refinement_prompt(text, target_language);

        debug!("Sending refinement request to: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.config.model,
                "messages": [{ "role": "user", "content": prompt }],
            }))
            .send()
            .await
            .map_err(|e| {
                SafeHorizonError::UpstreamUnavailable(format!("Refinement request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SafeHorizonError::UpstreamUnavailable(format!(
                "Refinement API error {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            SafeHorizonError::UpstreamFormat(format!("Failed to parse refinement response: {}", e))
        })?;

        let refined = completion
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| {
                SafeHorizonError::UpstreamFormat("Refinement response had no choices".to_string())
            })?;

        Ok(refined)
    }
}

/// Factory for creating refiner instances
pub struct RefinerFactory;

impl RefinerFactory {
    pub fn create_refiner(config: RefineConfig, api_key: String) -> Arc<dyn TranslationRefiner> {
        Arc::new(OpenAiRefiner::new(config, api_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_the_target_language() {
        let prompt = OpenAiRefiner::build_refinement_prompt("नमस्ते", "hi");
        assert!(prompt.contains("hi translation"));
        assert!(prompt.contains("नमस्ते"));
    }

    #[test]
    fn completion_response_deserializes() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"  नमस्ते  "}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.trim(), "नमस्ते");
    }
}

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::SpeechConfig;
use crate::error::{Result, SafeHorizonError};
use super::SpeechSynthesizer;

/// Synthesizer backed by the hosted speech endpoint. The response body is
/// the MP3 audio itself, not JSON.
pub struct OpenAiSynthesizer {
    client: Client,
    config: SpeechConfig,
    api_key: String,
}

impl OpenAiSynthesizer {
    pub fn new(config: SpeechConfig, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            config,
            api_key,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSynthesizer {
    async fn synthesize(&self, text: &str, voice_hint: &str) -> Result<Vec<u8>> {
        let url = format!("{}/audio/speech", self.config.endpoint);

        debug!("Sending synthesis request to: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.config.synthesis_model,
                "voice": voice_hint,
                "input": text,
            }))
            .send()
            .await
            .map_err(|e| SafeHorizonError::Synthesis(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SafeHorizonError::Synthesis(format!(
                "Speech API error {}: {}",
                status, error_text
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SafeHorizonError::Synthesis(format!("Failed to read audio body: {}", e)))?;

        info!("Speech synthesis completed ({} bytes)", audio.len());
        Ok(audio.to_vec())
    }
}

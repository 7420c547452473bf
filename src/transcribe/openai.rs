use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::SpeechConfig;
use crate::error::{Result, SafeHorizonError};
use super::Transcriber;

/// Whisper API JSON output
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Transcriber backed by the hosted Whisper API.
pub struct OpenAiTranscriber {
    client: Client,
    config: SpeechConfig,
    api_key: String,
}

impl OpenAiTranscriber {
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

/// Quota exhaustion must be surfaced distinctly from generic failures.
fn is_quota_exhausted(status: StatusCode, body: &str) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || body.contains("insufficient_quota")
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe<'a>(
        &self,
        audio: Vec<u8>,
        file_name: &str,
        language: Option<&'a str>,
    ) -> Result<String> {
        let url = format!("{}/audio/transcriptions", self.config.endpoint);

        debug!("Sending transcription request to: {}", url);

        let file_part = Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| SafeHorizonError::Transcription(format!("Invalid upload part: {}", e)))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", self.config.transcribe_model.clone());

        if let Some(lang) = language.filter(|l| !l.is_empty() && *l != "auto") {
            form = form.text("language", lang.to_string());
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                SafeHorizonError::Transcription(format!("HTTP request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if is_quota_exhausted(status, &error_text) {
                return Err(SafeHorizonError::UpstreamQuota(format!(
                    "Transcription API rejected the request ({}): {}",
                    status, error_text
                )));
            }
            return Err(SafeHorizonError::Transcription(format!(
                "Transcription API error {}: {}",
                status, error_text
            )));
        }

        let transcription: TranscriptionResponse = response.json().await.map_err(|e| {
            SafeHorizonError::Transcription(format!("Failed to parse response: {}", e))
        })?;

        info!("Transcription completed ({} chars)", transcription.text.len());
        Ok(transcription.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_detected_by_status() {
        assert!(is_quota_exhausted(StatusCode::TOO_MANY_REQUESTS, ""));
    }

    #[test]
    fn quota_detected_by_error_code() {
        let body = r#"{"error":{"code":"insufficient_quota","message":"You exceeded your quota"}}"#;
        assert!(is_quota_exhausted(StatusCode::PAYMENT_REQUIRED, body));
    }

    #[test]
    fn generic_failures_are_not_quota() {
        assert!(!is_quota_exhausted(
            StatusCode::INTERNAL_SERVER_ERROR,
            "upstream exploded"
        ));
    }

    #[test]
    fn transcription_response_deserializes() {
        let raw = r#"{"text":"hello world"}"#;
        let parsed: TranscriptionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text, "hello world");
    }
}

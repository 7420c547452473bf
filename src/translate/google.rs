use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{Result, SafeHorizonError};
use super::{TextTranslator, Translation};

/// Translator backed by the undocumented `translate_a/single` endpoint.
///
/// The endpoint responds with a nested JSON array rather than an object:
/// element 0 holds the translated segments, element 2 (when present) holds
/// the detected source language.
pub struct GoogleTranslator {
    client: Client,
    config: TranslateConfig,
}

impl GoogleTranslator {
    pub fn new(config: TranslateConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("HTTP client creation should not fail");

        Self { client, config }
    }
}

#[async_trait]
impl TextTranslator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> Result<Translation> {
        debug!("Sending translation request to: {}", self.config.endpoint);

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("client", self.config.client.as_str()),
                ("sl", source_language),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| {
                SafeHorizonError::UpstreamUnavailable(format!("HTTP request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(SafeHorizonError::UpstreamUnavailable(format!(
                "Google Translation Service failed (Status: {}).",
                status.as_u16()
            )));
        }

        let payload: Value = response.json().await.map_err(|_| {
            SafeHorizonError::UpstreamFormat(
                "Received invalid response from translation service.".to_string(),
            )
        })?;

        parse_translation_payload(&payload, source_language)
    }
}

/// Extract the translated text and detected source language from the nested
/// array response. Segment texts are concatenated in order.
fn parse_translation_payload(payload: &Value, fallback_source: &str) -> Result<Translation> {
    let segments = payload.get(0).and_then(Value::as_array).ok_or_else(|| {
        SafeHorizonError::UpstreamFormat(
            "Unexpected translation response format. Service may be blocking requests.".to_string(),
        )
    })?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    let detected_source_language = payload
        .get(2)
        .and_then(Value::as_str)
        .unwrap_or(fallback_source)
        .to_string();

    Ok(Translation {
        text,
        detected_source_language,
    })
}

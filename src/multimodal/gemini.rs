use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::MultimodalConfig;
use crate::error::{Result, SafeHorizonError};
use super::{split_analysis_response, MediaTranscriber, VideoAnalysis};

#[derive(Debug, Deserialize)]
struct FileUploadResponse {
    file: UploadedFile,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    /// Resource name, e.g. "files/abc-123"
    name: String,
    /// Retrieval URI referenced by generation requests
    uri: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Media transcriber backed by the Gemini file store and generateContent API.
pub struct GeminiTranscriber {
    client: Client,
    config: MultimodalConfig,
    api_key: String,
}

impl GeminiTranscriber {
    pub fn new(config: MultimodalConfig, api_key: String) -> Self {
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

    /// Upload the media bytes into the provider's file store.
    async fn upload_file(&self, media_path: &Path) -> Result<UploadedFile> {
        let bytes = tokio::fs::read(media_path).await.map_err(|e| {
            SafeHorizonError::Multimodal(format!(
                "Failed to read media file {}: {}",
                media_path.display(),
                e
            ))
        })?;

        let url = format!("{}/upload/v1beta/files", self.config.endpoint);
        debug!("Uploading {} bytes to provider file store", bytes.len());

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", mime_type_for(media_path))
            .body(bytes)
            .send()
            .await
            .map_err(|e| SafeHorizonError::Multimodal(format!("File upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SafeHorizonError::Multimodal(format!(
                "File upload rejected ({}): {}",
                status, error_text
            )));
        }

        let upload: FileUploadResponse = response.json().await.map_err(|e| {
            SafeHorizonError::Multimodal(format!("Failed to parse upload response: {}", e))
        })?;

        Ok(upload.file)
    }

    /// One generation request against the uploaded file.
    async fn generate(
        &self,
        file: &UploadedFile,
        media_path: &Path,
        source_language: &str,
        target_language: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint, self.config.model
        );

        let instruction = build_instruction(source_language, target_language);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{
                    "parts": [
                        { "file_data": {
                            "mime_type": mime_type_for(media_path),
                            "file_uri": file.uri,
                        }},
                        { "text": instruction },
                    ],
                }],
            }))
            .send()
            .await
            .map_err(|e| SafeHorizonError::Multimodal(format!("Generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SafeHorizonError::Multimodal(format!(
                "Generation rejected ({}): {}",
                status, error_text
            )));
        }

        let generation: GenerateContentResponse = response.json().await.map_err(|e| {
            SafeHorizonError::Multimodal(format!("Failed to parse generation response: {}", e))
        })?;

        let text: String = generation
            .candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SafeHorizonError::Multimodal(
                "Generation response contained no text".to_string(),
            ));
        }

        Ok(text)
    }

    /// Release the provider-side copy. Best-effort: a failed delete is
    /// logged and never masks the generation outcome.
    async fn delete_file(&self, file: &UploadedFile) {
        let url = format!("{}/v1beta/{}", self.config.endpoint, file.name);

        match self
            .client
            .delete(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                debug!("Deleted provider-side file {}", file.name);
            }
            Ok(response) => {
                warn!(
                    "Provider-side delete of {} returned {}",
                    file.name,
                    response.status()
                );
            }
            Err(e) => {
                warn!("Provider-side delete of {} failed: {}", file.name, e);
            }
        }
    }
}

#[async_trait]
impl MediaTranscriber for GeminiTranscriber {
    async fn transcribe_and_translate(
        &self,
        media_path: &Path,
        source_language: &str,
        target_language: &str,
    ) -> Result<VideoAnalysis> {
        let file = self.upload_file(media_path).await?;
        info!("Uploaded media as {} for analysis", file.name);

        let generation = self
            .generate(&file, media_path, source_language, target_language)
            .await;

        // The uploaded copy is released whether generation succeeded or not.
        self.delete_file(&file).await;

        let text = generation?;
        Ok(split_analysis_response(&text))
    }
}

fn build_instruction(source_language: &str, target_language: &str) -> String {
    format!(
        "Transcribe the spoken audio in this video (source language: {}). Then, after a \
         blank line, translate the transcription into {} as subtitle text. Output only the \
         transcription and the translated subtitles.",
        source_language, target_language
    )
}

/// Best-effort container type from the file extension; the provider sniffs
/// the content anyway.
fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(mime_type_for(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(mime_type_for(Path::new("CLIP.MOV")), "video/quicktime");
        assert_eq!(mime_type_for(Path::new("voice.mp3")), "audio/mpeg");
        assert_eq!(mime_type_for(Path::new("unknown.bin")), "application/octet-stream");
    }

    #[test]
    fn instruction_names_both_languages() {
        let instruction = build_instruction("en", "hi");
        assert!(instruction.contains("source language: en"));
        assert!(instruction.contains("into hi"));
    }

    #[test]
    fn generation_response_text_concatenates_parts() {
        let raw = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Hello there."},
                        {"text": "\n\nनमस्ते।"}
                    ]
                }
            }]
        }"#;

        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .map(|part| part.text.as_str())
            .collect::<String>();
        assert_eq!(text, "Hello there.\n\nनमस्ते।");
    }

    #[test]
    fn upload_response_deserializes() {
        let raw = r#"{"file":{"name":"files/abc-123","uri":"https://example.test/files/abc-123"}}"#;
        let parsed: FileUploadResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.file.name, "files/abc-123");
    }
}

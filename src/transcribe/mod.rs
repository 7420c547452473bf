// Speech-to-text adapters
//
// This module provides transcription implementations through a factory pattern:
// - OpenAI: the hosted Whisper API (multipart upload)
//
// To add a new transcription service, implement `Transcriber` for it and
// extend the factory.

pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::SpeechConfig;
use crate::error::Result;

/// Main trait for transcription operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio byte stream to text. `file_name` is forwarded so
    /// the provider can infer the container format; `language` is an
    /// optional source-language hint.
    async fn transcribe<'a>(
        &self,
        audio: Vec<u8>,
        file_name: &str,
        language: Option<&'a str>,
    ) -> Result<String>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create_transcriber(config: SpeechConfig, api_key: String) -> Arc<dyn Transcriber> {
        Arc::new(openai::OpenAiTranscriber::new(config, api_key))
    }
}

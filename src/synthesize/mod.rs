// Text-to-speech adapters
//
// This module provides speech synthesis implementations through a factory
// pattern:
// - OpenAI: the hosted speech endpoint (JSON in, binary MP3 out)

pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::SpeechConfig;
use crate::error::Result;

/// Main trait for speech synthesis operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech for the given text. `voice_hint` names the voice to
    /// use; language-aware voice selection is not performed.
    async fn synthesize(&self, text: &str, voice_hint: &str) -> Result<Vec<u8>>;
}

/// Factory for creating synthesizer instances
pub struct SynthesizerFactory;

impl SynthesizerFactory {
    pub fn create_synthesizer(config: SpeechConfig, api_key: String) -> Arc<dyn SpeechSynthesizer> {
        Arc::new(openai::OpenAiSynthesizer::new(config, api_key))
    }
}

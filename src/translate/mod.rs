// Text translation adapters
//
// This module provides translation implementations through a factory pattern:
// - Google: the undocumented translate_a/single endpoint
//
// Refinement (LLM post-editing of a translation) lives in `refine`.

pub mod google;
pub mod refine;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::TranslateConfig;
use crate::error::Result;

/// Result of a single translation call
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// Translated text; may be empty if the provider returns empty
    pub text: String,
    /// Best-effort detected source language, falling back to the requested one
    pub detected_source_language: String,
}

/// Main trait for text translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextTranslator: Send + Sync {
    /// Translate text to the target language. `source_language` may be the
    /// sentinel "auto" to request provider-side detection.
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> Result<Translation>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    pub fn create_translator(config: TranslateConfig) -> Arc<dyn TextTranslator> {
        Arc::new(google::GoogleTranslator::new(config))
    }
}

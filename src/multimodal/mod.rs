// Multimodal transcribe-and-translate adapters
//
// This module provides media-understanding implementations through a factory
// pattern:
// - Gemini: file-store upload + one generateContent call + guaranteed
//   provider-side delete

pub mod gemini;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::config::MultimodalConfig;
use crate::error::Result;

/// Combined transcription and subtitle translation for one media file
#[derive(Debug, Clone, PartialEq)]
pub struct VideoAnalysis {
    pub transcribed_text: String,
    pub translated_subtitles: String,
}

/// Main trait for multimodal media understanding
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaTranscriber: Send + Sync {
    /// Transcribe the spoken audio in a media file and translate the
    /// transcription into the target language as a subtitle block. The
    /// provider-side copy of the uploaded file is deleted before this call
    /// returns, whether generation succeeded or failed.
    async fn transcribe_and_translate(
        &self,
        media_path: &Path,
        source_language: &str,
        target_language: &str,
    ) -> Result<VideoAnalysis>;
}

/// Split a model response into transcription and subtitle block.
///
/// The model is instructed to emit the transcription, a blank line, then the
/// translated subtitles. The last blank-line-separated block is taken as the
/// subtitles while the whole response is kept as the transcription; a
/// response with no separator fills both fields with the same text.
pub fn split_analysis_response(text: &str) -> VideoAnalysis {
    let trimmed = text.trim();
    let subtitles = trimmed
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .last()
        .unwrap_or(trimmed);

    VideoAnalysis {
        transcribed_text: trimmed.to_string(),
        translated_subtitles: subtitles.to_string(),
    }
}

/// Factory for creating media transcriber instances
pub struct MediaTranscriberFactory;

impl MediaTranscriberFactory {
    pub fn create_transcriber(
        config: MultimodalConfig,
        api_key: String,
    ) -> Arc<dyn MediaTranscriber> {
        Arc::new(gemini::GeminiTranscriber::new(config, api_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_selects_last_block_as_subtitles() {
        let response = "Hello, and welcome.\nWe make localization easy.\n\nनमस्ते, और आपका स्वागत है।\nहम स्थानीयकरण को आसान बनाते हैं।";

        let analysis = split_analysis_response(response);
        assert_eq!(
            analysis.translated_subtitles,
            "नमस्ते, और आपका स्वागत है।\nहम स्थानीयकरण को आसान बनाते हैं।"
        );
        // The full response is kept as the transcription, separator included.
        assert_eq!(analysis.transcribed_text, response);
    }

    #[test]
    fn missing_separator_duplicates_the_response() {
        let response = "Hello, and welcome to the channel.";

        let analysis = split_analysis_response(response);
        assert_eq!(analysis.transcribed_text, response);
        assert_eq!(analysis.translated_subtitles, response);
    }

    #[test]
    fn trailing_blank_lines_do_not_produce_empty_subtitles() {
        let response = "Transcription here.\n\nUntertitel hier.\n\n";

        let analysis = split_analysis_response(response);
        assert_eq!(analysis.translated_subtitles, "Untertitel hier.");
    }
}

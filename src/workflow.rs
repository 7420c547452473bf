use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Result, SafeHorizonError};
use crate::multimodal::{MediaTranscriber, VideoAnalysis};
use crate::storage::{ArtifactStore, TempUpload};
use crate::synthesize::SpeechSynthesizer;
use crate::transcribe::Transcriber;
use crate::translate::TextTranslator;

/// Stages of one audio localization job. A failure in any non-terminal
/// stage skips the remaining stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioJobStage {
    Uploaded,
    Transcribing,
    Translating,
    Synthesizing,
    Done,
    Failed,
}

impl fmt::Display for AudioJobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uploaded => "uploaded",
            Self::Transcribing => "transcribing",
            Self::Translating => "translating",
            Self::Synthesizing => "synthesizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Stages of one video localization job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoJobStage {
    Uploaded,
    Processing,
    Done,
    Failed,
}

impl fmt::Display for VideoJobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Result of a completed audio localization job
#[derive(Debug, Clone)]
pub struct AudioLocalization {
    pub transcribed_text: String,
    pub translated_text: String,
    pub audio_url: String,
}

/// Speech-to-text, translation and synthesis composed over one uploaded
/// audio file. Adapters are injected so tests can substitute stubs.
pub struct AudioLocalizationPipeline {
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn TextTranslator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    artifacts: Arc<ArtifactStore>,
    voice: String,
}

impl AudioLocalizationPipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn TextTranslator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        artifacts: Arc<ArtifactStore>,
        voice: String,
    ) -> Self {
        Self {
            transcriber,
            translator,
            synthesizer,
            artifacts,
            voice,
        }
    }

    /// Run the whole job. The uploaded input is released on every exit path;
    /// the generated artifact is retained only on success.
    pub async fn run(
        &self,
        upload: TempUpload,
        target_language: &str,
        source_language: Option<&str>,
    ) -> Result<AudioLocalization> {
        info!("Audio job stage: {}", AudioJobStage::Uploaded);
        let result = self
            .execute(upload.path(), target_language, source_language)
            .await;

        match &result {
            Ok(_) => info!("Audio job stage: {}", AudioJobStage::Done),
            Err(e) => warn!("Audio job stage: {} ({})", AudioJobStage::Failed, e),
        }

        upload.release().await;
        result
    }

    async fn execute(
        &self,
        input: &Path,
        target_language: &str,
        source_language: Option<&str>,
    ) -> Result<AudioLocalization> {
        let audio = tokio::fs::read(input).await.map_err(|e| {
            SafeHorizonError::FileSystem(format!(
                "Failed to read upload {}: {}",
                input.display(),
                e
            ))
        })?;
        let file_name = input
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        info!("Audio job stage: {}", AudioJobStage::Transcribing);
        let transcribed_text = self
            .transcriber
            .transcribe(audio, &file_name, source_language)
            .await?;

        info!("Audio job stage: {}", AudioJobStage::Translating);
        let translation = self
            .translator
            .translate(&transcribed_text, target_language, "auto")
            .await?;

        info!("Audio job stage: {}", AudioJobStage::Synthesizing);
        let speech = self
            .synthesizer
            .synthesize(&translation.text, &self.voice)
            .await?;

        let artifact = self
            .artifacts
            .publish("localized", target_language, "mp3", &speech)
            .await?;

        Ok(AudioLocalization {
            transcribed_text,
            translated_text: translation.text,
            audio_url: artifact.url,
        })
    }
}

/// Upload plus one multimodal transcribe-and-translate call for a video
/// file. Provider-side release of the uploaded copy is owned by the adapter.
pub struct VideoLocalizationPipeline {
    media: Arc<dyn MediaTranscriber>,
}

impl VideoLocalizationPipeline {
    pub fn new(media: Arc<dyn MediaTranscriber>) -> Self {
        Self { media }
    }

    /// Run the whole job; the uploaded input is released on every exit path.
    pub async fn run(
        &self,
        upload: TempUpload,
        source_language: &str,
        target_language: &str,
    ) -> Result<VideoAnalysis> {
        info!("Video job stage: {}", VideoJobStage::Uploaded);
        info!("Video job stage: {}", VideoJobStage::Processing);

        let result = self
            .media
            .transcribe_and_translate(upload.path(), source_language, target_language)
            .await;

        match &result {
            Ok(_) => info!("Video job stage: {}", VideoJobStage::Done),
            Err(e) => warn!("Video job stage: {} ({})", VideoJobStage::Failed, e),
        }

        upload.release().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multimodal::MockMediaTranscriber;
    use crate::storage::UploadStore;
    use crate::synthesize::MockSpeechSynthesizer;
    use crate::transcribe::MockTranscriber;
    use crate::translate::{MockTextTranslator, Translation};

    fn artifact_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    fn stub_translation(text: &str) -> Translation {
        Translation {
            text: text.to_string(),
            detected_source_language: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn audio_job_publishes_artifact_and_releases_upload() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(dir.path().join("uploads")).unwrap();
        let artifacts =
            Arc::new(ArtifactStore::new(dir.path().join("public"), "http://localhost:5000").unwrap());

        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .returning(|_, _, _| Ok("Hello".to_string()));

        let mut translator = MockTextTranslator::new();
        translator
            .expect_translate()
            .returning(|_, _, _| Ok(stub_translation("नमस्ते")));

        let mut synthesizer = MockSpeechSynthesizer::new();
        synthesizer
            .expect_synthesize()
            .returning(|_, _| Ok(vec![0x49, 0x44, 0x33]));

        let pipeline = AudioLocalizationPipeline::new(
            Arc::new(transcriber),
            Arc::new(translator),
            Arc::new(synthesizer),
            artifacts.clone(),
            "alloy".to_string(),
        );

        let upload = uploads
            .stash("audio", Some("voice.mp3"), b"fake audio")
            .await
            .unwrap();
        let input_path = upload.path().to_path_buf();

        let outcome = pipeline.run(upload, "hi", None).await.unwrap();

        assert_eq!(outcome.transcribed_text, "Hello");
        assert_eq!(outcome.translated_text, "नमस्ते");
        assert!(outcome.audio_url.contains("/public/localized_hi_"));
        assert!(!input_path.exists());
        assert_eq!(artifact_count(artifacts.dir()), 1);
    }

    #[tokio::test]
    async fn audio_job_translation_failure_skips_synthesis_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(dir.path().join("uploads")).unwrap();
        let artifacts =
            Arc::new(ArtifactStore::new(dir.path().join("public"), "http://localhost:5000").unwrap());

        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .returning(|_, _, _| Ok("Hello".to_string()));

        let mut translator = MockTextTranslator::new();
        translator.expect_translate().returning(|_, _, _| {
            Err(SafeHorizonError::UpstreamUnavailable(
                "Google Translation Service failed (Status: 503).".to_string(),
            ))
        });

        let mut synthesizer = MockSpeechSynthesizer::new();
        synthesizer.expect_synthesize().never();

        let pipeline = AudioLocalizationPipeline::new(
            Arc::new(transcriber),
            Arc::new(translator),
            Arc::new(synthesizer),
            artifacts.clone(),
            "alloy".to_string(),
        );

        let upload = uploads
            .stash("audio", Some("voice.mp3"), b"fake audio")
            .await
            .unwrap();
        let input_path = upload.path().to_path_buf();

        let err = pipeline.run(upload, "hi", None).await.unwrap_err();

        assert!(matches!(err, SafeHorizonError::UpstreamUnavailable(_)));
        assert!(!input_path.exists());
        assert_eq!(artifact_count(artifacts.dir()), 0);
    }

    #[tokio::test]
    async fn audio_job_transcription_failure_stops_the_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(dir.path().join("uploads")).unwrap();
        let artifacts =
            Arc::new(ArtifactStore::new(dir.path().join("public"), "http://localhost:5000").unwrap());

        let mut transcriber = MockTranscriber::new();
        transcriber.expect_transcribe().returning(|_, _, _| {
            Err(SafeHorizonError::UpstreamQuota("rate limited".to_string()))
        });

        let mut translator = MockTextTranslator::new();
        translator.expect_translate().never();

        let mut synthesizer = MockSpeechSynthesizer::new();
        synthesizer.expect_synthesize().never();

        let pipeline = AudioLocalizationPipeline::new(
            Arc::new(transcriber),
            Arc::new(translator),
            Arc::new(synthesizer),
            artifacts.clone(),
            "alloy".to_string(),
        );

        let upload = uploads.stash("audio", None, b"fake audio").await.unwrap();
        let input_path = upload.path().to_path_buf();

        let err = pipeline.run(upload, "hi", Some("en")).await.unwrap_err();

        assert!(matches!(err, SafeHorizonError::UpstreamQuota(_)));
        assert!(!input_path.exists());
        assert_eq!(artifact_count(artifacts.dir()), 0);
    }

    #[tokio::test]
    async fn video_job_returns_analysis_and_releases_upload() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(dir.path().join("uploads")).unwrap();

        let mut media = MockMediaTranscriber::new();
        media.expect_transcribe_and_translate().returning(|_, _, _| {
            Ok(VideoAnalysis {
                transcribed_text: "Hello, and welcome.".to_string(),
                translated_subtitles: "नमस्ते, और आपका स्वागत है।".to_string(),
            })
        });

        let pipeline = VideoLocalizationPipeline::new(Arc::new(media));

        let upload = uploads
            .stash("video", Some("clip.mp4"), b"fake video")
            .await
            .unwrap();
        let input_path = upload.path().to_path_buf();

        let analysis = pipeline.run(upload, "en", "hi").await.unwrap();

        assert_eq!(analysis.transcribed_text, "Hello, and welcome.");
        assert!(!input_path.exists());
    }

    #[tokio::test]
    async fn video_job_failure_still_releases_upload() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(dir.path().join("uploads")).unwrap();

        let mut media = MockMediaTranscriber::new();
        media.expect_transcribe_and_translate().returning(|_, _, _| {
            Err(SafeHorizonError::Multimodal(
                "Generation rejected (500): provider error".to_string(),
            ))
        });

        let pipeline = VideoLocalizationPipeline::new(Arc::new(media));

        let upload = uploads
            .stash("video", Some("clip.mp4"), b"fake video")
            .await
            .unwrap();
        let input_path = upload.path().to_path_buf();

        let err = pipeline.run(upload, "en", "hi").await.unwrap_err();

        assert!(matches!(err, SafeHorizonError::Multimodal(_)));
        assert!(!input_path.exists());
    }
}

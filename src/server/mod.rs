// HTTP boundary
//
// Thin request/response mapping over the pipelines. Adapters are constructed
// once at startup and injected; handlers never touch provider clients
// directly.

pub mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::multimodal::MediaTranscriberFactory;
use crate::storage::{ArtifactStore, UploadStore};
use crate::synthesize::{SpeechSynthesizer, SynthesizerFactory};
use crate::transcribe::TranscriberFactory;
use crate::translate::refine::{RefinerFactory, TranslationRefiner};
use crate::translate::{TextTranslator, TranslatorFactory};
use crate::workflow::{AudioLocalizationPipeline, VideoLocalizationPipeline};

// Multipart media uploads can be large; raise the default extractor cap.
const MEDIA_UPLOAD_LIMIT_BYTES: usize = 256 * 1024 * 1024;

/// Shared per-request state: adapter instances, stores and pipelines.
#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<dyn TextTranslator>,
    pub refiner: Arc<dyn TranslationRefiner>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub uploads: Arc<UploadStore>,
    pub artifacts: Arc<ArtifactStore>,
    pub audio_pipeline: Arc<AudioLocalizationPipeline>,
    pub video_pipeline: Arc<VideoLocalizationPipeline>,
    pub voice: String,
}

impl AppState {
    /// Build the real adapter set from configuration. API keys are resolved
    /// from the environment here, once, instead of inside each request.
    pub fn from_config(config: &Config) -> Result<Self> {
        let speech_api_key = Config::resolve_api_key(&config.speech.api_key_env)?;
        let refine_api_key = Config::resolve_api_key(&config.refine.api_key_env)?;
        let multimodal_api_key = Config::resolve_api_key(&config.multimodal.api_key_env)?;

        let translator = TranslatorFactory::create_translator(config.translate.clone());
        let refiner = RefinerFactory::create_refiner(config.refine.clone(), refine_api_key);
        let transcriber =
            TranscriberFactory::create_transcriber(config.speech.clone(), speech_api_key.clone());
        let synthesizer =
            SynthesizerFactory::create_synthesizer(config.speech.clone(), speech_api_key);
        let media = MediaTranscriberFactory::create_transcriber(
            config.multimodal.clone(),
            multimodal_api_key,
        );

        let uploads = Arc::new(UploadStore::new(&config.storage.upload_dir)?);
        let artifacts = Arc::new(ArtifactStore::new(
            &config.storage.public_dir,
            &config.server.public_base_url,
        )?);

        let audio_pipeline = Arc::new(AudioLocalizationPipeline::new(
            transcriber,
            translator.clone(),
            synthesizer.clone(),
            artifacts.clone(),
            config.speech.voice.clone(),
        ));
        let video_pipeline = Arc::new(VideoLocalizationPipeline::new(media));

        Ok(Self {
            translator,
            refiner,
            synthesizer,
            uploads,
            artifacts,
            audio_pipeline,
            video_pipeline,
            voice: config.speech.voice.clone(),
        })
    }
}

/// Build the application router: the JSON API plus static artifact serving.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route(
            "/api/translate/document",
            post(handlers::translate_document),
        )
        .route("/api/generate/speech", post(handlers::generate_speech))
        .route("/api/refine/text", post(handlers::refine_text))
        .route(
            "/api/localize/audio",
            post(handlers::localize_audio)
                .layer(DefaultBodyLimit::max(MEDIA_UPLOAD_LIMIT_BYTES)),
        )
        .route(
            "/api/localize/video",
            post(handlers::localize_video)
                .layer(DefaultBodyLimit::max(MEDIA_UPLOAD_LIMIT_BYTES)),
        )
        .nest_service("/public", ServeDir::new(public_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and run the server until the process is stopped.
pub async fn serve(config: Config) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let app = router(state, Path::new(&config.storage.public_dir));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

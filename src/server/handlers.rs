use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SafeHorizonError};
use super::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateDocumentRequest {
    #[serde(default)]
    pub source_text: String,
    #[serde(default)]
    pub target_language: String,
    pub source_language: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateDocumentResponse {
    pub transcribed_text: String,
    pub translated_content: String,
    pub source_language: String,
    pub target_language: String,
}

/// Translate a block of text. Validation happens before any external call.
pub async fn translate_document(
    State(state): State<AppState>,
    Json(request): Json<TranslateDocumentRequest>,
) -> Result<Json<TranslateDocumentResponse>> {
    if request.source_text.trim().is_empty() || request.target_language.trim().is_empty() {
        return Err(SafeHorizonError::Validation(
            "Missing source text or target language.".to_string(),
        ));
    }

    let source_language = request.source_language.as_deref().unwrap_or("auto");
    info!(
        "Translating document to {} (source: {})",
        request.target_language, source_language
    );

    let translation = state
        .translator
        .translate(&request.source_text, &request.target_language, source_language)
        .await?;

    Ok(Json(TranslateDocumentResponse {
        transcribed_text: request.source_text,
        translated_content: translation.text,
        source_language: translation.detected_source_language,
        target_language: request.target_language,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSpeechRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub target_language: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSpeechResponse {
    pub message: String,
    pub audio_url: String,
}

/// Synthesize speech for already-translated text and publish it as an
/// artifact.
pub async fn generate_speech(
    State(state): State<AppState>,
    Json(request): Json<GenerateSpeechRequest>,
) -> Result<Json<GenerateSpeechResponse>> {
    if request.text.trim().is_empty() {
        return Err(SafeHorizonError::Validation(
            "Missing text for speech generation.".to_string(),
        ));
    }

    let audio = state
        .synthesizer
        .synthesize(&request.text, &state.voice)
        .await?;

    // "und" is the undetermined-language code; the page normally sends one.
    let language = if request.target_language.trim().is_empty() {
        "und"
    } else {
        request.target_language.trim()
    };

    let artifact = state
        .artifacts
        .publish("tts_output", language, "mp3", &audio)
        .await?;

    Ok(Json(GenerateSpeechResponse {
        message: "Speech generated successfully".to_string(),
        audio_url: artifact.url,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineTextRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub target_language: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineTextResponse {
    pub refined_text: String,
}

/// Post-edit a translation for fluency.
pub async fn refine_text(
    State(state): State<AppState>,
    Json(request): Json<RefineTextRequest>,
) -> Result<Json<RefineTextResponse>> {
    if request.text.trim().is_empty() || request.target_language.trim().is_empty() {
        return Err(SafeHorizonError::Validation(
            "Missing text or target language.".to_string(),
        ));
    }

    let refined_text = state
        .refiner
        .refine(&request.text, &request.target_language)
        .await?;

    Ok(Json(RefineTextResponse { refined_text }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioLocalizationResponse {
    pub transcribed_text: String,
    pub translated_text: String,
    pub audio_url: String,
}

/// Full audio localization: speech-to-text, translation, text-to-speech.
pub async fn localize_audio(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AudioLocalizationResponse>> {
    let mut form = collect_media_form(multipart, "audio").await?;
    let (file_name, bytes) = form.file.take().ok_or_else(|| {
        SafeHorizonError::Validation("No audio file uploaded.".to_string())
    })?;
    let target_language = form.require_target_language()?;

    info!(
        "Localizing audio {} ({} bytes) to {}",
        file_name,
        bytes.len(),
        target_language
    );

    let upload = state
        .uploads
        .stash("audio", Some(&file_name), &bytes)
        .await?;

    let outcome = state
        .audio_pipeline
        .run(upload, &target_language, form.source_language.as_deref())
        .await?;

    Ok(Json(AudioLocalizationResponse {
        transcribed_text: outcome.transcribed_text,
        translated_text: outcome.translated_text,
        audio_url: outcome.audio_url,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoLocalizationResponse {
    pub transcribed_text: String,
    pub translated_subtitles: String,
    pub audio_url: Option<String>,
    pub download_link: Option<String>,
}

/// Video localization: one multimodal transcribe-and-translate pass.
pub async fn localize_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<VideoLocalizationResponse>> {
    let mut form = collect_media_form(multipart, "video").await?;
    let (file_name, bytes) = form.file.take().ok_or_else(|| {
        SafeHorizonError::Validation("No video file uploaded.".to_string())
    })?;
    let target_language = form.require_target_language()?;
    let source_language = form.source_language.as_deref().unwrap_or("auto");

    info!(
        "Localizing video {} ({} bytes) to {}",
        file_name,
        bytes.len(),
        target_language
    );

    let upload = state
        .uploads
        .stash("video", Some(&file_name), &bytes)
        .await?;

    let analysis = state
        .video_pipeline
        .run(upload, source_language, &target_language)
        .await?;

    Ok(Json(VideoLocalizationResponse {
        transcribed_text: analysis.transcribed_text,
        translated_subtitles: analysis.translated_subtitles,
        audio_url: None,
        download_link: None,
    }))
}

/// Fields shared by the media upload endpoints.
struct MediaForm {
    file: Option<(String, Vec<u8>)>,
    target_language: Option<String>,
    source_language: Option<String>,
}

impl MediaForm {
    fn require_target_language(&self) -> Result<String> {
        self.target_language
            .as_deref()
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
            .ok_or_else(|| SafeHorizonError::Validation("Missing target language.".to_string()))
    }
}

async fn collect_media_form(mut multipart: Multipart, file_field: &str) -> Result<MediaForm> {
    let mut form = MediaForm {
        file: None,
        target_language: None,
        source_language: None,
    };

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        SafeHorizonError::Validation(format!("Malformed multipart request: {}", e))
    })? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == file_field {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await.map_err(|e| {
                SafeHorizonError::Validation(format!("Failed to read uploaded file: {}", e))
            })?;
            form.file = Some((file_name, bytes.to_vec()));
        } else if name == "targetLanguage" {
            form.target_language = Some(field.text().await.map_err(|e| {
                SafeHorizonError::Validation(format!("Failed to read form field: {}", e))
            })?);
        } else if name == "sourceLanguage" {
            form.source_language = Some(field.text().await.map_err(|e| {
                SafeHorizonError::Validation(format!("Failed to read form field: {}", e))
            })?);
        }
    }

    Ok(form)
}

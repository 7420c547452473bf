use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SafeHorizonError};

fn default_client() -> String {
    "gtx".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub translate: TranslateConfig,
    pub speech: SpeechConfig,
    pub refine: RefineConfig,
    pub multimodal: MultimodalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Base URL clients use to retrieve generated artifacts
    pub public_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for transient uploaded files
    pub upload_dir: String,
    /// Directory for generated, publicly retrievable artifacts
    pub public_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Translation endpoint URL
    pub endpoint: String,
    /// Client identifier sent with every translation request
    #[serde(default = "default_client")]
    pub client: String,
    /// HTTP timeout for translation calls (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Speech API base URL
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Model used for transcription
    pub transcribe_model: String,
    /// Model used for speech synthesis
    pub synthesis_model: String,
    /// Voice used for synthesis regardless of target language
    pub voice: String,
    /// HTTP timeout for speech calls (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineConfig {
    /// Chat completion base URL
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Model used for translation refinement
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultimodalConfig {
    /// Multimodal API base URL
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Model used for transcribe-and-translate generation
    pub model: String,
    /// HTTP timeout for multimodal calls (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                public_base_url: "http://localhost:5000".to_string(),
            },
            storage: StorageConfig {
                upload_dir: "uploads".to_string(),
                public_dir: "public".to_string(),
            },
            translate: TranslateConfig {
                endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
                client: "gtx".to_string(),
                request_timeout_secs: 300,
            },
            speech: SpeechConfig {
                endpoint: "https://api.openai.com/v1".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                transcribe_model: "whisper-1".to_string(),
                synthesis_model: "tts-1".to_string(),
                voice: "alloy".to_string(),
                request_timeout_secs: 300,
            },
            refine: RefineConfig {
                endpoint: "https://api.openai.com/v1".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                model: "gpt-3.5-turbo".to_string(),
            },
            multimodal: MultimodalConfig {
                endpoint: "https://generativelanguage.googleapis.com".to_string(),
                api_key_env: "GEMINI_API_KEY".to_string(),
                model: "gemini-1.5-flash".to_string(),
                request_timeout_secs: 300,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SafeHorizonError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SafeHorizonError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SafeHorizonError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SafeHorizonError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Resolve an API key from the environment variable named in the config.
    pub fn resolve_api_key(env_var: &str) -> Result<String> {
        std::env::var(env_var).map_err(|_| {
            SafeHorizonError::Config(format!(
                "API key environment variable '{}' is not set",
                env_var
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.server.port, 5000);
        assert_eq!(parsed.speech.transcribe_model, "whisper-1");
        assert_eq!(parsed.speech.voice, "alloy");
        assert_eq!(parsed.translate.client, "gtx");
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let minimal = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            public_base_url = "http://localhost:8080"

            [storage]
            upload_dir = "uploads"
            public_dir = "public"

            [translate]
            endpoint = "https://translate.googleapis.com/translate_a/single"

            [speech]
            endpoint = "https://api.openai.com/v1"
            api_key_env = "OPENAI_API_KEY"
            transcribe_model = "whisper-1"
            synthesis_model = "tts-1"
            voice = "alloy"

            [refine]
            endpoint = "https://api.openai.com/v1"
            api_key_env = "OPENAI_API_KEY"
            model = "gpt-3.5-turbo"

            [multimodal]
            endpoint = "https://generativelanguage.googleapis.com"
            api_key_env = "GEMINI_API_KEY"
            model = "gemini-1.5-flash"
        "#;

        let config: Config = toml::from_str(minimal).unwrap();
        assert_eq!(config.translate.client, "gtx");
        assert_eq!(config.translate.request_timeout_secs, 300);
        assert_eq!(config.multimodal.request_timeout_secs, 300);
    }
}

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, SafeHorizonError};

/// Holds transient uploaded files. Each stashed upload is exclusively owned
/// by the request that created it and is removed when the job ends.
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            SafeHorizonError::FileSystem(format!(
                "Failed to create upload directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        Ok(Self { dir })
    }

    /// Write uploaded bytes under a unique name and return the owning guard.
    pub async fn stash(
        &self,
        tag: &str,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<TempUpload> {
        let extension = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let file_name = format!("{}_{}{}", tag, Uuid::new_v4(), extension);
        let path = self.dir.join(file_name);

        tokio::fs::write(&path, bytes).await.map_err(|e| {
            SafeHorizonError::FileSystem(format!(
                "Failed to persist upload {}: {}",
                path.display(),
                e
            ))
        })?;

        debug!("Stashed upload at {}", path.display());
        Ok(TempUpload {
            path,
            released: false,
        })
    }
}

/// Scoped guard for one stashed upload. Release is best-effort and never
/// fatal; the Drop impl covers early-return paths.
pub struct TempUpload {
    path: PathBuf,
    released: bool,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the underlying file. Failures are logged, not raised, so a
    /// release on a failure path cannot mask the original error.
    pub async fn release(mut self) {
        self.released = true;
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            warn!("Cleanup error for {}: {}", self.path.display(), e);
        } else {
            debug!("Released upload {}", self.path.display());
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Cleanup error for {}: {}", self.path.display(), e);
        }
    }
}

/// A generated artifact retained for client retrieval.
#[derive(Debug, Clone)]
pub struct PublishedArtifact {
    pub file_name: String,
    pub url: String,
}

/// Append-only store for generated artifacts. Files are written once, never
/// mutated and never deleted by this system.
pub struct ArtifactStore {
    dir: PathBuf,
    base_url: String,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(dir: P, base_url: &str) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            SafeHorizonError::FileSystem(format!(
                "Failed to create public directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        Ok(Self {
            dir,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Write a new artifact and return its retrieval URL. Names combine the
    /// purpose tag, target language, and a microsecond timestamp so
    /// concurrent jobs never collide.
    pub async fn publish(
        &self,
        tag: &str,
        language: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<PublishedArtifact> {
        let file_name = format!(
            "{}_{}_{}.{}",
            tag,
            language,
            chrono::Utc::now().timestamp_micros(),
            extension
        );
        let path = self.dir.join(&file_name);

        tokio::fs::write(&path, bytes).await.map_err(|e| {
            SafeHorizonError::FileSystem(format!(
                "Failed to write artifact {}: {}",
                path.display(),
                e
            ))
        })?;

        debug!("Published artifact {}", path.display());
        Ok(PublishedArtifact {
            url: format!("{}/public/{}", self.base_url, file_name),
            file_name,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

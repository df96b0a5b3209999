// SYNOID Voiceline - Artifact Store
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Owns the output tree. Layout: <root>/<sanitized prompt>/<sanitized line>.{txt,mp3}

use std::path::{Path, PathBuf};

use base64::Engine;
use tracing::info;

use crate::error::ServiceError;
use crate::sanitize::sanitize;

/// URL prefix under which the output root is served.
pub const OUTPUT_ROUTE: &str = "/output";

/// Sanitized (directory, file base) pair for one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub directory: String,
    pub file_base: String,
}

impl ArtifactKey {
    pub fn derive(prompt: &str, line: &str) -> Self {
        Self {
            directory: sanitize(prompt),
            file_base: sanitize(line),
        }
    }

    /// Public path of the audio artifact, e.g. `/output/Chapter_1/Hello_world_.mp3`.
    pub fn public_audio_path(&self) -> String {
        format!("{}/{}/{}.mp3", OUTPUT_ROUTE, self.directory, self.file_base)
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn directory(&self, key: &ArtifactKey) -> PathBuf {
        self.root.join(&key.directory)
    }

    pub fn text_path(&self, key: &ArtifactKey) -> PathBuf {
        self.directory(key).join(format!("{}.txt", key.file_base))
    }

    pub fn audio_path(&self, key: &ArtifactKey) -> PathBuf {
        self.directory(key).join(format!("{}.mp3", key.file_base))
    }

    /// Create the key's directory (and parents). Existing directories are fine.
    pub async fn ensure_directory(&self, key: &ArtifactKey) -> Result<PathBuf, ServiceError> {
        let dir = self.directory(key);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::storage(&dir, e))?;
        Ok(dir)
    }

    pub async fn write_text(&self, path: &Path, content: &str) -> Result<(), ServiceError> {
        tokio::fs::write(path, content)
            .await
            .map_err(|e| ServiceError::storage(path, e))?;
        info!("[STORE] Wrote {} bytes of text to {:?}", content.len(), path);
        Ok(())
    }

    /// Decode `base64_content` and replace the file at `path` with the bytes.
    /// Nothing is written when decoding fails.
    pub async fn write_binary(&self, path: &Path, base64_content: &str) -> Result<(), ServiceError> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(base64_content.trim())?;
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| ServiceError::storage(path, e))?;
        info!("[STORE] Wrote {} bytes of audio to {:?}", bytes.len(), path);
        Ok(())
    }
}

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

static DATA_URL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/(png|jpeg|jpg);base64,").expect("data URL pattern is valid")
});

static FILE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to decode QR image: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("failed to write QR image: {0}")]
    Io(#[from] std::io::Error),
}

/// Decodes a `qrDataURL` payload, with or without its `data:image/...;base64,` prefix.
pub fn decode_qr_image(data_url: &str) -> Result<Vec<u8>, ArtifactError> {
    let payload = DATA_URL_PREFIX.replace(data_url.trim(), "");
    let compact: String = payload.chars().filter(|ch| !ch.is_whitespace()).collect();
    Ok(general_purpose::STANDARD.decode(compact)?)
}

fn file_extension(bytes: &[u8]) -> &'static str {
    match infer::get(bytes).map(|kind| kind.mime_type()) {
        Some("image/jpeg") => "jpg",
        _ => "png",
    }
}

/// Directory of short-lived QR images. Each file is removed after `cleanup_delay`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    cleanup_delay: Duration,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, cleanup_delay: Duration) -> Self {
        Self {
            dir: dir.into(),
            cleanup_delay,
        }
    }

    pub async fn persist(&self, bytes: &[u8]) -> Result<PathBuf, ArtifactError> {
        if !tokio::fs::try_exists(&self.dir).await.unwrap_or(false) {
            tokio::fs::create_dir_all(&self.dir).await?;
            info!("Created QR tmp directory {}", self.dir.display());
        }

        let sequence = FILE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let file_name = format!(
            "qr_{}_{}.{}",
            Utc::now().timestamp_millis(),
            sequence,
            file_extension(bytes)
        );
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        info!("Saved QR image to {}", path.display());
        Ok(path)
    }

    /// Deletes `path` once the cleanup delay has passed. Failures are only logged.
    pub fn schedule_removal(&self, path: PathBuf) -> JoinHandle<()> {
        let delay = self.cleanup_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => info!("Temporary QR file deleted: {}", path.display()),
                Err(err) => warn!("Failed to delete temporary QR file {}: {err}", path.display()),
            }
        })
    }
}

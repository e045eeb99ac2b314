//! Local previews for media without a servable durable URL.
//!
//! The blob is written under the previews directory and exposed as a
//! `file://` URL, so the result can still be played or viewed.

use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use super::failure::StudioError;

/// Directory of local preview files
#[derive(Debug, Clone)]
pub struct PreviewStore {
    dir: PathBuf,
}

impl PreviewStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` and return a `file://` URL to them
    pub async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<String, StudioError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| preview_error(&self.dir, e))?;

        let path = self.dir.join(format!("{}-{}", Uuid::new_v4(), sanitize(file_name)));
        fs::write(&path, bytes)
            .await
            .map_err(|e| preview_error(&path, e))?;

        let absolute = fs::canonicalize(&path)
            .await
            .map_err(|e| preview_error(&path, e))?;
        let url = reqwest::Url::from_file_path(&absolute).map_err(|_| {
            StudioError::Unknown(format!("Cannot build preview URL for {}", absolute.display()))
        })?;
        Ok(url.to_string())
    }
}

fn preview_error(path: &Path, err: std::io::Error) -> StudioError {
    StudioError::Unknown(format!("Failed to write preview {}: {}", path.display(), err))
}

/// Keep only the final path component of an upload name
fn sanitize(file_name: &str) -> String {
    let name = Path::new(file_name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if name.is_empty() {
        "media.bin".to_string()
    } else {
        name
    }
}

//! Adapter interfaces for external systems.
//!
//! Adapters provide a unified interface for the three services the
//! authoring flow talks to: the text-to-speech API, the text-to-image API
//! and the managed backend (database + file storage).

pub mod backend;
pub mod image;
pub mod tts;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::ApiSettings;
use crate::core::failure::StudioError;
use crate::domain::{PodcastRecord, StorageId, TopCreator, TrendingPodcast, Voice};

pub use backend::BackendClient;
pub use image::ImageClient;
pub use tts::{AudioLinks, TtsClient, TtsResponse};

/// Text-to-speech provider
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Full voice catalog
    async fn list_voices(&self) -> Result<Vec<Voice>, StudioError>;

    /// Synthesize `text` with `voice` and return the MP3 bytes
    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>, StudioError>;
}

/// Text-to-image provider
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Generate an image for `prompt` and return its bytes
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, StudioError>;
}

/// Managed backend: file storage plus podcast mutations and queries
#[async_trait]
pub trait PodcastBackend: Send + Sync {
    /// Short-lived URL that accepts one upload
    async fn generate_upload_url(&self) -> Result<String, StudioError>;

    /// Upload a blob and return its storage handle
    async fn upload(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StorageId, StudioError>;

    /// Public URL for a storage handle, if the backend has one
    async fn get_url(&self, storage_id: &StorageId) -> Result<Option<String>, StudioError>;

    /// Lightweight reachability check of a URL
    async fn probe(&self, url: &str) -> bool;

    /// Persist a podcast and return its id
    async fn create_podcast(&self, record: &PodcastRecord) -> Result<String, StudioError>;

    async fn trending_podcasts(&self) -> Result<Vec<TrendingPodcast>, StudioError>;

    async fn top_creators(&self) -> Result<Vec<TopCreator>, StudioError>;
}

/// The x-rapidapi-key / x-rapidapi-host header pair
pub(crate) fn rapidapi_headers(settings: &ApiSettings) -> Result<HeaderMap, StudioError> {
    let mut headers = HeaderMap::new();
    let key = HeaderValue::from_str(&settings.api_key)
        .map_err(|_| StudioError::Unknown("API key contains invalid characters".to_string()))?;
    let host = HeaderValue::from_str(&settings.host)
        .map_err(|_| StudioError::Unknown("API host contains invalid characters".to_string()))?;
    headers.insert(HeaderName::from_static("x-rapidapi-key"), key);
    headers.insert(HeaderName::from_static("x-rapidapi-host"), host);
    Ok(headers)
}

/// Turn a non-success response into a typed failure
pub(crate) async fn error_for_status(
    service: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, StudioError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(service, status = status.as_u16(), "Request rejected");
    Err(StudioError::from_status(service, status.as_u16(), &body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rapidapi_headers() {
        let settings = ApiSettings::new("https://tts.example.com", "secret");
        let headers = rapidapi_headers(&settings).unwrap();
        assert_eq!(headers["x-rapidapi-key"], "secret");
        assert_eq!(headers["x-rapidapi-host"], "tts.example.com");
    }

    #[test]
    fn test_rapidapi_headers_reject_newlines() {
        let settings = ApiSettings::new("https://tts.example.com", "bad\nkey");
        assert!(rapidapi_headers(&settings).is_err());
    }
}

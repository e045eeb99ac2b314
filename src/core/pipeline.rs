//! Media generation pipeline.
//!
//! One call per media slot:
//!
//! ```text
//! requesting ──► uploading ──► resolving ──► ready
//!     │              │             │
//!     └──► failed    └─► ready     └─► ready
//!                  (local preview,  (local preview,
//!                   no storage id)   storage id kept)
//! ```
//!
//! Each call takes a fresh token from its slot. Work belonging to a
//! superseded token is abandoned and its result dropped.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::duration::audio_duration_secs;
use super::failure::{StudioError, ValidationError};
use super::preview::PreviewStore;
use crate::adapters::{ImageGenerator, PodcastBackend, SpeechSynthesizer};
use crate::domain::{
    GenerationPhase, GenerationToken, MediaAsset, MediaKind, MediaSlot, PodcastDraft, StorageId,
    UrlSource,
};

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";
const GENERATED_THUMBNAIL_NAME: &str = "generated-thumbnail.png";
const GENERATED_THUMBNAIL_TYPE: &str = "image/png";

/// Result of a generation call that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The slot now holds this asset
    Ready(MediaAsset),
    /// A newer call replaced this one; the slot was left alone
    Superseded,
}

impl GenerationOutcome {
    pub fn asset(&self) -> Option<&MediaAsset> {
        match self {
            GenerationOutcome::Ready(asset) => Some(asset),
            GenerationOutcome::Superseded => None,
        }
    }
}

/// Orchestrates TTS / image generation, upload and URL resolution
pub struct MediaPipeline {
    speech: Arc<dyn SpeechSynthesizer>,
    images: Arc<dyn ImageGenerator>,
    backend: Arc<dyn PodcastBackend>,
    previews: PreviewStore,
}

impl MediaPipeline {
    pub fn new(
        speech: Arc<dyn SpeechSynthesizer>,
        images: Arc<dyn ImageGenerator>,
        backend: Arc<dyn PodcastBackend>,
        previews: PreviewStore,
    ) -> Self {
        Self {
            speech,
            images,
            backend,
            previews,
        }
    }

    /// Narrate the draft's voice prompt with its selected voice
    pub async fn generate_audio(
        &self,
        draft: &PodcastDraft,
    ) -> Result<GenerationOutcome, StudioError> {
        let slot = &draft.audio;
        let token = slot.begin();
        let result = self.run_audio(draft, token).await;
        finish(slot, token, result)
    }

    /// Generate a cover image from the draft's image prompt
    pub async fn generate_thumbnail(
        &self,
        draft: &PodcastDraft,
    ) -> Result<GenerationOutcome, StudioError> {
        let slot = &draft.image;
        let token = slot.begin();
        let result = self.run_thumbnail(draft, token).await;
        finish(slot, token, result)
    }

    /// Use a local image file as the cover image
    pub async fn upload_image(
        &self,
        draft: &PodcastDraft,
        path: &Path,
    ) -> Result<GenerationOutcome, StudioError> {
        let slot = &draft.image;
        let token = slot.begin();
        let result = self.run_custom_image(slot, token, path).await;
        finish(slot, token, result)
    }

    async fn run_audio(
        &self,
        draft: &PodcastDraft,
        token: GenerationToken,
    ) -> Result<Option<MediaAsset>, StudioError> {
        if draft.voice_prompt.trim().is_empty() {
            return Err(ValidationError::MissingVoicePrompt.into());
        }
        let voice = match &draft.voice {
            Some(voice) if !draft.locale.is_empty() => voice,
            _ => return Err(ValidationError::MissingVoiceSelection.into()),
        };

        info!(
            token = token.value(),
            voice = %voice.short_name,
            chars = draft.voice_prompt.chars().count(),
            "Requesting speech"
        );
        let bytes = self.speech.synthesize(&draft.voice_prompt, voice).await?;
        let duration = audio_duration_secs(&bytes).unwrap_or(0.0);

        let file_name = format!("podcast-{}.mp3", Uuid::new_v4());
        let asset = self
            .store(&draft.audio, token, bytes, &file_name, AUDIO_CONTENT_TYPE)
            .await?;

        Ok(asset.map(|mut asset| {
            asset.duration_secs = Some(duration);
            asset
        }))
    }

    async fn run_thumbnail(
        &self,
        draft: &PodcastDraft,
        token: GenerationToken,
    ) -> Result<Option<MediaAsset>, StudioError> {
        let prompt = draft.image_prompt.trim();
        if prompt.is_empty() {
            return Err(ValidationError::EmptyImagePrompt.into());
        }

        info!(token = token.value(), generator = self.images.name(), "Requesting image");
        let bytes = self.images.generate(prompt).await?;

        self.store(
            &draft.image,
            token,
            bytes,
            GENERATED_THUMBNAIL_NAME,
            GENERATED_THUMBNAIL_TYPE,
        )
        .await
    }

    async fn run_custom_image(
        &self,
        slot: &MediaSlot,
        token: GenerationToken,
        path: &Path,
    ) -> Result<Option<MediaAsset>, StudioError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            StudioError::Unknown(format!("Error Uploading Image {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());

        info!(token = token.value(), file = %file_name, size = bytes.len(), "Uploading custom image");
        self.store(slot, token, bytes, &file_name, image_content_type(path))
            .await
    }

    /// Upload and resolve a blob. `Ok(None)` means the token was superseded.
    async fn store(
        &self,
        slot: &MediaSlot,
        token: GenerationToken,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<Option<MediaAsset>, StudioError> {
        let kind = slot.kind();

        if !slot.advance(token, GenerationPhase::Uploading) {
            return Ok(None);
        }

        let storage_id = match self.upload(bytes.clone(), content_type).await {
            Ok(id) => id,
            Err(e) => {
                warn!(%kind, error = %e, "Upload failed, using local preview");
                let url = self.previews.write(file_name, &bytes).await?;
                return Ok(Some(local_asset(kind, url, None)));
            }
        };

        if !slot.advance(token, GenerationPhase::Resolving) {
            return Ok(None);
        }

        let durable = match self.backend.get_url(&storage_id).await {
            Ok(Some(url)) => {
                if self.backend.probe(&url).await {
                    Some(url)
                } else {
                    warn!(%kind, %url, "Storage URL not reachable yet");
                    None
                }
            }
            Ok(None) => {
                warn!(%kind, %storage_id, "Backend returned no URL");
                None
            }
            Err(e) => {
                warn!(%kind, %storage_id, error = %e, "Failed to resolve storage URL");
                None
            }
        };

        match durable {
            Some(url) => {
                debug!(%kind, %storage_id, %url, "Resolved durable URL");
                Ok(Some(MediaAsset {
                    kind,
                    url,
                    source: UrlSource::Durable,
                    storage_id: Some(storage_id),
                    duration_secs: None,
                }))
            }
            None => {
                let url = self.previews.write(file_name, &bytes).await?;
                Ok(Some(local_asset(kind, url, Some(storage_id))))
            }
        }
    }

    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<StorageId, StudioError> {
        let upload_url = self.backend.generate_upload_url().await?;
        self.backend.upload(&upload_url, bytes, content_type).await
    }
}

fn local_asset(kind: MediaKind, url: String, storage_id: Option<StorageId>) -> MediaAsset {
    MediaAsset {
        kind,
        url,
        source: UrlSource::LocalPreview,
        storage_id,
        duration_secs: None,
    }
}

/// Record the terminal phase, unless the token was superseded
fn finish(
    slot: &MediaSlot,
    token: GenerationToken,
    result: Result<Option<MediaAsset>, StudioError>,
) -> Result<GenerationOutcome, StudioError> {
    let kind = slot.kind();
    match result {
        Ok(Some(asset)) => {
            if slot.advance(token, GenerationPhase::Ready(asset.clone())) {
                info!(%kind, token = token.value(), source = ?asset.source, "Media ready");
                Ok(GenerationOutcome::Ready(asset))
            } else {
                debug!(%kind, token = token.value(), "Dropping superseded result");
                Ok(GenerationOutcome::Superseded)
            }
        }
        Ok(None) => {
            debug!(%kind, token = token.value(), "Generation superseded");
            Ok(GenerationOutcome::Superseded)
        }
        Err(e) => {
            let failed = GenerationPhase::Failed {
                kind: e.kind(),
                message: e.to_string(),
            };
            if slot.advance(token, failed) {
                warn!(%kind, token = token.value(), error = %e, "Generation failed");
                Err(e)
            } else {
                debug!(%kind, token = token.value(), error = %e, "Dropping superseded failure");
                Ok(GenerationOutcome::Superseded)
            }
        }
    }
}

/// MIME type for an uploaded image, from its extension
pub fn image_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    use crate::domain::{FailureKind, PodcastRecord, TopCreator, TrendingPodcast, Voice};

    /// Speech provider that blocks the first call until released
    struct GatedSpeech {
        calls: AtomicUsize,
        gate: Notify,
    }

    #[async_trait]
    impl SpeechSynthesizer for GatedSpeech {
        fn name(&self) -> &str {
            "gated"
        }

        async fn list_voices(&self) -> Result<Vec<Voice>, StudioError> {
            Ok(Vec::new())
        }

        async fn synthesize(&self, text: &str, _voice: &Voice) -> Result<Vec<u8>, StudioError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.gate.notified().await;
            }
            Ok(text.as_bytes().to_vec())
        }
    }

    struct NoImages;

    #[async_trait]
    impl ImageGenerator for NoImages {
        fn name(&self) -> &str {
            "none"
        }

        async fn generate(&self, _prompt: &str) -> Result<Vec<u8>, StudioError> {
            Err(StudioError::RateLimited {
                service: "image".to_string(),
            })
        }
    }

    /// Backend whose URLs echo the uploaded payload
    struct EchoBackend {
        uploads: AtomicUsize,
    }

    #[async_trait]
    impl PodcastBackend for EchoBackend {
        async fn generate_upload_url(&self) -> Result<String, StudioError> {
            Ok("https://upload.example.com".to_string())
        }

        async fn upload(
            &self,
            _upload_url: &str,
            bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<StorageId, StudioError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok(StorageId::new(String::from_utf8_lossy(&bytes).to_string()))
        }

        async fn get_url(&self, storage_id: &StorageId) -> Result<Option<String>, StudioError> {
            Ok(Some(format!("https://files.example.com/{}", storage_id)))
        }

        async fn probe(&self, _url: &str) -> bool {
            true
        }

        async fn create_podcast(&self, _record: &PodcastRecord) -> Result<String, StudioError> {
            unreachable!("not used by the pipeline")
        }

        async fn trending_podcasts(&self) -> Result<Vec<TrendingPodcast>, StudioError> {
            Ok(Vec::new())
        }

        async fn top_creators(&self) -> Result<Vec<TopCreator>, StudioError> {
            Ok(Vec::new())
        }
    }

    fn pipeline(temp: &TempDir) -> (MediaPipeline, Arc<GatedSpeech>, Arc<EchoBackend>) {
        let speech = Arc::new(GatedSpeech {
            calls: AtomicUsize::new(0),
            gate: Notify::new(),
        });
        let backend = Arc::new(EchoBackend {
            uploads: AtomicUsize::new(0),
        });
        let pipeline = MediaPipeline::new(
            speech.clone(),
            Arc::new(NoImages),
            backend.clone(),
            PreviewStore::new(temp.path().join("previews")),
        );
        (pipeline, speech, backend)
    }

    fn draft_with_voice(prompt: &str) -> PodcastDraft {
        let mut draft = PodcastDraft::new();
        draft.select_voice(Voice::new("en-US-GuyNeural", "en-US", "Guy"));
        draft.voice_prompt = prompt.to_string();
        draft
    }

    #[tokio::test]
    async fn test_superseded_call_does_not_overwrite_newer_result() {
        let temp = TempDir::new().unwrap();
        let (pipeline, speech, backend) = pipeline(&temp);
        let draft = draft_with_voice("first");

        // The first call parks inside synthesize until the gate opens
        let first = pipeline.generate_audio(&draft);
        let second = async {
            tokio::task::yield_now().await;
            let outcome = pipeline.generate_audio(&draft).await;
            speech.gate.notify_one();
            outcome
        };

        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap(), GenerationOutcome::Superseded);
        let second = second.unwrap();
        assert!(matches!(second, GenerationOutcome::Ready(_)));
        assert_eq!(draft.audio.asset(), second.asset().cloned());
        // The stale call never reached the upload step
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_prompt_fails_before_network() {
        let temp = TempDir::new().unwrap();
        let (pipeline, speech, _) = pipeline(&temp);
        let draft = draft_with_voice("   ");

        let err = pipeline.generate_audio(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            StudioError::Validation(ValidationError::MissingVoicePrompt)
        ));
        assert_eq!(speech.calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            draft.audio.phase(),
            GenerationPhase::Failed {
                kind: FailureKind::Validation,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_voice_fails() {
        let temp = TempDir::new().unwrap();
        let (pipeline, _, _) = pipeline(&temp);
        let mut draft = PodcastDraft::new();
        draft.voice_prompt = "hello".to_string();

        let err = pipeline.generate_audio(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            StudioError::Validation(ValidationError::MissingVoiceSelection)
        ));
    }

    #[tokio::test]
    async fn test_image_failure_is_recorded_on_image_slot_only() {
        let temp = TempDir::new().unwrap();
        let (pipeline, _, _) = pipeline(&temp);
        let mut draft = PodcastDraft::new();
        draft.image_prompt = "a cat on a podcast mic".to_string();

        let err = pipeline.generate_thumbnail(&draft).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::RateLimited);
        assert_eq!(draft.image.phase().name(), "failed");
        assert_eq!(draft.audio.phase(), GenerationPhase::Idle);
    }

    #[tokio::test]
    async fn test_custom_image_upload() {
        let temp = TempDir::new().unwrap();
        let (pipeline, _, _) = pipeline(&temp);
        let draft = PodcastDraft::new();

        let path: PathBuf = temp.path().join("cover.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let outcome = pipeline.upload_image(&draft, &path).await.unwrap();
        let asset = outcome.asset().unwrap();
        assert_eq!(asset.kind, MediaKind::Image);
        assert_eq!(asset.url, "https://files.example.com/jpeg");
        assert!(asset.is_durable());
    }

    #[tokio::test]
    async fn test_custom_image_missing_file() {
        let temp = TempDir::new().unwrap();
        let (pipeline, _, _) = pipeline(&temp);
        let draft = PodcastDraft::new();

        let err = pipeline
            .upload_image(&draft, &temp.path().join("nope.png"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unknown);
    }

    #[test]
    fn test_image_content_type() {
        assert_eq!(image_content_type(Path::new("a.PNG")), "image/png");
        assert_eq!(image_content_type(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(image_content_type(Path::new("a.svg")), "image/svg+xml");
        assert_eq!(
            image_content_type(Path::new("a")),
            "application/octet-stream"
        );
    }
}

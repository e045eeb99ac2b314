//! Podcast submission flow.
//!
//! Validates the draft, assembles a [`PodcastRecord`] and persists it with
//! a single `createPodcast` mutation. Media already uploaded is left in
//! place when the write fails.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use super::failure::{Notice, StudioError, ValidationError};
use crate::adapters::PodcastBackend;
use crate::domain::{PodcastDraft, PodcastRecord, HOME_ROUTE};

/// Minimum length of title and description
pub const MIN_TEXT_LEN: usize = 2;

/// What a successful submission produced
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub podcast_id: String,
    pub record: PodcastRecord,
    /// Route to navigate to next
    pub redirect: &'static str,
}

/// Validate the draft and build the record to persist
pub fn build_record(draft: &PodcastDraft) -> Result<PodcastRecord, ValidationError> {
    if draft.title.chars().count() < MIN_TEXT_LEN {
        return Err(ValidationError::TooShort {
            field: "podcastTitle",
            min: MIN_TEXT_LEN,
        });
    }
    if draft.description.chars().count() < MIN_TEXT_LEN {
        return Err(ValidationError::TooShort {
            field: "podcastDescription",
            min: MIN_TEXT_LEN,
        });
    }

    let audio = draft.audio_asset();
    let image = draft.image_asset();
    let audio_url = audio.as_ref().map(|a| a.url.clone()).unwrap_or_default();
    let image_url = image.as_ref().map(|a| a.url.clone()).unwrap_or_default();

    let mut missing = Vec::new();
    if audio_url.is_empty() {
        missing.push("audioUrl");
    }
    if image_url.is_empty() {
        missing.push("imageUrl");
    }
    if draft.genre.is_empty() {
        missing.push("genre");
    }
    if draft.voice_type().is_empty() {
        missing.push("voiceType");
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    Ok(PodcastRecord {
        podcast_title: draft.title.clone(),
        podcast_description: draft.description.clone(),
        audio_url,
        image_url,
        voice_prompt: draft.voice_prompt.clone(),
        image_prompt: draft.image_prompt.clone(),
        voice_type: draft.voice_type().to_string(),
        genre: draft.genre.clone(),
        views: 0,
        audio_duration: audio.as_ref().and_then(|a| a.duration_secs).unwrap_or(0.0),
        audio_storage_id: audio.and_then(|a| a.storage_id),
        image_storage_id: image.and_then(|a| a.storage_id),
    })
}

/// Notice shown after a submission attempt fails
pub fn failure_notice(err: &StudioError) -> Notice {
    match err {
        StudioError::Validation(v) => Notice::error(v.to_string()),
        _ => Notice::error("Error"),
    }
}

/// Notice shown after a successful submission
pub fn success_notice() -> Notice {
    Notice::info("Podcast Created")
}

/// Submits drafts; at most one submission in flight
pub struct Submitter {
    backend: Arc<dyn PodcastBackend>,
    submitting: AtomicBool,
}

impl Submitter {
    pub fn new(backend: Arc<dyn PodcastBackend>) -> Self {
        Self {
            backend,
            submitting: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub async fn submit(&self, draft: &PodcastDraft) -> Result<SubmissionOutcome, StudioError> {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return Err(ValidationError::AlreadySubmitting.into());
        }

        let result = self.submit_inner(draft).await;
        self.submitting.store(false, Ordering::SeqCst);

        match &result {
            Ok(outcome) => info!(
                podcast_id = %outcome.podcast_id,
                title = %outcome.record.podcast_title,
                "Podcast created"
            ),
            Err(e) => warn!(error = %e, "Podcast submission failed"),
        }
        result
    }

    async fn submit_inner(&self, draft: &PodcastDraft) -> Result<SubmissionOutcome, StudioError> {
        let record = build_record(draft)?;
        let podcast_id = self.backend.create_podcast(&record).await?;
        Ok(SubmissionOutcome {
            podcast_id,
            record,
            redirect: HOME_ROUTE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GenerationPhase, MediaAsset, MediaKind, StorageId, UrlSource, Voice};

    fn ready(draft: &PodcastDraft, kind: MediaKind, url: &str) {
        let slot = match kind {
            MediaKind::Audio => &draft.audio,
            MediaKind::Image => &draft.image,
        };
        let token = slot.begin();
        slot.advance(
            token,
            GenerationPhase::Ready(MediaAsset {
                kind,
                url: url.to_string(),
                source: UrlSource::Durable,
                storage_id: Some(StorageId::new(format!("{}-id", kind))),
                duration_secs: Some(12.5),
            }),
        );
    }

    fn complete_draft() -> PodcastDraft {
        let mut draft = PodcastDraft::new();
        draft.title = "Ep1".to_string();
        draft.description = "desc".to_string();
        draft.genre = "comedy".to_string();
        draft.select_voice(Voice::new("en-US-Guy", "en-US", "Guy"));
        ready(&draft, MediaKind::Audio, "https://files/a.mp3");
        ready(&draft, MediaKind::Image, "https://files/i.png");
        draft
    }

    #[test]
    fn test_build_record_from_complete_draft() {
        let record = build_record(&complete_draft()).unwrap();
        assert_eq!(record.views, 0);
        assert_eq!(record.audio_duration, 12.5);
        assert_eq!(record.audio_storage_id, Some(StorageId::new("audio-id")));
        assert_eq!(record.image_storage_id, Some(StorageId::new("image-id")));
    }

    #[test]
    fn test_each_required_field_is_enforced() {
        let mut no_genre = complete_draft();
        no_genre.genre.clear();
        assert_eq!(
            build_record(&no_genre).unwrap_err(),
            ValidationError::MissingFields(vec!["genre"])
        );

        let mut no_voice = complete_draft();
        no_voice.voice = None;
        assert_eq!(
            build_record(&no_voice).unwrap_err(),
            ValidationError::MissingFields(vec!["voiceType"])
        );

        let no_audio = complete_draft();
        no_audio.audio.begin();
        assert_eq!(
            build_record(&no_audio).unwrap_err(),
            ValidationError::MissingFields(vec!["audioUrl"])
        );

        let no_image = complete_draft();
        no_image.image.begin();
        assert_eq!(
            build_record(&no_image).unwrap_err(),
            ValidationError::MissingFields(vec!["imageUrl"])
        );
    }

    #[test]
    fn test_short_title_rejected() {
        let mut draft = complete_draft();
        draft.title = "E".to_string();
        assert!(matches!(
            build_record(&draft).unwrap_err(),
            ValidationError::TooShort {
                field: "podcastTitle",
                ..
            }
        ));
    }

    #[test]
    fn test_failure_notices() {
        let generic = failure_notice(&StudioError::Network("reset".to_string()));
        assert_eq!(generic.title, "Error");

        let validation = failure_notice(&ValidationError::MissingFields(vec!["genre"]).into());
        assert!(validation.title.starts_with("Please generate Audio and Image"));

        assert_eq!(success_notice().title, "Podcast Created");
    }
}

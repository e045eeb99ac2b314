//! Podcast records and the draft they are assembled from.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::media::{MediaAsset, MediaKind, MediaSlot};
use super::voice::Voice;

/// Route the client navigates to after a podcast is created
pub const HOME_ROUTE: &str = "/";

/// Genres offered by the create form
pub const GENRES: &[&str] = &[
    "true crime",
    "comedy",
    "news",
    "business",
    "technology",
    "health",
    "education",
    "history",
    "science",
    "sports",
    "personal development",
    "fiction",
    "self-help",
    "music",
    "parenting",
    "relationships",
    "politics",
    "travel",
    "culture",
    "interviews",
];

/// Opaque handle returned by backend file storage for an uploaded blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageId(pub String);

impl StorageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The record persisted by the `createPodcast` mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastRecord {
    pub podcast_title: String,
    pub podcast_description: String,
    pub audio_url: String,
    pub image_url: String,
    pub voice_prompt: String,
    pub image_prompt: String,
    /// Short name of the voice used for narration
    pub voice_type: String,
    pub genre: String,
    pub views: u64,
    /// Seconds
    pub audio_duration: f64,
    pub audio_storage_id: Option<StorageId>,
    pub image_storage_id: Option<StorageId>,
}

/// Row of the trending podcasts query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingPodcast {
    #[serde(rename = "_id")]
    pub id: String,
    pub podcast_title: String,
    #[serde(default)]
    pub podcast_description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub views: u64,
}

/// Row of the top creators query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCreator {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub clerk_id: String,
    #[serde(default)]
    pub total_podcasts: u64,
}

impl TopCreator {
    /// "1 podcast" / "3 podcasts"
    pub fn podcast_count_label(&self) -> String {
        let noun = if self.total_podcasts == 1 {
            "podcast"
        } else {
            "podcasts"
        };
        format!("{} {}", self.total_podcasts, noun)
    }
}

/// Everything the create form holds before submission.
///
/// The two media slots are written by the generation pipeline and read
/// back by the submission flow.
#[derive(Debug)]
pub struct PodcastDraft {
    pub title: String,
    pub description: String,
    pub genre: String,
    /// Selected language (locale code)
    pub locale: String,
    pub voice: Option<Voice>,
    pub voice_prompt: String,
    pub image_prompt: String,
    pub audio: MediaSlot,
    pub image: MediaSlot,
}

impl Default for PodcastDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl PodcastDraft {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            genre: String::new(),
            locale: String::new(),
            voice: None,
            voice_prompt: String::new(),
            image_prompt: String::new(),
            audio: MediaSlot::new(MediaKind::Audio),
            image: MediaSlot::new(MediaKind::Image),
        }
    }

    /// Short name of the selected voice, empty if none
    pub fn voice_type(&self) -> &str {
        self.voice.as_ref().map(|v| v.short_name.as_str()).unwrap_or("")
    }

    /// Select a voice and its locale together
    pub fn select_voice(&mut self, voice: Voice) {
        self.locale = voice.locale.clone();
        self.voice = Some(voice);
    }

    pub fn audio_asset(&self) -> Option<MediaAsset> {
        self.audio.asset()
    }

    pub fn image_asset(&self) -> Option<MediaAsset> {
        self.image.asset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wire_names() {
        let record = PodcastRecord {
            podcast_title: "Ep1".to_string(),
            podcast_description: "desc".to_string(),
            audio_url: "https://a".to_string(),
            image_url: "https://i".to_string(),
            voice_prompt: "hello".to_string(),
            image_prompt: String::new(),
            voice_type: "en-US-Guy".to_string(),
            genre: "comedy".to_string(),
            views: 0,
            audio_duration: 1.5,
            audio_storage_id: Some(StorageId::new("kg2abc")),
            image_storage_id: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["podcastTitle"], "Ep1");
        assert_eq!(json["voiceType"], "en-US-Guy");
        assert_eq!(json["audioStorageId"], "kg2abc");
        assert!(json["imageStorageId"].is_null());
        assert_eq!(json["views"], 0);
    }

    #[test]
    fn test_podcast_count_label() {
        let mut creator = TopCreator {
            id: "u1".to_string(),
            name: "Ann".to_string(),
            image_url: String::new(),
            clerk_id: "user_1".to_string(),
            total_podcasts: 1,
        };
        assert_eq!(creator.podcast_count_label(), "1 podcast");
        creator.total_podcasts = 4;
        assert_eq!(creator.podcast_count_label(), "4 podcasts");
    }

    #[test]
    fn test_draft_voice_selection() {
        let mut draft = PodcastDraft::new();
        assert_eq!(draft.voice_type(), "");

        draft.select_voice(Voice::new("en-US-Guy", "en-US", "Guy"));
        assert_eq!(draft.voice_type(), "en-US-Guy");
        assert_eq!(draft.locale, "en-US");
        assert_eq!(draft.audio.kind(), MediaKind::Audio);
        assert_eq!(draft.image.kind(), MediaKind::Image);
    }
}

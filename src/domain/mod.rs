//! Domain types for podcastr.
//!
//! This module contains the core data structures:
//! - Voice: entries of the TTS voice catalog
//! - Podcast: the persisted record and the draft it is built from
//! - Media: generated assets and the per-slot generation state machine

pub mod media;
pub mod podcast;
pub mod voice;

// Re-export commonly used types
pub use media::{
    FailureKind, GenerationPhase, GenerationToken, MediaAsset, MediaKind, MediaSlot, SlotState,
    UrlSource,
};
pub use podcast::{
    PodcastDraft, PodcastRecord, StorageId, TopCreator, TrendingPodcast, GENRES, HOME_ROUTE,
};
pub use voice::{language_display_name, unique_locales, voices_for_locale, Voice};

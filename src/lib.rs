//! podcastr - Podcast authoring pipeline
//!
//! Write a transcript, pick a synthesized voice, generate narration and a
//! cover image through third-party AI APIs, then publish the podcast
//! record to a managed backend.
//!
//! # Architecture
//!
//! - Voices are fetched once and cached on disk
//! - Each media slot (audio, image) runs its own generation state machine,
//!   guarded by in-flight tokens so a superseded call cannot win
//! - Media is uploaded to backend storage; when the durable URL is not yet
//!   servable a local preview is used instead
//! - A draft is validated and persisted with one create mutation
//!
//! # Modules
//!
//! - `adapters`: External services (TTS, image generation, backend)
//! - `core`: Voice catalog, media pipeline, submission, failures
//! - `domain`: Data structures (Voice, PodcastRecord, MediaSlot)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Find a voice
//! podcastr voices languages --search english
//! podcastr voices list --locale en-US
//!
//! # Generate and publish
//! podcastr create --title "Ep1" --description "desc" --genre comedy \
//!     --voice en-US-GuyNeural --text "Hello there" --image-prompt "a microphone"
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::core::{MediaPipeline, StudioError, Submitter, VoiceCatalog, VoiceCatalogCache};
pub use domain::{MediaAsset, MediaKind, PodcastDraft, PodcastRecord, StorageId, Voice};

//! Core authoring logic.
//!
//! This module contains:
//! - VoiceCatalogCache: persisted, lazily loaded voice list
//! - MediaPipeline: generate, upload and resolve audio and cover images
//! - Submitter: validate a draft and persist the podcast record
//! - Failure: error taxonomy and user notices

pub mod duration;
pub mod failure;
pub mod pipeline;
pub mod preview;
pub mod studio;
pub mod submission;
pub mod voice_catalog;

// Re-export commonly used types
pub use failure::{Notice, NoticeVariant, StudioError, ValidationError};
pub use pipeline::{GenerationOutcome, MediaPipeline};
pub use preview::PreviewStore;
pub use studio::Studio;
pub use submission::{build_record, SubmissionOutcome, Submitter};
pub use voice_catalog::{VoiceCatalog, VoiceCatalogCache};

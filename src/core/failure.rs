//! Failure taxonomy and user-facing notices.
//!
//! Every failure is caught at the call site and turned into a [`Notice`].
//! Nothing here retries; the user simply tries again.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{FailureKind, MediaKind};

/// Character limit quoted by the TTS provider for the BASIC plan
pub const TTS_CHARACTER_LIMIT_HINT: &str = "1000 characters";

const DEFAULT_TOO_LONG_DETAIL: &str = "Text is too long for your current plan.";

/// Errors surfaced by the generation pipeline and submission flow
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Rate limited by {service}")]
    RateLimited { service: String },

    #[error("Payload too large: {}", .detail.as_deref().unwrap_or("no detail"))]
    PayloadTooLarge { detail: Option<String> },

    #[error("Authentication rejected by {service}")]
    Auth { service: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Unknown(String),
}

/// Input problems caught before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please provide a voiceType to generate a podcast")]
    MissingVoicePrompt,

    #[error("Please select language and Ai voice first")]
    MissingVoiceSelection,

    #[error("Please enter a prompt")]
    EmptyImagePrompt,

    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("{field} must contain at least {min} character(s)")]
    TooShort { field: &'static str, min: usize },

    #[error("Please generate Audio and Image (missing: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("A submission is already in progress")]
    AlreadySubmitting,
}

impl From<reqwest::Error> for StudioError {
    fn from(err: reqwest::Error) -> Self {
        StudioError::Network(err.to_string())
    }
}

impl StudioError {
    /// Map an HTTP error status from `service` to a typed failure.
    ///
    /// `body` is the raw response body; a JSON `detail` field is kept for
    /// payload-too-large responses.
    pub fn from_status(service: &str, status: u16, body: &str) -> Self {
        match status {
            401 => StudioError::Auth {
                service: service.to_string(),
            },
            413 => StudioError::PayloadTooLarge {
                detail: extract_detail(body),
            },
            429 => StudioError::RateLimited {
                service: service.to_string(),
            },
            _ => StudioError::Unknown(format!("{} returned HTTP {}", service, status)),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            StudioError::Network(_) => FailureKind::Network,
            StudioError::RateLimited { .. } => FailureKind::RateLimited,
            StudioError::PayloadTooLarge { .. } => FailureKind::PayloadTooLarge,
            StudioError::Auth { .. } => FailureKind::Auth,
            StudioError::Validation(_) => FailureKind::Validation,
            StudioError::Unknown(_) => FailureKind::Unknown,
        }
    }

    /// The notice shown when generating `kind` media fails with this error
    pub fn notice(&self, kind: MediaKind) -> Notice {
        match self {
            StudioError::PayloadTooLarge { detail } => {
                let detail = detail.as_deref().unwrap_or(DEFAULT_TOO_LONG_DETAIL);
                let description = if detail.contains(TTS_CHARACTER_LIMIT_HINT) {
                    "Your text exceeds the 1000 character limit for the BASIC plan. \
                     Please shorten your transcript and try again."
                        .to_string()
                } else {
                    detail.to_string()
                };
                Notice::error("Text Too Long").with_description(description)
            }
            StudioError::Auth { .. } => Notice::error("Authentication Error").with_description(
                "There's an issue with the API authentication. Please try again later.",
            ),
            StudioError::RateLimited { .. } => Notice::error("Rate Limit Exceeded")
                .with_description(
                    "You've made too many requests. Please wait a moment and try again.",
                ),
            StudioError::Network(_) => {
                let title = match kind {
                    MediaKind::Audio => "Error creating a podcast",
                    MediaKind::Image => "Error generating image",
                };
                Notice::error(title)
                    .with_description("An unexpected error occurred. Please try again.")
            }
            StudioError::Validation(v) => Notice::error(v.to_string()),
            StudioError::Unknown(detail) => match kind {
                MediaKind::Audio => Notice::error("Audio Generation Failed").with_description(
                    "Unable to generate audio. Please check your text and try again.",
                ),
                MediaKind::Image => {
                    Notice::error("Error generating image").with_description(detail.clone())
                }
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: Option<serde_json::Value>,
}

/// Pull a human-readable `detail` out of an error body
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorDetail = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// A short message for the user (the toast of the original form)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: Option<String>,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            variant: NoticeVariant::Default,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(desc) => write!(f, "{}: {}", self.title, desc),
            None => write!(f, "{}", self.title),
        }
    }
}

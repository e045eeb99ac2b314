//! Generated media and the per-slot generation state machine.
//!
//! Each media slot (audio, image) moves through
//! `Idle -> Requesting -> Uploading -> Resolving -> Ready | Failed`.
//! Starting a generation hands out a fresh [`GenerationToken`]; any update
//! carrying an older token is dropped, so a superseded call can never
//! overwrite the result of the call that replaced it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::podcast::StorageId;

/// Which slot of the draft a piece of media belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Image,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Image => write!(f, "image"),
        }
    }
}

/// Where the displayed URL of an asset points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlSource {
    /// Public URL served by backend storage, verified by probe
    Durable,
    /// Local preview file; the durable URL was missing or unreachable
    LocalPreview,
}

/// A generated (or uploaded) piece of media ready for the draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub kind: MediaKind,
    /// URL to show or play
    pub url: String,
    pub source: UrlSource,
    /// Backend storage handle; `None` when the upload itself failed
    pub storage_id: Option<StorageId>,
    /// Playback length in seconds (audio only)
    pub duration_secs: Option<f64>,
}

impl MediaAsset {
    pub fn is_durable(&self) -> bool {
        self.source == UrlSource::Durable
    }
}

/// Coarse failure class, used for user messaging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    RateLimited,
    PayloadTooLarge,
    Auth,
    Validation,
    Unknown,
}

/// Phase of a single generation request
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationPhase {
    Idle,
    Requesting,
    Uploading,
    Resolving,
    Ready(MediaAsset),
    Failed { kind: FailureKind, message: String },
}

impl GenerationPhase {
    /// True while a request is in flight
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            GenerationPhase::Requesting | GenerationPhase::Uploading | GenerationPhase::Resolving
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            GenerationPhase::Idle => "idle",
            GenerationPhase::Requesting => "requesting",
            GenerationPhase::Uploading => "uploading",
            GenerationPhase::Resolving => "resolving",
            GenerationPhase::Ready(_) => "ready",
            GenerationPhase::Failed { .. } => "failed",
        }
    }
}

/// Identifies one generation call on a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(u64);

impl GenerationToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Snapshot of a slot, as seen by observers
#[derive(Debug, Clone, PartialEq)]
pub struct SlotState {
    /// Latest token handed out (0 = never started)
    pub current: u64,
    pub phase: GenerationPhase,
}

/// One media slot of the draft.
///
/// Backed by a watch channel so callers can follow phase changes while a
/// generation runs.
#[derive(Debug)]
pub struct MediaSlot {
    kind: MediaKind,
    state: watch::Sender<SlotState>,
}

impl MediaSlot {
    pub fn new(kind: MediaKind) -> Self {
        let (state, _) = watch::channel(SlotState {
            current: 0,
            phase: GenerationPhase::Idle,
        });
        Self { kind, state }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Start a new generation, superseding any in-flight one.
    ///
    /// Clears the previous result, as the form does when "Generate" is hit.
    pub fn begin(&self) -> GenerationToken {
        let mut token = 0;
        self.state.send_modify(|s| {
            s.current += 1;
            s.phase = GenerationPhase::Requesting;
            token = s.current;
        });
        GenerationToken(token)
    }

    /// Move to `phase` if `token` is still current. Returns false for
    /// superseded tokens, leaving the slot untouched.
    pub fn advance(&self, token: GenerationToken, phase: GenerationPhase) -> bool {
        self.state.send_if_modified(|s| {
            if s.current != token.0 {
                return false;
            }
            s.phase = phase;
            true
        })
    }

    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.state.borrow().current == token.0
    }

    pub fn phase(&self) -> GenerationPhase {
        self.state.borrow().phase.clone()
    }

    /// The ready asset, if the latest generation finished successfully
    pub fn asset(&self) -> Option<MediaAsset> {
        match &self.state.borrow().phase {
            GenerationPhase::Ready(asset) => Some(asset.clone()),
            _ => None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SlotState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(url: &str) -> MediaAsset {
        MediaAsset {
            kind: MediaKind::Audio,
            url: url.to_string(),
            source: UrlSource::Durable,
            storage_id: Some(StorageId::new("s1")),
            duration_secs: Some(2.0),
        }
    }

    #[test]
    fn test_slot_happy_path() {
        let slot = MediaSlot::new(MediaKind::Audio);
        assert_eq!(slot.phase(), GenerationPhase::Idle);

        let token = slot.begin();
        assert!(slot.phase().is_busy());
        assert!(slot.advance(token, GenerationPhase::Uploading));
        assert!(slot.advance(token, GenerationPhase::Resolving));
        assert!(slot.advance(token, GenerationPhase::Ready(asset("https://a"))));

        assert_eq!(slot.asset().unwrap().url, "https://a");
        assert!(!slot.phase().is_busy());
    }

    #[test]
    fn test_superseded_token_is_ignored() {
        let slot = MediaSlot::new(MediaKind::Audio);

        let first = slot.begin();
        let second = slot.begin();
        assert!(!slot.is_current(first));
        assert!(slot.is_current(second));

        assert!(slot.advance(second, GenerationPhase::Ready(asset("https://new"))));
        // Late completion of the first call must not clobber the second
        assert!(!slot.advance(first, GenerationPhase::Ready(asset("https://old"))));
        assert_eq!(slot.asset().unwrap().url, "https://new");
    }

    #[test]
    fn test_begin_clears_previous_result() {
        let slot = MediaSlot::new(MediaKind::Image);
        let token = slot.begin();
        slot.advance(token, GenerationPhase::Ready(asset("https://a")));
        assert!(slot.asset().is_some());

        slot.begin();
        assert!(slot.asset().is_none());
        assert_eq!(slot.phase().name(), "requesting");
    }

    #[test]
    fn test_subscribers_see_phase_changes() {
        let slot = MediaSlot::new(MediaKind::Audio);
        let mut rx = slot.subscribe();

        let token = slot.begin();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().phase, GenerationPhase::Requesting);

        slot.advance(
            token,
            GenerationPhase::Failed {
                kind: FailureKind::RateLimited,
                message: "slow down".to_string(),
            },
        );
        assert_eq!(rx.borrow_and_update().phase.name(), "failed");
    }
}

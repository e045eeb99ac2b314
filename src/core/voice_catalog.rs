//! Voice catalog cache.
//!
//! The voice list is read from a JSON file on first need. If the file is
//! absent the list is fetched from the TTS provider once and persisted.
//! A failed fetch is logged and leaves the catalog empty; there is no
//! retry until [`VoiceCatalogCache::refresh`] is called explicitly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::failure::StudioError;
use crate::adapters::SpeechSynthesizer;
use crate::domain::{language_display_name, unique_locales, voices_for_locale, Voice};

/// An immutable snapshot of the voice list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
}

impl VoiceCatalog {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Deduplicated locales in first-seen order
    pub fn locales(&self) -> Vec<String> {
        unique_locales(&self.voices)
    }

    /// Exactly the voices with this locale
    pub fn voices_for_locale(&self, locale: &str) -> Vec<&Voice> {
        voices_for_locale(&self.voices, locale)
    }

    pub fn language_display_name(&self, locale: &str) -> String {
        language_display_name(&self.voices, locale)
    }

    /// Locales whose code or display name contains `query` (case-insensitive)
    pub fn search_locales(&self, query: &str) -> Vec<String> {
        let query_lower = query.to_lowercase();
        self.locales()
            .into_iter()
            .filter(|locale| {
                locale.to_lowercase().contains(&query_lower)
                    || self
                        .language_display_name(locale)
                        .to_lowercase()
                        .contains(&query_lower)
            })
            .collect()
    }

    pub fn find_voice(&self, short_name: &str) -> Option<&Voice> {
        self.voices.iter().find(|v| v.short_name == short_name)
    }
}

/// On-disk format written by this cache
#[derive(Debug, Serialize, Deserialize)]
struct CachedVoices {
    fetched_at: DateTime<Utc>,
    voices: Vec<Voice>,
}

/// Accepted on-disk formats (bare arrays come from older caches)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CacheFile {
    Envelope(CachedVoices),
    Bare(Vec<Voice>),
}

/// Process-wide, read-mostly voice catalog backed by a cache file
pub struct VoiceCatalogCache {
    path: PathBuf,
    provider: Arc<dyn SpeechSynthesizer>,
    loaded: RwLock<Option<Arc<VoiceCatalog>>>,
}

impl VoiceCatalogCache {
    pub fn new(path: impl Into<PathBuf>, provider: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            path: path.into(),
            provider,
            loaded: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The catalog, loading it on first call
    pub async fn get(&self) -> Arc<VoiceCatalog> {
        if let Some(catalog) = self.loaded.read().await.as_ref() {
            return Arc::clone(catalog);
        }

        let mut slot = self.loaded.write().await;
        // Another caller may have loaded it while we waited
        if let Some(catalog) = slot.as_ref() {
            return Arc::clone(catalog);
        }

        let catalog = Arc::new(self.load_or_fetch().await);
        *slot = Some(Arc::clone(&catalog));
        catalog
    }

    /// Fetch from the provider, overwrite the cache file and swap it in
    pub async fn refresh(&self) -> Result<Arc<VoiceCatalog>, StudioError> {
        let voices = self.provider.list_voices().await?;
        if let Err(e) = self.persist(&voices).await {
            warn!(path = %self.path.display(), error = %e, "Failed to persist voice catalog");
        }
        let catalog = Arc::new(VoiceCatalog::new(voices));
        *self.loaded.write().await = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    async fn load_or_fetch(&self) -> VoiceCatalog {
        match read_cache(&self.path).await {
            Ok(Some(voices)) => {
                info!(count = voices.len(), path = %self.path.display(), "Loaded cached voices");
                return VoiceCatalog::new(voices);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable voice cache");
            }
        }

        match self.provider.list_voices().await {
            Ok(voices) => {
                if let Err(e) = self.persist(&voices).await {
                    warn!(path = %self.path.display(), error = %e, "Failed to persist voice catalog");
                }
                VoiceCatalog::new(voices)
            }
            Err(e) => {
                error!(provider = self.provider.name(), error = %e, "Error fetching voices");
                VoiceCatalog::default()
            }
        }
    }

    async fn persist(&self, voices: &[Voice]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let cached = CachedVoices {
            fetched_at: Utc::now(),
            voices: voices.to_vec(),
        };
        let content = serde_json::to_string_pretty(&cached)?;
        fs::write(&self.path, content).await
    }
}

/// Read the cache file; `Ok(None)` when it does not exist
async fn read_cache(path: &Path) -> anyhow::Result<Option<Vec<Voice>>> {
    if !fs::try_exists(path).await? {
        return Ok(None);
    }
    let content = fs::read_to_string(path).await?;
    let voices = match serde_json::from_str::<CacheFile>(&content)? {
        CacheFile::Envelope(cached) => cached.voices,
        CacheFile::Bare(voices) => voices,
    };
    Ok(Some(voices))
}

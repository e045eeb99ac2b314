//! Wiring of adapters and services from resolved configuration.

use std::sync::Arc;

use anyhow::Result;

use super::pipeline::MediaPipeline;
use super::preview::PreviewStore;
use super::submission::Submitter;
use super::voice_catalog::VoiceCatalogCache;
use crate::adapters::{BackendClient, ImageClient, PodcastBackend, TtsClient};
use crate::config::{paths, ResolvedConfig};

/// Everything a command needs, built once per process
pub struct Studio {
    pub catalog: VoiceCatalogCache,
    pub pipeline: MediaPipeline,
    pub submitter: Submitter,
    pub backend: Arc<dyn PodcastBackend>,
}

impl Studio {
    /// Build the real HTTP-backed services
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let backend_url = config.require_backend_url()?;

        let tts = Arc::new(TtsClient::new(config.tts.clone(), config.speech.clone()));
        let images = Arc::new(ImageClient::new(
            config.image.clone(),
            config.image_proxy.clone(),
        ));
        let backend: Arc<dyn PodcastBackend> = Arc::new(
            BackendClient::new(backend_url, config.backend_token.clone())
                .with_probe_timeout(config.probe_timeout),
        );

        let catalog = VoiceCatalogCache::new(paths::voice_cache(&config.home), tts.clone());
        let pipeline = MediaPipeline::new(
            tts,
            images,
            Arc::clone(&backend),
            PreviewStore::new(paths::previews_dir(&config.home)),
        );
        let submitter = Submitter::new(Arc::clone(&backend));

        Ok(Self {
            catalog,
            pipeline,
            submitter,
            backend,
        })
    }

    /// Only the voice catalog; needs no backend configuration
    pub fn voice_catalog(config: &ResolvedConfig) -> VoiceCatalogCache {
        let tts = Arc::new(TtsClient::new(config.tts.clone(), config.speech.clone()));
        VoiceCatalogCache::new(paths::voice_cache(&config.home), tts)
    }
}

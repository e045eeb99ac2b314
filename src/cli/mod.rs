//! Command-line interface for podcastr.
//!
//! Provides commands for browsing voices, generating narration and cover
//! images, publishing podcasts and reading the backend's listings.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};

use crate::config::{self, mask_secret};
use crate::core::submission::{failure_notice, success_notice};
use crate::core::{GenerationOutcome, Notice, Studio, StudioError, ValidationError};
use crate::domain::{MediaAsset, MediaKind, PodcastDraft, UrlSource, GENRES};

pub mod voices;

/// podcastr - Podcast authoring with synthesized voices and AI cover art
#[derive(Parser, Debug)]
#[command(name = "podcastr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse the voice catalog
    Voices {
        #[command(subcommand)]
        command: voices::VoicesCommands,
    },

    /// Generate narration audio from a transcript
    Audio {
        /// Voice short name (see `voices list`)
        #[arg(long)]
        voice: String,

        /// Language of the voice (defaults to the voice's own locale)
        #[arg(long)]
        locale: Option<String>,

        #[command(flatten)]
        transcript: TranscriptInput,
    },

    /// Generate or upload a cover image
    Thumbnail {
        #[command(flatten)]
        image: ImageInput,
    },

    /// Generate audio and cover image, then publish the podcast
    Create {
        /// Podcast title
        #[arg(long)]
        title: String,

        /// Podcast description
        #[arg(long)]
        description: String,

        /// Podcast genre
        #[arg(long, value_parser = PossibleValuesParser::new(GENRES.iter().copied()))]
        genre: String,

        /// Voice short name (see `voices list`)
        #[arg(long)]
        voice: String,

        /// Language of the voice (defaults to the voice's own locale)
        #[arg(long)]
        locale: Option<String>,

        #[command(flatten)]
        transcript: TranscriptInput,

        #[command(flatten)]
        image: ImageInput,
    },

    /// List trending podcasts
    Trending {
        /// Maximum number of podcasts to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// List the top podcast creators
    Creators,

    /// Show resolved configuration (debug)
    Config,
}

/// Transcript to narrate
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct TranscriptInput {
    /// Transcript text
    #[arg(long)]
    text: Option<String>,

    /// Read the transcript from a file
    #[arg(long)]
    text_file: Option<PathBuf>,
}

/// Cover image source
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ImageInput {
    /// Prompt for AI image generation
    #[arg(long)]
    image_prompt: Option<String>,

    /// Upload this image file instead
    #[arg(long)]
    image_file: Option<PathBuf>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = config::config()?;

        match self.command {
            Commands::Voices { command } => {
                let catalog = Studio::voice_catalog(cfg);
                voices::execute(&catalog, command).await
            }
            Commands::Audio {
                voice,
                locale,
                transcript,
            } => {
                let studio = Studio::from_config(cfg)?;
                generate_audio(&studio, &voice, locale, transcript).await
            }
            Commands::Thumbnail { image } => {
                let studio = Studio::from_config(cfg)?;
                generate_thumbnail(&studio, image).await
            }
            Commands::Create {
                title,
                description,
                genre,
                voice,
                locale,
                transcript,
                image,
            } => {
                let studio = Studio::from_config(cfg)?;
                let mut draft = PodcastDraft::new();
                draft.title = title;
                draft.description = description;
                draft.genre = genre;
                create_podcast(&studio, draft, &voice, locale, transcript, image).await
            }
            Commands::Trending { limit } => {
                let studio = Studio::from_config(cfg)?;
                list_trending(&studio, limit).await
            }
            Commands::Creators => {
                let studio = Studio::from_config(cfg)?;
                list_creators(&studio).await
            }
            Commands::Config => show_config(),
        }
    }
}

/// Look up `voice` in the catalog and select it on the draft
async fn select_voice(
    studio: &Studio,
    draft: &mut PodcastDraft,
    voice: &str,
    locale: Option<String>,
) -> Result<(), StudioError> {
    let catalog = studio.catalog.get().await;
    let found = catalog
        .find_voice(voice)
        .cloned()
        .ok_or_else(|| ValidationError::UnknownVoice(voice.to_string()))?;

    if let Some(locale) = locale {
        if found.locale != locale {
            return Err(ValidationError::UnknownVoice(format!("{} ({})", voice, locale)).into());
        }
    }

    draft.select_voice(found);
    Ok(())
}

fn read_transcript(input: TranscriptInput) -> Result<String> {
    match (input.text, input.text_file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read transcript: {}", path.display())),
        (None, None) => anyhow::bail!("No transcript provided. Use --text or --text-file"),
    }
}

/// Turn a failure into a CLI error carrying the user notice
fn notice_error(notice: Notice) -> anyhow::Error {
    anyhow::anyhow!("{}", notice)
}

/// Run the image step for whichever source was given
async fn run_image_step(
    studio: &Studio,
    draft: &PodcastDraft,
    file: Option<&PathBuf>,
) -> Result<GenerationOutcome, StudioError> {
    match file {
        Some(path) => studio.pipeline.upload_image(draft, path).await,
        None => studio.pipeline.generate_thumbnail(draft).await,
    }
}

async fn generate_audio(
    studio: &Studio,
    voice: &str,
    locale: Option<String>,
    transcript: TranscriptInput,
) -> Result<()> {
    let mut draft = PodcastDraft::new();
    draft.voice_prompt = read_transcript(transcript)?;
    select_voice(studio, &mut draft, voice, locale)
        .await
        .map_err(|e| notice_error(e.notice(MediaKind::Audio)))?;

    let outcome = studio
        .pipeline
        .generate_audio(&draft)
        .await
        .map_err(|e| notice_error(e.notice(MediaKind::Audio)))?;

    if let Some(asset) = outcome.asset() {
        eprintln!("{}", Notice::info("Podcast generated successfully"));
        print_asset(asset);
    }
    Ok(())
}

async fn generate_thumbnail(studio: &Studio, image: ImageInput) -> Result<()> {
    let mut draft = PodcastDraft::new();
    draft.image_prompt = image.image_prompt.unwrap_or_default();

    let outcome = run_image_step(studio, &draft, image.image_file.as_ref())
        .await
        .map_err(|e| notice_error(e.notice(MediaKind::Image)))?;

    if let Some(asset) = outcome.asset() {
        eprintln!("{}", thumbnail_notice(asset));
        print_asset(asset);
    }
    Ok(())
}

async fn create_podcast(
    studio: &Studio,
    mut draft: PodcastDraft,
    voice: &str,
    locale: Option<String>,
    transcript: TranscriptInput,
    image: ImageInput,
) -> Result<()> {
    draft.voice_prompt = read_transcript(transcript)?;
    draft.image_prompt = image.image_prompt.unwrap_or_default();
    select_voice(studio, &mut draft, voice, locale)
        .await
        .map_err(|e| notice_error(e.notice(MediaKind::Audio)))?;

    // Audio and image are independent; run them side by side
    let (audio, cover) = tokio::join!(
        studio.pipeline.generate_audio(&draft),
        run_image_step(studio, &draft, image.image_file.as_ref()),
    );
    audio.map_err(|e| notice_error(e.notice(MediaKind::Audio)))?;
    let cover = cover.map_err(|e| notice_error(e.notice(MediaKind::Image)))?;
    if let Some(asset) = cover.asset() {
        eprintln!("{}", thumbnail_notice(asset));
    }

    let outcome = studio
        .submitter
        .submit(&draft)
        .await
        .map_err(|e| notice_error(failure_notice(&e)))?;

    eprintln!("{}", success_notice());
    println!("Podcast ID: {}", outcome.podcast_id);
    println!("Audio:      {}", outcome.record.audio_url);
    println!("Image:      {}", outcome.record.image_url);
    println!("Duration:   {:.1}s", outcome.record.audio_duration);
    println!("Next:       {}", outcome.redirect);
    Ok(())
}

fn thumbnail_notice(asset: &MediaAsset) -> Notice {
    if asset.storage_id.is_none() {
        Notice::info("Thumbnail generated (using local preview)")
    } else {
        Notice::info("Thumbnail generated successfully")
    }
}

fn print_asset(asset: &MediaAsset) {
    let source = match asset.source {
        UrlSource::Durable => "durable",
        UrlSource::LocalPreview => "local preview",
    };
    println!("URL:        {}", asset.url);
    println!("Source:     {}", source);
    println!(
        "Storage ID: {}",
        asset
            .storage_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    if let Some(duration) = asset.duration_secs {
        println!("Duration:   {:.1}s", duration);
    }
}

async fn list_trending(studio: &Studio, limit: usize) -> Result<()> {
    let podcasts = studio
        .backend
        .trending_podcasts()
        .await
        .map_err(|e| notice_error(failure_notice(&e)))?;

    if podcasts.is_empty() {
        println!("No podcasts found");
        return Ok(());
    }

    println!("{:<34} {:<40} {:>8}", "ID", "TITLE", "VIEWS");
    println!("{}", "-".repeat(84));
    for podcast in podcasts.iter().take(limit) {
        println!(
            "{:<34} {:<40} {:>8}",
            podcast.id, podcast.podcast_title, podcast.views
        );
    }
    Ok(())
}

async fn list_creators(studio: &Studio) -> Result<()> {
    let creators = studio
        .backend
        .top_creators()
        .await
        .map_err(|e| notice_error(failure_notice(&e)))?;

    if creators.is_empty() {
        println!("No creators found");
        return Ok(());
    }

    println!("Top Podcasters");
    for creator in creators.iter().take(4) {
        println!(
            "  {:<30} {:>12}  /profile/{}",
            creator.name,
            creator.podcast_count_label(),
            creator.clerk_id
        );
    }
    Ok(())
}

fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("podcastr configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:        {}", cfg.home.display());
    println!("  Voice cache: {}", config::paths::voice_cache(&cfg.home).display());
    println!("  Previews:    {}", config::paths::previews_dir(&cfg.home).display());
    println!();
    println!("Text-to-speech:");
    println!("  URL:    {}", cfg.tts.base_url);
    println!("  Host:   {}", cfg.tts.host);
    println!("  Key:    {}", mask_secret(&cfg.tts.api_key));
    println!(
        "  Voice:  rate {} / pitch {} / volume {}",
        cfg.speech.rate, cfg.speech.pitch, cfg.speech.volume
    );
    println!();
    println!("Image generation:");
    println!("  URL:    {}", cfg.image.base_url);
    println!("  Host:   {}", cfg.image.host);
    println!("  Key:    {}", mask_secret(&cfg.image.api_key));
    println!(
        "  Proxy:  {}",
        cfg.image_proxy.as_deref().unwrap_or("(direct)")
    );
    println!();
    println!("Backend:");
    println!(
        "  URL:    {}",
        cfg.backend_url.as_deref().unwrap_or("(unset)")
    );
    println!(
        "  Token:  {}",
        mask_secret(cfg.backend_token.as_deref().unwrap_or(""))
    );
    println!("  Probe timeout: {}s", cfg.probe_timeout.as_secs());

    Ok(())
}

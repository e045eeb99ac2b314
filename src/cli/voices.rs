//! Voice catalog CLI commands.
//!
//! - `podcastr voices languages` - List available languages
//! - `podcastr voices list --locale <code>` - List voices for a language
//! - `podcastr voices refresh` - Refetch and re-cache the catalog

use anyhow::Result;
use clap::Subcommand;

use crate::core::{StudioError, VoiceCatalogCache};
use crate::domain::MediaKind;

/// Voice catalog subcommands
#[derive(Subcommand, Debug)]
pub enum VoicesCommands {
    /// List available languages (locales)
    Languages {
        /// Only show languages matching this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List voices for one language
    List {
        /// Locale code, e.g. en-US
        #[arg(short, long)]
        locale: String,
    },

    /// Fetch the catalog again and overwrite the local cache
    Refresh,
}

pub async fn execute(catalog: &VoiceCatalogCache, command: VoicesCommands) -> Result<()> {
    match command {
        VoicesCommands::Languages { search } => list_languages(catalog, search).await,
        VoicesCommands::List { locale } => list_voices(catalog, &locale).await,
        VoicesCommands::Refresh => refresh(catalog).await,
    }
}

async fn list_languages(catalog: &VoiceCatalogCache, search: Option<String>) -> Result<()> {
    let catalog = catalog.get().await;
    if catalog.is_empty() {
        println!("No voices available");
        return Ok(());
    }

    let locales = match search {
        Some(query) => catalog.search_locales(&query),
        None => catalog.locales(),
    };
    if locales.is_empty() {
        println!("No language found.");
        return Ok(());
    }

    println!("{:<12} {:<40} {:>6}", "LOCALE", "LANGUAGE", "VOICES");
    println!("{}", "-".repeat(60));
    for locale in locales {
        println!(
            "{:<12} {:<40} {:>6}",
            locale,
            catalog.language_display_name(&locale),
            catalog.voices_for_locale(&locale).len()
        );
    }
    Ok(())
}

async fn list_voices(catalog: &VoiceCatalogCache, locale: &str) -> Result<()> {
    let catalog = catalog.get().await;
    let voices = catalog.voices_for_locale(locale);
    if voices.is_empty() {
        println!("No voices for {}", locale);
        return Ok(());
    }

    println!("{:<36} {}", "VOICE", "NAME");
    println!("{}", "-".repeat(80));
    for voice in voices {
        println!("{:<36} {}", voice.short_name, voice.friendly_name);
    }
    Ok(())
}

async fn refresh(catalog: &VoiceCatalogCache) -> Result<()> {
    let refreshed = catalog.refresh().await.map_err(notice_error)?;
    println!(
        "Cached {} voices in {} languages at {}",
        refreshed.len(),
        refreshed.locales().len(),
        catalog.path().display()
    );
    Ok(())
}

fn notice_error(err: StudioError) -> anyhow::Error {
    anyhow::anyhow!("{}", err.notice(MediaKind::Audio))
}

//! Synthesized voices offered by the TTS provider.

use serde::{Deserialize, Serialize};

/// A single voice from the TTS provider's catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Unique voice id sent back to the provider (e.g. "en-US-GuyNeural")
    #[serde(rename = "ShortName")]
    pub short_name: String,

    /// Language/region code (e.g. "en-US")
    #[serde(rename = "Locale")]
    pub locale: String,

    /// Display string, usually "<Name> Online (Natural) - <Language> (<Region>)"
    #[serde(rename = "FriendlyName", default)]
    pub friendly_name: String,
}

impl Voice {
    /// Create a new voice
    pub fn new(
        short_name: impl Into<String>,
        locale: impl Into<String>,
        friendly_name: impl Into<String>,
    ) -> Self {
        Self {
            short_name: short_name.into(),
            locale: locale.into(),
            friendly_name: friendly_name.into(),
        }
    }

    /// Language part of the friendly name: everything after the first "- "
    pub fn language_label(&self) -> Option<&str> {
        let idx = self.friendly_name.find("- ")?;
        let label = &self.friendly_name[idx + 2..];
        if label.is_empty() {
            None
        } else {
            Some(label)
        }
    }
}

/// Unique locales in first-seen order
pub fn unique_locales(voices: &[Voice]) -> Vec<String> {
    let mut locales: Vec<String> = Vec::new();
    for voice in voices {
        if !locales.iter().any(|l| l == &voice.locale) {
            locales.push(voice.locale.clone());
        }
    }
    locales
}

/// All voices with exactly this locale
pub fn voices_for_locale<'a>(voices: &'a [Voice], locale: &str) -> Vec<&'a Voice> {
    voices.iter().filter(|v| v.locale == locale).collect()
}

/// Human-readable language name for a locale, falling back to the code
pub fn language_display_name(voices: &[Voice], locale: &str) -> String {
    voices
        .iter()
        .find(|v| v.locale == locale)
        .and_then(Voice::language_label)
        .map(str::to_string)
        .unwrap_or_else(|| locale.to_string())
}

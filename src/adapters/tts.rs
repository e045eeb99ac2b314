//! RapidAPI text-to-speech adapter.
//!
//! `POST /tts` answers in one of several shapes (a bare URL string, `{url}`
//! or `{audio_url}`), or sometimes with the audio itself. Everything is
//! normalized here into a single absolute audio URL before the MP3 is
//! downloaded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{error_for_status, rapidapi_headers, SpeechSynthesizer};
use crate::config::{ApiSettings, SpeechSettings};
use crate::core::failure::StudioError;
use crate::domain::Voice;

const SERVICE: &str = "tts";

/// The accepted response shapes of `POST /tts`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TtsResponse {
    Raw(String),
    Links(AudioLinks),
}

/// Object form: `{url}`, `{audio_url}` or both
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AudioLinks {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl AudioLinks {
    /// First non-empty of `url`, `audio_url`
    fn first(&self) -> Option<&str> {
        [&self.url, &self.audio_url]
            .into_iter()
            .flatten()
            .map(|u| u.trim())
            .find(|u| !u.is_empty())
    }
}

impl TtsResponse {
    /// Parse a response body. Plain (non-JSON) text is taken as a raw URL.
    pub fn parse(body: &str) -> Result<Self, StudioError> {
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed.starts_with('[') {
            return Err(invalid_format());
        }
        match serde_json::from_str::<TtsResponse>(trimmed) {
            Ok(TtsResponse::Links(links)) if links.first().is_none() => Err(invalid_format()),
            Ok(parsed) => Ok(parsed),
            Err(_) if trimmed.starts_with('{') => Err(invalid_format()),
            Err(_) => Ok(TtsResponse::Raw(trimmed.to_string())),
        }
    }

    /// The audio URL, made absolute against `base_url` when relative
    pub fn audio_url(&self, base_url: &str) -> Result<String, StudioError> {
        let url = match self {
            TtsResponse::Raw(url) => url.trim(),
            TtsResponse::Links(links) => links.first().unwrap_or_default(),
        };
        if url.is_empty() {
            return Err(invalid_format());
        }
        if url.starts_with('/') {
            Ok(format!("{}{}", base_url.trim_end_matches('/'), url))
        } else {
            Ok(url.to_string())
        }
    }
}

fn invalid_format() -> StudioError {
    StudioError::Unknown("Invalid response format from TTS API".to_string())
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    voice: &'a str,
    rate: &'a str,
    pitch: &'a str,
    volume: &'a str,
}

/// Client for the RapidAPI realistic text-to-speech service
pub struct TtsClient {
    settings: ApiSettings,
    speech: SpeechSettings,
    client: reqwest::Client,
}

impl TtsClient {
    pub fn new(settings: ApiSettings, speech: SpeechSettings) -> Self {
        Self {
            settings,
            speech,
            client: reqwest::Client::new(),
        }
    }

    /// Build API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url, path)
    }

    /// Download the synthesized audio
    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, StudioError> {
        let response = self
            .client
            .get(url)
            .headers(rapidapi_headers(&self.settings)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StudioError::Unknown(format!(
                "Failed to fetch audio: {}",
                response.status().as_u16()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for TtsClient {
    fn name(&self) -> &str {
        "rapidapi-tts"
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, StudioError> {
        let response = self
            .client
            .get(self.api_url("/tts/voices"))
            .headers(rapidapi_headers(&self.settings)?)
            .send()
            .await?;
        let response = error_for_status(SERVICE, response).await?;

        let voices: Vec<Voice> = response
            .json()
            .await
            .map_err(|e| StudioError::Unknown(format!("Failed to parse voice list: {}", e)))?;
        info!(count = voices.len(), "Fetched voice catalog");
        Ok(voices)
    }

    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>, StudioError> {
        let request = TtsRequest {
            text,
            voice: &voice.short_name,
            rate: &self.speech.rate,
            pitch: &self.speech.pitch,
            volume: &self.speech.volume,
        };

        let response = self
            .client
            .post(self.api_url("/tts"))
            .headers(rapidapi_headers(&self.settings)?)
            .json(&request)
            .send()
            .await?;
        let response = error_for_status(SERVICE, response).await?;

        let is_audio = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("audio/"))
            .unwrap_or(false);
        if is_audio {
            debug!(voice = %voice.short_name, "TTS answered with audio body");
            return Ok(response.bytes().await?.to_vec());
        }

        let body = response.text().await?;
        let audio_url = TtsResponse::parse(&body)?.audio_url(&self.settings.base_url)?;
        debug!(voice = %voice.short_name, %audio_url, "Fetching synthesized audio");

        self.fetch_audio(&audio_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://tts.example.com";

    #[test]
    fn test_all_shapes_normalize_to_same_url() {
        let bodies = [
            "https://cdn.example.com/a.mp3",
            r#""https://cdn.example.com/a.mp3""#,
            r#"{"url":"https://cdn.example.com/a.mp3"}"#,
            r#"{"audio_url":"https://cdn.example.com/a.mp3","status":"ok"}"#,
            r#"{"url":"","audio_url":"https://cdn.example.com/a.mp3"}"#,
            r#"{"url":null,"audio_url":"https://cdn.example.com/a.mp3"}"#,
        ];
        for body in bodies {
            let url = TtsResponse::parse(body).unwrap().audio_url(BASE).unwrap();
            assert_eq!(url, "https://cdn.example.com/a.mp3", "body: {}", body);
        }
    }

    #[test]
    fn test_url_wins_over_audio_url() {
        let parsed = TtsResponse::parse(r#"{"url":"/a.mp3","audio_url":"/b.mp3"}"#).unwrap();
        assert_eq!(parsed.audio_url(BASE).unwrap(), "https://tts.example.com/a.mp3");
    }

    #[test]
    fn test_relative_url_made_absolute() {
        let parsed = TtsResponse::parse(r#"{"audio_url":"/files/x.mp3"}"#).unwrap();
        assert_eq!(
            parsed.audio_url("https://tts.example.com/").unwrap(),
            "https://tts.example.com/files/x.mp3"
        );
    }

    #[test]
    fn test_unrecognized_shapes_rejected() {
        for body in [
            "",
            "   ",
            r#"{"status":"ok"}"#,
            r#"{"url":null}"#,
            r#"{"url":"","audio_url":"  "}"#,
            "[1,2]",
            r#"["https://cdn.example.com/a.mp3"]"#,
        ] {
            let err = TtsResponse::parse(body).unwrap_err();
            assert_eq!(err.to_string(), "Invalid response format from TTS API");
        }
        let empty = TtsResponse::parse(r#""""#).unwrap();
        assert!(empty.audio_url(BASE).is_err());
    }

    #[test]
    fn test_api_url() {
        let client = TtsClient::new(
            ApiSettings::new(BASE, "key"),
            SpeechSettings::default(),
        );
        assert_eq!(client.api_url("/tts/voices"), "https://tts.example.com/tts/voices");
    }
}

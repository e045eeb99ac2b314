//! Configuration for podcastr.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (PODCASTR_HOME, PODCASTR_TTS_KEY, PODCASTR_IMAGE_KEY,
//!    PODCASTR_BACKEND_URL, PODCASTR_BACKEND_TOKEN, PODCASTR_IMAGE_PROXY)
//! 2. Config file (.podcastr/config.yaml)
//! 3. Defaults (~/.podcastr, public RapidAPI hosts)
//!
//! Config file discovery:
//! - Searches current directory and parents for .podcastr/config.yaml
//! - `paths.home` is relative to the .podcastr/ directory

pub mod paths;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const DEFAULT_TTS_BASE_URL: &str = "https://realistic-text-to-speech-tts-api.p.rapidapi.com";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://open-ai21.p.rapidapi.com";
const DEFAULT_PROBE_TIMEOUT_SECONDS: u64 = 10;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub tts: Option<TtsConfig>,
    #[serde(default)]
    pub image: Option<ImageConfig>,
    #[serde(default)]
    pub backend: Option<BackendConfig>,
    #[serde(default)]
    pub probe: Option<ProbeConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .podcastr/)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    pub base_url: Option<String>,
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub rate: Option<String>,
    pub pitch: Option<String>,
    pub volume: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    pub base_url: Option<String>,
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub proxy_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    pub timeout_seconds: Option<u64>,
}

/// Connection settings for one RapidAPI-hosted service
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    /// Value of the x-rapidapi-host header
    pub host: String,
    pub api_key: String,
}

impl ApiSettings {
    /// Settings for `base_url` with the host header derived from it
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let host = host_of(&base_url);
        Self {
            base_url,
            host,
            api_key: api_key.into(),
        }
    }
}

/// Prosody parameters sent with every TTS request
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSettings {
    pub rate: String,
    pub pitch: String,
    pub volume: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            rate: "+0%".to_string(),
            pitch: "+0Hz".to_string(),
            volume: "+0%".to_string(),
        }
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to podcastr home (voice cache, previews)
    pub home: PathBuf,
    pub tts: ApiSettings,
    pub speech: SpeechSettings,
    pub image: ApiSettings,
    /// Same-origin style proxy used to fetch generated images
    pub image_proxy: Option<String>,
    /// Backend deployment URL
    pub backend_url: Option<String>,
    pub backend_token: Option<String>,
    pub probe_timeout: Duration,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Backend URL, or an error explaining how to set it
    pub fn require_backend_url(&self) -> Result<&str> {
        self.backend_url.as_deref().context(
            "No backend URL configured. Set PODCASTR_BACKEND_URL or backend.url in .podcastr/config.yaml",
        )
    }
}

/// Host part of a URL ("https://a.b.c/x" -> "a.b.c")
fn host_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// Hide all but the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(unset)".to_string();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".podcastr").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Merge the file (if any) with environment and defaults
fn resolve(file: Option<ConfigFile>, config_file: Option<PathBuf>) -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".podcastr");

    let file_home = match (&file, &config_file) {
        (Some(cfg), Some(path)) => cfg.paths.home.as_ref().map(|home| {
            let podcastr_dir = path.parent().unwrap_or(Path::new("."));
            resolve_path(podcastr_dir, home)
        }),
        _ => None,
    };

    let home = env_var("PODCASTR_HOME")
        .map(PathBuf::from)
        .or(file_home)
        .unwrap_or(default_home);

    let tts_file = file.as_ref().and_then(|f| f.tts.clone());
    let image_file = file.as_ref().and_then(|f| f.image.clone());
    let backend_file = file.as_ref().and_then(|f| f.backend.clone());

    let mut tts = ApiSettings::new(
        tts_file
            .as_ref()
            .and_then(|t| t.base_url.clone())
            .unwrap_or_else(|| DEFAULT_TTS_BASE_URL.to_string()),
        env_var("PODCASTR_TTS_KEY")
            .or_else(|| tts_file.as_ref().and_then(|t| t.api_key.clone()))
            .unwrap_or_default(),
    );
    if let Some(host) = tts_file.as_ref().and_then(|t| t.host.clone()) {
        tts.host = host;
    }

    let defaults = SpeechSettings::default();
    let speech = SpeechSettings {
        rate: tts_file
            .as_ref()
            .and_then(|t| t.rate.clone())
            .unwrap_or(defaults.rate),
        pitch: tts_file
            .as_ref()
            .and_then(|t| t.pitch.clone())
            .unwrap_or(defaults.pitch),
        volume: tts_file
            .as_ref()
            .and_then(|t| t.volume.clone())
            .unwrap_or(defaults.volume),
    };

    let mut image = ApiSettings::new(
        image_file
            .as_ref()
            .and_then(|i| i.base_url.clone())
            .unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_string()),
        env_var("PODCASTR_IMAGE_KEY")
            .or_else(|| image_file.as_ref().and_then(|i| i.api_key.clone()))
            .unwrap_or_default(),
    );
    if let Some(host) = image_file.as_ref().and_then(|i| i.host.clone()) {
        image.host = host;
    }

    let image_proxy = env_var("PODCASTR_IMAGE_PROXY")
        .or_else(|| image_file.as_ref().and_then(|i| i.proxy_url.clone()));

    let backend_url = env_var("PODCASTR_BACKEND_URL")
        .or_else(|| backend_file.as_ref().and_then(|b| b.url.clone()));
    let backend_token = env_var("PODCASTR_BACKEND_TOKEN")
        .or_else(|| backend_file.as_ref().and_then(|b| b.auth_token.clone()));

    let probe_timeout = Duration::from_secs(
        file.as_ref()
            .and_then(|f| f.probe.as_ref())
            .and_then(|p| p.timeout_seconds)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT_SECONDS),
    );

    Ok(ResolvedConfig {
        home,
        tts,
        speech,
        image,
        image_proxy,
        backend_url,
        backend_token,
        probe_timeout,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();
    let file = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };
    resolve(file, config_file)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

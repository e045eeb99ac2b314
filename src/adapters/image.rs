//! RapidAPI text-to-image adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{error_for_status, rapidapi_headers, ImageGenerator};
use crate::config::ApiSettings;
use crate::core::failure::StudioError;

const SERVICE: &str = "image";

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    generated_image: Option<String>,
}

/// Client for the RapidAPI `texttoimage2` endpoint
pub struct ImageClient {
    settings: ApiSettings,
    /// Fetch generated images through this proxy (`<proxy>?url=<image>`)
    proxy_url: Option<String>,
    client: reqwest::Client,
}

impl ImageClient {
    pub fn new(settings: ApiSettings, proxy_url: Option<String>) -> Self {
        Self {
            settings,
            proxy_url,
            client: reqwest::Client::new(),
        }
    }

    /// Where to download a generated image from
    fn download_url(&self, image_url: &str) -> Result<String, StudioError> {
        let Some(proxy) = &self.proxy_url else {
            return Ok(image_url.to_string());
        };
        let mut url = reqwest::Url::parse(proxy)
            .map_err(|e| StudioError::Unknown(format!("Invalid image proxy URL: {}", e)))?;
        url.query_pairs_mut().append_pair("url", image_url);
        Ok(url.to_string())
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    fn name(&self) -> &str {
        "rapidapi-texttoimage"
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, StudioError> {
        let response = self
            .client
            .post(format!("{}/texttoimage2", self.settings.base_url))
            .headers(rapidapi_headers(&self.settings)?)
            .json(&ImageRequest { text: prompt })
            .send()
            .await?;
        let response = error_for_status(SERVICE, response).await?;

        let parsed: ImageResponse = response
            .json()
            .await
            .map_err(|e| StudioError::Unknown(format!("Failed to parse image response: {}", e)))?;
        let image_url = parsed
            .generated_image
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| StudioError::Unknown("No image URL received from the API".to_string()))?;

        let download = self.download_url(&image_url)?;
        debug!(%download, "Fetching generated image");

        let image = self.client.get(&download).send().await?;
        if !image.status().is_success() {
            return Err(StudioError::Unknown(format!(
                "Failed to fetch image through proxy: {}",
                image.status().as_u16()
            )));
        }

        Ok(image.bytes().await?.to_vec())
    }
}

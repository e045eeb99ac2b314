//! Managed backend adapter (Convex-style HTTP function API).
//!
//! Mutations and queries are invoked as
//! `POST {base}/api/{mutation|query}` with `{path, args, format: "json"}`
//! and answer `{status: "success", value}` or
//! `{status: "error", errorMessage}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::PodcastBackend;
use crate::core::failure::StudioError;
use crate::domain::{PodcastRecord, StorageId, TopCreator, TrendingPodcast};

const SERVICE: &str = "backend";

pub const FN_GENERATE_UPLOAD_URL: &str = "files:generateUploadUrl";
pub const FN_GET_URL: &str = "podcasts:getUrl";
pub const FN_CREATE_PODCAST: &str = "podcasts:createPodcast";
pub const FN_TRENDING_PODCASTS: &str = "podcasts:getTrendingPodcasts";
pub const FN_TOP_CREATORS: &str = "users:getTopUserByPodcastCount";

/// Envelope of every function call response
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum FunctionResponse {
    Success {
        #[serde(default)]
        value: Value,
    },
    Error {
        #[serde(rename = "errorMessage", default)]
        error_message: String,
    },
}

/// Upload endpoints answer `{storageId}`, some deployments a bare id
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UploadResponse {
    Object {
        #[serde(rename = "storageId")]
        storage_id: String,
    },
    Bare(String),
}

#[derive(Debug, Clone, Copy)]
enum FunctionKind {
    Query,
    Mutation,
}

impl FunctionKind {
    fn endpoint(&self) -> &'static str {
        match self {
            FunctionKind::Query => "query",
            FunctionKind::Mutation => "mutation",
        }
    }
}

/// HTTP client for the podcast backend
pub struct BackendClient {
    base_url: String,
    auth_token: Option<String>,
    probe_timeout: Duration,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
            probe_timeout: Duration::from_secs(10),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Build API URL
    fn api_url(&self, kind: FunctionKind) -> String {
        format!("{}/api/{}", self.base_url, kind.endpoint())
    }

    /// Invoke a backend function and return its raw value
    async fn call(&self, kind: FunctionKind, path: &str, args: Value) -> Result<Value, StudioError> {
        let mut request = self.client.post(self.api_url(kind)).json(&json!({
            "path": path,
            "args": args,
            "format": "json",
        }));
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if matches!(status.as_u16(), 401 | 413 | 429) {
            warn!(path, status = status.as_u16(), "Backend call rejected");
            return Err(StudioError::from_status(SERVICE, status.as_u16(), &body));
        }

        match serde_json::from_str::<FunctionResponse>(&body) {
            Ok(FunctionResponse::Success { value }) => {
                debug!(path, "Backend call succeeded");
                Ok(value)
            }
            Ok(FunctionResponse::Error { error_message }) => {
                warn!(path, error = %error_message, "Backend function failed");
                Err(StudioError::Unknown(format!("{} failed: {}", path, error_message)))
            }
            Err(_) if !status.is_success() => {
                Err(StudioError::from_status(SERVICE, status.as_u16(), &body))
            }
            Err(e) => Err(StudioError::Unknown(format!(
                "Malformed response from {}: {}",
                path, e
            ))),
        }
    }

    async fn call_typed<T: DeserializeOwned>(
        &self,
        kind: FunctionKind,
        path: &str,
        args: Value,
    ) -> Result<T, StudioError> {
        let value = self.call(kind, path, args).await?;
        serde_json::from_value(value)
            .map_err(|e| StudioError::Unknown(format!("Unexpected value from {}: {}", path, e)))
    }
}

#[async_trait]
impl PodcastBackend for BackendClient {
    async fn generate_upload_url(&self) -> Result<String, StudioError> {
        self.call_typed(FunctionKind::Mutation, FN_GENERATE_UPLOAD_URL, json!({}))
            .await
    }

    async fn upload(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StorageId, StudioError> {
        let size = bytes.len();
        let response = self
            .client
            .post(upload_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        let response = super::error_for_status(SERVICE, response).await?;

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| StudioError::Unknown(format!("Malformed upload response: {}", e)))?;
        let storage_id = match parsed {
            UploadResponse::Object { storage_id } => storage_id,
            UploadResponse::Bare(id) => id,
        };
        debug!(%storage_id, size, content_type, "Uploaded blob");
        Ok(StorageId::new(storage_id))
    }

    async fn get_url(&self, storage_id: &StorageId) -> Result<Option<String>, StudioError> {
        self.call_typed(
            FunctionKind::Mutation,
            FN_GET_URL,
            json!({ "storageId": storage_id }),
        )
        .await
    }

    async fn probe(&self, url: &str) -> bool {
        match self
            .client
            .head(url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!(url, status = response.status().as_u16(), "Probe failed");
                false
            }
            Err(e) => {
                debug!(url, error = %e, "Probe failed");
                false
            }
        }
    }

    async fn create_podcast(&self, record: &PodcastRecord) -> Result<String, StudioError> {
        let args = serde_json::to_value(record)
            .map_err(|e| StudioError::Unknown(format!("Failed to encode podcast: {}", e)))?;
        let value = self
            .call(FunctionKind::Mutation, FN_CREATE_PODCAST, args)
            .await?;
        Ok(match value {
            Value::String(id) => id,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    async fn trending_podcasts(&self) -> Result<Vec<TrendingPodcast>, StudioError> {
        self.call_typed(FunctionKind::Query, FN_TRENDING_PODCASTS, json!({}))
            .await
    }

    async fn top_creators(&self) -> Result<Vec<TopCreator>, StudioError> {
        self.call_typed(FunctionKind::Query, FN_TOP_CREATORS, json!({}))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let client = BackendClient::new("https://happy-otter-123.convex.cloud/", None);
        assert_eq!(
            client.api_url(FunctionKind::Mutation),
            "https://happy-otter-123.convex.cloud/api/mutation"
        );
        assert_eq!(
            client.api_url(FunctionKind::Query),
            "https://happy-otter-123.convex.cloud/api/query"
        );
    }

    #[test]
    fn test_function_response_parsing() {
        let ok: FunctionResponse =
            serde_json::from_str(r#"{"status":"success","value":"abc","logLines":[]}"#).unwrap();
        assert!(matches!(ok, FunctionResponse::Success { value } if value == "abc"));

        let err: FunctionResponse =
            serde_json::from_str(r#"{"status":"error","errorMessage":"Not authenticated"}"#)
                .unwrap();
        assert!(
            matches!(err, FunctionResponse::Error { error_message } if error_message == "Not authenticated")
        );
    }

    #[test]
    fn test_upload_response_shapes() {
        let obj: UploadResponse = serde_json::from_str(r#"{"storageId":"kg2"}"#).unwrap();
        assert!(matches!(obj, UploadResponse::Object { storage_id } if storage_id == "kg2"));

        let bare: UploadResponse = serde_json::from_str(r#""kg3""#).unwrap();
        assert!(matches!(bare, UploadResponse::Bare(id) if id == "kg3"));
    }
}

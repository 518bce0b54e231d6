use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ApiError, ImportError};
use crate::models::{ImportRecord, Settings};
use crate::services::crypto::CryptoService;

pub const CHECK_TIMEOUT_SECS: u64 = 30;
const MIN_CHUNK_TIMEOUT_SECS: u64 = 30;
const MAX_CHUNK_TIMEOUT_SECS: u64 = 120;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckExistingRequest<'a> {
    item_codes: &'a [String],
}

#[derive(Serialize)]
struct BulkImportRequest<'a> {
    items: &'a [ImportRecord],
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingItems {
    #[serde(default)]
    pub existing_item_ids: Vec<String>,
    #[serde(default)]
    pub duplicates_found: usize,
    #[serde(default)]
    pub total_checked: usize,
}

#[derive(Debug, Deserialize)]
struct CheckExistingResponse {
    success: bool,
    data: Option<ExistingItems>,
    message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkImportData {
    #[serde(default)]
    pub success_count: usize,
    #[serde(default)]
    pub error_count: usize,
    #[serde(default)]
    pub processing_time: Option<serde_json::Value>,
}

/// Server answer for one chunk; `success == false` means the whole chunk failed.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkImportResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<BulkImportData>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Backend operations the import pipeline needs.
#[async_trait]
pub trait ItemApi: Send + Sync {
    async fn check_existing(&self, item_codes: &[String]) -> Result<ExistingItems, ApiError>;
    async fn bulk_import(&self, items: &[ImportRecord]) -> Result<BulkImportResponse, ApiError>;
}

/// 30 s plus 1 s per 10 records, capped at 120 s.
pub fn chunk_timeout(records: usize) -> Duration {
    let secs = MIN_CHUNK_TIMEOUT_SECS + (records as u64) / 10;
    Duration::from_secs(secs.min(MAX_CHUNK_TIMEOUT_SECS))
}

pub struct ItemsApiClient {
    client: reqwest::Client,
    base_url: String,
    user_id: String,
    token: String,
}

impl ItemsApiClient {
    pub fn new(base_url: &str, user_id: &str, token: &str) -> Self {
        ItemsApiClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
            token: token.to_string(),
        }
    }

    /// Builds a client from stored settings; an encrypted token is decrypted here.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings
            .api_base_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ImportError::MissingApiUrl)?;
        let user_id = settings
            .user_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ImportError::MissingUserId)?;
        let token = settings
            .auth_token
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ImportError::MissingAuthToken)?;
        let token = if token.starts_with("enc:") {
            CryptoService::decrypt_token(token)?
        } else {
            token.to_string()
        };
        Ok(Self::new(base_url, user_id, &token))
    }

    fn url(&self, action: &str) -> String {
        format!("{}/items/{}/{}", self.base_url, self.user_id, action)
    }

    /// True when the server accepts the token for a no-op existence check.
    pub async fn test_connection(&self) -> Result<bool, ApiError> {
        match self.check_existing(&[]).await {
            Ok(_) => Ok(true),
            Err(ApiError::Status { status, .. }) if status == 401 || status == 403 => Ok(false),
            Err(err) => Err(err),
        }
    }
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

#[async_trait]
impl ItemApi for ItemsApiClient {
    async fn check_existing(&self, item_codes: &[String]) -> Result<ExistingItems, ApiError> {
        let response = self
            .client
            .post(self.url("check-existing"))
            .bearer_auth(&self.token)
            .timeout(Duration::from_secs(CHECK_TIMEOUT_SECS))
            .json(&CheckExistingRequest { item_codes })
            .send()
            .await?;
        let response = error_for_status(response).await?;

        let body: CheckExistingResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        if !body.success {
            return Err(ApiError::Rejected {
                message: body.message.unwrap_or_else(|| "check-existing failed".to_string()),
            });
        }
        Ok(body.data.unwrap_or_default())
    }

    async fn bulk_import(&self, items: &[ImportRecord]) -> Result<BulkImportResponse, ApiError> {
        let response = self
            .client
            .post(self.url("bulk-import"))
            .bearer_auth(&self.token)
            .timeout(chunk_timeout(items.len()))
            .json(&BulkImportRequest { items })
            .send()
            .await?;
        let response = error_for_status(response).await?;

        response
            .json::<BulkImportResponse>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

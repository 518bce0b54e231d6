#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use item_import::models::ImportRecord;
use item_import::services::api::{BulkImportData, BulkImportResponse, ExistingItems, ItemApi};
use item_import::ApiError;

/// Canned answer for one bulk-import call.
pub enum ChunkReply {
    /// Server accepted everything in the chunk.
    AllOk,
    /// Server-reported figures.
    Counts { success: usize, error: usize },
    Rejected(&'static str),
    NetworkError,
}

#[derive(Default)]
pub struct FakeApi {
    pub existing: Vec<String>,
    pub fail_check: bool,
    pub replies: Mutex<VecDeque<ChunkReply>>,
    pub checked: Mutex<Vec<Vec<String>>>,
    pub chunk_sizes: Mutex<Vec<usize>>,
    pub submitted_codes: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        FakeApi::default()
    }

    pub fn with_existing(codes: &[&str]) -> Self {
        FakeApi {
            existing: codes.iter().map(|c| c.to_string()).collect(),
            ..FakeApi::default()
        }
    }

    pub fn with_replies(replies: Vec<ChunkReply>) -> Self {
        FakeApi {
            replies: Mutex::new(replies.into()),
            ..FakeApi::default()
        }
    }

    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.chunk_sizes.lock().unwrap().clone()
    }

    pub fn check_calls(&self) -> usize {
        self.checked.lock().unwrap().len()
    }
}

#[async_trait]
impl ItemApi for FakeApi {
    async fn check_existing(&self, item_codes: &[String]) -> Result<ExistingItems, ApiError> {
        self.checked.lock().unwrap().push(item_codes.to_vec());
        if self.fail_check {
            return Err(ApiError::Status {
                status: 401,
                body: "unauthorized".to_string(),
            });
        }
        let existing: Vec<String> = item_codes
            .iter()
            .filter(|c| self.existing.contains(c))
            .cloned()
            .collect();
        Ok(ExistingItems {
            duplicates_found: existing.len(),
            total_checked: item_codes.len(),
            existing_item_ids: existing,
        })
    }

    async fn bulk_import(&self, items: &[ImportRecord]) -> Result<BulkImportResponse, ApiError> {
        self.chunk_sizes.lock().unwrap().push(items.len());
        self.submitted_codes
            .lock()
            .unwrap()
            .extend(items.iter().map(|i| i.external_id().to_string()));

        let reply = self.replies.lock().unwrap().pop_front().unwrap_or(ChunkReply::AllOk);
        let ok = |success: usize, error: usize| BulkImportResponse {
            success: true,
            data: Some(BulkImportData {
                success_count: success,
                error_count: error,
                processing_time: Some(serde_json::json!(12)),
            }),
            message: None,
        };
        match reply {
            ChunkReply::AllOk => Ok(ok(items.len(), 0)),
            ChunkReply::Counts { success, error } => Ok(ok(success, error)),
            ChunkReply::Rejected(message) => Ok(BulkImportResponse {
                success: false,
                data: None,
                message: Some(message.to_string()),
            }),
            ChunkReply::NetworkError => Err(ApiError::Rejected {
                message: "connection reset".to_string(),
            }),
        }
    }
}

/// `count` valid item rows under a standard header.
pub fn items_csv(count: usize) -> String {
    let mut text = String::from("Item Name,Item Code,Sale Price,Tax Rate\n");
    for i in 0..count {
        text.push_str(&format!("Item {i},CODE{i:04},{}.50,18\n", i + 1));
    }
    text
}

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

mod item;

use serde::{Deserialize, Serialize};

pub use item::{
    CanonicalField, ChunkResult, HeaderMap, ImportRecord, ImportSummary, ItemStatus, ValidationIssue,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub api_base_url: Option<String>,
    pub user_id: Option<String>,
    /// Encrypted (`enc:...`) when loaded from the database, plain when it came from the environment.
    pub auth_token: Option<String>,
    pub inbox_folder: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRun {
    pub id: String,
    pub source: String,
    pub file_hash: Option<String>,
    pub status: String,
    pub record_count: i64,
    pub issue_count: i64,
    pub success_count: i64,
    pub error_count: i64,
    pub skipped_count: i64,
    pub message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportChunkRow {
    pub run_id: String,
    pub ordinal: i64,
    pub size: i64,
    pub success_count: i64,
    pub error_count: i64,
    pub failed: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRunDetail {
    pub run: ImportRun,
    pub chunks: Vec<ImportChunkRow>,
}

/// Result of `check`: parse and validation only, nothing sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub mapped_fields: Vec<String>,
    pub record_count: usize,
    pub issues: Vec<ValidationIssue>,
}

/// What one import produced: the stored run plus anything the user must see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub run: ImportRun,
    pub issues: Vec<ValidationIssue>,
    pub duplicate_warning: Option<String>,
}

use std::path::Path;
use tracing::info;

use crate::models::{CheckReport, ImportReport};
use crate::services::processor::{process_import_file, process_pasted_text};
use crate::services::session::ImportSession;
use crate::services::spreadsheet::read_input;
use crate::services::state::AppState;
use crate::services::template::write_template;

fn log_progress(progress: f64, message: &str) {
    info!(percent = progress.round() as u64, "{}", message);
}

pub async fn import_file(path: String, state: &AppState) -> Result<ImportReport, String> {
    let client = state.api_client().map_err(|e| e.to_string())?;
    process_import_file(&state.db, Path::new(&path), &client, log_progress)
        .await
        .map_err(|e| e.to_string())
}

pub async fn import_pasted(text: String, state: &AppState) -> Result<ImportReport, String> {
    let client = state.api_client().map_err(|e| e.to_string())?;
    process_pasted_text(&state.db, &text, &client, log_progress)
        .await
        .map_err(|e| e.to_string())
}

/// Parse and validate only; nothing is sent.
pub fn check_file(path: String) -> Result<CheckReport, String> {
    let text = read_input(Path::new(&path)).map_err(|e| e.to_string())?;
    let mut session = ImportSession::new();
    session.load_text(&text).map_err(|e| e.to_string())?;

    let mapped_fields = crate::models::CanonicalField::ALL
        .iter()
        .filter(|f| session.header_map.contains(**f))
        .map(|f| f.as_str().to_string())
        .collect();
    Ok(CheckReport {
        mapped_fields,
        record_count: session.records.len(),
        issues: session.issues,
    })
}

pub async fn scan_inbox(state: &AppState) -> Result<Vec<ImportReport>, String> {
    let client = state.api_client().map_err(|e| e.to_string())?;
    state.scan_inbox(&client).await.map_err(|e| e.to_string())
}

pub fn save_template(path: String) -> Result<(), String> {
    write_template(Path::new(&path)).map_err(|e| e.to_string())
}

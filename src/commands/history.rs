use crate::models::{ImportRun, ImportRunDetail};
use crate::services::state::AppState;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

pub fn get_runs(limit: Option<usize>, state: &AppState) -> Result<Vec<ImportRun>, String> {
    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    db.list_runs(limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .map_err(|e| e.to_string())
}

pub fn get_run_detail(run_id: String, state: &AppState) -> Result<ImportRunDetail, String> {
    let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
    let run = db
        .get_run(&run_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "Import run not found".to_string())?;
    let chunks = db.get_chunks(&run_id).map_err(|e| e.to_string())?;
    Ok(ImportRunDetail { run, chunks })
}

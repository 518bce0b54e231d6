use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::models::{ImportReport, ImportRun, ImportSummary};
use crate::services::api::ItemApi;
use crate::services::session::ImportSession;
use crate::services::spreadsheet::read_input;
use crate::utils::{now_rfc3339, sha256_file, sha256_text};

pub const STATUS_IMPORTED: &str = "imported";
pub const STATUS_PARTIAL: &str = "partial";
pub const STATUS_FAILED: &str = "failed";
pub const STATUS_INVALID: &str = "invalid";
pub const STATUS_SKIPPED: &str = "skipped";

fn new_run(source: &str, file_hash: Option<String>) -> ImportRun {
    let now = now_rfc3339();
    ImportRun {
        id: uuid::Uuid::new_v4().to_string(),
        source: source.to_string(),
        file_hash,
        status: "pending".to_string(),
        record_count: 0,
        issue_count: 0,
        success_count: 0,
        error_count: 0,
        skipped_count: 0,
        message: None,
        created_at: now.clone(),
        updated_at: now,
    }
}

fn status_for(summary: &ImportSummary) -> &'static str {
    match (summary.success_count, summary.error_count) {
        (_, 0) => STATUS_IMPORTED,
        (0, _) => STATUS_FAILED,
        _ => STATUS_PARTIAL,
    }
}

fn save_run(db: &Arc<Mutex<Database>>, run: &ImportRun) -> Result<()> {
    let db = db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
    db.insert_run(run)?;
    Ok(())
}

/// Imports one file unless an identical file was already imported completely.
pub async fn process_import_file<A, F>(
    db: &Arc<Mutex<Database>>,
    path: &Path,
    api: &A,
    on_progress: F,
) -> Result<ImportReport>
where
    A: ItemApi + ?Sized,
    F: FnMut(f64, &str),
{
    let source = path.to_string_lossy().to_string();
    let file_hash = sha256_file(path)?;

    let already = {
        let db = db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
        db.was_imported(&file_hash)?
    };
    if already {
        info!(file = %source, "File already imported, skipping");
        let mut run = new_run(&source, Some(file_hash));
        run.status = STATUS_SKIPPED.to_string();
        run.message = Some("Identical file was already imported".to_string());
        save_run(db, &run)?;
        return Ok(ImportReport {
            run,
            issues: Vec::new(),
            duplicate_warning: None,
        });
    }

    let text = match read_input(path) {
        Ok(text) => text,
        Err(err) => {
            mark_failed(db, &source, Some(file_hash), &err.to_string())?;
            return Err(err);
        }
    };
    run_import(db, &source, Some(file_hash), &text, false, api, on_progress).await
}

/// Inbox variant of [`process_import_file`]: a file whose content already has a run of any
/// status is left alone without recording anything, so repeated watcher events never resend it.
/// Retrying a partial or failed file takes an explicit `process_import_file`.
pub async fn process_inbox_file<A, F>(
    db: &Arc<Mutex<Database>>,
    path: &Path,
    api: &A,
    on_progress: F,
) -> Result<Option<ImportReport>>
where
    A: ItemApi + ?Sized,
    F: FnMut(f64, &str),
{
    let file_hash = sha256_file(path)?;
    let seen = {
        let db = db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
        db.has_run_for_hash(&file_hash)?
    };
    if seen {
        debug!(file = %path.display(), "Inbox file unchanged since last run");
        return Ok(None);
    }
    process_import_file(db, path, api, on_progress).await.map(Some)
}

/// Imports text typed or pasted by the user.
pub async fn process_pasted_text<A, F>(
    db: &Arc<Mutex<Database>>,
    text: &str,
    api: &A,
    on_progress: F,
) -> Result<ImportReport>
where
    A: ItemApi + ?Sized,
    F: FnMut(f64, &str),
{
    run_import(db, "paste", Some(sha256_text(text)), text, true, api, on_progress).await
}

async fn run_import<A, F>(
    db: &Arc<Mutex<Database>>,
    source: &str,
    file_hash: Option<String>,
    text: &str,
    pasted: bool,
    api: &A,
    on_progress: F,
) -> Result<ImportReport>
where
    A: ItemApi + ?Sized,
    F: FnMut(f64, &str),
{
    let mut session = ImportSession::new();
    let loaded = if pasted {
        session.load_pasted(text)
    } else {
        session.load_text(text)
    };
    if let Err(err) = loaded {
        mark_failed(db, source, file_hash, &err.to_string())?;
        return Err(err.into());
    }

    let mut run = new_run(source, file_hash);
    run.record_count = session.records.len() as i64;
    run.issue_count = session.issues.len() as i64;

    if !session.issues.is_empty() {
        warn!(source, issues = session.issues.len(), "Import blocked by validation issues");
        run.status = STATUS_INVALID.to_string();
        run.message = Some(format!(
            "{} validation issue(s) must be fixed before importing",
            session.issues.len()
        ));
        save_run(db, &run)?;
        return Ok(ImportReport {
            run,
            issues: session.issues,
            duplicate_warning: None,
        });
    }

    let duplicate_warning = session
        .check_duplicates(api)
        .await
        .warning()
        .map(|w| w.to_string());
    let summary = session.execute(api, on_progress).await?;

    run.status = status_for(&summary).to_string();
    run.success_count = summary.success_count as i64;
    run.error_count = summary.error_count as i64;
    run.skipped_count = summary.skipped_count as i64;
    run.message = Some(summary.message());
    run.updated_at = now_rfc3339();

    {
        let mut db = db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
        db.insert_run(&run)?;
        db.insert_chunks(&run.id, &session.chunk_results)?;
    }

    Ok(ImportReport {
        run,
        issues: Vec::new(),
        duplicate_warning,
    })
}

pub fn mark_failed(
    db: &Arc<Mutex<Database>>,
    source: &str,
    file_hash: Option<String>,
    message: &str,
) -> Result<()> {
    warn!(source, error = message, "Import failed before sending");
    let mut run = new_run(source, file_hash);
    run.status = STATUS_FAILED.to_string();
    run.message = Some(message.to_string());
    save_run(db, &run)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_counts() {
        let summary = |success_count, error_count| ImportSummary {
            success_count,
            error_count,
            skipped_count: 0,
        };
        assert_eq!(status_for(&summary(10, 0)), STATUS_IMPORTED);
        assert_eq!(status_for(&summary(0, 0)), STATUS_IMPORTED);
        assert_eq!(status_for(&summary(0, 4)), STATUS_FAILED);
        assert_eq!(status_for(&summary(6, 4)), STATUS_PARTIAL);
    }
}

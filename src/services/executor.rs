use std::time::Instant;
use tracing::{error, info, warn};

use crate::error::ImportError;
use crate::models::{ChunkResult, ImportRecord, ImportSummary, ValidationIssue};
use crate::services::api::ItemApi;

pub const CHUNK_SIZE: usize = 100;

pub fn chunk_count(records: usize) -> usize {
    records.div_ceil(CHUNK_SIZE)
}

/// Percent reported before sending chunk `index` of `total`.
pub fn chunk_progress(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 2.0;
    }
    2.0 + (index as f64 / total as f64) * 93.0
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub summary: ImportSummary,
    pub chunks: Vec<ChunkResult>,
}

/// Sends candidates in sequential chunks of `CHUNK_SIZE`.
///
/// Refuses to start while any validation issue exists. Afterwards it never fails: a
/// rejected or erroring chunk counts all of its records as failed and the next chunk
/// is still sent.
pub async fn execute<A, F>(
    candidates: &[ImportRecord],
    issues: &[ValidationIssue],
    skipped: usize,
    api: &A,
    mut on_progress: F,
) -> Result<ExecutionReport, ImportError>
where
    A: ItemApi + ?Sized,
    F: FnMut(f64, &str),
{
    if !issues.is_empty() {
        error!(issues = issues.len(), "Import blocked by validation issues");
        return Err(ImportError::ValidationFailed {
            issues: issues.len(),
        });
    }

    let total = chunk_count(candidates.len());
    let mut report = ExecutionReport::default();
    report.summary.skipped_count = skipped;

    for (index, chunk) in candidates.chunks(CHUNK_SIZE).enumerate() {
        on_progress(
            chunk_progress(index, total),
            &format!("Importing batch {} of {}", index + 1, total),
        );
        let started = Instant::now();

        let result = match api.bulk_import(chunk).await {
            Ok(response) if response.success => {
                let data = response.data.unwrap_or_default();
                ChunkResult {
                    ordinal: index,
                    size: chunk.len(),
                    success_count: data.success_count,
                    error_count: data.error_count,
                    failed: false,
                    processing_time: data.processing_time.map(|v| match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    }),
                    message: response.message,
                }
            }
            Ok(response) => {
                warn!(chunk = index + 1, message = ?response.message, "Chunk rejected by server");
                failed_chunk(index, chunk.len(), response.message)
            }
            Err(err) => {
                warn!(chunk = index + 1, error = %err, "Chunk request failed");
                failed_chunk(index, chunk.len(), Some(err.to_string()))
            }
        };

        info!(
            chunk = index + 1,
            of = total,
            success = result.success_count,
            errors = result.error_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chunk finished"
        );
        report.summary.success_count += result.success_count;
        report.summary.error_count += result.error_count;
        report.chunks.push(result);
    }

    on_progress(98.0, "Finalizing import");
    let message = report.summary.message();
    on_progress(100.0, &message);
    info!(summary = %message, "Import finished");

    Ok(report)
}

fn failed_chunk(ordinal: usize, size: usize, message: Option<String>) -> ChunkResult {
    ChunkResult {
        ordinal,
        size,
        success_count: 0,
        error_count: size,
        failed: true,
        processing_time: None,
        message,
    }
}

use std::collections::HashSet;
use tracing::{info, warn};

use crate::models::ImportRecord;
use crate::services::api::ItemApi;

/// A failed check is kept apart from "no duplicates" so callers can warn about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateOutcome {
    Detected(HashSet<String>),
    DetectionFailed(String),
}

impl DuplicateOutcome {
    pub fn is_duplicate(&self, record: &ImportRecord) -> bool {
        match self {
            DuplicateOutcome::Detected(set) => set.contains(record.external_id()),
            DuplicateOutcome::DetectionFailed(_) => false,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            DuplicateOutcome::Detected(_) => None,
            DuplicateOutcome::DetectionFailed(reason) => Some(reason),
        }
    }
}

pub async fn detect<A: ItemApi + ?Sized>(records: &[ImportRecord], api: &A) -> DuplicateOutcome {
    if records.is_empty() {
        return DuplicateOutcome::Detected(HashSet::new());
    }
    let ids: Vec<String> = records.iter().map(|r| r.external_id().to_string()).collect();

    match api.check_existing(&ids).await {
        Ok(existing) => {
            info!(
                checked = ids.len(),
                duplicates = existing.existing_item_ids.len(),
                server_checked = existing.total_checked,
                server_duplicates = existing.duplicates_found,
                "Duplicate check finished"
            );
            let set: HashSet<String> = existing.existing_item_ids.into_iter().collect();
            DuplicateOutcome::Detected(set)
        }
        Err(err) => {
            warn!(error = %err, "Duplicate check failed, importing without it");
            DuplicateOutcome::DetectionFailed(format!("Could not check for existing items: {}", err))
        }
    }
}

pub fn import_candidates(records: &[ImportRecord], outcome: &DuplicateOutcome) -> Vec<ImportRecord> {
    records
        .iter()
        .filter(|r| !outcome.is_duplicate(r))
        .cloned()
        .collect()
}

pub fn duplicate_count(records: &[ImportRecord], outcome: &DuplicateOutcome) -> usize {
    records.iter().filter(|r| outcome.is_duplicate(r)).count()
}

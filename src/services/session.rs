use tracing::info;

use crate::error::ImportError;
use crate::models::{ChunkResult, HeaderMap, ImportRecord, ImportSummary, ValidationIssue};
use crate::services::api::ItemApi;
use crate::services::duplicates::{self, DuplicateOutcome};
use crate::services::executor::{self, ExecutionReport};
use crate::services::records::build_records;
use crate::services::tabular::{normalize_pasted_text, parse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    Empty,
    Parsed,
    Checked,
    Imported,
}

/// Everything one import holds between stages. Owned by a single caller; `reset` discards it.
#[derive(Debug, Clone)]
pub struct ImportSession {
    pub raw_text: String,
    pub rows: Vec<Vec<String>>,
    pub header_map: HeaderMap,
    pub records: Vec<ImportRecord>,
    pub issues: Vec<ValidationIssue>,
    pub duplicates: Option<DuplicateOutcome>,
    pub chunk_results: Vec<ChunkResult>,
    pub stage: SessionStage,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSession {
    pub fn new() -> Self {
        ImportSession {
            raw_text: String::new(),
            rows: Vec::new(),
            header_map: HeaderMap::default(),
            records: Vec::new(),
            issues: Vec::new(),
            duplicates: None,
            chunk_results: Vec::new(),
            stage: SessionStage::Empty,
        }
    }

    /// Parses delimited text, replacing whatever the session held before.
    pub fn load_text(&mut self, text: &str) -> Result<(), ImportError> {
        self.reset();
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let rows = parse(text);
        let parsed = build_records(&rows);
        if parsed.header_map.is_empty() && parsed.records.is_empty() {
            return Err(ImportError::EmptyInput);
        }

        info!(
            rows = rows.len(),
            mapped_columns = parsed.header_map.len(),
            records = parsed.records.len(),
            issues = parsed.issues.len(),
            "Parsed import input"
        );
        self.raw_text = text.to_string();
        self.rows = rows;
        self.header_map = parsed.header_map;
        self.records = parsed.records;
        self.issues = parsed.issues;
        self.stage = SessionStage::Parsed;
        Ok(())
    }

    pub fn load_pasted(&mut self, text: &str) -> Result<(), ImportError> {
        self.load_text(&normalize_pasted_text(text))
    }

    pub fn can_import(&self) -> bool {
        self.stage != SessionStage::Empty && self.issues.is_empty()
    }

    pub async fn check_duplicates<A: ItemApi + ?Sized>(&mut self, api: &A) -> &DuplicateOutcome {
        let outcome = duplicates::detect(&self.records, api).await;
        if self.stage == SessionStage::Parsed {
            self.stage = SessionStage::Checked;
        }
        self.duplicates.insert(outcome)
    }

    pub fn import_candidates(&self) -> Vec<ImportRecord> {
        match &self.duplicates {
            Some(outcome) => duplicates::import_candidates(&self.records, outcome),
            None => self.records.clone(),
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.duplicates
            .as_ref()
            .map(|outcome| duplicates::duplicate_count(&self.records, outcome))
            .unwrap_or(0)
    }

    /// Runs the duplicate check if it has not happened yet, then sends the candidates.
    pub async fn execute<A, F>(&mut self, api: &A, on_progress: F) -> Result<ImportSummary, ImportError>
    where
        A: ItemApi + ?Sized,
        F: FnMut(f64, &str),
    {
        if self.stage == SessionStage::Empty {
            return Err(ImportError::EmptyInput);
        }
        if !self.issues.is_empty() {
            return Err(ImportError::ValidationFailed {
                issues: self.issues.len(),
            });
        }
        if self.duplicates.is_none() {
            self.check_duplicates(api).await;
        }

        let candidates = self.import_candidates();
        let ExecutionReport { summary, chunks } =
            executor::execute(&candidates, &self.issues, self.skipped_count(), api, on_progress).await?;
        self.chunk_results = chunks;
        self.stage = SessionStage::Imported;
        Ok(summary)
    }

    pub fn reset(&mut self) {
        *self = ImportSession::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_text_fills_session() {
        let mut session = ImportSession::new();
        session
            .load_text("\u{feff}Item name,Sale price\nWidget,10\nGadget,-1")
            .unwrap();
        assert_eq!(session.stage, SessionStage::Parsed);
        assert_eq!(session.records.len(), 2);
        assert_eq!(session.issues.len(), 1);
        assert!(!session.can_import());
        assert_eq!(session.import_candidates().len(), 2);
    }

    #[test]
    fn blank_input_is_rejected() {
        let mut session = ImportSession::new();
        assert!(matches!(session.load_text("\n \n"), Err(ImportError::EmptyInput)));
        assert_eq!(session.stage, SessionStage::Empty);
    }

    #[test]
    fn pasted_text_is_normalized() {
        let mut session = ImportSession::new();
        session.load_pasted("Item name\tItem code\nWidget\tW1").unwrap();
        assert_eq!(session.records[0].item_code, "W1");
    }

    #[test]
    fn reset_discards_state() {
        let mut session = ImportSession::new();
        session.load_text("Item name\nWidget").unwrap();
        session.reset();
        assert_eq!(session.stage, SessionStage::Empty);
        assert!(session.records.is_empty());
        assert!(session.raw_text.is_empty());
    }
}

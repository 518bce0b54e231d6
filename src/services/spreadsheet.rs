use anyhow::{anyhow, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

use crate::error::ImportError;

const TEXT_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];
const SHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsm", "ods"];

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn is_supported(path: &Path) -> bool {
    let ext = extension(path);
    TEXT_EXTENSIONS.contains(&ext.as_str()) || SHEET_EXTENSIONS.contains(&ext.as_str())
}

/// Reads an import file as delimited text; spreadsheets go through `sheet_to_csv`.
pub fn read_input(path: &Path) -> Result<String> {
    let ext = extension(path);
    let unreadable = |reason: String| ImportError::UnreadableFile {
        path: path.display().to_string(),
        reason,
    };

    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        let bytes = std::fs::read(path).map_err(|e| unreadable(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| unreadable(e.to_string()))?;
        Ok(text.trim_start_matches('\u{feff}').to_string())
    } else if SHEET_EXTENSIONS.contains(&ext.as_str()) {
        sheet_to_csv(path).map_err(|e| unreadable(e.to_string()).into())
    } else {
        Err(ImportError::UnsupportedFile(path.display().to_string()).into())
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// First worksheet as comma-separated text, quoting only where needed, blank rows dropped.
pub fn sheet_to_csv(path: &Path) -> Result<String> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook has no worksheets"))??;

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .flexible(true)
        .from_writer(Vec::new());
    for row in range.rows() {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        writer.write_record(&cells)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("CSV buffer: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

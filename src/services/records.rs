use tracing::debug;

use crate::models::{HeaderMap, ImportRecord, ValidationIssue};
use crate::services::header_map::build_header_map;
use crate::services::normalizer::normalize;

#[derive(Debug, Clone, Default)]
pub struct ParsedImport {
    pub header_map: HeaderMap,
    pub records: Vec<ImportRecord>,
    pub issues: Vec<ValidationIssue>,
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.is_empty())
}

fn is_instruction(row: &[String]) -> bool {
    row.iter().any(|cell| cell.starts_with("**"))
}

/// Walks parsed rows: the first non-blank row is the header, the rest become records.
///
/// A `**` row is dropped together with the physical line right after it, whatever that
/// line holds.
pub fn build_records(rows: &[Vec<String>]) -> ParsedImport {
    let header_idx = match rows.iter().position(|row| !is_blank(row)) {
        Some(idx) => idx,
        None => return ParsedImport::default(),
    };
    let header_map = build_header_map(&rows[header_idx]);

    let mut records = Vec::new();
    let mut issues = Vec::new();
    let mut skip_next = false;

    for (idx, row) in rows.iter().enumerate().skip(header_idx + 1) {
        let row_number = idx + 1;
        if skip_next {
            skip_next = false;
            debug!(row_number, "Dropping line after instruction row");
            continue;
        }
        if is_blank(row) {
            continue;
        }
        if is_instruction(row) {
            skip_next = true;
            continue;
        }
        match row.first() {
            Some(first) if !first.is_empty() && !first.starts_with("**") => {}
            _ => continue,
        }

        let (record, row_issues) = normalize(row, &header_map, row_number);
        records.push(record);
        issues.extend(row_issues);
    }

    ParsedImport {
        header_map,
        records,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tabular::parse;

    #[test]
    fn instruction_row_drops_next_line() {
        let text = "Item name*,Item code\nWidget,ITM001\n**skip this block\nignored row\nGadget,ITM002";
        let parsed = build_records(&parse(text));
        let names: Vec<&str> = parsed.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Widget", "Gadget"]);
        assert_eq!(parsed.records[1].row_number, 5);
    }

    #[test]
    fn instruction_in_later_cell_counts() {
        let text = "Item name,Item code\nWidget,**note\nLost,L1\nKept,K1";
        let parsed = build_records(&parse(text));
        let names: Vec<&str> = parsed.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Kept"]);
    }

    #[test]
    fn blank_and_nameless_rows_are_skipped() {
        let text = "\nItem name,Item code\n,,\n\n,C9\nWidget,W1";
        let parsed = build_records(&parse(text));
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].row_number, 6);
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn empty_input_yields_nothing() {
        let parsed = build_records(&parse("\n\n"));
        assert!(parsed.records.is_empty());
        assert!(parsed.header_map.is_empty());
    }

    #[test]
    fn first_data_row_is_row_two() {
        let text = "Item name,Sale price\nWidget,-5";
        let parsed = build_records(&parse(text));
        assert_eq!(parsed.issues.len(), 1);
        assert_eq!(parsed.issues[0].row_index, 2);
    }
}

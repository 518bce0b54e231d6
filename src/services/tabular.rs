//! Delimited-text parsing. Every cell stays a string here; typing happens in the normalizer.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Tab => '\t',
        }
    }
}

/// Tab if both of the first two lines contain a tab, else semicolon on the same rule, else comma.
pub fn detect_delimiter(text: &str) -> Delimiter {
    let mut lines = text.lines();
    let (first, second) = match (lines.next(), lines.next()) {
        (Some(first), Some(second)) => (first, second),
        _ => return Delimiter::Comma,
    };
    if first.contains('\t') && second.contains('\t') {
        Delimiter::Tab
    } else if first.contains(';') && second.contains(';') {
        Delimiter::Semicolon
    } else {
        Delimiter::Comma
    }
}

/// Splits one line into trimmed cells. `""` inside quotes is a literal quote;
/// unbalanced quotes are tolerated.
pub fn split_line(line: &str, delimiter: Delimiter) -> Vec<String> {
    let delim = delimiter.as_char();
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == delim && !in_quotes {
            cells.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// One row of cells per physical line (blank lines included, as a single empty cell),
/// so that callers can report line numbers.
pub fn parse(text: &str) -> Vec<Vec<String>> {
    let delimiter = detect_delimiter(text);
    text.lines().map(|line| split_line(line, delimiter)).collect()
}

/// Pasted spreadsheet ranges arrive tab-separated; they are turned into comma rows.
pub fn normalize_pasted_text(text: &str) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }
    text.lines()
        .map(|line| line.replace('\t', ","))
        .collect::<Vec<_>>()
        .join("\n")
}

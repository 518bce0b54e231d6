use anyhow::Result;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn sha256_text(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Parses the longest numeric prefix (`"12.5kg"` -> 12.5, `"1.2E+3"` -> 1200). `None` when there is none.
pub fn parse_leading_float(value: &str) -> Option<f64> {
    let s = value.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok()
}

pub fn parse_float_or_zero(value: &str) -> f64 {
    parse_leading_float(value).unwrap_or(0.0)
}

/// First `digits[.digits]` run anywhere in the text (`"GST@18%"` -> 18).
pub fn first_number(value: &str) -> Option<f64> {
    let bytes = value.as_bytes();
    let start = bytes.iter().position(|b| b.is_ascii_digit())?;
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    value[start..end].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_float_accepts_prefixes() {
        assert_eq!(parse_leading_float("12.5kg"), Some(12.5));
        assert_eq!(parse_leading_float(" -3 "), Some(-3.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("7."), Some(7.0));
        assert_eq!(parse_leading_float("abc"), None);
        assert_eq!(parse_leading_float("-"), None);
        assert_eq!(parse_leading_float(""), None);
    }

    #[test]
    fn leading_float_keeps_exponent() {
        assert_eq!(parse_leading_float("1e3"), Some(1000.0));
        assert_eq!(parse_leading_float("2.5E+2"), Some(250.0));
        assert_eq!(parse_leading_float("5E-1"), Some(0.5));
        assert_eq!(parse_leading_float("3e"), Some(3.0));
        assert_eq!(parse_leading_float("4E+kg"), Some(4.0));
    }

    #[test]
    fn float_or_zero_falls_back() {
        assert_eq!(parse_float_or_zero("n/a"), 0.0);
        assert_eq!(parse_float_or_zero("250"), 250.0);
    }

    #[test]
    fn first_number_finds_embedded_rate() {
        assert_eq!(first_number("GST@18%"), Some(18.0));
        assert_eq!(first_number("18.00"), Some(18.0));
        assert_eq!(first_number("IGST 12.5 %"), Some(12.5));
        assert_eq!(first_number("exempt"), None);
        assert_eq!(first_number("-5"), Some(5.0));
    }
}

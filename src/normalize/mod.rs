// src/normalize/mod.rs
//
// Canonical forms for the loosely-typed cell values the spreadsheet endpoint
// returns: lookup keys, numbers and display dates. Everything here is pure
// and total; bad input degrades to a harmless default instead of an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Normalize a raw column header into a canonical lookup key: trim,
/// lowercase, fold Spanish diacritics and drop anything outside `[a-z0-9]`.
///
/// `ñ` folds to `ni` because the ASCII spelling in older sheets is `anio`,
/// `contrasenia`, etc. — `Año`, `ANIO` and ` anio ` must all collide.
pub fn canonical_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        match c {
            'a'..='z' | '0'..='9' => out.push(c),
            'ñ' => out.push_str("ni"),
            _ => {
                if let Some(folded) = fold_accent(c) {
                    out.push(folded);
                }
            }
        }
    }
    out
}

fn fold_accent(c: char) -> Option<char> {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' => Some('a'),
        'é' | 'è' | 'ê' | 'ë' => Some('e'),
        'í' | 'ì' | 'î' | 'ï' => Some('i'),
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => Some('o'),
        'ú' | 'ù' | 'û' | 'ü' => Some('u'),
        'ç' => Some('c'),
        _ => None,
    }
}

/// Normalize a raw cell value into a number. Numeric JSON values pass
/// through; strings go through [`parse_loose_number`]; everything else
/// (null, bool, nested structures) reads as `0.0`.
///
/// The zero fallback is load-bearing: downstream totals assume that a
/// missing, empty or malformed cell contributes nothing. A legitimately-zero
/// cell and a malformed one are indistinguishable on purpose.
pub fn canonical_number(raw: &Value) -> f64 {
    match raw {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_loose_number(s),
        _ => 0.0,
    }
}

/// Parse a spreadsheet-style numeric string: whitespace is stripped, a
/// trailing `%` is dropped, and when a comma is present it is taken as the
/// decimal separator (so `.` becomes a thousands mark and is removed).
///
/// The source sheets are comma-decimal; a US-style `"1,234"` therefore
/// mis-parses as `1.234`. Known trade-off, kept for compatibility.
pub fn parse_loose_number(raw: &str) -> f64 {
    let mut s: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if s.ends_with('%') {
        s.pop();
    }
    if s.contains(',') {
        s.retain(|c| c != '.');
        s = s.replace(',', ".");
    }
    s.parse().unwrap_or(0.0)
}

/// Render a raw cell value as a display date (`DD/MM/YYYY`). If the value
/// does not parse as a date under any known shape, fall back to the
/// stringified raw value with `/` and `-` separators stripped, so the UI
/// still has something stable to show.
pub fn canonical_date(raw: &Value) -> String {
    let text = match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Null => return String::new(),
        other => other.to_string(),
    };
    if text.is_empty() {
        return text;
    }
    if let Some(date) = parse_date(&text) {
        return date.format("%d/%m/%Y").to_string();
    }
    text.chars().filter(|c| *c != '/' && *c != '-').collect()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_collapses_locale_spellings() {
        assert_eq!(canonical_key("Año"), canonical_key("ANIO"));
        assert_eq!(canonical_key("ANIO"), canonical_key(" anio "));
        assert_eq!(canonical_key("Año"), "anio");
        assert_eq!(canonical_key("Rentabilidad (%)"), "rentabilidad");
        assert_eq!(canonical_key("FECHA_CIERRE"), "fechacierre");
        assert_eq!(canonical_key("Número de Acciones"), "numerodeacciones");
    }

    #[test]
    fn key_is_total_and_idempotent() {
        assert_eq!(canonical_key(""), "");
        assert_eq!(canonical_key("   "), "");
        assert_eq!(canonical_key("!!!"), "");
        let once = canonical_key("Beneficio Neto €");
        assert_eq!(canonical_key(&once), once);
    }

    #[test]
    fn number_handles_comma_decimal_and_percent() {
        assert_eq!(parse_loose_number("1.234,56"), 1234.56);
        assert_eq!(parse_loose_number("12%"), 12.0);
        assert_eq!(parse_loose_number("-3,5 %"), -3.5);
        assert_eq!(parse_loose_number(" 42 "), 42.0);
        assert_eq!(parse_loose_number(""), 0.0);
        assert_eq!(parse_loose_number("abc"), 0.0);
    }

    #[test]
    fn number_passes_json_numbers_through() {
        assert_eq!(canonical_number(&json!(7.25)), 7.25);
        assert_eq!(canonical_number(&json!("1.234,56")), 1234.56);
        assert_eq!(canonical_number(&Value::Null), 0.0);
        assert_eq!(canonical_number(&json!(true)), 0.0);
    }

    #[test]
    fn date_renders_known_shapes() {
        assert_eq!(canonical_date(&json!("2024-03-01")), "01/03/2024");
        assert_eq!(canonical_date(&json!("01/03/2024")), "01/03/2024");
        assert_eq!(canonical_date(&json!("2024-03-01 09:30:00")), "01/03/2024");
        assert_eq!(canonical_date(&json!("2024-03-01T09:30:00Z")), "01/03/2024");
    }

    #[test]
    fn date_falls_back_to_stripped_raw() {
        assert_eq!(canonical_date(&json!("T1-2024")), "T12024");
        assert_eq!(canonical_date(&json!(202403)), "202403");
        assert_eq!(canonical_date(&json!("")), "");
        assert_eq!(canonical_date(&Value::Null), "");
    }
}

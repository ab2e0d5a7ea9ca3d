// src/schema/mod.rs
//
// Tolerant field lookup over rows whose header spellings drift across
// sheet versions and locales. A row is just a string-keyed map; the mapper
// resolves a logical field by canonicalizing both sides of the match.

use std::collections::HashSet;

use serde_json::Value;

use crate::normalize::{canonical_key, canonical_number};

/// One row of a remote table. Key spellings are not known ahead of time;
/// always go through [`find_value`] instead of indexing directly.
pub type Record = std::collections::HashMap<String, Value>;

/// Resolve a logical field against `record`, trying every `candidates`
/// spelling under canonical-key equality. Candidate order expresses caller
/// preference, but the match itself is set membership: the first record key
/// whose canonical form appears in the candidate set wins. Schemas are
/// assumed not to carry two columns that canonicalize identically.
pub fn find_value<'a>(record: &'a Record, candidates: &[&str]) -> Option<&'a Value> {
    let wanted: HashSet<String> = candidates.iter().map(|c| canonical_key(c)).collect();
    record
        .iter()
        .find(|(key, _)| wanted.contains(&canonical_key(key)))
        .map(|(_, value)| value)
}

/// [`find_value`] followed by numeric canonicalization. A schema-miss reads
/// as `0.0`, same as an empty or malformed cell.
pub fn find_number(record: &Record, candidates: &[&str]) -> f64 {
    find_value(record, candidates)
        .map(canonical_number)
        .unwrap_or(0.0)
}

/// [`find_value`] rendered as text. Misses, nulls and empty strings all
/// collapse to `default`, matching how the portal screens show placeholder
/// markers for absent cells.
pub fn find_text(record: &Record, candidates: &[&str], default: &str) -> String {
    match find_value(record, candidates) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Null) | Some(Value::String(_)) | None => default.to_string(),
        Some(other) => other.to_string(),
    }
}

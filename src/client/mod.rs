// src/client/mod.rs
//
// Read/write client for the spreadsheet-backed portal endpoint. Reads go
// through the table cache; writes are single POSTs with no automatic retry.
// Nothing in here throws across the public boundary: transport failures
// degrade to empty row sets, `false` probes, or `success: false` outcomes,
// and the underlying cause goes to the log.

pub mod tabs;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::cache::{TableCache, DEFAULT_TTL};
use crate::schema::Record;

/// Result of a write against the endpoint. `error` carries whatever detail
/// the transport or response body offered; it is log/display material, not
/// something callers should branch on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub success: bool,
    pub error: Option<String>,
}

pub struct RemoteTableClient {
    http: Client,
    base: Url,
    cache: TableCache,
}

impl RemoteTableClient {
    pub fn new(base: Url) -> Self {
        Self::with_ttl(base, DEFAULT_TTL)
    }

    pub fn with_ttl(base: Url, ttl: Duration) -> Self {
        Self {
            http: Client::new(),
            base,
            cache: TableCache::new(ttl),
        }
    }

    /// Fetch `table`'s rows. Cache gating (freshness, in-flight join, stale
    /// fallback) lives in [`TableCache`]; `bypass` forces a refetch
    /// regardless of freshness. Never fails: worst case is an empty set.
    pub async fn fetch_table(&self, table: &str, bypass: bool) -> Arc<Vec<Record>> {
        let url = self.read_url(table);
        let http = self.http.clone();
        let name = table.to_string();
        self.cache
            .get_or_fetch(table, bypass, fetch_rows(http, url, name))
            .await
    }

    /// Append/update-style write: `POST <base>` with a JSON text body
    /// `{ "action": ..., "tab": ..., "data": ... }`.
    pub async fn send_mutation(
        &self,
        action: &str,
        tab: Option<&str>,
        data: Value,
    ) -> MutationOutcome {
        let mut body = serde_json::json!({ "action": action, "data": data });
        if let Some(tab) = tab {
            body["tab"] = Value::String(tab.to_string());
        }
        self.post_payload(body).await
    }

    /// Flat action payloads (e.g. `{"action":"UPDATE_PIN","uid":...,"newPin":...}`)
    /// that do not follow the `action/tab/data` envelope.
    pub async fn send_action(&self, payload: Value) -> MutationOutcome {
        self.post_payload(payload).await
    }

    /// Reachability probe. Any failure, transport or status, reads as
    /// `false`; the UI uses this for its "reconnecting" indicator.
    pub async fn check_connection(&self) -> bool {
        match self.http.get(self.base.clone()).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                debug!(error = %err, "connection probe failed");
                false
            }
        }
    }

    fn read_url(&self, table: &str) -> Url {
        let mut url = self.base.clone();
        // `t` busts any intermediary HTTP caching; freshness is ours to manage.
        url.query_pairs_mut()
            .append_pair("tab", table)
            .append_pair("t", &Utc::now().timestamp_millis().to_string());
        url
    }

    async fn post_payload(&self, payload: Value) -> MutationOutcome {
        match self.try_post(&payload).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "mutation failed in transport");
                MutationOutcome {
                    success: false,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    async fn try_post(&self, payload: &Value) -> Result<MutationOutcome> {
        // Sent as a plain-text body: the Apps-Script-style endpoint rejects
        // preflighted requests, so the JSON must not trigger one.
        let text = self
            .http
            .post(self.base.clone())
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(payload.to_string())
            .send()
            .await
            .with_context(|| format!("POST {} failed", self.base))?
            .text()
            .await
            .context("reading mutation response body")?;
        Ok(decode_mutation(&text))
    }
}

async fn fetch_rows(http: Client, url: Url, table: String) -> Result<Vec<Record>> {
    debug!(table = %table, url = %url, "fetching table");
    let body: Value = http
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("non-success status from {}", url))?
        .json()
        .await
        .with_context(|| format!("decoding JSON from {}", url))?;
    Ok(decode_rows(body, &table))
}

/// Unwrap the endpoint's response shapes: a bare array of row objects or a
/// `{"rows": [...]}` envelope. A body carrying an `error` field means "no
/// usable data", which is an empty result here, not a failure.
fn decode_rows(body: Value, table: &str) -> Vec<Record> {
    let raw = match body {
        Value::Array(raw) => raw,
        Value::Object(mut map) => {
            if let Some(err) = map.get("error") {
                warn!(table, error = %err, "response carried an error field; treating as empty");
                return Vec::new();
            }
            match map.remove("rows") {
                Some(Value::Array(raw)) => raw,
                _ => {
                    warn!(table, "unrecognized response envelope");
                    return Vec::new();
                }
            }
        }
        other => {
            warn!(table, body = %other, "non-tabular response");
            return Vec::new();
        }
    };

    raw.into_iter()
        .filter_map(|row| match row {
            Value::Object(map) => Some(trim_keys(map)),
            _ => None,
        })
        .collect()
}

// Sheet headers routinely arrive with stray padding; trim before the
// schema mapper ever sees them.
fn trim_keys(map: Map<String, Value>) -> Record {
    map.into_iter()
        .map(|(key, value)| (key.trim().to_string(), value))
        .collect()
}

/// Success iff the body carries a truthy `success` or `status: "success"`.
/// Anything else, including unparseable bodies, is a failure with the raw
/// body as detail.
fn decode_mutation(text: &str) -> MutationOutcome {
    match serde_json::from_str::<Value>(text) {
        Ok(body) => {
            let success = matches!(body.get("success"), Some(Value::Bool(true)))
                || body.get("success").and_then(Value::as_str) == Some("true")
                || body.get("status").and_then(Value::as_str) == Some("success");
            let error = if success {
                None
            } else {
                body.get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| Some(text.to_string()))
            };
            MutationOutcome { success, error }
        }
        Err(_) => {
            // Some action handlers answer bare text.
            let success = text.trim().eq_ignore_ascii_case("success");
            MutationOutcome {
                success,
                error: if success {
                    None
                } else {
                    Some(text.to_string())
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_bare_array_and_envelope() {
        let bare = json!([{"ANIO": 2024}, {"ANIO": 2025}]);
        assert_eq!(decode_rows(bare, "t").len(), 2);

        let envelope = json!({"rows": [{"ANIO": 2024}]});
        assert_eq!(decode_rows(envelope, "t").len(), 1);
    }

    #[test]
    fn error_body_is_empty_not_fatal() {
        let body = json!({"error": "tab not found"});
        assert!(decode_rows(body, "t").is_empty());

        // `error` wins even when rows are present.
        let body = json!({"error": "partial", "rows": [{"a": 1}]});
        assert!(decode_rows(body, "t").is_empty());
    }

    #[test]
    fn junk_shapes_decode_to_empty() {
        assert!(decode_rows(json!("oops"), "t").is_empty());
        assert!(decode_rows(json!({"data": []}), "t").is_empty());
        // Non-object rows are dropped, object rows survive.
        let mixed = json!([{"a": 1}, 42, "x"]);
        assert_eq!(decode_rows(mixed, "t").len(), 1);
    }

    #[test]
    fn row_keys_are_trimmed() {
        let body = json!([{" ANIO ": 2024, "Mes\t": "enero"}]);
        let rows = decode_rows(body, "t");
        assert!(rows[0].contains_key("ANIO"));
        assert!(rows[0].contains_key("Mes"));
    }

    #[test]
    fn mutation_success_markers() {
        assert!(decode_mutation(r#"{"success": true}"#).success);
        assert!(decode_mutation(r#"{"success": "true"}"#).success);
        assert!(decode_mutation(r#"{"status": "success"}"#).success);
        assert!(decode_mutation("success").success);
    }

    #[test]
    fn mutation_failures_carry_detail() {
        let out = decode_mutation(r#"{"success": false, "error": "PIN mismatch"}"#);
        assert!(!out.success);
        assert_eq!(out.error.as_deref(), Some("PIN mismatch"));

        let out = decode_mutation("<html>gateway timeout</html>");
        assert!(!out.success);
        assert_eq!(out.error.as_deref(), Some("<html>gateway timeout</html>"));

        let out = decode_mutation(r#"{"status": "error"}"#);
        assert!(!out.success);
        assert!(out.error.is_some());
    }
}

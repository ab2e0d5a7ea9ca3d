// src/views/executions.rs

use serde_json::Value;

use crate::normalize::canonical_date;
use crate::schema::{find_number, find_text, find_value, Record};

/// Sentinel shown in the close-time column while a trade is open.
pub const PENDING_CLOSE_TIME: &str = "PENDING";
/// Sentinel shown in the close-price column while a trade is open.
pub const PENDING_CLOSE_PRICE: &str = "---";

#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub symbol: String,
    pub side: String,
    pub open_time: String,
    pub close_time: String,
    pub open_price: String,
    pub close_price: String,
    pub volume: f64,
    pub profit: f64,
}

/// Execution log partitioned the way the trades screen shows it.
#[derive(Debug, Default)]
pub struct ExecutionLog {
    pub open: Vec<Execution>,
    pub closed: Vec<Execution>,
}

/// Partition `rows` into open and closed trades. An explicit status field
/// wins; otherwise a non-empty close-time cell marks the row closed.
pub fn split_log(rows: &[Record]) -> ExecutionLog {
    let mut log = ExecutionLog::default();
    for row in rows {
        if is_closed(row) {
            log.closed.push(build(row, true));
        } else {
            log.open.push(build(row, false));
        }
    }
    log
}

fn is_closed(row: &Record) -> bool {
    if let Some(status) = find_value(row, &["estado", "status"]) {
        if let Some(s) = status.as_str() {
            let s = s.trim();
            if !s.is_empty() {
                return s.eq_ignore_ascii_case("cerrada") || s.eq_ignore_ascii_case("closed");
            }
        }
    }
    match find_value(row, &["fecha_cierre", "close_time", "cierre"]) {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

fn build(row: &Record, closed: bool) -> Execution {
    let date_of = |names: &[&str]| {
        find_value(row, names)
            .map(canonical_date)
            .unwrap_or_default()
    };

    Execution {
        symbol: find_text(row, &["simbolo", "symbol", "activo"], "---"),
        side: find_text(row, &["tipo", "side", "operacion"], "---"),
        open_time: date_of(&["fecha_apertura", "open_time", "apertura"]),
        close_time: if closed {
            date_of(&["fecha_cierre", "close_time", "cierre"])
        } else {
            PENDING_CLOSE_TIME.to_string()
        },
        open_price: find_text(row, &["precio_apertura", "open_price"], "---"),
        close_price: if closed {
            find_text(row, &["precio_cierre", "close_price"], "---")
        } else {
            PENDING_CLOSE_PRICE.to_string()
        },
        volume: find_number(row, &["volumen", "volume", "lotes"]),
        profit: find_number(row, &["beneficio", "profit", "resultado"]),
    }
}

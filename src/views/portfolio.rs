// src/views/portfolio.rs

use crate::normalize::canonical_date;
use crate::schema::{find_number, find_text, find_value, Record};
use crate::store::Session;

/// One line of the portfolio composition chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub asset: String,
    pub category: String,
    pub weight_pct: f64,
    pub value: f64,
}

/// Headline figures for the dashboard, read off the single-row master
/// config table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KpiSummary {
    pub fund_value: f64,
    pub share_value: f64,
    pub total_shares: f64,
    pub ytd_yield: f64,
    pub updated: String,
}

pub fn positions(rows: &[Record]) -> Vec<Position> {
    rows.iter()
        .map(|row| Position {
            asset: find_text(row, &["activo", "asset", "nombre"], "---"),
            category: find_text(row, &["categoria", "category", "tipo"], "---"),
            weight_pct: find_number(row, &["peso", "weight", "porcentaje"]),
            value: find_number(row, &["valor", "value", "importe"]),
        })
        .collect()
}

/// KPI shaping over `CONFIG_MAESTRA`. The table carries one row; anything
/// else degrades to zeroed figures rather than failing the dashboard.
pub fn kpis(rows: &[Record]) -> KpiSummary {
    let Some(row) = rows.first() else {
        return KpiSummary::default();
    };
    KpiSummary {
        fund_value: find_number(row, &["valor_fondo", "fund_value", "patrimonio"]),
        share_value: find_number(row, &["valor_accion", "share_value", "valor_participacion"]),
        total_shares: find_number(row, &["acciones_totales", "total_shares"]),
        ytd_yield: find_number(row, &["rentabilidad_anual", "ytd_yield", "rentabilidad_ytd"]),
        updated: find_value(row, &["actualizado", "updated", "fecha"])
            .map(canonical_date)
            .unwrap_or_default(),
    }
}

/// Share count for the signed-in shareholder: the roster row wins; when the
/// roster has no row for the session uid, fall back to the session's own
/// copy so the dashboard keeps rendering between refreshes.
pub fn shares_for(roster: &[Record], session: &Session) -> f64 {
    roster
        .iter()
        .find(|row| find_text(row, &["uid", "id", "usuario"], "") == session.uid)
        .map(|row| find_number(row, &["acciones", "shares", "participaciones"]))
        .unwrap_or(session.shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn session(uid: &str, shares: f64) -> Session {
        Session {
            uid: uid.to_string(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            shares,
            timestamp: 0,
        }
    }

    #[test]
    fn positions_rename_with_defaults() {
        let rows = vec![record(&[
            ("ACTIVO", json!("Renta Fija")),
            ("PESO", json!("35,5%")),
        ])];
        let got = positions(&rows);
        assert_eq!(got[0].asset, "Renta Fija");
        assert_eq!(got[0].category, "---");
        assert_eq!(got[0].weight_pct, 35.5);
        assert_eq!(got[0].value, 0.0);
    }

    #[test]
    fn kpis_read_the_first_row() {
        let rows = vec![record(&[
            ("VALOR_FONDO", json!("1.250.000,00")),
            ("VALOR_ACCION", json!("1.042,73")),
            ("ACTUALIZADO", json!("2024-06-30")),
        ])];
        let got = kpis(&rows);
        assert_eq!(got.fund_value, 1_250_000.0);
        assert_eq!(got.share_value, 1042.73);
        assert_eq!(got.total_shares, 0.0);
        assert_eq!(got.updated, "30/06/2024");
    }

    #[test]
    fn kpis_of_empty_table_are_zeroed() {
        assert_eq!(kpis(&[]), KpiSummary::default());
    }

    #[test]
    fn roster_shares_win_over_session_copy() {
        let roster = vec![record(&[("UID", json!("u1")), ("ACCIONES", json!(120))])];
        assert_eq!(shares_for(&roster, &session("u1", 90.0)), 120.0);
        assert_eq!(shares_for(&roster, &session("u2", 90.0)), 90.0);
        assert_eq!(shares_for(&[], &session("u1", 90.0)), 90.0);
    }
}

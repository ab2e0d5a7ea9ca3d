// src/views/performance.rs

use crate::schema::{find_number, find_text, Record};

/// Index value both series are seeded at.
pub const BASE_INDEX: f64 = 1000.0;

/// One point of the performance chart: the row's own period yield plus the
/// cumulative fund and benchmark index values up to and including it.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformancePoint {
    pub period: String,
    pub period_yield: f64,
    pub fund_index: f64,
    pub benchmark_index: f64,
}

/// Walk `rows` in table order compounding two running multipliers seeded at
/// [`BASE_INDEX`]. Yields are fractions (`0.03` is 3%). Emitted index values
/// are rounded to 2 decimals; the running product is kept unrounded so the
/// rounding never compounds.
pub fn build_series(rows: &[Record]) -> Vec<PerformancePoint> {
    let mut fund = BASE_INDEX;
    let mut benchmark = BASE_INDEX;

    rows.iter()
        .map(|row| {
            let y = find_number(row, &["rentabilidad", "yield", "rendimiento"]);
            let b = find_number(row, &["benchmark", "indice", "sp500"]);
            fund *= 1.0 + y;
            benchmark *= 1.0 + b;
            PerformancePoint {
                period: find_text(row, &["periodo", "period", "mes"], ""),
                period_yield: y,
                fund_index: round2(fund),
                benchmark_index: round2(benchmark),
            }
        })
        .collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn yield_row(period: &str, y: f64, b: f64) -> Record {
        [
            ("PERIODO".to_string(), json!(period)),
            ("RENTABILIDAD".to_string(), json!(y)),
            ("BENCHMARK".to_string(), json!(b)),
        ]
        .into_iter()
        .collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn compounds_from_base_index() {
        let rows = vec![
            yield_row("2024-01", 0.03, 0.01),
            yield_row("2024-02", -0.02, 0.01),
            yield_row("2024-03", 0.05, 0.01),
        ];

        let series = build_series(&rows);
        assert_eq!(series.len(), 3);
        assert!(close(series[0].fund_index, 1030.00));
        assert!(close(series[1].fund_index, 1009.40));
        assert!(close(series[2].fund_index, 1059.87));

        assert!(close(series[0].period_yield, 0.03));
        assert_eq!(series[0].period, "2024-01");
        assert!(close(series[2].benchmark_index, 1030.30));
    }

    #[test]
    fn missing_yield_reads_as_flat_period() {
        let mut row = yield_row("2024-01", 0.10, 0.0);
        row.insert("RENTABILIDAD".to_string(), Value::Null);

        let series = build_series(&[row, yield_row("2024-02", 0.10, 0.0)]);
        assert!(close(series[0].fund_index, 1000.00));
        assert!(close(series[1].fund_index, 1100.00));
    }

    #[test]
    fn comma_decimal_strings_parse_as_fractions() {
        let row: Record = [("rentabilidad".to_string(), json!("0,03"))]
            .into_iter()
            .collect();
        let series = build_series(&[row]);
        assert!(close(series[0].fund_index, 1030.00));
    }
}

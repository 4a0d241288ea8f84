use crate::error::{InvoiceAuditError, Result};
use chrono::NaiveDate;

/// Largest absolute difference (exclusive) at which a stated amount still
/// matches its recomputed value.
pub const CENT_TOLERANCE: f64 = 0.01;

/// Rounds to two decimals. Ties at the half cent round away from zero.
pub fn round_to_cents(value: f64) -> f64 {
    round_to_places(value, 2)
}

pub fn round_to_places(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn amounts_match(a: f64, b: f64) -> bool {
    (a - b).abs() < CENT_TOLERANCE
}

pub fn parse_invoice_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| InvoiceAuditError::InvalidDate(format!("'{}': {}", raw, e)))
}

pub fn format_money(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", value.abs())
    } else {
        format!("${:.2}", value)
    }
}

pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

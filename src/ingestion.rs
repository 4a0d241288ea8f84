use crate::error::Result;
use crate::schema::{Invoice, LineItem, Organization};
use crate::utils::{parse_invoice_date, round_to_places};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Odoo sends `false` for empty relational and date fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OdooValue<T> {
    Set(T),
    Unset(bool),
}

impl<T> OdooValue<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            OdooValue::Set(value) => Some(value),
            OdooValue::Unset(_) => None,
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            OdooValue::Set(value) => Some(value),
            OdooValue::Unset(_) => None,
        }
    }
}

impl<T> Default for OdooValue<T> {
    fn default() -> Self {
        OdooValue::Unset(false)
    }
}

/// An `account.move` record as returned by `read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdooInvoiceRecord {
    pub id: i64,
    /// Invoice number, e.g. "INV/2024/00012".
    pub name: String,
    #[serde(default)]
    pub partner_id: OdooValue<(i64, String)>,
    #[serde(default)]
    pub invoice_date: OdooValue<String>,
    pub amount_untaxed: f64,
    pub amount_tax: f64,
    pub amount_total: f64,
    #[serde(default)]
    pub invoice_line_ids: Vec<i64>,
}

/// An `account.move.line` record as returned by `read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdooInvoiceLine {
    pub id: i64,
    #[serde(default)]
    pub name: OdooValue<String>,
    pub quantity: f64,
    pub price_unit: f64,
    pub price_subtotal: f64,
}

/// A batch of invoice and line records, as pulled by two `read` calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OdooDataset {
    pub invoices: Vec<OdooInvoiceRecord>,
    #[serde(default)]
    pub lines: Vec<OdooInvoiceLine>,
}

impl OdooDataset {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn find_invoice(&self, name: &str) -> Option<&OdooInvoiceRecord> {
        self.invoices
            .iter()
            .find(|record| record.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Lines referenced by `record`, in `invoice_line_ids` order.
    pub fn lines_for(&self, record: &OdooInvoiceRecord) -> Vec<OdooInvoiceLine> {
        record
            .invoice_line_ids
            .iter()
            .filter_map(|id| self.lines.iter().find(|line| line.id == *id))
            .cloned()
            .collect()
    }
}

/// Maps an Odoo invoice onto [`Invoice`].
///
/// Section, note and tax lines carry no positive quantity and price and are
/// dropped. Odoo has no single tax rate on the move, so one is derived from
/// the amounts. Discounts are folded into line subtotals by Odoo and come
/// through as zero.
pub fn convert_odoo_invoice(
    record: &OdooInvoiceRecord,
    lines: &[OdooInvoiceLine],
    fallback_date: NaiveDate,
) -> Result<Invoice> {
    let line_items = lines
        .iter()
        .filter(|line| line.quantity > 0.0 && line.price_unit > 0.0)
        .enumerate()
        .map(|(index, line)| LineItem {
            id: format!("L{}", index + 1),
            description: line
                .name
                .as_option()
                .filter(|name| !name.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| "Item".to_string()),
            quantity: line.quantity,
            unit_price: line.price_unit,
            line_total: line.price_subtotal,
        })
        .collect();

    let subtotal = record.amount_untaxed;
    let tax_amount = record.amount_tax;
    let tax_rate = if subtotal > 0.0 {
        round_to_places(tax_amount / subtotal, 4)
    } else {
        0.0
    };

    let date = match record.invoice_date.as_option() {
        Some(raw) => parse_invoice_date(raw)?,
        None => fallback_date,
    };

    let vendor = record
        .partner_id
        .as_option()
        .map(|(_, name)| name.clone())
        .unwrap_or_else(|| "Unknown Vendor".to_string());

    Ok(Invoice {
        id: record.name.clone(),
        organization: Organization::Odoo,
        vendor,
        date,
        line_items,
        subtotal,
        tax_rate,
        tax_amount,
        discounts: 0.0,
        grand_total: record.amount_total,
    })
}

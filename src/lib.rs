//! # Invoice Auditor
//!
//! A library for checking the arithmetic of invoices pulled from accounting
//! and CRM platforms (QuickBooks, Salesforce, Odoo), with optional written
//! commentary from a language model.
//!
//! ## Core Concepts
//!
//! - **Rule engine**: five independent checks (line totals, subtotal, tax,
//!   grand total, unusual patterns) over one immutable [`Invoice`]
//! - **Tolerance**: stated amounts match when within one cent of the
//!   recomputed value, after rounding the recomputed value to cents
//! - **Severity**: errors break an arithmetic identity and make the invoice
//!   invalid; warnings flag anomalies and do not
//! - **Augmentation**: a [`NarrativeAnalyzer`] may append free-text analysis
//!   and the issues it mentions, after the rule result is computed
//!
//! ## Example
//!
//! ```rust
//! use invoice_auditor::*;
//! use chrono::NaiveDate;
//!
//! let invoice = Invoice {
//!     id: "QB-INV-002".to_string(),
//!     organization: Organization::QuickBooks,
//!     vendor: "Tech Solutions Ltd".to_string(),
//!     date: NaiveDate::from_ymd_opt(2024, 12, 18).unwrap(),
//!     line_items: vec![LineItem {
//!         id: "L1".to_string(),
//!         description: "Consulting Services".to_string(),
//!         quantity: 3.0,
//!         unit_price: 100.0,
//!         line_total: 290.0,
//!     }],
//!     subtotal: 290.0,
//!     tax_rate: 0.10,
//!     tax_amount: 29.0,
//!     discounts: 0.0,
//!     grand_total: 319.0,
//! };
//!
//! let result = validate_invoice(&invoice);
//! assert!(!result.is_valid);
//! assert_eq!(result.issues[0].field, "lineItems[0].lineTotal");
//! assert_eq!(result.issues[0].expected, 300.0);
//! ```

pub mod augmentation;
pub mod error;
pub mod ingestion;
pub mod rules;
pub mod schema;
pub mod sources;
pub mod utils;

#[cfg(feature = "llm")]
pub mod llm;

pub use augmentation::{augment, merge_analysis, parse_analysis_issues, NarrativeAnalyzer};
pub use error::{InvoiceAuditError, Result};
pub use ingestion::*;
pub use rules::{validate, validate_invoice, InvoiceValidator};
pub use schema::*;
pub use sources::{fetch_invoice, source_for, InvoiceSource, MockInvoiceSource};
pub use utils::*;

use futures::future::join_all;
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;

/// A fetched invoice together with its validation outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub invoice: Invoice,
    pub result: ValidationResult,
}

/// Fetch → validate → (optionally) augment.
pub struct InvoiceAuditor {
    sources: HashMap<Organization, Box<dyn InvoiceSource>>,
    analyzer: Option<Box<dyn NarrativeAnalyzer>>,
}

impl InvoiceAuditor {
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            analyzer: None,
        }
    }

    /// Auditor backed by the bundled sample sources for every organization.
    pub fn with_sample_sources() -> Result<Self> {
        let mut auditor = Self::new();
        for organization in Organization::ALL {
            auditor = auditor.with_source(source_for(organization)?);
        }
        Ok(auditor)
    }

    /// Registers `source` for its organization, replacing any previous one.
    pub fn with_source(mut self, source: Box<dyn InvoiceSource>) -> Self {
        self.sources.insert(source.organization(), source);
        self
    }

    pub fn with_analyzer(mut self, analyzer: Box<dyn NarrativeAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn has_analyzer(&self) -> bool {
        self.analyzer.is_some()
    }

    pub async fn audit(
        &self,
        invoice_id: &str,
        organization: Organization,
        use_analysis: bool,
    ) -> Result<AuditReport> {
        let source = self.sources.get(&organization).ok_or_else(|| {
            InvoiceAuditError::Configuration(format!(
                "No invoice source registered for {}",
                organization
            ))
        })?;

        info!("Fetching invoice {} from {}", invoice_id, organization);
        let invoice = source.fetch_invoice(invoice_id).await?;

        let rule_result = validate_invoice(&invoice);
        info!(
            "Invoice {}: {} error(s), {} warning(s)",
            invoice.id,
            rule_result.error_count(),
            rule_result.warning_count()
        );

        let result = match (&self.analyzer, use_analysis) {
            (Some(analyzer), true) => augment(&invoice, rule_result, analyzer.as_ref()).await,
            (None, true) => {
                debug!("Analysis requested but no analyzer is configured");
                rule_result
            }
            _ => rule_result,
        };

        Ok(AuditReport { invoice, result })
    }

    /// Audits every request concurrently. Output order follows input order.
    pub async fn audit_many(
        &self,
        requests: &[(String, Organization)],
        use_analysis: bool,
    ) -> Vec<Result<AuditReport>> {
        join_all(
            requests
                .iter()
                .map(|(id, organization)| self.audit(id, *organization, use_analysis)),
        )
        .await
    }
}

impl Default for InvoiceAuditor {
    fn default() -> Self {
        Self::new()
    }
}

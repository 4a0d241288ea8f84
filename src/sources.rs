//! Invoice sources, one per organization.
//!
//! The bundled sources serve fixed sample data so the rest of the pipeline
//! can run without credentials for any platform.

use crate::error::{InvoiceAuditError, Result};
use crate::ingestion::{convert_odoo_invoice, OdooDataset};
use crate::schema::{Invoice, Organization};
use async_trait::async_trait;
use chrono::Local;
use log::debug;

const QUICKBOOKS_SAMPLES: &str = include_str!("../data/quickbooks_invoices.json");
const SALESFORCE_SAMPLES: &str = include_str!("../data/salesforce_invoices.json");
const ODOO_SAMPLES: &str = include_str!("../data/odoo_invoices.json");

#[async_trait]
pub trait InvoiceSource: Send + Sync {
    fn organization(&self) -> Organization;

    /// Fails with [`InvoiceAuditError::InvoiceNotFound`] when the
    /// organization has no invoice with this id.
    async fn fetch_invoice(&self, invoice_id: &str) -> Result<Invoice>;
}

/// In-memory source over a fixed set of invoices. Lookup ignores case.
#[derive(Debug, Clone)]
pub struct MockInvoiceSource {
    organization: Organization,
    invoices: Vec<Invoice>,
}

impl MockInvoiceSource {
    pub fn new(organization: Organization, invoices: Vec<Invoice>) -> Self {
        Self {
            organization,
            invoices,
        }
    }

    /// Source preloaded with the bundled sample invoices for `organization`.
    pub fn with_samples(organization: Organization) -> Result<Self> {
        let invoices = match organization {
            Organization::QuickBooks => serde_json::from_str(QUICKBOOKS_SAMPLES)?,
            Organization::Salesforce => serde_json::from_str(SALESFORCE_SAMPLES)?,
            Organization::Odoo => odoo_samples()?,
        };
        Ok(Self::new(organization, invoices))
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn find(&self, invoice_id: &str) -> Option<&Invoice> {
        self.invoices
            .iter()
            .find(|invoice| invoice.id.eq_ignore_ascii_case(invoice_id.trim()))
    }
}

#[async_trait]
impl InvoiceSource for MockInvoiceSource {
    fn organization(&self) -> Organization {
        self.organization
    }

    async fn fetch_invoice(&self, invoice_id: &str) -> Result<Invoice> {
        debug!("Looking up {} in {} samples", invoice_id, self.organization);

        self.find(invoice_id)
            .cloned()
            .ok_or_else(|| InvoiceAuditError::InvoiceNotFound {
                id: invoice_id.to_string(),
                organization: self.organization,
            })
    }
}

fn odoo_samples() -> Result<Vec<Invoice>> {
    let dataset = OdooDataset::from_json(ODOO_SAMPLES)?;
    let today = Local::now().date_naive();

    dataset
        .invoices
        .iter()
        .map(|record| convert_odoo_invoice(record, &dataset.lines_for(record), today))
        .collect()
}

/// Builds the bundled sample source for `organization`.
///
/// Each call re-parses the bundled JSON. Callers fetching repeatedly should
/// hold on to a [`MockInvoiceSource`] or use
/// [`InvoiceAuditor::with_sample_sources`](crate::InvoiceAuditor::with_sample_sources).
pub fn source_for(organization: Organization) -> Result<Box<dyn InvoiceSource>> {
    Ok(Box::new(MockInvoiceSource::with_samples(organization)?))
}

/// One-shot fetch from the sample source. Builds a fresh source per call,
/// see [`source_for`].
pub async fn fetch_invoice(invoice_id: &str, organization: Organization) -> Result<Invoice> {
    let source = source_for(organization)?;
    source.fetch_invoice(invoice_id).await
}

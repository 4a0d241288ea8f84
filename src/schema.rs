use crate::error::InvoiceAuditError;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
pub enum Organization {
    #[serde(rename = "quickBook")]
    #[schemars(description = "Invoices pulled from QuickBooks")]
    QuickBooks,

    #[serde(rename = "salesForce")]
    #[schemars(description = "Invoices pulled from Salesforce")]
    Salesforce,

    #[serde(rename = "odoo")]
    #[schemars(description = "Invoices pulled from an Odoo instance (account.move records)")]
    Odoo,
}

impl Organization {
    pub const ALL: [Organization; 3] = [
        Organization::QuickBooks,
        Organization::Salesforce,
        Organization::Odoo,
    ];

    /// Wire key used by the platforms' JSON and by `FromStr`.
    pub fn key(&self) -> &'static str {
        match self {
            Organization::QuickBooks => "quickBook",
            Organization::Salesforce => "salesForce",
            Organization::Odoo => "odoo",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Organization::QuickBooks => "QuickBook",
            Organization::Salesforce => "Salesforce",
            Organization::Odoo => "Odoo",
        }
    }

    /// Invoice ids served by the bundled mock sources.
    pub fn sample_invoice_ids(&self) -> &'static [&'static str] {
        match self {
            Organization::QuickBooks => &["QB-INV-001", "QB-INV-002", "QB-INV-003"],
            Organization::Salesforce => &["SF-INV-001", "SF-INV-002", "SF-INV-003", "SF-INV-004"],
            Organization::Odoo => &["ODO-INV-001", "ODO-INV-002", "ODO-INV-003", "ODO-INV-004"],
        }
    }
}

impl fmt::Display for Organization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Organization {
    type Err = InvoiceAuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Organization::ALL
            .into_iter()
            .find(|org| {
                org.key().eq_ignore_ascii_case(s.trim())
                    || org.display_name().eq_ignore_ascii_case(s.trim())
            })
            .ok_or_else(|| InvoiceAuditError::UnknownOrganization(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,

    pub description: String,

    pub quantity: f64,

    pub unit_price: f64,

    #[schemars(description = "Stated total for the line. Should equal quantity × unit price.")]
    pub line_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,

    pub organization: Organization,

    pub vendor: String,

    #[schemars(description = "Invoice date in YYYY-MM-DD format")]
    pub date: NaiveDate,

    pub line_items: Vec<LineItem>,

    #[schemars(description = "Stated sum of all line totals")]
    pub subtotal: f64,

    #[schemars(description = "Tax rate as a fraction, e.g. 0.08 for 8%")]
    pub tax_rate: f64,

    #[schemars(description = "Stated tax. Should equal subtotal × tax rate.")]
    pub tax_amount: f64,

    pub discounts: f64,

    #[schemars(description = "Stated total. Should equal subtotal + tax amount - discounts.")]
    pub grand_total: f64,
}

impl Invoice {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Invoice)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[schemars(description = "Violates a required arithmetic identity or a hard invariant")]
    Error,

    #[schemars(description = "Anomalous but not necessarily wrong")]
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("ERROR"),
            Severity::Warning => f.write_str("WARNING"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationIssue {
    #[schemars(description = "Dotted/indexed path of the offending field, e.g. lineItems[2].lineTotal")]
    pub field: String,

    pub message: String,

    pub expected: f64,

    pub actual: f64,

    pub severity: Severity,
}

impl ValidationIssue {
    pub fn error(field: impl Into<String>, message: impl Into<String>, expected: f64, actual: f64) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            expected,
            actual,
            severity: Severity::Error,
        }
    }

    pub fn warning(field: impl Into<String>, message: impl Into<String>, expected: f64, actual: f64) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            expected,
            actual,
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn difference(&self) -> f64 {
        (self.expected - self.actual).abs()
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,

    pub issues: Vec<ValidationIssue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Free-text commentary from the language model, when augmentation ran")]
    pub llm_analysis: Option<String>,
}

impl ValidationResult {
    /// Builds a result whose validity is derived from the issues.
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let is_valid = !issues.iter().any(ValidationIssue::is_error);
        Self {
            is_valid,
            issues,
            llm_analysis: None,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ValidationResult)
    }
}

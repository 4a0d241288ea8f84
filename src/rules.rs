//! Arithmetic consistency checks over a single invoice.
//!
//! Every check reads the same borrowed [`Invoice`] and reports what it finds;
//! none of them depends on another's output, so a single upstream mistake
//! (for example a wrong line total) surfaces once per field it breaks.

use crate::schema::{Invoice, ValidationIssue, ValidationResult};
use crate::utils::{amounts_match, format_money, format_percent, round_to_cents};
use log::debug;

/// Tax rates above this are reported as unusual.
pub const MAX_EXPECTED_TAX_RATE: f64 = 0.25;

/// Smallest unit price that is not flagged.
pub const MIN_UNIT_PRICE: f64 = 0.01;

pub struct InvoiceValidator<'a> {
    invoice: &'a Invoice,
}

impl<'a> InvoiceValidator<'a> {
    pub fn new(invoice: &'a Invoice) -> Self {
        Self { invoice }
    }

    /// Runs every check in fixed order and derives validity from the
    /// concatenated issues.
    pub fn validate(&self) -> ValidationResult {
        let mut issues = self.check_line_items();
        issues.extend(self.check_subtotal());
        issues.extend(self.check_tax());
        issues.extend(self.check_grand_total());
        issues.extend(self.check_unusual_patterns());

        let result = ValidationResult::from_issues(issues);

        debug!(
            "Validated invoice {}: {} error(s), {} warning(s)",
            self.invoice.id,
            result.error_count(),
            result.warning_count()
        );

        result
    }

    pub fn check_line_items(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for (index, item) in self.invoice.line_items.iter().enumerate() {
            let expected = round_to_cents(item.quantity * item.unit_price);

            if !amounts_match(item.line_total, expected) {
                issues.push(ValidationIssue::error(
                    format!("lineItems[{}].lineTotal", index),
                    format!(
                        "Line item \"{}\": quantity ({}) × unit price ({}) should equal {}, but got {}",
                        item.description,
                        item.quantity,
                        format_money(item.unit_price),
                        format_money(expected),
                        format_money(item.line_total)
                    ),
                    expected,
                    item.line_total,
                ));
            }
        }

        issues
    }

    /// Sums the stated line totals, not recomputed ones.
    pub fn check_subtotal(&self) -> Vec<ValidationIssue> {
        let expected = round_to_cents(
            self.invoice
                .line_items
                .iter()
                .map(|item| item.line_total)
                .sum(),
        );

        if amounts_match(self.invoice.subtotal, expected) {
            return Vec::new();
        }

        vec![ValidationIssue::error(
            "subtotal",
            format!(
                "Subtotal should be sum of line items ({}), but got {}",
                format_money(expected),
                format_money(self.invoice.subtotal)
            ),
            expected,
            self.invoice.subtotal,
        )]
    }

    pub fn check_tax(&self) -> Vec<ValidationIssue> {
        let invoice = self.invoice;
        let mut issues = Vec::new();

        let expected = round_to_cents(invoice.subtotal * invoice.tax_rate);

        if !amounts_match(invoice.tax_amount, expected) {
            issues.push(ValidationIssue::error(
                "taxAmount",
                format!(
                    "Tax amount should be subtotal ({}) × tax rate ({}) = {}, but got {}",
                    format_money(invoice.subtotal),
                    format_percent(invoice.tax_rate),
                    format_money(expected),
                    format_money(invoice.tax_amount)
                ),
                expected,
                invoice.tax_amount,
            ));
        }

        if invoice.tax_rate > MAX_EXPECTED_TAX_RATE {
            issues.push(ValidationIssue::warning(
                "taxRate",
                format!(
                    "Tax rate of {} seems unusually high",
                    format_percent(invoice.tax_rate)
                ),
                MAX_EXPECTED_TAX_RATE,
                invoice.tax_rate,
            ));
        }

        if invoice.tax_rate < 0.0 {
            issues.push(ValidationIssue::error(
                "taxRate",
                "Tax rate cannot be negative",
                0.0,
                invoice.tax_rate,
            ));
        }

        issues
    }

    pub fn check_grand_total(&self) -> Vec<ValidationIssue> {
        let invoice = self.invoice;
        let expected = round_to_cents(invoice.subtotal + invoice.tax_amount - invoice.discounts);

        if amounts_match(invoice.grand_total, expected) {
            return Vec::new();
        }

        vec![ValidationIssue::error(
            "grandTotal",
            format!(
                "Grand total should be subtotal ({}) + tax ({}) - discounts ({}) = {}, but got {}",
                format_money(invoice.subtotal),
                format_money(invoice.tax_amount),
                format_money(invoice.discounts),
                format_money(expected),
                format_money(invoice.grand_total)
            ),
            expected,
            invoice.grand_total,
        )]
    }

    pub fn check_unusual_patterns(&self) -> Vec<ValidationIssue> {
        let invoice = self.invoice;
        let mut issues = Vec::new();

        for (index, item) in invoice.line_items.iter().enumerate() {
            if item.quantity < 0.0 {
                issues.push(ValidationIssue::warning(
                    format!("lineItems[{}].quantity", index),
                    format!(
                        "Line item \"{}\" has negative quantity ({})",
                        item.description, item.quantity
                    ),
                    0.0,
                    item.quantity,
                ));
            }

            if item.unit_price <= 0.0 {
                issues.push(ValidationIssue::warning(
                    format!("lineItems[{}].unitPrice", index),
                    format!(
                        "Line item \"{}\" has zero or negative unit price ({})",
                        item.description,
                        format_money(item.unit_price)
                    ),
                    MIN_UNIT_PRICE,
                    item.unit_price,
                ));
            }
        }

        // A negative discount adds to the total.
        if invoice.discounts < 0.0 {
            issues.push(ValidationIssue::warning(
                "discounts",
                format!(
                    "Discounts should not be negative ({})",
                    format_money(invoice.discounts)
                ),
                0.0,
                invoice.discounts,
            ));
        }

        if invoice.discounts > invoice.subtotal {
            issues.push(ValidationIssue::warning(
                "discounts",
                format!(
                    "Discount ({}) exceeds subtotal ({})",
                    format_money(invoice.discounts),
                    format_money(invoice.subtotal)
                ),
                invoice.subtotal,
                invoice.discounts,
            ));
        }

        issues
    }
}

pub fn validate_invoice(invoice: &Invoice) -> ValidationResult {
    InvoiceValidator::new(invoice).validate()
}

/// Alias of [`validate_invoice`].
pub fn validate(invoice: &Invoice) -> ValidationResult {
    validate_invoice(invoice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LineItem, Organization, Severity};
    use chrono::NaiveDate;

    fn item(description: &str, quantity: f64, unit_price: f64, line_total: f64) -> LineItem {
        LineItem {
            id: format!("L-{}", description),
            description: description.to_string(),
            quantity,
            unit_price,
            line_total,
        }
    }

    fn invoice(
        line_items: Vec<LineItem>,
        subtotal: f64,
        tax_rate: f64,
        tax_amount: f64,
        discounts: f64,
        grand_total: f64,
    ) -> Invoice {
        Invoice {
            id: "TEST-001".to_string(),
            organization: Organization::QuickBooks,
            vendor: "Test Vendor".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(),
            line_items,
            subtotal,
            tax_rate,
            tax_amount,
            discounts,
            grand_total,
        }
    }

    #[test]
    fn test_consistent_invoice_has_no_issues() {
        let inv = invoice(
            vec![
                item("Widget A", 10.0, 25.0, 250.0),
                item("Widget B", 5.0, 50.0, 250.0),
                item("Shipping", 1.0, 15.0, 15.0),
            ],
            515.0,
            0.08,
            41.2,
            0.0,
            556.2,
        );

        let result = validate_invoice(&inv);
        assert!(result.is_valid);
        assert!(result.issues.is_empty());
        assert!(result.llm_analysis.is_none());
    }

    #[test]
    fn test_wrong_line_total() {
        let inv = invoice(
            vec![item("Consulting Services", 3.0, 100.0, 290.0)],
            290.0,
            0.0,
            0.0,
            0.0,
            290.0,
        );

        let issues = InvoiceValidator::new(&inv).check_line_items();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "lineItems[0].lineTotal");
        assert_eq!(issues[0].expected, 300.0);
        assert_eq!(issues[0].actual, 290.0);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].message.contains("Consulting Services"));
        assert!(issues[0].message.contains("$300.00"));
    }

    #[test]
    fn test_line_total_tolerance_boundary() {
        let within = invoice(vec![item("A", 1.0, 100.0, 100.009)], 100.009, 0.0, 0.0, 0.0, 100.009);
        assert!(InvoiceValidator::new(&within).check_line_items().is_empty());

        let outside = invoice(vec![item("A", 1.0, 100.0, 100.02)], 100.02, 0.0, 0.0, 0.0, 100.02);
        assert_eq!(InvoiceValidator::new(&outside).check_line_items().len(), 1);
    }

    #[test]
    fn test_subtotal_uses_stated_line_totals() {
        // The line total is wrong, but the subtotal agrees with it.
        let inv = invoice(
            vec![item("A", 3.0, 100.0, 290.0), item("B", 2.0, 150.0, 300.0)],
            590.0,
            0.1,
            59.0,
            50.0,
            599.0,
        );

        let validator = InvoiceValidator::new(&inv);
        assert!(validator.check_subtotal().is_empty());
        assert_eq!(validator.check_line_items().len(), 1);
    }

    #[test]
    fn test_subtotal_mismatch() {
        let inv = invoice(
            vec![
                item("Hosting", 1.0, 1200.0, 1200.0),
                item("SSL", 2.0, 100.0, 200.0),
                item("Support", 12.0, 50.0, 600.0),
            ],
            1900.0,
            0.06,
            114.0,
            0.0,
            2014.0,
        );

        let issues = InvoiceValidator::new(&inv).check_subtotal();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "subtotal");
        assert_eq!(issues[0].expected, 2000.0);
        assert_eq!(issues[0].actual, 1900.0);
    }

    #[test]
    fn test_tax_mismatch() {
        let inv = invoice(
            vec![item("Paper", 10.0, 35.0, 350.0), item("Ink", 4.0, 45.0, 180.0)],
            530.0,
            0.07,
            40.0,
            20.0,
            550.0,
        );

        let issues = InvoiceValidator::new(&inv).check_tax();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "taxAmount");
        assert_eq!(issues[0].expected, 37.1);
        assert_eq!(issues[0].actual, 40.0);
        assert!(issues[0].message.contains("7.0%"));
    }

    #[test]
    fn test_high_tax_rate_warns() {
        let inv = invoice(vec![item("A", 1.0, 100.0, 100.0)], 100.0, 0.30, 30.0, 0.0, 130.0);

        let issues = InvoiceValidator::new(&inv).check_tax();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "taxRate");
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].expected, 0.25);
        assert_eq!(issues[0].actual, 0.30);
    }

    #[test]
    fn test_negative_tax_rate_is_error() {
        let inv = invoice(vec![item("A", 1.0, 100.0, 100.0)], 100.0, -0.05, -5.0, 0.0, 95.0);

        let result = validate_invoice(&inv);
        assert!(!result.is_valid);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].field, "taxRate");
        assert_eq!(result.issues[0].severity, Severity::Error);
        assert_eq!(result.issues[0].expected, 0.0);
    }

    #[test]
    fn test_grand_total_mismatch() {
        let inv = invoice(
            vec![item("License", 5.0, 300.0, 1500.0), item("Training", 2.0, 250.0, 500.0)],
            2000.0,
            0.09,
            180.0,
            100.0,
            2100.0,
        );

        let result = validate_invoice(&inv);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].field, "grandTotal");
        assert_eq!(result.issues[0].expected, 2080.0);
        assert_eq!(result.issues[0].actual, 2100.0);
    }

    #[test]
    fn test_unusual_patterns() {
        let inv = invoice(
            vec![item("Return", -2.0, 10.0, -20.0), item("Freebie", 1.0, 0.0, 0.0)],
            -20.0,
            0.0,
            0.0,
            -5.0,
            -15.0,
        );

        let issues = InvoiceValidator::new(&inv).check_unusual_patterns();
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "lineItems[0].quantity",
                "lineItems[1].unitPrice",
                "discounts",
                "discounts"
            ]
        );
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
        assert_eq!(issues[1].expected, 0.01);
        // Negative discount that still exceeds a negative subtotal.
        assert_eq!(issues[3].expected, -20.0);
        assert_eq!(issues[3].actual, -5.0);
    }

    #[test]
    fn test_discount_exceeding_subtotal() {
        let inv = invoice(vec![item("A", 1.0, 100.0, 100.0)], 100.0, 0.0, 0.0, 150.0, -50.0);

        let result = validate_invoice(&inv);
        assert!(result.is_valid);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].field, "discounts");
        assert_eq!(result.issues[0].expected, 100.0);
        assert_eq!(result.issues[0].actual, 150.0);
    }

    #[test]
    fn test_cascading_errors_are_reported_independently() {
        let inv = invoice(
            vec![item("A", 3.0, 100.0, 290.0)],
            300.0,
            0.1,
            29.0,
            0.0,
            300.0,
        );

        let result = validate_invoice(&inv);
        let fields: Vec<&str> = result.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["lineItems[0].lineTotal", "subtotal", "taxAmount", "grandTotal"]
        );
        assert!(!result.is_valid);
    }

    #[test]
    fn test_empty_invoice() {
        let inv = invoice(vec![], 0.0, 0.0, 0.0, 0.0, 0.0);
        let result = validate(&inv);
        assert!(result.is_valid);
        assert!(result.issues.is_empty());
    }
}

// Prompts for the invoice audit pass

use crate::schema::Invoice;
use crate::utils::format_money;

pub const SYSTEM_PROMPT_AUDIT: &str = r#"
You are an expert invoice auditor. Analyze the provided invoice data and check for:

1. **Mathematical Accuracy**: Verify all calculations are correct
   - Line item totals: quantity × unit_price = line_total
   - Subtotal: sum of all line_totals
   - Tax: subtotal × tax_rate = tax_amount
   - Grand total: subtotal + tax - discounts

2. **Rounding Inconsistencies**: Flag numbers that seem to be rounded differently

3. **Missing or Duplicate Items**: Check for potential data issues

4. **Unusual Patterns**: Flag concerning patterns like:
   - Negative quantities or prices
   - Zero-value items
   - Tax rates above 25% or negative
   - Discounts exceeding the subtotal

5. **Data Integrity**: Check for any other inconsistencies in the data

## OUTPUT FORMAT
- Start with a brief summary of your findings.
- Put every issue on its own line, starting with `ERROR:` or `WARNING:` followed by a one-sentence description.
- Finish with recommendations if issues were found.

Be concise but thorough. Focus on actionable insights.
"#;

pub fn format_invoice_for_prompt(invoice: &Invoice) -> String {
    let line_items = invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "  {}. {}: qty={}, price={}, total={}",
                i + 1,
                item.description,
                item.quantity,
                format_money(item.unit_price),
                format_money(item.line_total)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "INVOICE DETAILS:\n\
         ================\n\
         Invoice ID: {}\n\
         Organization: {}\n\
         Vendor: {}\n\
         Date: {}\n\
         \n\
         LINE ITEMS:\n\
         {}\n\
         \n\
         CALCULATIONS:\n\
         - Subtotal: {}\n\
         - Tax Rate: {:.2}%\n\
         - Tax Amount: {}\n\
         - Discounts: {}\n\
         - Grand Total: {}\n",
        invoice.id,
        invoice.organization.key(),
        invoice.vendor,
        invoice.date.format("%Y-%m-%d"),
        line_items,
        format_money(invoice.subtotal),
        invoice.tax_rate * 100.0,
        format_money(invoice.tax_amount),
        format_money(invoice.discounts),
        format_money(invoice.grand_total)
    )
}

pub fn audit_request(invoice: &Invoice) -> String {
    format!(
        "Please analyze this invoice for any calculation errors or issues:\n{}",
        format_invoice_for_prompt(invoice)
    )
}

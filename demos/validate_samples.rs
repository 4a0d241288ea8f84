use invoice_auditor::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let auditor = InvoiceAuditor::with_sample_sources()?;

    for organization in Organization::ALL {
        println!("\n=== {} ===", organization);

        for id in organization.sample_invoice_ids() {
            let report = auditor.audit(id, organization, false).await?;
            let result = &report.result;

            println!(
                "\n{} ({}, {}): {} - {} error(s), {} warning(s)",
                report.invoice.id,
                report.invoice.vendor,
                report.invoice.date,
                if result.is_valid { "VALID" } else { "INVALID" },
                result.error_count(),
                result.warning_count()
            );

            for issue in &result.issues {
                println!("  {}", issue);
                println!(
                    "      expected {}, actual {} (off by {})",
                    format_money(issue.expected),
                    format_money(issue.actual),
                    format_money(issue.difference())
                );
            }
        }
    }

    println!("\nInvoice JSON schema:\n{}", Invoice::schema_as_json()?);

    Ok(())
}

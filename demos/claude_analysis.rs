use invoice_auditor::llm::ClaudeAnalyzer;
use invoice_auditor::*;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let mut args = env::args().skip(1);
    let invoice_id = args.next().unwrap_or_else(|| "QB-INV-003".to_string());
    let organization: Organization = args
        .next()
        .unwrap_or_else(|| "quickBook".to_string())
        .parse()?;

    let mut auditor = InvoiceAuditor::with_sample_sources()?;
    match ClaudeAnalyzer::from_env() {
        Some(analyzer) => auditor = auditor.with_analyzer(Box::new(analyzer)),
        None => println!("ANTHROPIC_API_KEY not set; running rule-based checks only."),
    }

    let report = auditor.audit(&invoice_id, organization, true).await?;
    let result = &report.result;

    println!(
        "\n{} from {}: {}",
        report.invoice.id,
        organization,
        if result.is_valid { "VALID" } else { "INVALID" }
    );

    for issue in &result.issues {
        println!("  {}", issue);
    }

    if let Some(analysis) = &result.llm_analysis {
        println!("\n--- LLM analysis ---\n{}", analysis);
    }

    println!("\n{}", serde_json::to_string_pretty(result)?);

    Ok(())
}

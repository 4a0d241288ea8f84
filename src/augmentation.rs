//! Optional narrative analysis layered on top of a rule-based result.
//!
//! The free-text scan here is a heuristic. It only ever appends issues after
//! the rule-based ones and never touches what the rule engine produced.

use crate::schema::{Invoice, Severity, ValidationIssue, ValidationResult};
use async_trait::async_trait;
use log::{debug, info};

/// Field name given to issues recovered from analysis text.
pub const LLM_DETECTED_FIELD: &str = "llm_detected";

/// Source of free-text commentary on an invoice.
///
/// Implementations are best-effort: return `None` when unconfigured or when
/// the underlying call fails, never an error.
#[async_trait]
pub trait NarrativeAnalyzer: Send + Sync {
    async fn analyze(&self, invoice: &Invoice) -> Option<String>;
}

/// Runs the analyzer and folds its output into `rule_result`.
pub async fn augment(
    invoice: &Invoice,
    rule_result: ValidationResult,
    analyzer: &dyn NarrativeAnalyzer,
) -> ValidationResult {
    match analyzer.analyze(invoice).await {
        Some(analysis) => {
            info!("Received narrative analysis for invoice {}", invoice.id);
            merge_analysis(rule_result, analysis)
        }
        None => {
            debug!("No narrative analysis for invoice {}", invoice.id);
            rule_result
        }
    }
}

/// Attaches `analysis` and appends the issues it mentions, re-deriving
/// validity over the combined list.
pub fn merge_analysis(rule_result: ValidationResult, analysis: String) -> ValidationResult {
    let extra = parse_analysis_issues(&analysis);
    debug!("Parsed {} issue(s) from analysis text", extra.len());

    let mut issues = rule_result.issues;
    issues.extend(extra);

    let mut merged = ValidationResult::from_issues(issues);
    merged.llm_analysis = Some(analysis);
    merged
}

/// Scans text for lines starting with `ERROR:` or `WARNING:` (any case) in
/// the order they appear. Indentation, list bullets, numbered markers,
/// heading marks and emphasis around the keyword are ignored, so
/// `1. ERROR: ...`, `### WARNING: ...`, `**ERROR**: ...` and `**ERROR:** ...`
/// all match.
pub fn parse_analysis_issues(text: &str) -> Vec<ValidationIssue> {
    text.lines().filter_map(parse_issue_line).collect()
}

fn parse_issue_line(line: &str) -> Option<ValidationIssue> {
    let content = strip_list_marker(line);

    let (severity, rest) = strip_label(content, "ERROR")
        .map(|rest| (Severity::Error, rest))
        .or_else(|| strip_label(content, "WARNING").map(|rest| (Severity::Warning, rest)))?;

    let message = trim_emphasis(rest).trim();
    if message.is_empty() {
        return None;
    }

    Some(ValidationIssue {
        field: LLM_DETECTED_FIELD.to_string(),
        message: message.to_string(),
        expected: 0.0,
        actual: 0.0,
        severity,
    })
}

fn is_decoration(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '*' | '_' | '•' | '#' | '>')
}

fn trim_emphasis(text: &str) -> &str {
    text.trim_start_matches(|c: char| matches!(c, '*' | '_'))
}

/// Drops bullets, heading marks and a leading `1.` / `1)` item number.
fn strip_list_marker(line: &str) -> &str {
    let content = line.trim_start_matches(is_decoration);

    let after_digits = content.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() < content.len() {
        if let Some(rest) = after_digits
            .strip_prefix('.')
            .or_else(|| after_digits.strip_prefix(')'))
        {
            return rest.trim_start_matches(is_decoration);
        }
    }

    content
}

/// Matches `keyword` followed by `:`, allowing emphasis between the two.
fn strip_label<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = strip_prefix_ignore_case(text, keyword)?;
    trim_emphasis(rest).strip_prefix(':')
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

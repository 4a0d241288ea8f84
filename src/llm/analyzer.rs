use async_trait::async_trait;
use log::{info, warn};

use crate::augmentation::NarrativeAnalyzer;
use crate::error::Result;
use crate::llm::client::{AnalyzerConfig, ClaudeClient};
use crate::llm::prompts::{audit_request, SYSTEM_PROMPT_AUDIT};
use crate::llm::types::Message;
use crate::schema::Invoice;

/// Asks Claude for a written audit of an invoice.
pub struct ClaudeAnalyzer {
    client: ClaudeClient,
    system_prompt: String,
}

impl ClaudeAnalyzer {
    pub fn new(client: ClaudeClient) -> Self {
        Self {
            client,
            system_prompt: SYSTEM_PROMPT_AUDIT.to_string(),
        }
    }

    pub fn from_config(config: AnalyzerConfig) -> Self {
        Self::new(ClaudeClient::new(config))
    }

    /// `None` when `ANTHROPIC_API_KEY` is not configured.
    pub fn from_env() -> Option<Self> {
        match AnalyzerConfig::from_env() {
            Ok(config) => Some(Self::from_config(config)),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Replace the auditor prompt (e.g. for industry-specific rules).
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub async fn request_analysis(&self, invoice: &Invoice) -> Result<String> {
        info!(
            "Requesting analysis of invoice {} from {}",
            invoice.id,
            self.client.config().model
        );

        self.client
            .create_message(&self.system_prompt, vec![Message::user(audit_request(invoice))])
            .await
    }
}

#[async_trait]
impl NarrativeAnalyzer for ClaudeAnalyzer {
    async fn analyze(&self, invoice: &Invoice) -> Option<String> {
        match self.request_analysis(invoice).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("LLM analysis failed for invoice {}: {}", invoice.id, e);
                None
            }
        }
    }
}

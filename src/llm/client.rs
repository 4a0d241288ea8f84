use crate::error::{InvoiceAuditError, Result};
use crate::llm::types::*;
use reqwest::Client;

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
const MODEL_VAR: &str = "INVOICE_AUDITOR_MODEL";

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
}

impl AnalyzerConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: ANTHROPIC_BASE_URL.to_string(),
        }
    }

    /// Reads `ANTHROPIC_API_KEY` and, when set, `INVOICE_AUDITOR_MODEL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                InvoiceAuditError::Configuration(format!(
                    "{} not set. LLM analysis will be skipped.",
                    API_KEY_VAR
                ))
            })?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var(MODEL_VAR) {
            if !model.trim().is_empty() {
                config.model = model;
            }
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    config: AnalyzerConfig,
}

impl ClaudeClient {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub async fn create_message(&self, system_prompt: &str, messages: Vec<Message>) -> Result<String> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));

        let payload = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: system_prompt.to_string(),
            messages,
        };

        let res = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await?;
            return Err(InvoiceAuditError::AnalysisFailed(format!(
                "Anthropic API Error (status {}): {}",
                status, err_text
            )));
        }

        let body: MessagesResponse = res.json().await?;

        body.first_text()
            .map(str::to_string)
            .ok_or_else(|| InvoiceAuditError::AnalysisFailed("Model returned no text content".to_string()))
    }
}

use crate::schema::Organization;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceAuditError {
    #[error("Invoice {id} not found in {organization}")]
    InvoiceNotFound {
        id: String,
        organization: Organization,
    },

    #[error("Unknown organization: {0}")]
    UnknownOrganization(String),

    #[error("Invalid invoice date: {0}")]
    InvalidDate(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[cfg(feature = "llm")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InvoiceAuditError>;

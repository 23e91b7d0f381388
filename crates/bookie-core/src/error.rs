//! Error types for the bookie-sync system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// An authored entity is missing a field it must carry. Fatal: this is
    /// an authoring defect, never a retryable condition.
    #[error("mandatory field '{field}' missing on {entity}")]
    MissingMandatoryField { entity: String, field: &'static str },

    /// A remote record does not have any recognizable shape (neither
    /// create- nor update-shaped, or structurally broken).
    #[error("malformed remote record: {0}")]
    MalformedRemote(String),

    /// A grading rule cannot be applied: non-string metric, unevaluable
    /// expression, leg/group count mismatch, or an outcome group that does
    /// not resolve to exactly one true label.
    #[error("malformed grading rule: {0}")]
    MalformedRule(String),

    /// A caller-supplied result vector has the wrong shape.
    #[error("invalid result: {0}")]
    InvalidResult(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("ledger client error: {message}")]
    Ledger {
        message: String,
        status: Option<u16>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

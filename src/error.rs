use thiserror::Error;

use crate::models::{ReportId, ReportKind};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("malformed input for {kind} report: {reason}")]
    MalformedInput { kind: ReportKind, reason: String },

    #[error("report {0} not found")]
    NotFound(ReportId),

    #[error("failed to encode report payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("report store failure: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ReportError {
    pub fn malformed(kind: ReportKind, reason: impl ToString) -> Self {
        Self::MalformedInput {
            kind,
            reason: reason.to_string(),
        }
    }

    pub fn store(err: anyhow::Error) -> Self {
        Self::Store(err.into())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

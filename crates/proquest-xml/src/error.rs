//! Error types for parsing, flattening, and export

use thiserror::Error;

/// Crate error type
#[derive(Error, Debug)]
pub enum ProquestError {
    #[error("XML parse error: {message}")]
    Parse { message: String },
    #[error("non-numeric contributor order {value:?} in document {id}")]
    MalformedAuthor { id: String, value: String },
    #[error("document {id} has no authors")]
    NoAuthor { id: String },
    #[error("no query terms entered")]
    EmptyQuery,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProquestError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        ProquestError::Parse {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProquestError>;

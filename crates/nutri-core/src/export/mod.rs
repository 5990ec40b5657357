//! Patient record exports for external formatters (PDF, spreadsheets).

mod anthropometry;
mod record;

pub use anthropometry::*;
pub use record::*;

use thiserror::Error;

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

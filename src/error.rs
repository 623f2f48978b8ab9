// src/error.rs
use folio_layout::LayoutError;
use folio_style::CounterError;
use thiserror::Error;

/// Errors of a layout session, from input loading through pagination.
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Numbering failed: {0}")]
    Counter(#[from] CounterError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FolioError>;

use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads, rewrites, or exports the budget workbook.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading, copying, or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors raised while loading, editing, or saving a workbook in place.
    #[error("workbook edit error: {0}")]
    WorkbookEdit(String),

    /// Raised when a sheet the operation depends on is absent from the workbook.
    #[error("missing sheet '{0}'")]
    MissingSheet(String),

    /// Raised when a layout file is inconsistent.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// Raised when a lookup is attempted with a blank subcategory.
    #[error("subcategory cannot be empty")]
    EmptySubcategory,

    /// Raised when a subcategory is not listed in the reference sheet.
    #[error("subcategory not found: {0}")]
    SubcategoryNotFound(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ToolError {
    /// Wraps an error reported by the in-place workbook editor.
    pub(crate) fn edit(err: impl std::fmt::Display) -> Self {
        ToolError::WorkbookEdit(err.to_string())
    }
}

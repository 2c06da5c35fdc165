//! Error types for sheet rendering

use thiserror::Error;

/// Errors that can occur while writing a workbook
#[derive(Error, Debug)]
pub enum SheetError {
    /// Workbook construction or save failed
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

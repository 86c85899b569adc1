use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for pdf-darkmode-core
///
/// This enum is a closed set of failure kinds so callers can distinguish
/// cause without parsing free-text messages:
/// - Locating the input file
/// - Opening and parsing the source PDF
/// - Mutating a page's object graph
/// - Serializing the result
#[derive(Error, Debug)]
pub enum Error {
    /// Input file does not exist
    #[error("the file '{}' does not exist", path.display())]
    FileNotFound { path: PathBuf },

    /// Failed to open or parse a PDF file
    #[error("failed to open PDF: {0}")]
    PdfOpen(String),

    /// Failed to apply the dark mode mutations to a page
    #[error("failed to darken page {page}: {reason}")]
    PdfMutate { page: usize, reason: String },

    /// Failed to save a PDF
    #[error("failed to save PDF: {0}")]
    PdfSave(String),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

//! PDF Dark Mode Core Library
//!
//! This library provides the core functionality for applying a dark mode
//! effect to PDF documents:
//! - PDF loading and saving with object-graph compaction
//! - Per-page background fill and inversion annotation
//! - Typed errors and conversion options

pub mod config;
pub mod error;
pub mod pdf;
pub mod util;

pub use config::{BlendMode, DarkenOptions, FillColor};
pub use error::{Error, Result};
pub use pdf::{Darkener, PageBounds, PageNumber, PdfDocument};
pub use util::{file_size, format_mib};

use std::path::Path;

use tracing::info;

/// Progress callback invoked with 1-indexed `(page, total)` at report points.
pub type ProgressFn = Box<dyn Fn(usize, usize) + Send>;

/// Summary of a completed conversion.
#[derive(Debug, Clone, Copy)]
pub struct ConversionReport {
    /// Number of pages transformed
    pub pages: usize,
    /// Size of the written output file in bytes
    pub output_bytes: u64,
}

/// High-level dark mode converter that combines all components
pub struct DarkModeConverter {
    darkener: Darkener,
}

impl DarkModeConverter {
    /// Create a new converter with the given options
    pub const fn new(options: DarkenOptions) -> Self {
        Self {
            darkener: Darkener::new(options),
        }
    }

    /// Apply the dark mode effect to `input` and write the result to `output`.
    ///
    /// The output path is overwritten if it exists. The open document handle
    /// is dropped on every path, success or error; a failed save may leave a
    /// partially written output file behind.
    pub fn convert_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        progress: Option<ProgressFn>,
    ) -> Result<ConversionReport> {
        let input = input.as_ref();
        let output = output.as_ref();

        let mut doc = PdfDocument::from_file(input)?;
        info!(
            "Processing {} pages from {}",
            doc.page_count(),
            input.display()
        );

        let pages = self
            .darkener
            .darken_document(doc.document_mut(), progress.as_deref())?;
        let output_bytes = doc.save_compacted(output)?;

        info!("Saved dark mode PDF to {}", output.display());

        Ok(ConversionReport {
            pages,
            output_bytes,
        })
    }

    /// Apply the dark mode effect to in-memory PDF bytes.
    ///
    /// Returns the transformed document serialized with the same compaction
    /// as [`Self::convert_file`].
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        progress: Option<ProgressFn>,
    ) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::from_bytes(bytes)?;
        self.darkener
            .darken_document(doc.document_mut(), progress.as_deref())?;
        doc.save_to_vec()
    }

    pub const fn options(&self) -> &DarkenOptions {
        &self.darkener.options
    }
}

/// Convenience function: apply the default dark mode effect to a file pair.
pub fn apply_dark_mode(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    progress: Option<ProgressFn>,
) -> Result<ConversionReport> {
    DarkModeConverter::new(DarkenOptions::default()).convert_file(input, output, progress)
}

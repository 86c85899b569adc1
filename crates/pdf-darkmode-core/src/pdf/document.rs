use std::path::Path;

use lopdf::Document;
use tracing::debug;

use crate::error::{Error, Result};

/// Owned wrapper around a loaded PDF document.
///
/// The wrapper owns the lopdf handle for the duration of one conversion;
/// dropping the value releases it on every path, success or error.
pub struct PdfDocument {
    doc: Document,
    /// Number of pages, computed once on load
    page_count: usize,
}

impl PdfDocument {
    /// Open a PDF from a file path.
    ///
    /// A missing file is reported as [`Error::FileNotFound`] before any
    /// parse attempt; an unparseable file as [`Error::PdfOpen`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let doc = Document::load(path).map_err(|e| {
            Error::PdfOpen(format!("Failed to parse {}: {e}", path.display()))
        })?;

        Ok(Self::from_document(doc))
    }

    /// Open a PDF from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| Error::PdfOpen(format!("Failed to parse PDF: {e}")))?;

        Ok(Self::from_document(doc))
    }

    fn from_document(doc: Document) -> Self {
        let page_count = doc.get_pages().len();
        Self { doc, page_count }
    }

    /// Get number of pages
    pub const fn page_count(&self) -> usize {
        self.page_count
    }

    /// Borrow the underlying lopdf document
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutably borrow the underlying lopdf document
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Serialize to `path` with unused-object garbage collection and stream
    /// deflation. Returns the number of bytes written.
    ///
    /// The destination is overwritten if it exists; no existence check is
    /// performed.
    pub fn save_compacted(&mut self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        self.compact();

        let file = self.doc.save(path).map_err(|e| {
            Error::PdfSave(format!("Failed to write {}: {e}", path.display()))
        })?;
        let written = file.metadata()?.len();

        debug!("Wrote {} bytes to {}", written, path.display());
        Ok(written)
    }

    /// Serialize to memory with the same compaction as [`Self::save_compacted`].
    pub fn save_to_vec(&mut self) -> Result<Vec<u8>> {
        self.compact();

        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|e| Error::PdfSave(format!("Failed to serialize PDF: {e}")))?;

        Ok(output)
    }

    /// Discard unreferenced objects and deflate streams before writing.
    fn compact(&mut self) {
        self.doc.prune_objects();
        self.doc.renumber_objects();
        self.doc.compress();
    }
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("page_count", &self.page_count)
            .finish()
    }
}

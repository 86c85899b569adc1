mod document;
mod page_index;
pub mod darken;

pub use darken::{Darkener, PageBounds};
pub use document::PdfDocument;
pub use page_index::PageNumber;

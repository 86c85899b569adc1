//! Per-page dark mode mutation.
//!
//! # Effect Encoding
//!
//! The dark mode effect is encoded with native PDF constructs, without
//! re-encoding the existing content streams:
//!
//! 1. A filled rectangle covering the page bounds is drawn *underneath* the
//!    existing content by prepending a content stream to `/Contents`. This
//!    gives every page a known white backdrop.
//! 2. A full-page `/Square` annotation with blend mode `Difference` is
//!    layered on top. Blending 0.9 gray against the white backdrop renders
//!    the page as roughly 0.1 gray while keeping dark content readable.
//!
//! The annotation carries its own appearance stream whose ExtGState sets the
//! blend mode, so viewers that honor appearance streams render the inversion
//! without any viewer-side configuration.
//!
//! Mutation order per page is fixed: the background fill must precede the
//! annotation, since the blend result depends on the white backdrop.

use std::fmt::Write as _;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use super::page_index::PageNumber;
use crate::config::{DarkenOptions, FillColor};
use crate::error::{Error, Result};

/// Annotation flag bit 3: print the annotation when the page is printed.
const ANNOTATION_PRINT_FLAG: i64 = 4;

/// Resource name of the blend-mode graphics state in appearance streams.
const BLEND_GS_NAME: &str = "GS0";

// =============================================================================
// Page Bounds
// =============================================================================

/// Page rectangle in PDF user space (bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBounds {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PageBounds {
    /// US Letter, the fallback when a page carries no usable `/MediaBox`.
    pub const LETTER: Self = Self {
        x0: 0.0,
        y0: 0.0,
        x1: 612.0,
        y1: 792.0,
    };

    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Convert to a PDF `[x0 y0 x1 y1]` rectangle array
    fn to_rect_array(self) -> Object {
        Object::Array(vec![
            Object::Real(self.x0),
            Object::Real(self.y0),
            Object::Real(self.x1),
            Object::Real(self.y1),
        ])
    }
}

// =============================================================================
// Darkener
// =============================================================================

/// Applies the dark mode mutations to lopdf documents.
pub struct Darkener {
    /// Configuration options for the mutations
    pub options: DarkenOptions,
}

impl Darkener {
    /// Create a new darkener with the given options.
    pub const fn new(options: DarkenOptions) -> Self {
        Self { options }
    }

    /// Apply the dark mode mutations to every page of `doc`, in document
    /// order. Returns the number of pages mutated.
    ///
    /// `progress` is invoked with 1-indexed `(page, total)` on every
    /// `progress_interval`-th page and unconditionally on the final page,
    /// never twice for the same page.
    pub fn darken_document(
        &self,
        doc: &mut Document,
        progress: Option<&(dyn Fn(usize, usize) + Send)>,
    ) -> Result<usize> {
        let pages = doc.get_pages();
        let total = pages.len();

        for (page_number, page_id) in pages {
            let page = PageNumber::new(page_number);
            self.darken_page(doc, page_id, page)?;

            if let Some(report) = progress
                && page.is_report_point(total, self.options.progress_interval)
            {
                report(page.as_usize(), total);
            }
        }

        Ok(total)
    }

    /// Apply both mutations to a single page, background first.
    fn darken_page(&self, doc: &mut Document, page_id: ObjectId, page: PageNumber) -> Result<()> {
        let bounds = page_bounds(doc, page_id);
        debug!(
            "Darkening page {} ({} x {} pt)",
            page,
            bounds.width(),
            bounds.height()
        );

        self.prepend_background(doc, page_id, bounds, page)?;
        self.attach_inversion_annotation(doc, page_id, bounds, page)?;

        Ok(())
    }

    /// Draw the background fill underneath the existing page content.
    ///
    /// The new stream is wrapped in `q`/`Q` and prepended to `/Contents`, so
    /// the existing graphics state is untouched.
    fn prepend_background(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        bounds: PageBounds,
        page: PageNumber,
    ) -> Result<()> {
        let content = background_content(self.options.background, bounds);
        let stream = Stream::new(Dictionary::new(), content.into_bytes());
        let content_id = doc.add_object(Object::Stream(stream));

        let page_obj = doc.get_object_mut(page_id).map_err(|e| Error::PdfMutate {
            page: page.as_usize(),
            reason: format!("failed to get page object: {e}"),
        })?;

        if let Object::Dictionary(dict) = page_obj {
            let existing_contents = dict.get(b"Contents").ok().cloned();

            match existing_contents {
                Some(Object::Reference(existing_id)) => {
                    dict.set(
                        "Contents",
                        Object::Array(vec![
                            Object::Reference(content_id),
                            Object::Reference(existing_id),
                        ]),
                    );
                }
                Some(Object::Array(arr)) => {
                    let mut contents = Vec::with_capacity(arr.len() + 1);
                    contents.push(Object::Reference(content_id));
                    contents.extend(arr);
                    dict.set("Contents", Object::Array(contents));
                }
                _ => {
                    dict.set("Contents", Object::Reference(content_id));
                }
            }
        }

        Ok(())
    }

    /// Create the full-page blended annotation and register it in `/Annots`.
    fn attach_inversion_annotation(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        bounds: PageBounds,
        page: PageNumber,
    ) -> Result<()> {
        let appearance_id = self.add_appearance_stream(doc, bounds);
        let annotation_id = self.add_annotation_object(doc, bounds, appearance_id);

        // /Annots may be a direct array, a reference to an array, or absent.
        // Learn the shape before taking a mutable borrow.
        let annots_ref = {
            let page_obj = doc.get_object(page_id).map_err(|e| Error::PdfMutate {
                page: page.as_usize(),
                reason: format!("failed to get page object: {e}"),
            })?;

            match page_obj {
                Object::Dictionary(dict) => match dict.get(b"Annots") {
                    Ok(Object::Reference(id)) => Some(*id),
                    _ => None,
                },
                _ => None,
            }
        };

        if let Some(array_id) = annots_ref {
            let annots = doc.get_object_mut(array_id).map_err(|e| Error::PdfMutate {
                page: page.as_usize(),
                reason: format!("failed to resolve /Annots reference: {e}"),
            })?;

            if let Object::Array(arr) = annots {
                arr.push(Object::Reference(annotation_id));
                return Ok(());
            }

            return Err(Error::PdfMutate {
                page: page.as_usize(),
                reason: "/Annots reference is not an array".to_string(),
            });
        }

        let page_obj = doc.get_object_mut(page_id).map_err(|e| Error::PdfMutate {
            page: page.as_usize(),
            reason: format!("failed to get page object: {e}"),
        })?;

        if let Object::Dictionary(dict) = page_obj {
            let existing_annots = dict.get(b"Annots").ok().cloned();

            match existing_annots {
                Some(Object::Array(mut arr)) => {
                    arr.push(Object::Reference(annotation_id));
                    dict.set("Annots", Object::Array(arr));
                }
                _ => {
                    dict.set(
                        "Annots",
                        Object::Array(vec![Object::Reference(annotation_id)]),
                    );
                }
            }
        }

        Ok(())
    }

    /// Add the annotation's appearance stream: a form XObject whose
    /// ExtGState carries the blend mode.
    fn add_appearance_stream(&self, doc: &mut Document, bounds: PageBounds) -> ObjectId {
        let fill = self.options.annotation_fill;

        let mut content = String::new();
        let _ = writeln!(content, "/{BLEND_GS_NAME} gs");
        let _ = writeln!(content, "{} {} {} rg", fill.r, fill.g, fill.b);
        let _ = writeln!(
            content,
            "{} {} {} {} re f",
            bounds.x0,
            bounds.y0,
            bounds.width(),
            bounds.height()
        );

        let graphics_state = Dictionary::from_iter([
            ("Type", Object::Name(b"ExtGState".to_vec())),
            (
                "BM",
                Object::Name(self.options.blend_mode.pdf_name().as_bytes().to_vec()),
            ),
            ("CA", Object::Real(1.0)),
            ("ca", Object::Real(1.0)),
        ]);

        let resources = Dictionary::from_iter([(
            "ExtGState",
            Object::Dictionary(Dictionary::from_iter([(
                BLEND_GS_NAME,
                Object::Dictionary(graphics_state),
            )])),
        )]);

        let form_dict = Dictionary::from_iter([
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Form".to_vec())),
            ("FormType", Object::Integer(1)),
            ("BBox", bounds.to_rect_array()),
            ("Resources", Object::Dictionary(resources)),
        ]);

        doc.add_object(Object::Stream(Stream::new(form_dict, content.into_bytes())))
    }

    /// Add the `/Square` annotation dictionary itself.
    fn add_annotation_object(
        &self,
        doc: &mut Document,
        bounds: PageBounds,
        appearance_id: ObjectId,
    ) -> ObjectId {
        let [r, g, b] = self.options.annotation_fill.components();

        let annotation = Dictionary::from_iter([
            ("Type", Object::Name(b"Annot".to_vec())),
            ("Subtype", Object::Name(b"Square".to_vec())),
            ("Rect", bounds.to_rect_array()),
            (
                "IC",
                Object::Array(vec![
                    Object::Real(r),
                    Object::Real(g),
                    Object::Real(b),
                ]),
            ),
            (
                "BS",
                Object::Dictionary(Dictionary::from_iter([(
                    "W",
                    Object::Real(self.options.border_width),
                )])),
            ),
            (
                "BM",
                Object::Name(self.options.blend_mode.pdf_name().as_bytes().to_vec()),
            ),
            ("F", Object::Integer(ANNOTATION_PRINT_FLAG)),
            (
                "AP",
                Object::Dictionary(Dictionary::from_iter([(
                    "N",
                    Object::Reference(appearance_id),
                )])),
            ),
        ]);

        doc.add_object(Object::Dictionary(annotation))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Content stream painting `fill` over the full page bounds.
fn background_content(fill: FillColor, bounds: PageBounds) -> String {
    let mut content = String::new();
    content.push_str("q\n");
    let _ = writeln!(content, "{} {} {} rg", fill.r, fill.g, fill.b);
    let _ = writeln!(
        content,
        "{} {} {} {} re f",
        bounds.x0,
        bounds.y0,
        bounds.width(),
        bounds.height()
    );
    content.push_str("Q\n");
    content
}

/// Bounds of a page, falling back to US Letter when no `/MediaBox` is found.
pub fn page_bounds(doc: &Document, page_id: ObjectId) -> PageBounds {
    doc.get_object(page_id)
        .ok()
        .and_then(|page_obj| media_box(doc, page_obj))
        .unwrap_or(PageBounds::LETTER)
}

/// Read `/MediaBox` from a page object, walking up `/Parent` nodes when the
/// page itself carries none.
fn media_box(doc: &Document, page_obj: &Object) -> Option<PageBounds> {
    if let Object::Dictionary(dict) = page_obj {
        if let Ok(Object::Array(arr)) = dict.get(b"MediaBox")
            && arr.len() == 4
        {
            let values: Vec<f32> = arr
                .iter()
                .filter_map(|o| match o {
                    #[allow(clippy::cast_precision_loss)]
                    Object::Integer(i) => Some(*i as f32),
                    Object::Real(r) => Some(*r),
                    _ => None,
                })
                .collect();

            if values.len() == 4 {
                return Some(PageBounds::new(values[0], values[1], values[2], values[3]));
            }
        }

        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent")
            && let Ok(parent) = doc.get_object(*parent_id)
        {
            return media_box(doc, parent);
        }
    }

    None
}

// =============================================================================
// Tests
// =============================================================================

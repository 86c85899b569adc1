//! Integration tests for pdf-darkmode-core
//!
//! These tests verify the end-to-end workflow:
//! - PDF loading
//! - Per-page dark mode mutation
//! - Progress reporting
//! - Save with garbage collection and stream deflation

use std::sync::{Arc, Mutex};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_darkmode_core::{
    apply_dark_mode, DarkModeConverter, DarkenOptions, Error, PdfDocument, ProgressFn,
};

// =============================================================================
// Test Fixtures
// =============================================================================

/// Build a minimal valid PDF with the given number of US Letter pages.
fn create_test_pdf(num_pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let page_tree_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let resources_id = doc.add_object(Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([(
            "F1",
            Object::Reference(font_id),
        )])),
    )]));

    let mut kids = Vec::with_capacity(num_pages);
    for page in 1..=num_pages {
        let content = format!("BT /F1 24 Tf 100 700 Td (Page {page}) Tj ET");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(page_tree_id)),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Reference(resources_id)),
            (
                "MediaBox",
                Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            ),
        ]));
        kids.push(Object::Reference(page_id));
    }

    #[allow(clippy::cast_possible_wrap)]
    let page_tree = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects
        .insert(page_tree_id, Object::Dictionary(page_tree));

    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(page_tree_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut output = Vec::new();
    doc.save_to(&mut output).expect("fixture should serialize");
    output
}

/// Run the converter over in-memory bytes with default options.
fn darken(bytes: &[u8], progress: Option<ProgressFn>) -> Vec<u8> {
    DarkModeConverter::new(DarkenOptions::default())
        .convert_bytes(bytes, progress)
        .expect("conversion should succeed")
}

/// Follow an indirect reference, returning the object itself otherwise.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).expect("reference should resolve"),
        other => other,
    }
}

/// The page's `/Annots` entries, references resolved.
fn page_annotations<'a>(doc: &'a Document, page_id: ObjectId) -> Vec<&'a Dictionary> {
    let page = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .expect("page should be a dictionary");

    let Ok(annots) = page.get(b"Annots") else {
        return Vec::new();
    };
    let Object::Array(annots) = resolve(doc, annots) else {
        panic!("/Annots should be an array");
    };

    annots
        .iter()
        .map(|entry| {
            resolve(doc, entry)
                .as_dict()
                .expect("annotation should be a dictionary")
        })
        .collect()
}

/// Decoded bytes of the first `/Contents` stream of a page.
fn first_content_stream(doc: &Document, page_id: ObjectId) -> Vec<u8> {
    let page = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .expect("page should be a dictionary");

    let contents = resolve(doc, page.get(b"Contents").expect("page should have contents"));
    let first = match contents {
        Object::Array(arr) => resolve(doc, arr.first().expect("contents should not be empty")),
        other => other,
    };

    let Object::Stream(stream) = first else {
        panic!("content entry should be a stream");
    };
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

// =============================================================================
// Page Structure Tests
// =============================================================================

#[test]
fn test_page_count_and_order_preserved() {
    let input = create_test_pdf(3);
    let output = darken(&input, None);

    let doc = Document::load_mem(&output).expect("output should be a valid PDF");
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 3, "Output should keep all 3 pages");

    for (page_number, page_id) in pages {
        let content = first_content_stream(&doc, page_id);
        let text = String::from_utf8_lossy(&content);
        assert!(
            text.contains("1 1 1 rg"),
            "Page {page_number} background should be white"
        );
    }
}

#[test]
fn test_background_covers_page_bounds() {
    let input = create_test_pdf(1);
    let output = darken(&input, None);

    let doc = Document::load_mem(&output).expect("output should be a valid PDF");
    let (_, page_id) = doc.get_pages().into_iter().next().expect("one page");

    let content = first_content_stream(&doc, page_id);
    let text = String::from_utf8_lossy(&content);
    assert!(text.contains("0 0 612 792 re f"), "got: {text}");
}

#[test]
fn test_background_precedes_original_content() {
    let input = create_test_pdf(1);
    let output = darken(&input, None);

    let doc = Document::load_mem(&output).expect("output should be a valid PDF");
    let (_, page_id) = doc.get_pages().into_iter().next().expect("one page");

    let page = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .expect("page dictionary");
    let Object::Array(contents) = resolve(&doc, page.get(b"Contents").expect("contents")) else {
        panic!("/Contents should be an array after the prepend");
    };
    assert_eq!(contents.len(), 2);

    // The original text drawing must still be there, after the background
    let Object::Stream(last) = resolve(&doc, &contents[1]) else {
        panic!("original content should be a stream");
    };
    let original = last
        .decompressed_content()
        .unwrap_or_else(|_| last.content.clone());
    assert!(String::from_utf8_lossy(&original).contains("Page 1"));
}

// =============================================================================
// Annotation Tests
// =============================================================================

#[test]
fn test_every_page_gets_one_inversion_annotation() {
    let input = create_test_pdf(4);
    let output = darken(&input, None);

    let doc = Document::load_mem(&output).expect("output should be a valid PDF");
    for (page_number, page_id) in doc.get_pages() {
        let annots = page_annotations(&doc, page_id);
        assert_eq!(
            annots.len(),
            1,
            "Page {page_number} should have exactly one annotation"
        );

        let annot = annots[0];
        assert_eq!(
            annot.get(b"Subtype").expect("subtype"),
            &Object::Name(b"Square".to_vec())
        );
        assert_eq!(
            annot.get(b"BM").expect("blend mode"),
            &Object::Name(b"Difference".to_vec())
        );

        let Object::Array(interior) = annot.get(b"IC").expect("interior color") else {
            panic!("/IC should be an array");
        };
        assert_eq!(interior.len(), 3);
        for component in interior {
            let Object::Real(v) = component else {
                panic!("/IC components should be reals");
            };
            assert!((v - 0.9).abs() < 1e-6, "fill should be 0.9 gray");
        }

        let Object::Dictionary(border) = annot.get(b"BS").expect("border style") else {
            panic!("/BS should be a dictionary");
        };
        let Object::Real(width) = border.get(b"W").expect("border width") else {
            panic!("/W should be a real");
        };
        assert!(width.abs() < 1e-6, "border width should be 0");

        let Object::Dictionary(appearance) = annot.get(b"AP").expect("appearance") else {
            panic!("/AP should be a dictionary");
        };
        assert!(
            appearance.get(b"N").is_ok(),
            "annotation should carry a normal appearance stream"
        );
    }
}

#[test]
fn test_annotation_rect_spans_page_bounds() {
    let input = create_test_pdf(1);
    let output = darken(&input, None);

    let doc = Document::load_mem(&output).expect("output should be a valid PDF");
    let (_, page_id) = doc.get_pages().into_iter().next().expect("one page");
    let annots = page_annotations(&doc, page_id);

    let Object::Array(rect) = annots[0].get(b"Rect").expect("rect") else {
        panic!("/Rect should be an array");
    };
    let values: Vec<f32> = rect
        .iter()
        .map(|o| match o {
            Object::Real(v) => *v,
            #[allow(clippy::cast_precision_loss)]
            Object::Integer(i) => *i as f32,
            other => panic!("unexpected rect entry: {other:?}"),
        })
        .collect();
    assert_eq!(values, vec![0.0, 0.0, 612.0, 792.0]);
}

#[test]
fn test_existing_annotations_are_kept() {
    let mut doc = Document::load_mem(&create_test_pdf(1)).expect("fixture");
    let dummy_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Annot".to_vec())),
        ("Subtype", Object::Name(b"Text".to_vec())),
        (
            "Rect",
            Object::Array(vec![0.into(), 0.into(), 10.into(), 10.into()]),
        ),
    ]));
    let (_, page_id) = doc.get_pages().into_iter().next().expect("one page");
    if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
        dict.set("Annots", Object::Array(vec![Object::Reference(dummy_id)]));
    }
    let mut fixture = Vec::new();
    doc.save_to(&mut fixture).expect("fixture should serialize");

    let output = darken(&fixture, None);

    let doc = Document::load_mem(&output).expect("output should be a valid PDF");
    let (_, page_id) = doc.get_pages().into_iter().next().expect("one page");
    let annots = page_annotations(&doc, page_id);
    assert_eq!(annots.len(), 2, "existing annotation plus the new one");
    assert_eq!(
        annots[0].get(b"Subtype").expect("subtype"),
        &Object::Name(b"Text".to_vec())
    );
    assert_eq!(
        annots[1].get(b"Subtype").expect("subtype"),
        &Object::Name(b"Square".to_vec())
    );
}

// =============================================================================
// Progress Reporting Tests
// =============================================================================

/// Collect progress callbacks into a shared vector.
fn capture_progress() -> (Arc<Mutex<Vec<(usize, usize)>>>, ProgressFn) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback: ProgressFn = Box::new(move |page, total| {
        sink.lock().expect("progress lock").push((page, total));
    });
    (seen, callback)
}

#[test]
fn test_progress_every_tenth_page_and_last() {
    let input = create_test_pdf(25);
    let (seen, callback) = capture_progress();

    darken(&input, Some(callback));

    let reports = seen.lock().expect("progress lock").clone();
    assert_eq!(reports, vec![(10, 25), (20, 25), (25, 25)]);
}

#[test]
fn test_progress_not_duplicated_when_last_page_is_a_tick() {
    let input = create_test_pdf(10);
    let (seen, callback) = capture_progress();

    darken(&input, Some(callback));

    let reports = seen.lock().expect("progress lock").clone();
    assert_eq!(reports, vec![(10, 10)]);
}

#[test]
fn test_progress_on_short_document() {
    let input = create_test_pdf(1);
    let (seen, callback) = capture_progress();

    darken(&input, Some(callback));

    let reports = seen.lock().expect("progress lock").clone();
    assert_eq!(reports, vec![(1, 1)]);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_missing_input_file() {
    let result = PdfDocument::from_file("/nonexistent/input.pdf");
    assert!(matches!(result, Err(Error::FileNotFound { .. })));

    let message = result.expect_err("should fail").to_string();
    assert!(
        message.contains("/nonexistent/input.pdf"),
        "error should reference the missing path: {message}"
    );
}

#[test]
fn test_missing_input_writes_no_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("out.pdf");

    let result = apply_dark_mode(dir.path().join("missing.pdf"), &output, None);
    assert!(matches!(result, Err(Error::FileNotFound { .. })));
    assert!(!output.exists(), "no output should be written on failure");
}

#[test]
fn test_invalid_pdf_bytes() {
    let result = PdfDocument::from_bytes(&[0, 1, 2, 3]);
    assert!(matches!(result, Err(Error::PdfOpen(_))));
}

#[test]
fn test_empty_pdf_bytes() {
    let result = PdfDocument::from_bytes(&[]);
    assert!(matches!(result, Err(Error::PdfOpen(_))));
}

// =============================================================================
// End-to-End Tests
// =============================================================================

#[test]
fn test_convert_file_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("out.pdf");
    std::fs::write(&input, create_test_pdf(1)).expect("write fixture");

    let report = apply_dark_mode(&input, &output, None).expect("conversion should succeed");
    assert_eq!(report.pages, 1);

    let written = std::fs::read(&output).expect("output should exist");
    assert!(written.starts_with(b"%PDF"), "output should be a PDF");
    assert_eq!(report.output_bytes, written.len() as u64);

    let doc = Document::load_mem(&written).expect("output should reload");
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn test_convert_file_overwrites_existing_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("out.pdf");
    std::fs::write(&input, create_test_pdf(2)).expect("write fixture");
    std::fs::write(&output, b"stale bytes").expect("write stale output");

    apply_dark_mode(&input, &output, None).expect("conversion should succeed");

    let written = std::fs::read(&output).expect("output should exist");
    assert!(written.starts_with(b"%PDF"), "stale output should be replaced");
}

//! Native file dialogs for selecting the input/output file pair.
//!
//! Dialog values are scoped to this module's functions: created, shown, and
//! dropped before returning, so no GUI state outlives a selection.

use std::path::PathBuf;

use rfd::FileDialog;

/// Outcome of the file pair selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Both paths were chosen
    Chosen { input: PathBuf, output: PathBuf },
    /// The user dismissed the named dialog ("input" or "output")
    Cancelled(&'static str),
}

/// Ask the user for an input PDF and an output destination.
///
/// Returns [`Selection::Cancelled`] as soon as either dialog is dismissed;
/// cancellation is a normal outcome, not an error.
#[allow(clippy::print_stdout)]
pub fn select_paths() -> Selection {
    println!("Please select the input PDF file:");
    let Some(input) = pick_input() else {
        return Selection::Cancelled("input");
    };

    println!("Please select where to save the output PDF file:");
    let Some(output) = pick_output() else {
        return Selection::Cancelled("output");
    };

    Selection::Chosen {
        input,
        output: ensure_pdf_extension(output),
    }
}

fn pick_input() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Select Input PDF")
        .add_filter("PDF files", &["pdf"])
        .add_filter("All files", &["*"])
        .pick_file()
}

fn pick_output() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Save Output PDF As")
        .add_filter("PDF files", &["pdf"])
        .add_filter("All files", &["*"])
        .set_file_name("darkmode.pdf")
        .save_file()
}

/// Append `.pdf` when the chosen file name has no extension.
fn ensure_pdf_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_none() {
        path.with_extension("pdf")
    } else {
        path
    }
}

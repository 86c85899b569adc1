//! PDF Dark Mode CLI - desktop tool for applying a dark mode effect to PDFs.

mod dialog;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use pdf_darkmode_core::{file_size, format_mib, DarkModeConverter, DarkenOptions};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dialog::Selection;

#[derive(Parser, Debug)]
#[command(name = "pdf-darkmode")]
#[command(author, version, about = "Apply a dark mode effect to a PDF", long_about = None)]
struct Args {
    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            // Failures share the operator-facing stdout stream
            #[allow(clippy::print_stdout)]
            {
                println!("An error occurred: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::print_stdout)]
fn run() -> Result<ExitCode> {
    print_banner();

    let (input, output) = match dialog::select_paths() {
        Selection::Chosen { input, output } => (input, output),
        Selection::Cancelled(which) => {
            println!("No {which} file selected. Exiting.");
            return Ok(ExitCode::SUCCESS);
        }
    };

    println!();
    println!("Input file: {}", input.display());
    println!("Output file: {}", output.display());
    println!();

    // Existence is checked here so the diagnostic names the path before any
    // open attempt; validity is left to the converter.
    if !input.exists() {
        anyhow::bail!("the file '{}' does not exist", input.display());
    }

    let input_size = file_size(&input)
        .with_context(|| format!("Failed to read metadata of {}", input.display()))?;

    info!("Converting {} -> {}", input.display(), output.display());

    let converter = DarkModeConverter::new(DarkenOptions::default());
    let report = converter.convert_file(
        &input,
        &output,
        Some(Box::new(|page, total| {
            println!("Processed page {page}/{total}");
        })),
    )?;

    println!("Successfully saved dark mode PDF to: {}", output.display());
    println!();
    println!("Conversion complete!");
    println!("Original file size: {} MiB", format_mib(input_size));
    println!("New file size: {} MiB", format_mib(report.output_bytes));

    Ok(ExitCode::SUCCESS)
}

#[allow(clippy::print_stdout)]
fn print_banner() {
    println!("{}", "=".repeat(50));
    println!("PDF Dark Mode Converter");
    println!("{}", "=".repeat(50));
    println!("This program will apply a dark mode effect to your PDF file.");
    println!("The resulting PDF will have a dark background with readable content.");
    println!();
}

//! # pdfreflow
//!
//! Text extraction from PDF files with line-wrap repair.
//!
//! Text pulled out of a PDF keeps the visual line breaks of the page: words
//! are split by end-of-line hyphens and sentences are chopped into short
//! lines. This library extracts the text, reflows it back into paragraphs
//! and writes one UTF-8 text file per document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! fn main() -> pdfreflow::Result<()> {
//!     // protocol2.pdf -> protocol2_cleaned.txt
//!     let written = pdfreflow::parse(Path::new("protocol2.pdf"), None)?;
//!     println!("Saved {}", written.display());
//!
//!     // Reflow text from any source
//!     assert_eq!(pdfreflow::reflow_text("inter-\nnational"), "international");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Reflow heuristic**: hyphenation and soft-wrap repair with presets
//! - **Layout analysis**: per-page text blocks with bounding boxes and fonts,
//!   plus image and form figures
//! - **Batch processing**: a directory of PDFs to a directory of text files,
//!   with per-file failure isolation
//! - **JSON output**: the full extraction result via serde

pub mod batch;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod reflow;
pub mod render;

// Re-export commonly used types
pub use batch::{
    collect_inputs, run_batch, BatchConfig, BatchItem, BatchReport, DocumentProcessor,
    FileOutcome,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use model::{
    BBox, ExtractionResult, FigureElement, FigureKind, LayoutElement, Metadata, PageContent,
    TextElement,
};
pub use parser::{ErrorMode, ExtractMode, ExtractOptions, TextExtractor};
pub use reflow::{reflow_text, ReflowOptions, ReflowPreset, ReflowStatus, Reflowed, Reflower};
pub use render::JsonFormat;

use std::path::{Path, PathBuf};

/// Extract a PDF file with default options.
///
/// Never fails; check `success` and `error` on the result.
///
/// # Example
///
/// ```no_run
/// let result = pdfreflow::extract("document.pdf");
/// if result.success {
///     println!("{} pages, fonts: {:?}", result.total_pages, result.fonts);
/// }
/// ```
pub fn extract<P: AsRef<Path>>(path: P) -> ExtractionResult {
    TextExtractor::new().extract(path)
}

/// Extract a PDF held in memory with default options.
pub fn extract_bytes(data: &[u8]) -> Result<ExtractionResult> {
    TextExtractor::new().extract_bytes(PathBuf::new(), data)
}

/// Extract the cleaned text of a PDF file.
///
/// # Example
///
/// ```no_run
/// let text = pdfreflow::extract_text("document.pdf").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let result = TextExtractor::new().try_extract(path)?;
    Ok(result.text)
}

/// Extract, clean and save one PDF.
///
/// Writes to `output`, or to `<base>_cleaned.txt` next to the input, and
/// returns the path written.
pub fn parse(pdf: &Path, output: Option<&Path>) -> Result<PathBuf> {
    TextExtractor::new().parse(pdf, output)
}

/// Convert a PDF to JSON.
///
/// # Example
///
/// ```no_run
/// use pdfreflow::{to_json, JsonFormat};
///
/// let json = to_json("document.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("output.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let result = TextExtractor::new().try_extract(path)?;
    render::to_json(&result, format)
}

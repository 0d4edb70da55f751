//! PDF text extractor.
//!
//! Whole-document text comes from `pdf-extract`; per-page layout, fonts and
//! metadata come from `lopdf` through [`LopdfBackend`]. Both are reflowed
//! with the configured [`Reflower`].

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::{
    ExtractionResult, FigureElement, LayoutElement, Metadata, PageContent, TextElement,
};
use crate::reflow::Reflower;

use super::backend::{LopdfBackend, PdfBackend};
use super::layout::{LayoutAnalyzer, PageItem, PageLayout};
use super::options::{ErrorMode, ExtractMode, ExtractOptions};

/// Extracts and cleans text from PDF files.
pub struct TextExtractor {
    options: ExtractOptions,
    reflower: Reflower,
}

impl TextExtractor {
    /// Create an extractor with default options.
    pub fn new() -> Self {
        Self::with_options(ExtractOptions::default())
    }

    /// Create an extractor with custom options.
    pub fn with_options(options: ExtractOptions) -> Self {
        let reflower = Reflower::new(options.reflow.clone());
        Self { options, reflower }
    }

    /// Options in effect.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract a PDF file.
    ///
    /// Never fails: errors are logged and recorded in the result with
    /// `success` set to false.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> ExtractionResult {
        let path = path.as_ref();
        match self.try_extract(path) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Failed to extract {}: {}", path.display(), e);
                ExtractionResult::failed(path, e.to_string())
            }
        }
    }

    /// Extract a PDF file, returning the first error.
    pub fn try_extract<P: AsRef<Path>>(&self, path: P) -> Result<ExtractionResult> {
        let path = path.as_ref();
        log::info!("Extracting text from {}", path.display());

        let data = fs::read(path)?;
        self.extract_bytes(path, &data)
    }

    /// Extract a PDF held in memory. `source` is recorded in the result.
    pub fn extract_bytes(
        &self,
        source: impl Into<PathBuf>,
        data: &[u8],
    ) -> Result<ExtractionResult> {
        let format = detect_format_from_bytes(data)?;
        let mut result = ExtractionResult::new(source);

        match self.options.extract_mode {
            ExtractMode::Detailed => self.analyze_layout(data, &mut result)?,
            ExtractMode::TextOnly => result.metadata = Metadata::with_version(format.version),
        }

        let raw = match extract_document_text(data) {
            Ok(text) => text,
            Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                log::warn!(
                    "{}: whole-document extraction failed ({}); using page text",
                    result.source.display(),
                    e
                );
                result.joined_page_text()
            }
            Err(e) => return Err(e),
        };

        let cleaned = self.reflower.reflow(&raw);
        result.cleanup_applied = cleaned.is_applied();
        result.text = cleaned.into_text();
        result.text_raw = raw;
        result.success = true;

        Ok(result)
    }

    /// Extract `pdf` and write its cleaned text.
    ///
    /// Writes to `output`, or to `<base>_cleaned.txt` next to the input.
    /// Returns the path written.
    pub fn save_clean_text(&self, pdf: &Path, output: Option<&Path>) -> Result<PathBuf> {
        let result = self.extract(pdf);

        if !result.success {
            return Err(Error::ExtractionFailed(
                result
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        if !result.has_text() {
            return Err(Error::NoText(pdf.to_path_buf()));
        }

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cleaned_output_path(pdf));

        fs::write(&output, result.text.as_bytes()).map_err(|source| Error::Write {
            path: output.clone(),
            source,
        })?;

        log::info!("Saved cleaned text to {}", output.display());
        Ok(output)
    }

    /// Full cycle for one file: check the input exists, extract, clean, save.
    pub fn parse(&self, pdf: &Path, output: Option<&Path>) -> Result<PathBuf> {
        if !pdf.is_file() {
            return Err(Error::InputNotFound(pdf.to_path_buf()));
        }
        self.save_clean_text(pdf, output)
    }

    /// Fill metadata, fonts and pages from the lopdf backend.
    fn analyze_layout(&self, data: &[u8], result: &mut ExtractionResult) -> Result<()> {
        let backend = LopdfBackend::load_bytes(data)?;
        let pages = backend.pages();

        let mut metadata = Metadata::from_entries(backend.version(), backend.info_entries());
        metadata.page_count = pages.len() as u32;
        metadata.encrypted = backend.is_encrypted();

        let analyzer = LayoutAnalyzer::new(&backend);
        for (&page_num, &page_id) in &pages {
            let page = match analyzer.analyze_page(page_num) {
                Ok(layout) => self.build_page(layout),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping layout of page {}: {}", page_num, e);
                    let (width, height) = backend.page_size(page_id);
                    PageContent::new(page_num, width, height)
                }
                Err(e) => return Err(e),
            };

            result.fonts.extend(page.fonts());
            result.pages.push(page);
        }

        result.total_pages = metadata.page_count;
        result.metadata = metadata;
        Ok(())
    }

    fn build_page(&self, layout: PageLayout) -> PageContent {
        let mut page = PageContent::new(layout.page_number, layout.width, layout.height);

        for item in layout.items {
            let element = match item {
                PageItem::Text(block) => {
                    let content_raw = block.text();
                    page.text_raw.push_str(&content_raw);
                    LayoutElement::Text(TextElement {
                        content_clean: self.reflower.reflow(&content_raw).into_text(),
                        bbox: block.bbox(),
                        fonts: block.fonts(),
                        content_raw,
                    })
                }
                PageItem::Figure(figure) => LayoutElement::Figure(FigureElement {
                    name: figure.name,
                    kind: figure.kind,
                    bbox: figure.bbox,
                }),
            };
            page.elements.push(element);
        }

        page.text_clean = self.reflower.reflow(&page.text_raw).into_text();
        page
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Default output path for single-file mode: `<base>_cleaned.txt`.
pub fn cleaned_output_path(pdf: &Path) -> PathBuf {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    pdf.with_file_name(format!("{}_cleaned.txt", stem))
}

/// Whole-document text via `pdf-extract`.
///
/// `pdf-extract` can panic on malformed input, so the call runs behind
/// `catch_unwind` and a panic becomes [`Error::TextExtract`].
fn extract_document_text(data: &[u8]) -> Result<String> {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(data)
    })) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(Error::TextExtract(
            "pdf-extract panicked (malformed document)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cleaned_output_path() {
        assert_eq!(
            cleaned_output_path(Path::new("/data/protocol2.pdf")),
            PathBuf::from("/data/protocol2_cleaned.txt")
        );
        assert_eq!(
            cleaned_output_path(Path::new("report.v2.PDF")),
            PathBuf::from("report.v2_cleaned.txt")
        );
    }

    #[test]
    fn test_parse_missing_input() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.pdf");

        let err = TextExtractor::new().parse(&missing, None).unwrap_err();
        assert!(matches!(err, Error::InputNotFound(p) if p == missing));
    }

    #[test]
    fn test_extract_non_pdf_is_recorded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.pdf");
        fs::write(&path, "just some text").unwrap();

        let result = TextExtractor::new().extract(&path);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("not a valid PDF"));
    }

    #[test]
    fn test_save_clean_text_reports_failed_extraction() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, "%PDF-1.4\nnot really a pdf").unwrap();

        let err = TextExtractor::new()
            .save_clean_text(&path, None)
            .unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed(_)));
        assert!(!cleaned_output_path(&path).exists());
    }

    #[test]
    fn test_extract_bytes_rejects_non_pdf() {
        let result = TextExtractor::new().extract_bytes("x.pdf", b"GIF89a");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }
}

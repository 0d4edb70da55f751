//! Per-document extraction result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::{Metadata, PageContent};

/// Everything extracted from one PDF.
///
/// An unsuccessful extraction still yields a result: `success` is false and
/// `error` holds the message, while the other fields keep whatever was
/// gathered before the failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Path of the source document
    pub source: PathBuf,

    /// Cleaned text of the whole document
    pub text: String,

    /// Text of the whole document as extracted
    pub text_raw: String,

    /// Whether `text` is reflowed (false when the reflow fell back to raw text)
    pub cleanup_applied: bool,

    /// Document metadata
    pub metadata: Metadata,

    /// Fonts used anywhere in the document
    pub fonts: BTreeSet<String>,

    /// Per-page content
    pub pages: Vec<PageContent>,

    /// Number of pages in the document
    pub total_pages: u32,

    /// Whether extraction completed
    pub success: bool,

    /// Failure message when `success` is false
    pub error: Option<String>,
}

impl ExtractionResult {
    /// Create an empty result for a source document.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    /// Create a failed result carrying an error message.
    pub fn failed(source: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(source)
        }
    }

    /// Iterate over `(page_number, raw, clean)` per page.
    pub fn text_by_pages(&self) -> impl Iterator<Item = (u32, &str, &str)> {
        self.pages
            .iter()
            .map(|p| (p.page_number, p.text_raw.as_str(), p.text_clean.as_str()))
    }

    /// Raw text of all pages joined by blank lines.
    pub fn joined_page_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text_raw.as_str())
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Total number of text elements.
    pub fn text_element_count(&self) -> usize {
        self.pages.iter().map(|p| p.text_elements().count()).sum()
    }

    /// Total number of figure elements.
    pub fn figure_count(&self) -> usize {
        self.pages.iter().map(|p| p.figures().count()).sum()
    }

    /// Check whether the cleaned text has any content.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result() {
        let result = ExtractionResult::failed("broken.pdf", "bad xref");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("bad xref"));
        assert_eq!(result.source, PathBuf::from("broken.pdf"));
        assert!(!result.has_text());
    }

    #[test]
    fn test_text_by_pages() {
        let mut result = ExtractionResult::new("doc.pdf");
        let mut page1 = PageContent::new(1, 612.0, 792.0);
        page1.text_raw = "exam-\nple\n".to_string();
        page1.text_clean = "example".to_string();
        let page2 = PageContent::new(2, 612.0, 792.0);
        result.pages = vec![page1, page2];

        let pages: Vec<_> = result.text_by_pages().collect();
        assert_eq!(pages[0], (1, "exam-\nple\n", "example"));
        assert_eq!(pages[1].0, 2);
        assert_eq!(result.joined_page_text(), "exam-\nple\n");
    }
}

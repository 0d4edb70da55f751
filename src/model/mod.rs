//! Result model for extracted PDF content.
//!
//! These types are produced fresh for every document and are not persisted
//! beyond the process that writes the output file.

mod metadata;
mod page;
mod result;

pub use metadata::{parse_pdf_date, Metadata};
pub use page::{BBox, FigureElement, FigureKind, LayoutElement, PageContent, TextElement};
pub use result::ExtractionResult;

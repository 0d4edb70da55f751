//! PDF parsing module.

mod backend;
mod extractor;
mod layout;
mod options;

pub use backend::{
    decode_pdf_string, BackendFontInfo, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue,
    XObjectInfo,
};
pub use extractor::{cleaned_output_path, TextExtractor};
pub use layout::{Figure, LayoutAnalyzer, PageItem, PageLayout, TextBlock, TextLine, TextSpan};
pub use options::{ErrorMode, ExtractMode, ExtractOptions};

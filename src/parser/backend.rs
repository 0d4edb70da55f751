//! PDF backend abstraction layer.
//!
//! The layout analyzer and metadata reader only see the [`PdfBackend`]
//! trait, so the concrete PDF library (lopdf) stays behind this module and
//! tests can drive the analyzer with hand-built content streams.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Dictionary, Document as LopdfDocument, Object, Stream};

use crate::error::{Error, Result};
use crate::model::FigureKind;

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// US Letter, used when a page has no usable MediaBox.
pub const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Font information returned by the backend.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
}

/// An XObject available to a page.
#[derive(Debug, Clone, PartialEq)]
pub struct XObjectInfo {
    /// Image or form
    pub kind: FigureKind,
    /// Form bounding box in form space
    pub bbox: Option<[f32; 4]>,
    /// Form matrix mapping form space to user space
    pub matrix: Option<[f32; 6]>,
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// Numeric operand at `idx`, if present and numeric.
    pub fn number(&self, idx: usize) -> Option<f32> {
        self.operands.get(idx).and_then(get_number_from_value)
    }
}

/// Abstract interface for PDF document access.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Page width and height in points.
    fn page_size(&self, page: PageId) -> (f32, f32);

    /// Return font info for a given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>>;

    /// Return the XObjects a page can draw, keyed by resource name.
    fn page_xobjects(&self, page: PageId) -> Result<HashMap<Vec<u8>, XObjectInfo>>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to [`decode_pdf_string`] if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// String-valued entries of the document info dictionary.
    fn info_entries(&self) -> BTreeMap<String, String>;

    /// PDF version string.
    fn version(&self) -> String;

    /// Whether the document is encrypted.
    fn is_encrypted(&self) -> bool;
}

/// Decode a PDF string without font information: UTF-16BE when it carries a
/// BOM, then UTF-8, then Latin-1.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let utf16: Vec<u16> = body
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

// ---------------------------------------------------------------------------
// LopdfBackend: implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self { doc })
    }

    /// Resolve an object that may be a reference to a dictionary.
    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match obj {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Look up a page attribute, following the `/Parent` chain for
    /// inheritable entries (Resources, MediaBox).
    fn inherited_attribute(&self, page: PageId, key: &[u8]) -> Option<&Object> {
        let mut node = self.doc.get_dictionary(page).ok();
        // Bounded to guard against cyclic parent links.
        for _ in 0..32 {
            let dict = node?;
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            node = dict
                .get(b"Parent")
                .ok()
                .and_then(|p| p.as_reference().ok())
                .and_then(|r| self.doc.get_dictionary(r).ok());
        }
        None
    }

    fn xobject_info(&self, obj: &Object) -> Option<XObjectInfo> {
        let dict = match obj {
            Object::Reference(r) => match self.doc.get_object(*r).ok()? {
                Object::Stream(s) => &s.dict,
                Object::Dictionary(d) => d,
                _ => return None,
            },
            Object::Stream(s) => &s.dict,
            _ => return None,
        };

        let kind = match dict.get(b"Subtype").and_then(Object::as_name_str).ok()? {
            "Image" => FigureKind::Image,
            "Form" => FigureKind::Form,
            _ => return None,
        };

        Some(XObjectInfo {
            kind,
            bbox: number_array(dict, b"BBox"),
            matrix: number_array(dict, b"Matrix"),
        })
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_size(&self, page: PageId) -> (f32, f32) {
        self.inherited_attribute(page, b"MediaBox")
            .and_then(|o| o.as_array().ok())
            .filter(|a| a.len() >= 4)
            .and_then(|a| {
                let v: Vec<f32> = a.iter().filter_map(get_number).collect();
                (v.len() == 4).then(|| ((v[2] - v[0]).abs(), (v[3] - v[1]).abs()))
            })
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut result = Vec::with_capacity(lopdf_fonts.len());
        for (name, font_dict) in &lopdf_fonts {
            let base_font = font_dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
            result.push(BackendFontInfo {
                name: name.clone(),
                base_font,
            });
        }
        Ok(result)
    }

    fn page_xobjects(&self, page: PageId) -> Result<HashMap<Vec<u8>, XObjectInfo>> {
        let mut xobjects = HashMap::new();

        let Some(resources) = self
            .inherited_attribute(page, b"Resources")
            .and_then(|r| self.resolve_dict(r))
        else {
            return Ok(xobjects);
        };

        if let Some(xobj_dict) = resources
            .get(b"XObject")
            .ok()
            .and_then(|x| self.resolve_dict(x))
        {
            for (name, obj) in xobj_dict.iter() {
                if let Some(info) = self.xobject_info(obj) {
                    xobjects.insert(name.clone(), info);
                }
            }
        }

        Ok(xobjects)
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(c) => c,
            // A page without content is blank, not broken.
            Err(_) => return Ok(Vec::new()),
        };

        let stream_data = |obj: &Object| -> Option<Vec<u8>> {
            let r = obj.as_reference().ok()?;
            match self.doc.get_object(r).ok()? {
                Object::Stream(s) => stream_bytes(s).ok(),
                _ => None,
            }
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => stream_bytes(s),
                Ok(Object::Array(arr)) => Ok(join_streams(arr.iter().filter_map(stream_data))),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(join_streams(arr.iter().filter_map(stream_data))),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_pdf_string(bytes)
    }

    fn info_entries(&self) -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();

        let Some(info) = self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|i| self.resolve_dict(i))
        else {
            return entries;
        };

        for (key, value) in info.iter() {
            let value = match value {
                Object::String(bytes, _) => decode_pdf_string(bytes),
                Object::Name(bytes) => String::from_utf8_lossy(bytes).to_string(),
                Object::Integer(i) => i.to_string(),
                Object::Real(r) => r.to_string(),
                Object::Boolean(b) => b.to_string(),
                _ => continue,
            };
            entries.insert(String::from_utf8_lossy(key).to_string(), value);
        }

        entries
    }

    fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }
}

/// Stream payload with filters applied; unfiltered streams are returned as stored.
fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|e| Error::PdfParse(e.to_string()))
}

fn join_streams(parts: impl Iterator<Item = Vec<u8>>) -> Vec<u8> {
    let mut content = Vec::new();
    for data in parts {
        content.extend_from_slice(&data);
        content.push(b' ');
    }
    content
}

fn number_array<const N: usize>(dict: &Dictionary, key: &[u8]) -> Option<[f32; N]> {
    let values: Vec<f32> = dict
        .get(key)
        .ok()?
        .as_array()
        .ok()?
        .iter()
        .filter_map(get_number)
        .collect();
    values.try_into().ok()
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}

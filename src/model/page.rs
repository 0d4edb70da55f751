//! Page-level types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Axis-aligned bounding box in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box, normalizing corner order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Smallest box containing all points. `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = (f32, f32)>) -> Option<Self> {
        points.into_iter().fold(None, |acc, (x, y)| {
            Some(match acc {
                None => Self::new(x, y, x, y),
                Some(b) => b.union(&Self::new(x, y, x, y)),
            })
        })
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// Kind of XObject drawn as a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureKind {
    /// Raster image XObject
    Image,
    /// Form XObject (vector graphics, nested content)
    Form,
}

/// A block of text on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    /// Text as extracted, one visual line per line
    pub content_raw: String,
    /// Text after reflow
    pub content_clean: String,
    /// Bounding box of the block
    pub bbox: BBox,
    /// Names of the fonts used in the block
    pub fonts: BTreeSet<String>,
}

/// A figure (image or form XObject) on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureElement {
    /// Resource name of the XObject (e.g., "Im1")
    pub name: String,
    /// Image or form
    pub kind: FigureKind,
    /// Bounding box of the figure
    pub bbox: BBox,
}

/// A layout element of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutElement {
    Text(TextElement),
    Figure(FigureElement),
}

impl LayoutElement {
    /// Bounding box of the element.
    pub fn bbox(&self) -> BBox {
        match self {
            LayoutElement::Text(t) => t.bbox,
            LayoutElement::Figure(f) => f.bbox,
        }
    }

    /// Check if this is a text element.
    pub fn is_text(&self) -> bool {
        matches!(self, LayoutElement::Text(_))
    }

    /// Check if this is a figure element.
    pub fn is_figure(&self) -> bool {
        matches!(self, LayoutElement::Figure(_))
    }
}

/// Extracted content of a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Concatenated raw text of the page's text elements
    pub text_raw: String,
    /// `text_raw` after reflow
    pub text_clean: String,
    /// Text and figure elements, top to bottom
    pub elements: Vec<LayoutElement>,
}

impl PageContent {
    /// Create an empty page.
    pub fn new(page_number: u32, width: f32, height: f32) -> Self {
        Self {
            page_number,
            width,
            height,
            text_raw: String::new(),
            text_clean: String::new(),
            elements: Vec::new(),
        }
    }

    /// Iterate over the text elements.
    pub fn text_elements(&self) -> impl Iterator<Item = &TextElement> {
        self.elements.iter().filter_map(|e| match e {
            LayoutElement::Text(t) => Some(t),
            LayoutElement::Figure(_) => None,
        })
    }

    /// Iterate over the figure elements.
    pub fn figures(&self) -> impl Iterator<Item = &FigureElement> {
        self.elements.iter().filter_map(|e| match e {
            LayoutElement::Figure(f) => Some(f),
            LayoutElement::Text(_) => None,
        })
    }

    /// Fonts used anywhere on the page.
    pub fn fonts(&self) -> BTreeSet<String> {
        self.text_elements()
            .flat_map(|t| t.fonts.iter().cloned())
            .collect()
    }
}

//! Layout analysis for PDF pages.
//!
//! Walks a page's content stream, tracking graphics and text state, and
//! produces positioned text spans and figures. Spans are grouped into lines
//! by baseline and lines into blocks by spacing, so each block becomes one
//! text element with a bounding box and a font set.

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::model::{BBox, FigureKind};

use super::backend::{
    get_number_from_value, ContentOp, PageId, PdfBackend, PdfValue, XObjectInfo,
};

/// Glyph advance as a fraction of the font size when real widths are unknown.
const AVG_GLYPH_ADVANCE: f32 = 0.5;

/// TJ adjustments beyond this (in thousandths of an em) are word gaps.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A text span with position and font information.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
}

impl TextSpan {
    pub fn new(text: String, x: f32, y: f32, width: f32, font_size: f32, font_name: String) -> Self {
        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Approximate descender line.
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2
    }

    /// Approximate ascender line.
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }
}

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        if spans.is_empty() {
            return Self {
                spans,
                y: 0.0,
                x: 0.0,
                font_size: 0.0,
            };
        }

        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        // Dominant font size, weighted by text length
        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted_size: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted_size / total_chars as f32
        } else {
            spans[0].font_size
        };

        let y = spans[0].y;
        let x = spans[0].x;

        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Combined text of all spans.
    ///
    /// A space is inserted where the horizontal gap between two spans is
    /// wider than a fifth of a character, except between characters of
    /// scripts written without word spaces.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i == 0 {
                result.push_str(&span.text);
                continue;
            }

            let prev_span = &self.spans[i - 1];
            let gap = span.x - prev_span.right();

            let char_count = span.text.chars().count();
            let avg_char_width = if char_count > 0 && span.width > 0.0 {
                span.width / char_count as f32
            } else {
                span.font_size * AVG_GLYPH_ADVANCE
            };

            let spaceless_pair = prev_span
                .text
                .chars()
                .last()
                .is_some_and(is_spaceless_script_char)
                && span
                    .text
                    .chars()
                    .next()
                    .is_some_and(is_spaceless_script_char);

            let already_spaced = prev_span.text.ends_with([' ', '\u{00A0}'])
                || span.text.starts_with([' ', '\u{00A0}']);

            if gap > avg_char_width * 0.2 && !spaceless_pair && !already_spaced {
                result.push(' ');
            }

            result.push_str(&span.text);
        }

        result
    }
}

/// A block of consecutive lines forming one text element.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Text of the block, one line per visual line, newline-terminated.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(&line.text());
            text.push('\n');
        }
        text
    }

    /// Bounding box of all spans in the block.
    pub fn bbox(&self) -> BBox {
        let spans = self.lines.iter().flat_map(|l| l.spans.iter());
        BBox::from_points(spans.flat_map(|s| [(s.x, s.bottom()), (s.right(), s.top())]))
            .unwrap_or_default()
    }

    /// Font names used in the block.
    pub fn fonts(&self) -> BTreeSet<String> {
        self.lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .map(|s| s.font_name.clone())
            .collect()
    }
}

/// An XObject drawn on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub name: String,
    pub kind: FigureKind,
    pub bbox: BBox,
}

/// A laid-out item of a page.
#[derive(Debug, Clone)]
pub enum PageItem {
    Text(TextBlock),
    Figure(Figure),
}

impl PageItem {
    fn top(&self) -> f32 {
        match self {
            PageItem::Text(block) => block.bbox().y1,
            PageItem::Figure(figure) => figure.bbox.y1,
        }
    }
}

/// Layout of a single page.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub page_number: u32,
    pub width: f32,
    pub height: f32,
    /// Text blocks and figures, top to bottom
    pub items: Vec<PageItem>,
}

/// Layout analyzer over any [`PdfBackend`].
pub struct LayoutAnalyzer<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: PdfBackend + ?Sized> LayoutAnalyzer<'a, B> {
    /// Create a new layout analyzer.
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Analyze one page (1-indexed).
    pub fn analyze_page(&self, page_num: u32) -> Result<PageLayout> {
        let pages = self.backend.pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;

        let (width, height) = self.backend.page_size(page_id);

        let fonts: HashMap<Vec<u8>, String> = self
            .backend
            .page_fonts(page_id)?
            .into_iter()
            .map(|f| (f.name, f.base_font))
            .collect();

        let xobjects = self.backend.page_xobjects(page_id).unwrap_or_else(|e| {
            log::warn!("Page {}: could not read XObjects: {}", page_num, e);
            HashMap::new()
        });

        let content = self.backend.page_content(page_id)?;
        let ops = self.backend.decode_content(&content)?;

        let (spans, figures) = self.interpret(page_id, &ops, &fonts, &xobjects);
        log::debug!(
            "Page {}: {} spans, {} figures",
            page_num,
            spans.len(),
            figures.len()
        );

        let lines = group_spans_into_lines(spans);
        let mut items: Vec<PageItem> = group_lines_into_blocks(lines)
            .into_iter()
            .map(PageItem::Text)
            .chain(figures.into_iter().map(PageItem::Figure))
            .collect();

        // PDF Y grows upwards, so top-to-bottom is descending Y.
        items.sort_by(|a, b| {
            b.top()
                .partial_cmp(&a.top())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(PageLayout {
            page_number: page_num,
            width,
            height,
            items,
        })
    }

    /// Run the content stream operators and collect spans and figures.
    fn interpret(
        &self,
        page_id: PageId,
        ops: &[ContentOp],
        fonts: &HashMap<Vec<u8>, String>,
        xobjects: &HashMap<Vec<u8>, XObjectInfo>,
    ) -> (Vec<TextSpan>, Vec<Figure>) {
        let mut spans = Vec::new();
        let mut figures = Vec::new();

        let mut ctm = Matrix::IDENTITY;
        let mut ctm_stack: Vec<Matrix> = Vec::new();
        let mut state = TextState::default();
        let mut in_text_block = false;

        for op in ops {
            match op.operator.as_str() {
                "q" => ctm_stack.push(ctm),
                "Q" => {
                    if let Some(saved) = ctm_stack.pop() {
                        ctm = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(op) {
                        ctm = m.multiply(&ctm);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    state.tm = Matrix::IDENTITY;
                    state.tlm = Matrix::IDENTITY;
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        state.font_name = fonts
                            .get(name)
                            .cloned()
                            .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                        state.font_resource = name.clone();
                    }
                    state.font_size = op.number(1).unwrap_or(state.font_size);
                }
                "TL" => state.leading = op.number(0).unwrap_or(state.leading),
                "Tz" => state.horizontal_scale = op.number(0).unwrap_or(100.0) / 100.0,
                "Td" | "TD" => {
                    let tx = op.number(0).unwrap_or(0.0);
                    let ty = op.number(1).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(op) {
                        state.tm = m;
                        state.tlm = m;
                    }
                }
                "T*" => state.next_line(),
                "Tj" | "TJ" | "'" | "\"" if in_text_block => {
                    if op.operator == "'" || op.operator == "\"" {
                        state.next_line();
                    }
                    let text_operand = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(operand) = op.operands.get(text_operand) {
                        if let Some(span) = self.show_text(page_id, operand, &mut state, &ctm) {
                            spans.push(span);
                        }
                    }
                }
                "Do" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        if let Some(info) = xobjects.get(name) {
                            figures.push(place_figure(name, info, &ctm));
                        }
                    }
                }
                _ => {}
            }
        }

        (spans, figures)
    }

    /// Decode a `Tj`/`TJ` operand into a span and advance the text matrix.
    fn show_text(
        &self,
        page_id: PageId,
        operand: &PdfValue,
        state: &mut TextState,
        ctm: &Matrix,
    ) -> Option<TextSpan> {
        let rendering = state.tm.multiply(ctm);
        let mut text = String::new();
        let mut advance = 0.0;

        let push_string = |bytes: &[u8], text: &mut String, advance: &mut f32| {
            let decoded = self
                .backend
                .decode_text(page_id, &state.font_resource, bytes);
            *advance += state.glyph_advance(decoded.chars().count());
            text.push_str(&decoded);
        };

        match operand {
            PdfValue::Str(bytes) => push_string(bytes, &mut text, &mut advance),
            PdfValue::Array(items) => {
                for item in items {
                    match item {
                        PdfValue::Str(bytes) => push_string(bytes, &mut text, &mut advance),
                        PdfValue::Integer(_) | PdfValue::Real(_) => {
                            let adjustment = -get_number_from_value(item)
                                .unwrap_or(0.0);
                            advance += adjustment / 1000.0
                                * state.font_size
                                * state.horizontal_scale;
                            if adjustment > TJ_SPACE_THRESHOLD
                                && text
                                    .chars()
                                    .last()
                                    .is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c))
                            {
                                text.push(' ');
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => return None,
        }

        state.tm = Matrix::translation(advance, 0.0).multiply(&state.tm);

        if text.trim().is_empty() {
            return None;
        }

        let (x, y) = rendering.apply(0.0, 0.0);
        Some(TextSpan::new(
            text,
            x,
            y,
            advance * rendering.horizontal_scale(),
            state.font_size * rendering.vertical_scale(),
            state.font_name.clone(),
        ))
    }
}

/// Map an XObject's extent through the current transformation matrix.
fn place_figure(name: &[u8], info: &XObjectInfo, ctm: &Matrix) -> Figure {
    let (matrix, [x0, y0, x1, y1]) = match info.kind {
        // Images occupy the unit square of their user space.
        FigureKind::Image => (*ctm, [0.0, 0.0, 1.0, 1.0]),
        FigureKind::Form => {
            let form_matrix = info.matrix.map(Matrix::from).unwrap_or(Matrix::IDENTITY);
            (
                form_matrix.multiply(ctm),
                info.bbox.unwrap_or([0.0, 0.0, 1.0, 1.0]),
            )
        }
    };

    let corners = [(x0, y0), (x1, y0), (x0, y1), (x1, y1)].map(|(x, y)| matrix.apply(x, y));

    Figure {
        name: String::from_utf8_lossy(name).to_string(),
        kind: info.kind,
        bbox: BBox::from_points(corners).unwrap_or_default(),
    }
}

/// Group spans into lines by baseline.
fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    // Top to bottom, then left to right
    spans.sort_by(|a, b| {
        let y_cmp = b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_line_spans: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;

        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current_line_spans.push(span),
            _ => {
                if !current_line_spans.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(
                        &mut current_line_spans,
                    )));
                }
                current_y = Some(span.y);
                current_line_spans.push(span);
            }
        }
    }

    if !current_line_spans.is_empty() {
        lines.push(TextLine::from_spans(current_line_spans));
    }

    lines
}

/// Group lines into blocks based on spacing, font size and indentation.
fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    let avg_spacing = calculate_avg_line_spacing(&lines);
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(TextBlock {
                    lines: std::mem::take(&mut current),
                });
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(TextBlock { lines: current });
    }

    blocks
}

fn calculate_avg_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev_line: &TextLine, curr_line: &TextLine, avg_spacing: f32) -> bool {
    // Large spacing indicates new paragraph
    let spacing = (prev_line.y - curr_line.y).abs();
    if spacing > avg_spacing * 1.5 {
        return true;
    }

    if (prev_line.font_size - curr_line.font_size).abs() > 1.0 {
        return true;
    }

    // Indenting further than the previous line starts a new paragraph;
    // returning to the margin after an indented first line does not.
    curr_line.x - prev_line.x > 20.0
}

/// Affine transformation `[a b 0; c d 0; e f 1]`, row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(op: &ContentOp) -> Option<Self> {
        let mut v = [0.0f32; 6];
        for (i, slot) in v.iter_mut().enumerate() {
            *slot = op.number(i)?;
        }
        Some(Self::from(v))
    }

    /// `self × other`: apply `self` first, then `other`.
    fn multiply(&self, o: &Matrix) -> Matrix {
        Matrix {
            a: self.a * o.a + self.b * o.c,
            b: self.a * o.b + self.b * o.d,
            c: self.c * o.a + self.d * o.c,
            d: self.c * o.b + self.d * o.d,
            e: self.e * o.a + self.f * o.c + o.e,
            f: self.e * o.b + self.f * o.d + o.f,
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

impl From<[f32; 6]> for Matrix {
    fn from([a, b, c, d, e, f]: [f32; 6]) -> Self {
        Self { a, b, c, d, e, f }
    }
}

/// Text state between `BT` and `ET`.
#[derive(Debug, Clone)]
struct TextState {
    tm: Matrix,
    tlm: Matrix,
    leading: f32,
    font_resource: Vec<u8>,
    font_name: String,
    font_size: f32,
    horizontal_scale: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            leading: 0.0,
            font_resource: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            horizontal_scale: 1.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translation(tx, ty).multiply(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.move_line(0.0, -leading);
    }

    /// Estimated advance of `chars` glyphs in text space.
    fn glyph_advance(&self, chars: usize) -> f32 {
        chars as f32 * AVG_GLYPH_ADVANCE * self.font_size * self.horizontal_scale
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

//! Loading a PDF with pdfium and building the [`Document`] model from it.
//!
//! pdfium exposes page objects in content-stream order with bounds in PDF
//! user space (bottom-left origin, before `/Rotate`). Form XObjects are
//! flattened in place. Bounds are then mapped onto the rendered page: the
//! crop-box origin is subtracted, y is flipped and the page rotation applied,
//! which is the space the rasterizer crops from.
//!
//! Text objects become spans; runs sharing a baseline become a line, and
//! lines separated by a small vertical gap become one text block. An image
//! object always ends the current text block.

use crate::error::ConvertError;
use crate::model::{Block, Document, ImageBlock, Line, Page, Rect, Span, TextBlock, BOLD_FLAG};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// A vertical gap between lines larger than this multiple of the font size
/// starts a new block.
const BLOCK_GAP_FACTOR: f32 = 1.4;

/// Runs on one line closer than this multiple of the font size are one word.
const GLYPH_GAP_FACTOR: f32 = 0.15;

/// Lowest font weight treated as bold.
const BOLD_WEIGHT: u32 = 700;

/// Bind to the pdfium library.
///
/// `library_path` may be the library file itself or the directory holding it.
/// Without a path the platform's library search path is used.
pub fn bind_pdfium(library_path: Option<&Path>) -> Result<Pdfium, ConvertError> {
    let bindings = match library_path {
        Some(path) if path.is_file() => Pdfium::bind_to_library(path),
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ConvertError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

/// Open `pdf_path`, mapping pdfium's load errors onto [`ConvertError`].
pub fn load_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, ConvertError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ConvertError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                ConvertError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            ConvertError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Build the [`Document`] model for every page of a loaded PDF.
pub fn extract_document(document: &PdfDocument<'_>) -> Document {
    let mut pages = Vec::new();

    for (index, page) in document.pages().iter().enumerate() {
        let page_num = index + 1;
        let frame = page_frame(&page);
        let mut items = Vec::new();
        collect_items(
            &mut page.objects().iter(),
            Affine::IDENTITY,
            &frame,
            page_num,
            &mut items,
        );

        let page = assemble_page(items);
        debug!("Page {}: {} blocks", page_num, page.blocks.len());
        pages.push(page);
    }

    info!("Extracted {} pages", pages.len());
    Document::new(pages)
}

/// Visit page objects in content order, descending into form XObjects.
///
/// `transform` maps the objects' own space to page user space: the identity
/// at the top level, the product of the enclosing form matrices inside forms.
fn collect_items<'a>(
    objects: &mut dyn Iterator<Item = PdfPageObject<'a>>,
    transform: Affine,
    frame: &PageFrame,
    page_num: usize,
    items: &mut Vec<PageItem>,
) {
    for object in objects {
        if let Some(form) = object.as_x_object_form_object() {
            let inner = match form.matrix() {
                Ok(m) => transform.concat(&Affine::new(m.a(), m.b(), m.c(), m.d(), m.e(), m.f())),
                Err(e) => {
                    debug!("Page {}: form without matrix, using parent: {:?}", page_num, e);
                    transform
                }
            };
            collect_items(&mut form.iter(), inner, frame, page_num, items);
            continue;
        }

        let bounds = match object.bounds() {
            Ok(b) => b,
            Err(e) => {
                debug!("Page {}: object without bounds skipped: {:?}", page_num, e);
                continue;
            }
        };
        let bbox = frame.to_display(&transform.map_edges(&Edges {
            left: bounds.left().value,
            bottom: bounds.bottom().value,
            right: bounds.right().value,
            top: bounds.top().value,
        }));

        if let Some(text) = object.as_text_object() {
            let size = text.scaled_font_size().value * transform.vertical_scale();
            if !(size.is_finite() && size > 0.0) {
                debug!("Page {}: text run with font size {} skipped", page_num, size);
                continue;
            }
            items.push(PageItem::Text {
                span: Span::from_flags(text.text(), size, font_flags(&text.font())),
                bbox,
            });
        } else if object.as_image_object().is_some() {
            items.push(PageItem::Image { bbox });
        } else {
            debug!("Page {}: {:?} object skipped", page_num, object.object_type());
        }
    }
}

/// Edges of a rectangle in PDF user space (bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Edges {
    left: f32,
    bottom: f32,
    right: f32,
    top: f32,
}

/// PDF matrix `[a b c d e f]`: `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Affine {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Affine {
    const IDENTITY: Affine = Affine::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// `inner` applied first, then `self`.
    fn concat(&self, inner: &Affine) -> Affine {
        Affine::new(
            self.a * inner.a + self.c * inner.b,
            self.b * inner.a + self.d * inner.b,
            self.a * inner.c + self.c * inner.d,
            self.b * inner.c + self.d * inner.d,
            self.a * inner.e + self.c * inner.f + self.e,
            self.b * inner.e + self.d * inner.f + self.f,
        )
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Axis-aligned box around the transformed corners.
    fn map_edges(&self, r: &Edges) -> Edges {
        let corners = [
            self.apply(r.left, r.bottom),
            self.apply(r.right, r.bottom),
            self.apply(r.left, r.top),
            self.apply(r.right, r.top),
        ];
        let (x0, y0) = corners[0];
        corners[1..].iter().fold(
            Edges {
                left: x0,
                bottom: y0,
                right: x0,
                top: y0,
            },
            |acc, &(x, y)| Edges {
                left: acc.left.min(x),
                bottom: acc.bottom.min(y),
                right: acc.right.max(x),
                top: acc.top.max(y),
            },
        )
    }

    /// Length of the transformed unit y vector.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// The visible page box and its `/Rotate`, as pdfium renders the page.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageFrame {
    /// Lower-left corner of the crop box in user space.
    left: f32,
    bottom: f32,
    /// Crop box size before rotation.
    width: f32,
    height: f32,
    /// Clockwise quarter turns.
    quarter_turns: u8,
}

impl PageFrame {
    /// Map user-space edges to the rendered page (top-left origin, y down,
    /// rotation applied).
    fn to_display(&self, r: &Edges) -> Rect {
        let x0 = r.left - self.left;
        let x1 = r.right - self.left;
        let y0 = self.height - (r.top - self.bottom);
        let y1 = self.height - (r.bottom - self.bottom);
        let (w, h) = (self.width, self.height);

        match self.quarter_turns % 4 {
            1 => Rect::new(h - y1, x0, h - y0, x1),
            2 => Rect::new(w - x1, h - y1, w - x0, h - y0),
            3 => Rect::new(y0, w - x1, y1, w - x0),
            _ => Rect::new(x0, y0, x1, y1),
        }
    }
}

fn page_frame(page: &PdfPage<'_>) -> PageFrame {
    let quarter_turns = match page.rotation() {
        Ok(PdfPageRenderRotation::Degrees90) => 1,
        Ok(PdfPageRenderRotation::Degrees180) => 2,
        Ok(PdfPageRenderRotation::Degrees270) => 3,
        _ => 0,
    };

    let boundaries = page.boundaries();
    match boundaries.crop().or_else(|_| boundaries.media()) {
        Ok(boundary) => {
            let r = boundary.bounds;
            PageFrame {
                left: r.left().value,
                bottom: r.bottom().value,
                width: r.right().value - r.left().value,
                height: r.top().value - r.bottom().value,
                quarter_turns,
            }
        }
        Err(e) => {
            debug!("Page box unavailable, using rendered size: {:?}", e);
            let (w, h) = (page.width().value, page.height().value);
            let (width, height) = if quarter_turns % 2 == 1 { (h, w) } else { (w, h) };
            PageFrame {
                left: 0.0,
                bottom: 0.0,
                width,
                height,
                quarter_turns,
            }
        }
    }
}

/// A positioned page object, before grouping.
#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    Text { span: Span, bbox: Rect },
    Image { bbox: Rect },
}

/// Group positioned page objects into lines and blocks, keeping their order.
///
/// Runs that touch on one line with the same size and weight are joined into
/// a single span, so glyph-by-glyph positioned text still reads as words.
pub fn assemble_page(items: Vec<PageItem>) -> Page {
    let mut blocks = Vec::new();
    let mut lines: Vec<OpenLine> = Vec::new();

    for item in items {
        match item {
            PageItem::Text { span, bbox } => match lines.last_mut() {
                Some(open) if open.bbox.overlaps_vertically(&bbox) => open.push(span, bbox),
                Some(open) => {
                    let gap = bbox.top - open.bbox.bottom;
                    let jumped_up = bbox.bottom <= open.bbox.top;
                    if jumped_up || gap > BLOCK_GAP_FACTOR * span.size {
                        flush_text_block(&mut blocks, &mut lines);
                    }
                    lines.push(OpenLine::new(span, bbox));
                }
                None => lines.push(OpenLine::new(span, bbox)),
            },
            PageItem::Image { bbox } => {
                flush_text_block(&mut blocks, &mut lines);
                let index = blocks.len();
                blocks.push(Block::Image(ImageBlock { index, bbox }));
            }
        }
    }
    flush_text_block(&mut blocks, &mut lines);

    Page::new(blocks)
}

/// A line under construction: its bounds and the bounds of its last run.
struct OpenLine {
    line: Line,
    bbox: Rect,
    last: Rect,
}

impl OpenLine {
    fn new(span: Span, bbox: Rect) -> Self {
        Self {
            line: Line::new(vec![span]),
            bbox,
            last: bbox,
        }
    }

    fn push(&mut self, span: Span, bbox: Rect) {
        let gap = bbox.left - self.last.right;
        match self.line.spans.last_mut() {
            Some(prev)
                if prev.size == span.size
                    && prev.bold == span.bold
                    && gap.abs() <= GLYPH_GAP_FACTOR * span.size =>
            {
                prev.text.push_str(&span.text);
            }
            _ => self.line.spans.push(span),
        }
        self.bbox = self.bbox.union(&bbox);
        self.last = bbox;
    }
}

fn flush_text_block(blocks: &mut Vec<Block>, lines: &mut Vec<OpenLine>) {
    if lines.is_empty() {
        return;
    }
    let lines = std::mem::take(lines).into_iter().map(|open| open.line).collect();
    blocks.push(Block::Text(TextBlock::new(lines)));
}

/// Span flag mask for a pdfium font. Only [`BOLD_FLAG`] is derived.
fn font_flags(font: &PdfFont<'_>) -> u32 {
    if is_bold_font(font) {
        BOLD_FLAG
    } else {
        0
    }
}

fn is_bold_font(font: &PdfFont<'_>) -> bool {
    let heavy = match font.weight() {
        Ok(PdfFontWeight::Weight700Bold)
        | Ok(PdfFontWeight::Weight800)
        | Ok(PdfFontWeight::Weight900) => true,
        Ok(PdfFontWeight::Custom(weight)) => weight >= BOLD_WEIGHT,
        _ => false,
    };
    heavy || font.is_bold_reenforced() || name_suggests_bold(&font.name())
}

/// Base-font names such as `Helvetica-Bold` or `ABCDEF+Arial,Black` carry the weight.
fn name_suggests_bold(font_name: &str) -> bool {
    let upper = font_name.to_uppercase();
    ["BOLD", "BLACK", "HEAVY"].iter().any(|w| upper.contains(w))
}

//! In-memory document model consumed by the conversion pipeline.
//!
//! The model is produced once by the parsing collaborator
//! ([`crate::pipeline::extract`] for pdfium, or any caller building it by
//! hand) and is read-only afterwards. Blocks on a page are already in reading
//! order; the pipeline never reorders them.

use serde::{Deserialize, Serialize};

/// Bit in a PyMuPDF-style span flag mask that marks bold text.
pub const BOLD_FLAG: u32 = 1 << 4;

/// An ordered sequence of pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Iterate over every span of every text block, in document order.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.pages.iter().flat_map(Page::spans)
    }

    /// Number of image blocks across all pages.
    pub fn image_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .filter(|b| matches!(b, Block::Image(_)))
            .count()
    }
}

/// One page: blocks in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Text(text) => Some(text),
                Block::Image(_) => None,
            })
            .flat_map(|text| text.spans())
    }
}

/// A page block: either text or an embedded raster region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Text(TextBlock),
    Image(ImageBlock),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub lines: Vec<Line>,
}

impl TextBlock {
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.lines.iter().flat_map(|l| l.spans.iter())
    }
}

/// An image region of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    /// Identifier unique within the page (the block's position in the page).
    pub index: usize,
    /// Region in page coordinates.
    pub bbox: Rect,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }
}

/// The atomic unit of heading classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    /// Font size in points.
    pub size: f32,
    pub bold: bool,
}

impl Span {
    pub fn new(text: impl Into<String>, size: f32, bold: bool) -> Self {
        Self {
            text: text.into(),
            size,
            bold,
        }
    }

    /// Build a span from a font-attribute flag mask, where [`BOLD_FLAG`] marks bold.
    pub fn from_flags(text: impl Into<String>, size: f32, flags: u32) -> Self {
        Self::new(text, size, flags & BOLD_FLAG != 0)
    }
}

/// Axis-aligned rectangle in points, top-left origin (y grows downward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// True when the vertical extents of the two rectangles intersect.
    pub fn overlaps_vertically(&self, other: &Rect) -> bool {
        self.top < other.bottom && other.top < self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_flag_is_bit_four() {
        assert!(Span::from_flags("a", 10.0, 16).bold);
        assert!(Span::from_flags("a", 10.0, 16 | 2 | 1).bold);
        assert!(!Span::from_flags("a", 10.0, 2 | 4 | 8).bold);
        assert!(!Span::from_flags("a", 10.0, 0).bold);
    }

    #[test]
    fn spans_skip_image_blocks() {
        let doc = Document::new(vec![Page::new(vec![
            Block::Text(TextBlock::new(vec![
                Line::new(vec![Span::new("a", 10.0, false), Span::new("b", 10.0, true)]),
                Line::new(vec![Span::new("c", 12.0, false)]),
            ])),
            Block::Image(ImageBlock {
                index: 1,
                bbox: Rect::new(0.0, 0.0, 10.0, 10.0),
            }),
        ])]);
        let texts: Vec<&str> = doc.spans().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert_eq!(doc.image_count(), 1);
    }

    #[test]
    fn rect_geometry() {
        let a = Rect::new(0.0, 0.0, 10.0, 5.0);
        let b = Rect::new(5.0, 4.0, 20.0, 12.0);
        assert_eq!(a.width(), 10.0);
        assert_eq!(a.height(), 5.0);
        assert!(a.overlaps_vertically(&b));
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 20.0, 12.0));
        let c = Rect::new(0.0, 6.0, 10.0, 9.0);
        assert!(!a.overlaps_vertically(&c));
    }
}

//! Page rendering: turn the document model into one linear Markdown buffer.
//!
//! Every span is classified on its own against the [`CorpusBaseline`]:
//!
//! - a span is a heading when it is noticeably larger than body text
//!   (`size > common_size * 1.1`), or when it is bold in a document whose
//!   body text is not bold;
//! - the heading level grows by one for every 2 points above body size,
//!   clamped to `1..=3`.
//!
//! Headings become their own paragraph; body spans run together separated by
//! single spaces, and every text block ends with a newline. Image blocks are
//! rasterised, saved through an [`ImageSink`] and referenced by relative
//! path. The buffer is not tidied here; that is the normaliser's job.

use crate::config::{ConversionConfig, ImageFailurePolicy};
use crate::error::ConvertError;
use crate::model::{Block, Document, ImageBlock, Span, TextBlock};
use crate::output::ConversionStats;
use crate::pipeline::analyze::CorpusBaseline;
use crate::pipeline::images::{encode_png, image_file_name, ImageSink};
use crate::pipeline::raster::Rasterizer;
use tracing::{debug, warn};

/// A span must exceed the body size by this factor to count as a heading.
pub const HEADING_SIZE_RATIO: f32 = 1.1;

/// Points of extra size per heading level.
pub const HEADING_LEVEL_STEP: f32 = 2.0;

/// Deepest heading level emitted.
pub const MAX_HEADING_LEVEL: usize = 3;

/// How a single span is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanClass {
    /// Heading of level `1..=MAX_HEADING_LEVEL`.
    Heading(usize),
    Body,
}

/// Classify one span against the document baseline.
pub fn classify(span: &Span, baseline: &CorpusBaseline) -> SpanClass {
    let larger = span.size > baseline.common_size * HEADING_SIZE_RATIO;
    let bold_in_plain_document = span.bold && !baseline.common_bold;
    if larger || bold_in_plain_document {
        SpanClass::Heading(heading_level(span.size, baseline.common_size))
    } else {
        SpanClass::Body
    }
}

/// Heading level for a span of `size` in a document whose body size is `common_size`.
pub fn heading_level(size: f32, common_size: f32) -> usize {
    let steps = ((size - common_size) / HEADING_LEVEL_STEP).floor() as i64 + 1;
    steps.clamp(1, MAX_HEADING_LEVEL as i64) as usize
}

/// Append-only Markdown accumulator, consumed once by the normaliser.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MarkdownBuffer {
    text: String,
}

impl MarkdownBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `"#" * level + " " + text + "\n\n"`.
    pub fn push_heading(&mut self, level: usize, text: &str) {
        for _ in 0..level {
            self.text.push('#');
        }
        self.text.push(' ');
        self.text.push_str(text);
        self.text.push_str("\n\n");
    }

    /// Append `text + " "`.
    pub fn push_body(&mut self, text: &str) {
        self.text.push_str(text);
        self.text.push(' ');
    }

    /// Close a text block.
    pub fn end_block(&mut self) {
        self.text.push('\n');
    }

    /// Append `![Image](path)\n\n`.
    pub fn push_image(&mut self, relative_path: &str) {
        self.text.push_str("![Image](");
        self.text.push_str(relative_path);
        self.text.push_str(")\n\n");
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Result of walking a document: the raw Markdown plus counters.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub buffer: MarkdownBuffer,
    pub stats: ConversionStats,
}

/// Walk every page and block of `document` in order and build the Markdown.
///
/// Progress is reported after each page as `(completed / total) * 100`.
///
/// # Errors
/// - [`ConvertError::OutputWriteFailed`] if the sink cannot write an image.
/// - [`ConvertError::RasterizationFailed`] if an image cannot be rasterised
///   and the policy is [`ImageFailurePolicy::Abort`].
pub fn render(
    document: &Document,
    baseline: &CorpusBaseline,
    rasterizer: &dyn Rasterizer,
    sink: &mut dyn ImageSink,
    config: &ConversionConfig,
) -> Result<Rendered, ConvertError> {
    let total_pages = document.pages.len();
    let mut buffer = MarkdownBuffer::new();
    let mut stats = ConversionStats {
        total_pages,
        ..ConversionStats::default()
    };

    for (page_index, page) in document.pages.iter().enumerate() {
        let page_num = page_index + 1;
        for block in &page.blocks {
            match block {
                Block::Text(text) => render_text_block(text, baseline, &mut buffer, &mut stats),
                Block::Image(image) => render_image_block(
                    page_index,
                    image,
                    rasterizer,
                    sink,
                    config,
                    &mut buffer,
                    &mut stats,
                )?,
            }
        }

        let percent = (page_num as f64 / total_pages as f64) * 100.0;
        debug!("Page {}/{} rendered ({:.1}%)", page_num, total_pages, percent);
        if let Some(ref cb) = config.progress_callback {
            cb.on_progress(percent);
        }
    }

    Ok(Rendered { buffer, stats })
}

fn render_text_block(
    block: &TextBlock,
    baseline: &CorpusBaseline,
    buffer: &mut MarkdownBuffer,
    stats: &mut ConversionStats,
) {
    for span in block.spans() {
        let text = span.text.trim();
        stats.span_count += 1;
        match classify(span, baseline) {
            SpanClass::Heading(level) => {
                stats.heading_count += 1;
                buffer.push_heading(level, text);
            }
            SpanClass::Body => {
                stats.body_count += 1;
                buffer.push_body(text);
            }
        }
    }
    buffer.end_block();
}

fn render_image_block(
    page_index: usize,
    image: &ImageBlock,
    rasterizer: &dyn Rasterizer,
    sink: &mut dyn ImageSink,
    config: &ConversionConfig,
    buffer: &mut MarkdownBuffer,
    stats: &mut ConversionStats,
) -> Result<(), ConvertError> {
    let page_num = page_index + 1;

    let png = rasterizer
        .rasterize(page_index, &image.bbox, config.image_scale)
        .map_err(|e| e.to_string())
        .and_then(|bitmap| encode_png(&bitmap).map_err(|e| format!("PNG encoding failed: {e}")));

    let png = match png {
        Ok(png) => png,
        Err(detail) => match config.image_failure {
            ImageFailurePolicy::Abort => {
                return Err(ConvertError::RasterizationFailed {
                    page: page_num,
                    block: image.index,
                    detail,
                })
            }
            ImageFailurePolicy::Skip => {
                warn!(
                    "Skipping image {} on page {}: {}",
                    image.index, page_num, detail
                );
                stats.skipped_images += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_skipped(page_num, image.index, &detail);
                }
                return Ok(());
            }
        },
    };

    let file_name = image_file_name(page_num, image.index);
    let relative_path = sink.save(&file_name, &png)?;
    buffer.push_image(&relative_path);
    stats.image_count += 1;
    Ok(())
}

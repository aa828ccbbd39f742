//! # pdftomd
//!
//! Convert PDF documents to Markdown by reading their typography.
//!
//! PDFs carry no reliable structure: a heading is just text in a bigger or
//! bolder font. This crate measures which font size and weight the document
//! uses most, treats that as body text, and marks everything noticeably
//! larger, or bold in an otherwise plain document, as a heading. Embedded
//! images are cropped out of the rendered page, saved next to the Markdown
//! file and linked by relative path.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate the path and the %PDF magic bytes
//!  ├─ 2. Extract  pdfium page objects → pages / blocks / lines / spans
//!  ├─ 3. Analyze  most common font size and boldness over every span
//!  ├─ 4. Render   spans → headings (#, ##, ###) or body; images → PNG files
//!  ├─ 5. Polish   collapse blank-line and space runs
//!  └─ 6. Output   {name}.md + {name}_images/
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdftomd::{convert_to_file, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let output = convert_to_file("paper.pdf", "paper.md", &ConversionConfig::default())?;
//!     eprintln!(
//!         "body text: {}pt, {} headings, {} images",
//!         output.baseline.common_size,
//!         output.stats.heading_count,
//!         output.stats.image_count
//!     );
//!     Ok(())
//! }
//! ```
//!
//! Callers with their own parser can build a [`Document`] by hand and call
//! [`convert_document`] with any [`Rasterizer`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdftomd` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, ImageFailurePolicy};
pub use convert::{
    convert_async, convert_document, convert_from_bytes, convert_to_file, inspect, summarize,
};
pub use error::{ConvertError, ErrorKind};
pub use model::{Block, Document, ImageBlock, Line, Page, Rect, Span, TextBlock};
pub use output::{ConversionOutput, ConversionStats, DocumentSummary};
pub use pipeline::analyze::{analyze, CorpusBaseline};
pub use pipeline::images::{DirImageSink, ImageSink};
pub use pipeline::input::default_output_path;
pub use pipeline::postprocess::normalize;
pub use pipeline::raster::{RasterError, Rasterizer};
pub use pipeline::render::{classify, heading_level, render, MarkdownBuffer, SpanClass};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};

//! Result types returned by the conversion entry points.

use crate::pipeline::analyze::CorpusBaseline;
use serde::Serialize;
use std::path::PathBuf;

/// Everything produced by one successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    /// The normalised Markdown, exactly as written to `markdown_path`.
    pub markdown: String,
    pub markdown_path: PathBuf,
    /// Folder holding the extracted images (may not exist if there were none).
    pub images_dir: PathBuf,
    pub baseline: CorpusBaseline,
    pub stats: ConversionStats,
}

/// Counters collected while rendering a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionStats {
    pub total_pages: usize,
    pub span_count: usize,
    pub heading_count: usize,
    pub body_count: usize,
    /// Images written to the image folder.
    pub image_count: usize,
    /// Image blocks skipped because they failed to rasterise.
    pub skipped_images: usize,
    pub duration_ms: u64,
}

/// What [`crate::convert::inspect`] reports about a document without converting it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub page_count: usize,
    pub span_count: usize,
    pub image_count: usize,
    pub baseline: CorpusBaseline,
}

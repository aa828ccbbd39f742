//! Conversion entry points.
//!
//! [`convert_document`] is the whole pipeline over an already-extracted
//! [`Document`]; the other functions put pdfium in front of it. Everything
//! runs to completion on the calling thread: the document is read and
//! analysed in full before the first byte of Markdown is produced.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::model::Document;
use crate::output::{ConversionOutput, DocumentSummary};
use crate::pipeline::images::DirImageSink;
use crate::pipeline::raster::{PdfiumRasterizer, Rasterizer};
use crate::pipeline::render::Rendered;
use crate::pipeline::{analyze, extract, input, postprocess, render};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Convert an extracted document to a Markdown file plus its image folder.
///
/// # Arguments
/// * `document`    — the page model, from [`extract`] or any other parser
/// * `rasterizer`  — renders the image blocks of `document`
/// * `output_path` — where the Markdown goes; images land in
///   `{stem}_images/` next to it
/// * `config`      — conversion configuration
///
/// # Errors
/// - [`ConvertError::EmptyDocument`] before anything is written, if there are no spans
/// - [`ConvertError::OutputWriteFailed`] if the Markdown or an image cannot be written
/// - [`ConvertError::RasterizationFailed`] under [`crate::ImageFailurePolicy::Abort`]
pub fn convert_document(
    document: &Document,
    rasterizer: &dyn Rasterizer,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let start = Instant::now();
    let output_path = output_path.as_ref();

    // ── Step 1: Corpus baseline ──────────────────────────────────────────
    let baseline = analyze::analyze(document)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(document.pages.len());
    }

    // ── Step 2: Render pages ─────────────────────────────────────────────
    let mut sink = DirImageSink::for_markdown(output_path);
    let Rendered { buffer, mut stats } =
        render::render(document, &baseline, rasterizer, &mut sink, config)?;

    // ── Step 3: Normalise and write ──────────────────────────────────────
    let markdown = postprocess::normalize(&buffer.into_string());
    write_markdown(output_path, &markdown)?;
    if stats.image_count > 0 {
        debug!("Images referenced as {}/…", sink.dir_name());
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Conversion complete: {} pages, {} headings, {} images ({} skipped), {}ms → {}",
        stats.total_pages,
        stats.heading_count,
        stats.image_count,
        stats.skipped_images,
        stats.duration_ms,
        output_path.display()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(&stats);
    }

    Ok(ConversionOutput {
        markdown,
        markdown_path: output_path.to_path_buf(),
        images_dir: sink.dir().to_path_buf(),
        baseline,
        stats,
    })
}

/// Convert a PDF file to Markdown at `output_path`.
///
/// This is the primary entry point for the library.
pub fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let pdf_path = input::resolve_input(input_path.as_ref())?;
    info!("Starting conversion: {}", pdf_path.display());

    let pdfium = extract::bind_pdfium(config.pdfium_library_path.as_deref())?;
    let pdf = extract::load_document(&pdfium, &pdf_path, config.password.as_deref())?;
    let document = extract::extract_document(&pdf);
    let rasterizer = PdfiumRasterizer::new(&pdf);

    convert_document(&document, &rasterizer, output_path, config)
}

/// Run [`convert_to_file`] on tokio's blocking pool.
///
/// pdfium calls are blocking, so async callers should use this rather than
/// calling [`convert_to_file`] from a runtime worker thread.
pub async fn convert_async(
    input_path: impl Into<PathBuf>,
    output_path: impl Into<PathBuf>,
    config: ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let input_path = input_path.into();
    let output_path = output_path.into();
    tokio::task::spawn_blocking(move || convert_to_file(&input_path, &output_path, &config))
        .await
        .map_err(|e| ConvertError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Convert PDF bytes in memory to a Markdown file.
///
/// The bytes are written to a managed [`tempfile`] that is removed on return.
pub fn convert_from_bytes(
    bytes: &[u8],
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| ConvertError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ConvertError::Internal(format!("tempfile write: {e}")))?;
    convert_to_file(tmp.path(), output_path, config)
}

/// Report page, span and image counts and the body-text baseline of a PDF
/// without writing anything.
pub fn inspect(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<DocumentSummary, ConvertError> {
    let pdf_path = input::resolve_input(input_path.as_ref())?;
    let pdfium = extract::bind_pdfium(config.pdfium_library_path.as_deref())?;
    let pdf = extract::load_document(&pdfium, &pdf_path, config.password.as_deref())?;
    summarize(&extract::extract_document(&pdf))
}

/// [`DocumentSummary`] of an extracted document.
pub fn summarize(document: &Document) -> Result<DocumentSummary, ConvertError> {
    Ok(DocumentSummary {
        page_count: document.pages.len(),
        span_count: document.spans().count(),
        image_count: document.image_count(),
        baseline: analyze::analyze(document)?,
    })
}

/// Write the Markdown atomically: temp file in the same folder, then rename.
fn write_markdown(path: &Path, markdown: &str) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConvertError::write_failed(path, e))?;
    }

    let tmp_path = path.with_extension("md.tmp");
    std::fs::write(&tmp_path, markdown).map_err(|e| ConvertError::write_failed(path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        ConvertError::write_failed(path, e)
    })
}

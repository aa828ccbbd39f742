//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`]. The
//! pipeline only ever notifies; it never waits on the callback's consumer.
//!
//! Any `Fn(f64) + Send + Sync` closure is a callback that receives the
//! per-page percentage:
//!
//! ```rust
//! use pdftomd::{ConversionConfig, ProgressCallback};
//! use std::sync::Arc;
//!
//! let cb: ProgressCallback = Arc::new(|percent: f64| eprintln!("{percent:.0}%"));
//! let config = ConversionConfig::builder()
//!     .progress_callback(cb)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ConversionStats;
use std::sync::Arc;

/// Called by the conversion pipeline as it walks the document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after the baseline is known, before the first page is rendered.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called once per completed page with `(pages_completed / total_pages) * 100`.
    ///
    /// Values are in `[0, 100]` and strictly increase within one conversion.
    fn on_progress(&self, percent: f64) {
        let _ = percent;
    }

    /// Called when an image block is skipped because it failed to rasterise.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `block_index` — the image block's index within its page
    /// * `error`       — human-readable error description
    fn on_image_skipped(&self, page_num: usize, block_index: usize, error: &str) {
        let _ = (page_num, block_index, error);
    }

    /// Called once after the Markdown file has been written.
    fn on_conversion_complete(&self, stats: &ConversionStats) {
        let _ = stats;
    }
}

impl<F> ConversionProgressCallback for F
where
    F: Fn(f64) + Send + Sync,
{
    fn on_progress(&self, percent: f64) {
        self(percent)
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

//! Pipeline stages for PDF-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ analyze ──▶ render ──▶ postprocess
//! (path)    (pdfium)    (baseline)  (+raster,   (normalise)
//!                                    images)
//! ```
//!
//! 1. [`input`]   — validate the user-supplied path before pdfium sees it
//! 2. [`extract`] — load the PDF and build the page/block/line/span model
//! 3. [`analyze`] — compute the body-text baseline over the whole document
//! 4. [`render`]  — classify spans, rasterise images via [`raster`] and save
//!    them via [`images`], accumulating one Markdown buffer
//! 5. [`postprocess`] — collapse blank-line and space runs

pub mod analyze;
pub mod extract;
pub mod images;
pub mod input;
pub mod postprocess;
pub mod raster;
pub mod render;

//! Rasterising image regions of a page.
//!
//! The renderer only sees the [`Rasterizer`] trait, so it can run against the
//! pdfium-backed [`PdfiumRasterizer`] or an in-memory stand-in.

use crate::model::Rect;
use image::DynamicImage;
use pdfium_render::prelude::*;
use thiserror::Error;
use tracing::debug;

/// A single region could not be turned into a bitmap.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct RasterError(pub String);

/// Produces a bitmap of a page region at a given magnification.
pub trait Rasterizer {
    /// Rasterise `region` of the 0-indexed page `page_index` at `scale`
    /// pixels per point. `region` is in points on the page as displayed:
    /// top-left of the crop box, `/Rotate` already applied.
    fn rasterize(
        &self,
        page_index: usize,
        region: &Rect,
        scale: f32,
    ) -> Result<DynamicImage, RasterError>;
}

/// Crop `region` out of a page bitmap that was rendered at `scale`.
///
/// The region is clamped to the bitmap; an empty result is an error.
pub fn crop_region(
    page_image: &DynamicImage,
    region: &Rect,
    scale: f32,
) -> Result<DynamicImage, RasterError> {
    let (width, height) = (page_image.width(), page_image.height());
    let to_px = |v: f32, limit: u32| -> u32 { (v * scale).max(0.0).min(limit as f32) as u32 };

    let x0 = to_px(region.left.floor(), width);
    let y0 = to_px(region.top.floor(), height);
    let x1 = to_px(region.right.ceil(), width);
    let y1 = to_px(region.bottom.ceil(), height);

    if x1 <= x0 || y1 <= y0 {
        return Err(RasterError(format!(
            "region {:?} is empty or outside the {}x{} px page",
            region, width, height
        )));
    }
    Ok(page_image.crop_imm(x0, y0, x1 - x0, y1 - y0))
}

/// Rasteriser backed by a loaded pdfium document.
///
/// Each call renders the whole page and crops it; nothing is cached between
/// calls, so at most one page bitmap is alive at a time.
pub struct PdfiumRasterizer<'a, 'doc> {
    document: &'a PdfDocument<'doc>,
}

impl<'a, 'doc> PdfiumRasterizer<'a, 'doc> {
    pub fn new(document: &'a PdfDocument<'doc>) -> Self {
        Self { document }
    }
}

impl Rasterizer for PdfiumRasterizer<'_, '_> {
    fn rasterize(
        &self,
        page_index: usize,
        region: &Rect,
        scale: f32,
    ) -> Result<DynamicImage, RasterError> {
        let page = self
            .document
            .pages()
            .get(page_index as u16)
            .map_err(|e| RasterError(format!("{:?}", e)))?;

        let bitmap = page
            .render_with_config(&PdfRenderConfig::new().scale_page_by_factor(scale))
            .map_err(|e| RasterError(format!("{:?}", e)))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} at {}x → {}x{} px",
            page_index + 1,
            scale,
            image.width(),
            image.height()
        );
        crop_region(&image, region, scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn page(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])))
    }

    #[test]
    fn crop_scales_region() {
        let img = page(200, 400);
        let out = crop_region(&img, &Rect::new(10.0, 20.0, 60.0, 45.0), 2.0).unwrap();
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn crop_rounds_outward() {
        let img = page(200, 200);
        let out = crop_region(&img, &Rect::new(10.4, 10.6, 20.2, 20.1), 1.0).unwrap();
        assert_eq!((out.width(), out.height()), (11, 11));
    }

    #[test]
    fn crop_clamps_to_page() {
        let img = page(100, 100);
        let out = crop_region(&img, &Rect::new(-10.0, 40.0, 80.0, 200.0), 1.0).unwrap();
        assert_eq!((out.width(), out.height()), (80, 60));
    }

    #[test]
    fn crop_outside_page_fails() {
        let img = page(100, 100);
        assert!(crop_region(&img, &Rect::new(150.0, 0.0, 180.0, 10.0), 1.0).is_err());
        assert!(crop_region(&img, &Rect::new(10.0, 10.0, 10.0, 30.0), 1.0).is_err());
    }
}

//! Configuration types for PDF-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The heading heuristic itself is not
//! configurable; its constants live in [`crate::pipeline::render`].

use crate::error::ConvertError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Magnification applied when rasterising image regions.
pub const DEFAULT_IMAGE_SCALE: f32 = 2.0;

/// Configuration for a PDF-to-Markdown conversion.
///
/// # Example
/// ```rust
/// use pdftomd::{ConversionConfig, ImageFailurePolicy};
///
/// let config = ConversionConfig::builder()
///     .image_scale(3.0)
///     .image_failure(ImageFailurePolicy::Abort)
///     .build()
///     .unwrap();
/// assert_eq!(config.image_scale, 3.0);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Magnification used when rasterising image blocks. Range: 0.5–8.0. Default: 2.0.
    ///
    /// At 2× a 72-DPI page region comes out at 144 DPI, which stays legible
    /// on typical screens.
    pub image_scale: f32,

    /// What to do when a single image block cannot be rasterised. Default: skip.
    pub image_failure: ImageFailurePolicy,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Directory containing the pdfium shared library.
    /// If None, the system library search path is used.
    pub pdfium_library_path: Option<PathBuf>,

    /// Receives per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            image_scale: DEFAULT_IMAGE_SCALE,
            image_failure: ImageFailurePolicy::default(),
            password: None,
            pdfium_library_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("image_scale", &self.image_scale)
            .field("image_failure", &self.image_failure)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn image_scale(mut self, scale: f32) -> Self {
        self.config.image_scale = if scale.is_finite() {
            scale.clamp(0.5, 8.0)
        } else {
            scale
        };
        self
    }

    pub fn image_failure(mut self, policy: ImageFailurePolicy) -> Self {
        self.config.image_failure = policy;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if !c.image_scale.is_finite() || c.image_scale <= 0.0 {
            return Err(ConvertError::InvalidConfig(format!(
                "Image scale must be a positive number, got {}",
                c.image_scale
            )));
        }
        Ok(self.config)
    }
}

/// Policy for an image block that fails to rasterise or encode.
///
/// Writing a successfully encoded image is never covered by this policy:
/// write failures always abort the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageFailurePolicy {
    /// Log the failure, emit no image reference, and continue. (default)
    #[default]
    Skip,
    /// Fail the whole conversion.
    Abort,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgressCallback;
    use std::sync::Arc;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.image_scale, 2.0);
        assert_eq!(c.image_failure, ImageFailurePolicy::Skip);
        assert!(c.password.is_none());
        assert!(c.progress_callback.is_none());
    }

    #[test]
    fn image_scale_is_clamped() {
        let c = ConversionConfig::builder().image_scale(100.0).build().unwrap();
        assert_eq!(c.image_scale, 8.0);
        let c = ConversionConfig::builder().image_scale(0.1).build().unwrap();
        assert_eq!(c.image_scale, 0.5);
    }

    #[test]
    fn non_finite_scale_is_rejected() {
        let err = ConversionConfig::builder()
            .image_scale(f32::NAN)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_password() {
        let c = ConversionConfig::builder()
            .password("hunter2")
            .progress_callback(Arc::new(NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
        assert!(dbg.contains("<dyn ConversionProgressCallback>"));
    }
}

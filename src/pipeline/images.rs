//! Persisting extracted images next to the Markdown file.
//!
//! Images go to a sibling folder named after the Markdown file
//! (`report.md` → `report_images/`) and are referenced by a path relative to
//! the Markdown file's directory, so the two can be moved together.

use crate::error::ConvertError;
use image::DynamicImage;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persists an encoded PNG under a given file name and returns the path to
/// use in the Markdown reference.
pub trait ImageSink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> Result<String, ConvertError>;
}

/// Deterministic file name for the image at `block_index` on a 1-indexed page.
pub fn image_file_name(page_number: usize, block_index: usize) -> String {
    format!("image_page{page_number}_{block_index}.png")
}

/// Name of the image folder that belongs to `markdown_path`.
pub fn images_dir_name(markdown_path: &Path) -> String {
    let stem = markdown_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    format!("{stem}_images")
}

/// Encode an image as PNG in memory.
///
/// PNG keeps rendered text and line art crisp.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

/// Writes PNG files into `{markdown_dir}/{stem}_images/`.
///
/// The folder is created on the first save, so documents without images
/// leave no empty folder behind.
#[derive(Debug, Clone)]
pub struct DirImageSink {
    dir: PathBuf,
    dir_name: String,
    created: bool,
}

impl DirImageSink {
    /// Sink for the image folder belonging to `markdown_path`.
    pub fn for_markdown(markdown_path: &Path) -> Self {
        let dir_name = images_dir_name(markdown_path);
        let parent = markdown_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self {
            dir: parent.join(&dir_name),
            dir_name,
            created: false,
        }
    }

    /// Absolute (or caller-relative) path of the image folder.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Folder name as it appears in Markdown references.
    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }

    fn ensure_dir(&mut self) -> Result<(), ConvertError> {
        if !self.created {
            std::fs::create_dir_all(&self.dir)
                .map_err(|e| ConvertError::write_failed(&self.dir, e))?;
            self.created = true;
        }
        Ok(())
    }
}

impl ImageSink for DirImageSink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> Result<String, ConvertError> {
        self.ensure_dir()?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, png).map_err(|e| ConvertError::write_failed(&path, e))?;
        debug!("Saved {} ({} bytes)", path.display(), png.len());
        Ok(format!("{}/{}", self.dir_name, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn red_square() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])))
    }

    fn red_png() -> Vec<u8> {
        encode_png(&red_square()).unwrap()
    }

    #[test]
    fn file_name_uses_page_and_block() {
        assert_eq!(image_file_name(3, 2), "image_page3_2.png");
        assert_eq!(image_file_name(1, 0), "image_page1_0.png");
    }

    #[test]
    fn dir_name_follows_markdown_stem() {
        assert_eq!(images_dir_name(Path::new("/out/report.md")), "report_images");
        assert_eq!(images_dir_name(Path::new("notes")), "notes_images");
    }

    #[test]
    fn encode_png_has_signature() {
        let bytes = encode_png(&red_square()).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn sink_writes_png_and_returns_relative_path() {
        let tmp = tempfile::tempdir().unwrap();
        let md = tmp.path().join("doc.md");
        let mut sink = DirImageSink::for_markdown(&md);
        assert!(!sink.dir().exists(), "folder is created lazily");

        let rel = sink.save("image_page1_0.png", &red_png()).unwrap();
        assert_eq!(rel, "doc_images/image_page1_0.png");

        let written = tmp.path().join("doc_images").join("image_page1_0.png");
        let decoded = image::open(&written).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 4));
    }

    #[test]
    fn sink_reuses_existing_folder() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("doc_images")).unwrap();
        let mut sink = DirImageSink::for_markdown(&tmp.path().join("doc.md"));
        sink.save("a.png", &red_png()).unwrap();
        sink.save("b.png", &red_png()).unwrap();
        assert!(tmp.path().join("doc_images/a.png").exists());
        assert!(tmp.path().join("doc_images/b.png").exists());
    }

    #[test]
    fn sink_reports_write_failure() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where the image folder should go.
        std::fs::write(tmp.path().join("doc_images"), b"not a dir").unwrap();
        let mut sink = DirImageSink::for_markdown(&tmp.path().join("doc.md"));
        let err = sink.save("a.png", &red_png()).unwrap_err();
        assert!(matches!(err, ConvertError::OutputWriteFailed { .. }), "{err}");
    }

    #[test]
    fn bare_file_name_uses_current_dir() {
        let sink = DirImageSink::for_markdown(Path::new("doc.md"));
        assert_eq!(sink.dir(), Path::new("./doc_images"));
        assert_eq!(sink.dir_name(), "doc_images");
    }
}

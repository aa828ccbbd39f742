//! Error types for the pdftomd library.
//!
//! Every fatal condition is a [`ConvertError`]. Conversion is all-or-nothing
//! at the document level, so there is no per-page error type: the only
//! non-fatal failure is a skipped image under
//! [`crate::config::ImageFailurePolicy::Skip`], which is recorded in
//! [`crate::output::ConversionStats`] instead of being returned.
//!
//! Variants are grouped into a coarse [`ErrorKind`] so a presentation layer
//! can pick a user-facing message without matching on every variant.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdftomd library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Analysis errors ───────────────────────────────────────────────────
    /// The document contains no text spans, so no body-text baseline exists.
    #[error("Document contains no text spans; cannot determine the body-text baseline")]
    EmptyDocument,

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Image errors ──────────────────────────────────────────────────────
    /// An image block could not be rasterised or encoded.
    #[error("Rasterisation failed for image {block} on page {page}: {detail}")]
    RasterizationFailed {
        page: usize,
        block: usize,
        detail: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the Markdown file, an image, or the image folder.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium for your platform, or point PDFIUM_LIB_PATH at the\n\
directory that contains it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`ConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    /// No spans to compute a baseline from.
    EmptyDocument,
    /// The input could not be opened or parsed.
    UnreadableInput,
    /// The Markdown file or an image could not be written.
    OutputWriteFailure,
    /// An image block could not be rasterised.
    RasterizationFailure,
    /// Bad configuration or missing pdfium library.
    Configuration,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Default one-line message for end users.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::EmptyDocument => "The PDF has no extractable text to convert.",
            ErrorKind::UnreadableInput => "The PDF could not be opened.",
            ErrorKind::OutputWriteFailure => "The Markdown output could not be written.",
            ErrorKind::RasterizationFailure => "An embedded image could not be extracted.",
            ErrorKind::Configuration => "The converter is not configured correctly.",
            ErrorKind::Internal => "An unexpected error occurred during conversion.",
        }
    }
}

impl ConvertError {
    /// The [`ErrorKind`] this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::EmptyDocument => ErrorKind::EmptyDocument,
            ConvertError::FileNotFound { .. }
            | ConvertError::PermissionDenied { .. }
            | ConvertError::NotAPdf { .. }
            | ConvertError::CorruptPdf { .. }
            | ConvertError::PasswordRequired { .. }
            | ConvertError::WrongPassword { .. } => ErrorKind::UnreadableInput,
            ConvertError::RasterizationFailed { .. } => ErrorKind::RasterizationFailure,
            ConvertError::OutputWriteFailed { .. } => ErrorKind::OutputWriteFailure,
            ConvertError::InvalidConfig(_) | ConvertError::PdfiumBindingFailed(_) => {
                ErrorKind::Configuration
            }
            ConvertError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::OutputWriteFailed {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_kind() {
        let e = ConvertError::EmptyDocument;
        assert_eq!(e.kind(), ErrorKind::EmptyDocument);
        assert!(e.to_string().contains("no text spans"));
    }

    #[test]
    fn input_errors_are_unreadable_input() {
        let path = PathBuf::from("/tmp/x.pdf");
        let errors = [
            ConvertError::FileNotFound { path: path.clone() },
            ConvertError::PermissionDenied { path: path.clone() },
            ConvertError::NotAPdf {
                path: path.clone(),
                magic: *b"PK\x03\x04",
            },
            ConvertError::CorruptPdf {
                path: path.clone(),
                detail: "bad xref".into(),
            },
            ConvertError::PasswordRequired { path: path.clone() },
            ConvertError::WrongPassword { path },
        ];
        for e in errors {
            assert_eq!(e.kind(), ErrorKind::UnreadableInput, "{e}");
        }
    }

    #[test]
    fn rasterization_display() {
        let e = ConvertError::RasterizationFailed {
            page: 3,
            block: 2,
            detail: "empty region".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 3"), "got: {msg}");
        assert!(msg.contains("image 2"), "got: {msg}");
        assert_eq!(e.kind(), ErrorKind::RasterizationFailure);
    }

    #[test]
    fn write_failure_keeps_source() {
        let e = ConvertError::write_failed(
            "/readonly/out.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(e.kind(), ErrorKind::OutputWriteFailure);
        assert!(std::error::Error::source(&e).is_some());
        assert!(e.to_string().contains("/readonly/out.md"));
    }

    #[test]
    fn every_kind_has_a_message() {
        for kind in [
            ErrorKind::EmptyDocument,
            ErrorKind::UnreadableInput,
            ErrorKind::OutputWriteFailure,
            ErrorKind::RasterizationFailure,
            ErrorKind::Configuration,
            ErrorKind::Internal,
        ] {
            assert!(!kind.user_message().is_empty());
        }
    }
}

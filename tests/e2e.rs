//! End-to-end tests against real PDF files through pdfium.
//!
//! These need the pdfium shared library and PDFs in `./test_cases/`, so they
//! are gated behind the `E2E_ENABLED` environment variable.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=. cargo test --test e2e -- --nocapture

use pdftomd::{
    convert_from_bytes, convert_to_file, default_output_path, inspect, ConversionConfig,
    ConvertError,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn config() -> ConversionConfig {
    let mut builder = ConversionConfig::builder();
    if let Ok(lib) = std::env::var("PDFIUM_LIB_PATH") {
        builder = builder.pdfium_library_path(lib);
    }
    builder.build().unwrap()
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

fn assert_markdown_shape(md: &str, context: &str) {
    assert!(!md.trim().is_empty(), "[{context}] Markdown is empty");
    assert!(
        !md.contains("\n\n\n"),
        "[{context}] Output has more than one consecutive blank line"
    );
    assert!(!md.contains("  "), "[{context}] Output has a run of spaces");
    for line in md.lines().filter(|l| l.starts_with('#')) {
        let hashes = line.chars().take_while(|&c| c == '#').count();
        assert!((1..=3).contains(&hashes), "[{context}] bad heading: {line:?}");
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn test_inspect_sample() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));

    let summary = inspect(&pdf, &config()).unwrap();
    println!("{summary:#?}");
    assert!(summary.page_count > 0);
    assert!(summary.span_count > 0);
    assert!(summary.baseline.common_size > 0.0);
}

#[test]
fn test_convert_sample() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let tmp = tempfile::tempdir().unwrap();
    let md_path = tmp.path().join("sample.md");

    let out = convert_to_file(&pdf, &md_path, &config()).unwrap();

    assert_markdown_shape(&out.markdown, "sample");
    assert_eq!(std::fs::read_to_string(&md_path).unwrap(), out.markdown);
    if out.stats.image_count > 0 {
        assert!(out.images_dir.is_dir());
        assert!(out.markdown.contains("![Image](sample_images/"));
    }
}

#[test]
fn test_convert_from_bytes_matches_file() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let tmp = tempfile::tempdir().unwrap();

    let from_file = convert_to_file(&pdf, tmp.path().join("a.md"), &config()).unwrap();
    let bytes = std::fs::read(&pdf).unwrap();
    let from_bytes = convert_from_bytes(&bytes, tmp.path().join("b.md"), &config()).unwrap();

    assert_eq!(
        from_file.markdown.replace("a_images/", ""),
        from_bytes.markdown.replace("b_images/", "")
    );
    assert_eq!(from_file.baseline, from_bytes.baseline);
}

#[test]
fn test_not_a_pdf_is_rejected() {
    let _ = e2e_skip_unless_ready!(test_cases_dir());
    let tmp = tempfile::tempdir().unwrap();
    let fake = tmp.path().join("fake.pdf");
    std::fs::write(&fake, b"hello, not a pdf").unwrap();

    let err = convert_to_file(&fake, default_output_path(&fake), &config()).unwrap_err();
    assert!(matches!(err, ConvertError::NotAPdf { .. }), "{err}");
}

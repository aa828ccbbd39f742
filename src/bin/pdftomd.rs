//! CLI binary for pdftomd.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdftomd::{
    convert_async, default_output_path, inspect, ConversionConfig, ConversionProgressCallback,
    ConversionStats, ConvertError, ImageFailurePolicy, ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Percentage bar driven by the library's per-page progress events.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.bar.set_message(format!("{total_pages} pages"));
    }

    fn on_progress(&self, percent: f64) {
        self.bar.set_position(percent.round().clamp(0.0, 100.0) as u64);
    }

    fn on_image_skipped(&self, page_num: usize, block_index: usize, error: &str) {
        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} page {:>3} image {:<3} {}",
            red("✗"),
            page_num,
            block_index,
            dim(&msg)
        ));
    }

    fn on_conversion_complete(&self, stats: &ConversionStats) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages, {} headings, {} images",
            if stats.skipped_images == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            bold(&stats.total_pages.to_string()),
            stats.heading_count,
            stats.image_count,
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert next to the input (writes report.md and report_images/)
  pdftomd report.pdf

  # Choose the output file
  pdftomd report.pdf -o notes/report.md

  # Sharper images, fail on the first broken one
  pdftomd --image-scale 3 --on-image-error abort scan.pdf

  # Show page/span/image counts and the body-text baseline
  pdftomd --inspect-only --json report.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  PDFTOMD_OUTPUT          Default output path
  PDFTOMD_IMAGE_SCALE     Image render scale
  PDFTOMD_PASSWORD        PDF user password
  RUST_LOG                Override log filter
"#;

/// Convert PDF files to Markdown using font-size statistics.
#[derive(Parser, Debug)]
#[command(
    name = "pdftomd",
    version,
    about = "Convert PDF files to Markdown, inferring headings from font sizes",
    long_about = "Convert a PDF into a Markdown file. The most common font size and weight \
in the document are taken as body text; larger or unusually bold text becomes a heading. \
Embedded images are saved as PNG files in a folder next to the output.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Markdown output path (default: input with `.md` extension).
    #[arg(short, long, env = "PDFTOMD_OUTPUT")]
    output: Option<PathBuf>,

    /// Render scale for extracted images (0.5–8.0).
    #[arg(long, env = "PDFTOMD_IMAGE_SCALE", default_value_t = 2.0)]
    image_scale: f32,

    /// What to do when an embedded image cannot be extracted.
    #[arg(long, env = "PDFTOMD_ON_IMAGE_ERROR", value_enum, default_value = "skip")]
    on_image_error: ImageErrorArg,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFTOMD_PASSWORD")]
    password: Option<String>,

    /// Path to the pdfium shared library or its directory.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print a document summary only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print results as JSON.
    #[arg(long, env = "PDFTOMD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFTOMD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFTOMD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFTOMD_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ImageErrorArg {
    Skip,
    Abort,
}

impl From<ImageErrorArg> for ImageFailurePolicy {
    fn from(v: ImageErrorArg) -> Self {
        match v {
            ImageErrorArg::Skip => ImageFailurePolicy::Skip,
            ImageErrorArg::Abort => ImageFailurePolicy::Abort,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless --verbose is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli, show_progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, show_progress: bool) -> Result<()> {
    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let config = build_config(&cli, None)?;
        let summary = inspect(&cli.input, &config).context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            println!("Pages:        {}", summary.page_count);
            println!("Text spans:   {}", summary.span_count);
            println!("Images:       {}", summary.image_count);
            println!("Body size:    {}", summary.baseline.common_size);
            println!("Body bold:    {}", summary.baseline.common_bold);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    let output = convert_async(cli.input.clone(), output_path.clone(), config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            output.stats.total_pages,
            output.stats.duration_ms,
            bold(&output_path.display().to_string()),
        );
        if output.stats.image_count > 0 {
            eprintln!(
                "   {} images in {}",
                output.stats.image_count,
                dim(&output.images_dir.display().to_string())
            );
        }
        if output.stats.skipped_images > 0 {
            eprintln!("   {} images skipped", red(&output.stats.skipped_images.to_string()));
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .image_scale(cli.image_scale)
        .image_failure(cli.on_image_error.clone().into());

    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(lib.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Print the user-facing message for a library error, then the detail chain.
fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<ConvertError>() {
        Some(convert_err) => {
            eprintln!("{} {}", red("✘"), bold(convert_err.kind().user_message()));
            eprintln!("  {}", dim(&convert_err.to_string()));
        }
        None => eprintln!("{} {:#}", red("✘"), err),
    }
}

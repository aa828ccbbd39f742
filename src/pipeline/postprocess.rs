//! Output normalisation: tidy the raw buffer before it is written.
//!
//! The renderer appends a paragraph break after every heading and a newline
//! after every block, and separates body spans with spaces even when a span
//! is empty. This module removes the resulting noise with two passes and
//! nothing else; leading and trailing whitespace is left alone.
//!
//! Both passes are idempotent and neither can create input for the other,
//! so applying [`normalize`] twice gives the same result as applying it once.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all normalisation rules to the rendered Markdown.
///
/// Rules (applied in order):
/// 1. Collapse 3+ consecutive newlines to exactly 2 (at most one blank line)
/// 2. Collapse 2+ consecutive spaces to exactly 1
pub fn normalize(input: &str) -> String {
    let s = collapse_blank_lines(input);
    collapse_spaces(&s)
}

// ── Rule 1: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").into_owned()
}

// ── Rule 2: Collapse runs of spaces ──────────────────────────────────────────

static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

fn collapse_spaces(input: &str) -> String {
    RE_SPACES.replace_all(input, " ").into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────

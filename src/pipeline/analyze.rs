//! Corpus statistics: find the font size and weight of body text.
//!
//! Body text is whatever the document uses most. Scanning every span once
//! before any Markdown is produced means a heading on page 40 is judged
//! against the same baseline as one on page 1.

use crate::error::ConvertError;
use crate::model::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::info;

/// The typographic signature of body text for one document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorpusBaseline {
    /// Most frequent span font size.
    pub common_size: f32,
    /// Whether most spans are bold.
    pub common_bold: bool,
}

/// Compute the [`CorpusBaseline`] of `document`.
///
/// Both values are modes over all spans of all text blocks. Ties go to the
/// value encountered first in document order.
///
/// # Errors
/// [`ConvertError::EmptyDocument`] if the document has no spans at all.
pub fn analyze(document: &Document) -> Result<CorpusBaseline, ConvertError> {
    let mut sizes = Vec::new();
    let mut weights = Vec::new();
    for span in document.spans() {
        sizes.push(span.size.to_bits());
        weights.push(span.bold);
    }

    let (Some(size_bits), Some(common_bold)) = (mode(sizes), mode(weights)) else {
        return Err(ConvertError::EmptyDocument);
    };

    let baseline = CorpusBaseline {
        common_size: f32::from_bits(size_bits),
        common_bold,
    };
    info!(
        "Corpus baseline: common size {}, common weight bold={}",
        baseline.common_size, baseline.common_bold
    );
    Ok(baseline)
}

/// Most frequent value; on equal counts the earliest first occurrence wins.
fn mode<K: Eq + Hash + Copy>(values: impl IntoIterator<Item = K>) -> Option<K> {
    let mut counts: HashMap<K, (usize, usize)> = HashMap::new();
    for (position, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, ImageBlock, Line, Page, Rect, Span, TextBlock};

    fn doc_of(spans: Vec<Span>) -> Document {
        Document::new(vec![Page::new(vec![Block::Text(TextBlock::new(vec![
            Line::new(spans),
        ]))])])
    }

    #[test]
    fn uniform_document_baseline_is_exact() {
        let doc = doc_of(vec![
            Span::new("a", 11.5, true),
            Span::new("b", 11.5, true),
            Span::new("c", 11.5, true),
        ]);
        let b = analyze(&doc).unwrap();
        assert_eq!(b.common_size, 11.5);
        assert!(b.common_bold);
    }

    #[test]
    fn picks_most_frequent_size_and_weight() {
        let doc = doc_of(vec![
            Span::new("Title", 24.0, true),
            Span::new("x", 10.0, false),
            Span::new("y", 10.0, false),
            Span::new("Sub", 14.0, true),
            Span::new("z", 10.0, false),
        ]);
        let b = analyze(&doc).unwrap();
        assert_eq!(b.common_size, 10.0);
        assert!(!b.common_bold);
    }

    #[test]
    fn size_tie_goes_to_first_encountered() {
        let doc = doc_of(vec![
            Span::new("a", 14.0, false),
            Span::new("b", 10.0, false),
            Span::new("c", 10.0, false),
            Span::new("d", 14.0, false),
        ]);
        assert_eq!(analyze(&doc).unwrap().common_size, 14.0);

        let doc = doc_of(vec![
            Span::new("b", 10.0, false),
            Span::new("a", 14.0, false),
            Span::new("d", 14.0, false),
            Span::new("c", 10.0, false),
        ]);
        assert_eq!(analyze(&doc).unwrap().common_size, 10.0);
    }

    #[test]
    fn weight_tie_goes_to_first_encountered() {
        let doc = doc_of(vec![Span::new("a", 10.0, true), Span::new("b", 10.0, false)]);
        assert!(analyze(&doc).unwrap().common_bold);
        let doc = doc_of(vec![Span::new("a", 10.0, false), Span::new("b", 10.0, true)]);
        assert!(!analyze(&doc).unwrap().common_bold);
    }

    #[test]
    fn baseline_values_occur_in_input() {
        let spans = vec![
            Span::new("a", 9.0, false),
            Span::new("b", 9.5, true),
            Span::new("c", 13.25, true),
            Span::new("d", 9.5, false),
        ];
        let doc = doc_of(spans.clone());
        let b = analyze(&doc).unwrap();
        assert!(spans.iter().any(|s| s.size == b.common_size));
        assert!(spans.iter().any(|s| s.bold == b.common_bold));
    }

    #[test]
    fn counts_spans_across_pages_and_blocks() {
        let doc = Document::new(vec![
            Page::new(vec![Block::Text(TextBlock::new(vec![Line::new(vec![
                Span::new("a", 12.0, false),
            ])]))]),
            Page::new(vec![
                Block::Text(TextBlock::new(vec![Line::new(vec![Span::new(
                    "b", 9.0, false,
                )])])),
                Block::Text(TextBlock::new(vec![
                    Line::new(vec![Span::new("c", 9.0, false)]),
                    Line::new(vec![Span::new("d", 12.0, false)]),
                    Line::new(vec![Span::new("e", 9.0, false)]),
                ])),
            ]),
        ]);
        assert_eq!(analyze(&doc).unwrap().common_size, 9.0);
    }

    #[test]
    fn empty_document_fails() {
        let err = analyze(&Document::default()).unwrap_err();
        assert!(matches!(err, ConvertError::EmptyDocument));
    }

    #[test]
    fn image_only_document_fails() {
        let doc = Document::new(vec![
            Page::new(vec![Block::Image(ImageBlock {
                index: 0,
                bbox: Rect::new(0.0, 0.0, 100.0, 100.0),
            })]),
            Page::new(vec![Block::Text(TextBlock::default())]),
        ]);
        assert!(matches!(analyze(&doc), Err(ConvertError::EmptyDocument)));
    }
}

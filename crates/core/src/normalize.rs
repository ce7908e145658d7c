//! Word stream normalization.
//!
//! Raw word records coming from the extraction collaborator are filtered and
//! put in reading order before anything else looks at them.  The output of
//! [`normalize_words`] is the single source of truth for both the layout
//! branch (lines, spacing) and the statistics branch (overlap, stats).

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::geometry::BBox;

/// A word record as produced by the word source, before any validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWord {
    pub text: String,
    pub bbox: BBox,
    pub page_index: usize,
    pub font_size: Option<f64>,
    pub font_name: Option<String>,
}

impl RawWord {
    pub fn new(text: impl Into<String>, bbox: BBox, page_index: usize) -> Self {
        RawWord {
            text: text.into(),
            bbox,
            page_index,
            font_size: None,
            font_name: None,
        }
    }

    pub fn with_font(mut self, name: impl Into<String>, size: f64) -> Self {
        self.font_name = Some(name.into());
        self.font_size = Some(size);
        self
    }
}

/// A validated word: non-empty text and a non-degenerate, finite box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
    pub page_index: usize,
    pub font_size: Option<f64>,
    pub font_name: Option<String>,
}

impl Word {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Why word records were dropped by the normalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDrops {
    pub empty_text: usize,
    pub degenerate: usize,
    pub non_finite: usize,
}

impl WordDrops {
    pub fn total(&self) -> usize {
        self.empty_text + self.degenerate + self.non_finite
    }

    pub fn merge(&mut self, other: &WordDrops) {
        self.empty_text += other.empty_text;
        self.degenerate += other.degenerate;
        self.non_finite += other.non_finite;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedWords {
    pub words: Vec<Word>,
    pub drops: WordDrops,
}

/// Filter degenerate records and sort the survivors into reading order.
///
/// Records are dropped when their text is empty or whitespace-only, when any
/// coordinate is not finite, or when the box has zero width or height.  Boxes
/// with swapped corners are reordered instead of discarded.  Surviving words
/// are stable-sorted by `(page_index, round(y0 / line_tolerance), x0)`.
pub fn normalize_words<I>(records: I, config: &LayoutConfig) -> NormalizedWords
where
    I: IntoIterator<Item = RawWord>,
{
    let mut drops = WordDrops::default();
    let mut words: Vec<Word> = Vec::new();

    for raw in records {
        let text = raw.text.trim();
        if text.is_empty() {
            drops.empty_text += 1;
            continue;
        }
        if !raw.bbox.is_finite() {
            drops.non_finite += 1;
            continue;
        }
        let bbox = raw.bbox.normalized();
        if bbox.is_degenerate() {
            drops.degenerate += 1;
            continue;
        }

        words.push(Word {
            text: text.to_string(),
            bbox,
            page_index: raw.page_index,
            font_size: raw.font_size.filter(|s| s.is_finite() && *s > 0.0),
            font_name: raw.font_name,
        });
    }

    let tolerance = config.line_tolerance;
    words.sort_by(|a, b| {
        a.page_index
            .cmp(&b.page_index)
            .then(row_key(a.bbox.y0, tolerance).total_cmp(&row_key(b.bbox.y0, tolerance)))
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    NormalizedWords { words, drops }
}

/// Vertical sort key: `y0` bucketed by the line tolerance.
fn row_key(y0: f64, tolerance: f64) -> f64 {
    if tolerance > 0.0 {
        (y0 / tolerance).round()
    } else {
        y0
    }
}

//! Word / redaction box overlap analysis.

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::geometry::BBox;
use crate::normalize::Word;
use crate::redaction::{BoxId, RedactionBox};

/// Source of candidate boxes for a word.
///
/// The slice implementation is a linear scan, which is fine for the tens to
/// low hundreds of boxes a page carries.  A spatial index only needs to
/// return a superset of the boxes that can intersect `bbox`.
pub trait BoxLookup {
    fn candidates<'a>(&'a self, bbox: &BBox) -> Box<dyn Iterator<Item = &'a RedactionBox> + 'a>;
}

impl BoxLookup for [RedactionBox] {
    fn candidates<'a>(&'a self, _bbox: &BBox) -> Box<dyn Iterator<Item = &'a RedactionBox> + 'a> {
        Box::new(self.iter())
    }
}

impl BoxLookup for Vec<RedactionBox> {
    fn candidates<'a>(&'a self, bbox: &BBox) -> Box<dyn Iterator<Item = &'a RedactionBox> + 'a> {
        self.as_slice().candidates(bbox)
    }
}

/// Classification of one word of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapResult {
    /// Position of the word in the page's normalized word list.
    pub word_index: usize,
    pub hidden: bool,
    /// Box with the largest overlap, when the word is hidden.
    pub covering_box: Option<BoxId>,
    /// Largest fraction of the word's area covered by a single box.
    pub fraction: f64,
}

/// Classify every word of a page as hidden or visible.
///
/// A word is hidden when the largest fraction of its area covered by one box
/// is strictly positive and at least `config.overlap_fraction`.
pub fn analyze_overlaps<L>(words: &[Word], boxes: &L, config: &LayoutConfig) -> Vec<OverlapResult>
where
    L: BoxLookup + ?Sized,
{
    words
        .iter()
        .enumerate()
        .map(|(word_index, word)| {
            let mut best: Option<(&RedactionBox, f64)> = None;
            for candidate in boxes.candidates(&word.bbox) {
                let fraction = word.bbox.covered_fraction(&candidate.bbox);
                if best.is_none_or(|(_, f)| fraction > f) {
                    best = Some((candidate, fraction));
                }
            }

            let fraction = best.map(|(_, f)| f).unwrap_or(0.0);
            let hidden = fraction > 0.0 && fraction >= config.overlap_fraction;

            OverlapResult {
                word_index,
                hidden,
                covering_box: best.filter(|_| hidden).map(|(b, _)| b.id),
                fraction,
            }
        })
        .collect()
}

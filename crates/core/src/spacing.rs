//! Inter-word spacing reconstruction.
//!
//! PDF content streams position every word absolutely; the spaces a reader
//! sees were never encoded.  This module turns the horizontal gaps between
//! consecutive words of a [`Line`] back into whitespace runs, so that the
//! rebuilt text keeps the visual alignment of the original page (columns,
//! indented fields, tabular data).
//!
//! # Space unit
//!
//! The width of one reconstructed space is
//!
//! ```text
//! unit = max(MIN_SPACE_WIDTH, char_width * space_unit)
//! ```
//!
//! where `char_width` is either the configured override or the median
//! single-character width of the words in the line.
//!
//! # Gap rule
//!
//! With `gap = next.x0 - right edge so far`:
//!
//! - `gap <= touch_gap * unit`: the glyphs touch or overlap, concatenate.
//! - otherwise: insert `max(round(gap / unit), min_spaces)` spaces.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::lines::Line;

/// Smallest space width ever used, in page units.
const MIN_SPACE_WIDTH: f64 = 0.5;

/// Largest page side a PDF can declare (200 in, at the default user unit).
/// No gap on a page is wider, so longer space runs are clipped to it.
const MAX_PAGE_EXTENT: f64 = 14_400.0;

/// Font sizes outside this range are treated as artifacts (watermarks,
/// zero-size invisible text) when estimating a line's size.
const PLAUSIBLE_FONT_SIZE: (f64, f64) = (4.0, 72.0);

/// Box heights are floored at this value when used as a size estimate.
const MIN_HEIGHT_ESTIMATE: f64 = 6.0;

const FALLBACK_FONT_SIZE: f64 = 10.0;

/// The rebuilt size is clamped into this range so the text fits in the
/// space the original line occupied.
const RENDER_FONT_SIZE: (f64, f64) = (6.0, 12.0);

/// One line of recovered text, ready to be drawn at its original position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebuiltLine {
    pub text: String,
    /// Top-left corner of the leftmost word.
    pub start: (f64, f64),
    /// Right edge of the rightmost word.
    pub end_x: f64,
    pub page_index: usize,
    pub font_size: f64,
    pub font_name: Option<String>,
    pub word_count: usize,
    /// Positions of the line's words in the page word list, left to right.
    #[serde(default)]
    pub word_indices: Vec<usize>,
}

/// Rebuild the text of a single line.
pub fn rebuild_line(line: &Line, config: &LayoutConfig) -> RebuiltLine {
    let unit = space_unit_width(line, config);
    let touch = config.touch_gap * unit;

    let mut text = String::new();
    let mut right_edge = f64::NEG_INFINITY;

    for (i, word) in line.words.iter().enumerate() {
        if i > 0 {
            let gap = word.bbox.x0 - right_edge;
            text.push_str(&" ".repeat(spaces_for_gap(gap, unit, touch, config.min_spaces)));
        }
        text.push_str(&word.text);
        right_edge = right_edge.max(word.bbox.x1);
    }

    let (start, page_index) = line
        .words
        .first()
        .map(|w| ((w.bbox.x0, w.bbox.y0), w.page_index))
        .unwrap_or(((0.0, line.baseline), line.page_index));

    RebuiltLine {
        text,
        start,
        end_x: if right_edge.is_finite() { right_edge } else { start.0 },
        page_index,
        font_size: estimate_font_size(line),
        font_name: dominant_font_name(line),
        word_count: line.words.len(),
        word_indices: line.word_indices.clone(),
    }
}

/// Rebuild every line of a page.
pub fn rebuild_lines(lines: &[Line], config: &LayoutConfig) -> Vec<RebuiltLine> {
    lines.iter().map(|line| rebuild_line(line, config)).collect()
}

/// Number of spaces that stand in for a horizontal gap.
///
/// Gaps wider than any page are clipped to [`MAX_PAGE_EXTENT`], so stray
/// coordinates cannot blow up the rebuilt text.
pub fn spaces_for_gap(gap: f64, unit: f64, touch: f64, min_spaces: u32) -> usize {
    if !gap.is_finite() || gap <= touch {
        return 0;
    }
    let n = (gap.min(MAX_PAGE_EXTENT) / unit).round() as usize;
    n.max(min_spaces as usize)
}

/// Width of one reconstructed space for this line.
pub fn space_unit_width(line: &Line, config: &LayoutConfig) -> f64 {
    let char_width = config
        .char_width
        .or_else(|| median_char_width(line))
        .unwrap_or(MIN_SPACE_WIDTH);
    (char_width * config.space_unit).max(MIN_SPACE_WIDTH)
}

/// Median of `width / char_count` across the words of the line.
pub fn median_char_width(line: &Line) -> Option<f64> {
    let widths: Vec<f64> = line
        .words
        .iter()
        .filter_map(|w| {
            let n = w.char_count();
            (n > 0).then(|| w.bbox.width() / n as f64)
        })
        .filter(|w| w.is_finite() && *w > 0.0)
        .collect();
    median(widths)
}

/// Estimate the size used to redraw the line.
///
/// Prefers the median reported font size; falls back to the median box
/// height when no word carries a plausible size.
pub fn estimate_font_size(line: &Line) -> f64 {
    let (lo, hi) = PLAUSIBLE_FONT_SIZE;

    let sizes: Vec<f64> = line
        .words
        .iter()
        .filter_map(|w| w.font_size)
        .filter(|s| (lo..=hi).contains(s))
        .collect();

    let size = median(sizes).or_else(|| {
        let heights: Vec<f64> = line
            .words
            .iter()
            .map(|w| w.bbox.height().max(MIN_HEIGHT_ESTIMATE))
            .filter(|h| *h <= hi)
            .collect();
        median(heights)
    });

    let (min, max) = RENDER_FONT_SIZE;
    size.unwrap_or(FALLBACK_FONT_SIZE).clamp(min, max)
}

/// Most frequent font name in the line; ties go to the first seen.
pub fn dominant_font_name(line: &Line) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (order, name) in line
        .words
        .iter()
        .filter_map(|w| w.font_name.as_deref())
        .enumerate()
    {
        counts.entry(name).or_insert((0, order)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (ca, oa)), (_, (cb, ob))| ca.cmp(cb).then(ob.cmp(oa)))
        .map(|(name, _)| name.to_string())
}

/// Upper median (element at `len / 2` after sorting).
fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    Some(values[values.len() / 2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;
    use crate::normalize::Word;

    fn word(text: &str, x0: f64, x1: f64) -> Word {
        Word {
            text: text.to_string(),
            bbox: BBox::new(x0, 100.0, x1, 110.0),
            page_index: 0,
            font_size: Some(10.0),
            font_name: Some("Helvetica".to_string()),
        }
    }

    fn line(words: Vec<Word>) -> Line {
        let word_indices = (0..words.len()).collect();
        Line {
            page_index: 0,
            baseline: 100.0,
            words,
            word_indices,
        }
    }

    fn unit5() -> LayoutConfig {
        LayoutConfig {
            char_width: Some(5.0),
            space_unit: 1.0,
            min_spaces: 1,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn test_gap_of_two_units_gives_two_spaces() {
        let rebuilt = rebuild_line(
            &line(vec![word("Alice", 0.0, 30.0), word("Bob", 40.0, 60.0)]),
            &unit5(),
        );
        assert_eq!(rebuilt.text, "Alice  Bob");
        assert_eq!(rebuilt.start, (0.0, 100.0));
        assert_eq!(rebuilt.end_x, 60.0);
        assert_eq!(rebuilt.word_count, 2);
    }

    #[test]
    fn test_small_positive_gap_floored_at_one_space() {
        let rebuilt = rebuild_line(
            &line(vec![word("a", 0.0, 5.0), word("b", 6.5, 11.5)]),
            &unit5(),
        );
        assert_eq!(rebuilt.text, "a b");
    }

    #[test]
    fn test_min_spaces_raises_short_runs() {
        let config = LayoutConfig {
            min_spaces: 3,
            ..unit5()
        };
        let rebuilt = rebuild_line(&line(vec![word("a", 0.0, 5.0), word("b", 10.0, 15.0)]), &config);
        assert_eq!(rebuilt.text, "a   b");
    }

    #[test]
    fn test_overlapping_words_concatenate() {
        let rebuilt = rebuild_line(
            &line(vec![word("foo", 0.0, 15.0), word("bar", 13.0, 28.0)]),
            &unit5(),
        );
        assert_eq!(rebuilt.text, "foobar");
    }

    #[test]
    fn test_touching_words_concatenate() {
        let rebuilt = rebuild_line(
            &line(vec![word("foo", 0.0, 15.0), word("bar", 15.2, 30.0)]),
            &unit5(),
        );
        assert_eq!(rebuilt.text, "foobar");
    }

    #[test]
    fn test_gap_measured_from_widest_right_edge() {
        // "wide" extends past "b"; the gap to "c" is measured from x=50.
        let rebuilt = rebuild_line(
            &line(vec![
                word("wide", 0.0, 50.0),
                word("b", 20.0, 25.0),
                word("c", 60.0, 65.0),
            ]),
            &unit5(),
        );
        assert_eq!(rebuilt.text, "wideb  c");
    }

    #[test]
    fn test_median_char_width_inferred() {
        let l = line(vec![
            word("abcd", 0.0, 20.0),
            word("ef", 30.0, 40.0),
            word("ghijkl", 50.0, 110.0),
        ]);
        // Per-char widths: 5, 5, 10 -> median 5.
        assert_eq!(median_char_width(&l), Some(5.0));
        let config = LayoutConfig {
            space_unit: 0.5,
            ..LayoutConfig::default()
        };
        assert_eq!(space_unit_width(&l, &config), 2.5);
    }

    #[test]
    fn test_space_unit_has_floor() {
        let config = LayoutConfig {
            char_width: Some(0.01),
            ..LayoutConfig::default()
        };
        assert_eq!(space_unit_width(&line(vec![word("x", 0.0, 1.0)]), &config), MIN_SPACE_WIDTH);
    }

    #[test]
    fn test_collapsed_text_preserves_word_sequence() {
        let words = vec![
            word("The", 0.0, 15.0),
            word("quick", 30.0, 55.0),
            word("brown", 120.0, 145.0),
            word("fox", 146.0, 161.0),
        ];
        let expected: Vec<String> = words.iter().map(|w| w.text.clone()).collect();
        let rebuilt = rebuild_line(&line(words), &LayoutConfig::default());

        let collapsed: Vec<&str> = rebuilt.text.split_whitespace().collect();
        assert_eq!(collapsed, expected);
    }

    #[test]
    fn test_single_word_line() {
        let rebuilt = rebuild_line(&line(vec![word("solo", 12.0, 32.0)]), &unit5());
        assert_eq!(rebuilt.text, "solo");
        assert_eq!(rebuilt.start, (12.0, 100.0));
    }

    #[test]
    fn test_spaces_for_gap_non_finite() {
        assert_eq!(spaces_for_gap(f64::NAN, 5.0, 0.5, 1), 0);
        assert_eq!(spaces_for_gap(-3.0, 5.0, 0.5, 1), 0);
        assert_eq!(spaces_for_gap(0.5, 5.0, 0.5, 1), 0);
        assert_eq!(spaces_for_gap(23.0, 5.0, 0.5, 1), 5);
    }

    #[test]
    fn test_far_away_word_gives_bounded_run() {
        assert_eq!(spaces_for_gap(1.0e12, 0.5, 0.05, 1), 28_800);

        let rebuilt = rebuild_line(
            &line(vec![word("left", 0.0, 20.0), word("stray", 1.0e12, 1.0e12 + 25.0)]),
            &unit5(),
        );
        assert_eq!(rebuilt.text.len(), "left".len() + 2_880 + "stray".len());
        assert!(rebuilt.text.ends_with(" stray"));
    }

    #[test]
    fn test_font_size_from_median_size() {
        let mut words = vec![word("a", 0.0, 5.0), word("b", 10.0, 15.0), word("c", 20.0, 25.0)];
        words[0].font_size = Some(9.0);
        words[1].font_size = Some(11.0);
        words[2].font_size = Some(200.0); // artifact, ignored
        assert_eq!(estimate_font_size(&line(words)), 11.0);
    }

    #[test]
    fn test_font_size_falls_back_to_height_and_clamps() {
        let mut w = word("a", 0.0, 5.0);
        w.font_size = None;
        w.bbox = BBox::new(0.0, 0.0, 5.0, 3.0);
        // Height 3 is floored at 6.
        assert_eq!(estimate_font_size(&line(vec![w.clone()])), 6.0);

        w.bbox = BBox::new(0.0, 0.0, 5.0, 30.0);
        assert_eq!(estimate_font_size(&line(vec![w])), 12.0);
    }

    #[test]
    fn test_font_size_fallback_without_metrics() {
        let mut w = word("a", 0.0, 5.0);
        w.font_size = None;
        w.bbox = BBox::new(0.0, 0.0, 5.0, 100.0);
        assert_eq!(estimate_font_size(&line(vec![w])), FALLBACK_FONT_SIZE);
    }

    #[test]
    fn test_dominant_font_name() {
        let mut words = vec![word("a", 0.0, 5.0), word("b", 10.0, 15.0), word("c", 20.0, 25.0)];
        words[0].font_name = Some("Times-Bold".to_string());
        words[1].font_name = Some("Courier".to_string());
        words[2].font_name = Some("Courier".to_string());
        assert_eq!(dominant_font_name(&line(words)).as_deref(), Some("Courier"));
    }

    #[test]
    fn test_dominant_font_name_tie_prefers_first() {
        let mut words = vec![word("a", 0.0, 5.0), word("b", 10.0, 15.0)];
        words[0].font_name = Some("Times-Roman".to_string());
        words[1].font_name = Some("Courier".to_string());
        assert_eq!(dominant_font_name(&line(words)).as_deref(), Some("Times-Roman"));
    }
}

//! Recovery statistics.

use serde::{Deserialize, Serialize};

use crate::normalize::Word;
use crate::overlap::OverlapResult;

/// Summary of what was found under redaction boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub boxes_found: usize,
    pub words_recovered: usize,
    pub chars_recovered: usize,
    pub words_total: usize,
    pub chars_total: usize,
    /// `words_recovered / words_total` as a percentage, `0.0` for an empty
    /// document.
    pub recovery_rate: f64,
}

impl StatsReport {
    /// Build a report from raw counters.
    pub fn new(
        boxes_found: usize,
        words_recovered: usize,
        chars_recovered: usize,
        words_total: usize,
        chars_total: usize,
    ) -> Self {
        StatsReport {
            boxes_found,
            words_recovered,
            chars_recovered,
            words_total,
            chars_total,
            recovery_rate: recovery_rate(words_recovered, words_total),
        }
    }

    pub fn has_boxes(&self) -> bool {
        self.boxes_found > 0
    }
}

/// Percentage of hidden words, computed from the exact counts.
pub fn recovery_rate(words_recovered: usize, words_total: usize) -> f64 {
    if words_total == 0 {
        return 0.0;
    }
    words_recovered as f64 * 100.0 / words_total as f64
}

/// Per-page counters, summed by [`aggregate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCounts {
    pub boxes: usize,
    pub words_hidden: usize,
    pub chars_hidden: usize,
    pub words_total: usize,
    pub chars_total: usize,
}

/// Count one page's classifications.
///
/// `results` must be the overlap results for `words`, in the same order.
pub fn count_page(words: &[Word], results: &[OverlapResult], boxes: usize) -> PageCounts {
    let mut counts = PageCounts {
        boxes,
        words_total: words.len(),
        chars_total: words.iter().map(Word::char_count).sum(),
        ..PageCounts::default()
    };

    for result in results.iter().filter(|r| r.hidden) {
        if let Some(word) = words.get(result.word_index) {
            counts.words_hidden += 1;
            counts.chars_hidden += word.char_count();
        }
    }

    counts
}

/// Reduce per-page counters into one report.
pub fn aggregate<'a, I>(pages: I) -> StatsReport
where
    I: IntoIterator<Item = &'a PageCounts>,
{
    let mut total = PageCounts::default();
    for page in pages {
        total.boxes += page.boxes;
        total.words_hidden += page.words_hidden;
        total.chars_hidden += page.chars_hidden;
        total.words_total += page.words_total;
        total.chars_total += page.chars_total;
    }

    StatsReport::new(
        total.boxes,
        total.words_hidden,
        total.chars_hidden,
        total.words_total,
        total.chars_total,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;

    fn word(text: &str) -> Word {
        Word {
            text: text.to_string(),
            bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
            page_index: 0,
            font_size: None,
            font_name: None,
        }
    }

    fn result(word_index: usize, hidden: bool) -> OverlapResult {
        OverlapResult {
            word_index,
            hidden,
            covering_box: None,
            fraction: if hidden { 1.0 } else { 0.0 },
        }
    }

    #[test]
    fn test_recovery_rate_exact_arithmetic() {
        let report = StatsReport::new(42, 387, 2_000, 3_429, 20_000);
        assert_eq!(report.recovery_rate, 387.0 * 100.0 / 3429.0);
        assert!((report.recovery_rate - 11.286_089_238_845_145).abs() < 1e-9);
        assert_eq!(format!("{:.1}", report.recovery_rate), "11.3");
    }

    #[test]
    fn test_empty_document_rate_is_zero() {
        let report = StatsReport::new(0, 0, 0, 0, 0);
        assert_eq!(report.recovery_rate, 0.0);
        assert!(!report.has_boxes());
    }

    #[test]
    fn test_count_page() {
        let words = vec![word("alpha"), word("beta"), word("ñu")];
        let results = vec![result(0, true), result(1, false), result(2, true)];

        let counts = count_page(&words, &results, 2);
        assert_eq!(counts.boxes, 2);
        assert_eq!(counts.words_total, 3);
        assert_eq!(counts.chars_total, 11);
        assert_eq!(counts.words_hidden, 2);
        assert_eq!(counts.chars_hidden, 7);
    }

    #[test]
    fn test_aggregate_pages() {
        let pages = [
            PageCounts {
                boxes: 40,
                words_hidden: 380,
                chars_hidden: 1_900,
                words_total: 3_000,
                chars_total: 15_000,
            },
            PageCounts {
                boxes: 2,
                words_hidden: 7,
                chars_hidden: 100,
                words_total: 429,
                chars_total: 5_000,
            },
        ];

        let report = aggregate(&pages);
        assert_eq!(report.boxes_found, 42);
        assert_eq!(report.words_recovered, 387);
        assert_eq!(report.words_total, 3_429);
        assert_eq!(report.chars_recovered, 2_000);
        assert_eq!(report.recovery_rate, recovery_rate(387, 3_429));
    }

    #[test]
    fn test_aggregate_nothing() {
        let report = aggregate(&Vec::<PageCounts>::new());
        assert_eq!(report, StatsReport::new(0, 0, 0, 0, 0));
    }

    #[test]
    fn test_serializes_to_flat_record() {
        let report = StatsReport::new(1, 2, 10, 4, 20);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["boxes_found"], 1);
        assert_eq!(value["words_recovered"], 2);
        assert_eq!(value["chars_recovered"], 10);
        assert_eq!(value["words_total"], 4);
        assert_eq!(value["chars_total"], 20);
        assert_eq!(value["recovery_rate"], 50.0);
    }
}

//! Per-page fan-out and document-level fan-in.
//!
//! ```text
//!                    ┌─> group_words_into_lines ─> rebuild_lines ──> lines
//! words ─> normalize ┤
//!                    └─> analyze_overlaps ─┬─> count_page ─> aggregate ─> stats
//! shapes ─> detect_redaction_boxes ────────┘
//! ```
//!
//! Every page is an independent unit of work.  [`analyze_document`] merges
//! page results by page index, so the output does not depend on the order in
//! which pages were produced.

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::error::{ConfigError, PageFailure};
use crate::lines::group_words_into_lines;
use crate::normalize::{normalize_words, RawWord, Word, WordDrops};
use crate::overlap::{analyze_overlaps, OverlapResult};
use crate::redaction::{detect_redaction_boxes, RawShape, RedactionBox, ShapeDrops};
use crate::spacing::{rebuild_lines, RebuiltLine};
use crate::stats::{aggregate, count_page, PageCounts, StatsReport};

/// Everything the extraction collaborator knows about one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_index: usize,
    pub width: f64,
    pub height: f64,
    pub words: Vec<RawWord>,
    pub shapes: Vec<RawShape>,
}

/// Records filtered out along the way; informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub words: WordDrops,
    pub shapes: ShapeDrops,
}

impl Diagnostics {
    pub fn merge(&mut self, other: &Diagnostics) {
        self.words.merge(&other.words);
        self.shapes.merge(&other.shapes);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageAnalysis {
    pub page_index: usize,
    pub width: f64,
    pub height: f64,
    pub words: Vec<Word>,
    pub lines: Vec<RebuiltLine>,
    pub boxes: Vec<RedactionBox>,
    /// One entry per word, in the same order as `words`.
    pub overlaps: Vec<OverlapResult>,
    pub counts: PageCounts,
    pub diagnostics: Diagnostics,
}

impl PageAnalysis {
    /// Words classified as hidden, with their classification.
    pub fn hidden_words(&self) -> impl Iterator<Item = (&Word, &OverlapResult)> {
        self.overlaps
            .iter()
            .filter(|r| r.hidden)
            .filter_map(|r| self.words.get(r.word_index).map(|w| (w, r)))
    }

    /// Whether any word of `line` was classified as hidden.
    pub fn line_has_hidden_word(&self, line: &RebuiltLine) -> bool {
        line.word_indices
            .iter()
            .any(|&i| self.overlaps.get(i).is_some_and(|r| r.hidden))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAnalysis {
    /// Successfully analyzed pages, ordered by page index.
    pub pages: Vec<PageAnalysis>,
    /// Pages the collaborator could not provide, ordered by page index.
    pub skipped: Vec<PageFailure>,
    pub stats: StatsReport,
    pub diagnostics: Diagnostics,
}

impl DocumentAnalysis {
    pub fn lines(&self) -> impl Iterator<Item = &RebuiltLine> {
        self.pages.iter().flat_map(|p| p.lines.iter())
    }
}

/// Run both branches of the pipeline on one page.
///
/// The configuration is assumed to be valid; [`analyze_document`] checks it
/// before calling this.
pub fn analyze_page(geometry: PageGeometry, config: &LayoutConfig) -> PageAnalysis {
    let PageGeometry {
        page_index,
        width,
        height,
        words,
        shapes,
    } = geometry;

    let normalized = normalize_words(
        words.into_iter().map(|w| RawWord { page_index, ..w }),
        config,
    );
    let words = normalized.words;

    let lines = group_words_into_lines(words.clone(), config);
    let lines = rebuild_lines(&lines, config);

    let detected = detect_redaction_boxes(page_index, &shapes, config);
    let overlaps = analyze_overlaps(&words, &detected.boxes, config);
    let counts = count_page(&words, &overlaps, detected.boxes.len());

    let diagnostics = Diagnostics {
        words: normalized.drops,
        shapes: detected.drops,
    };

    log::debug!(
        "page {page_index}: {} words, {} lines, {} boxes, {} hidden, {} records dropped",
        words.len(),
        lines.len(),
        detected.boxes.len(),
        counts.words_hidden,
        diagnostics.words.total() + diagnostics.shapes.total(),
    );

    PageAnalysis {
        page_index,
        width,
        height,
        words,
        lines,
        boxes: detected.boxes,
        overlaps,
        counts,
        diagnostics,
    }
}

/// Analyze every page of a document and aggregate the statistics.
///
/// The configuration is validated before the first page is touched.  Pages
/// the collaborator failed to provide are logged and reported in
/// [`DocumentAnalysis::skipped`]; they never abort the run.
pub fn analyze_document<I>(inputs: I, config: &LayoutConfig) -> Result<DocumentAnalysis, ConfigError>
where
    I: IntoIterator<Item = Result<PageGeometry, PageFailure>>,
{
    config.validate()?;

    let mut pages: Vec<PageAnalysis> = Vec::new();
    let mut skipped: Vec<PageFailure> = Vec::new();

    for input in inputs {
        match input {
            Ok(geometry) => pages.push(analyze_page(geometry, config)),
            Err(failure) => {
                log::warn!("{failure}");
                skipped.push(failure);
            }
        }
    }

    pages.sort_by_key(|p| p.page_index);
    skipped.sort_by_key(|f| f.page_index);

    let stats = aggregate(pages.iter().map(|p| &p.counts));
    let mut diagnostics = Diagnostics::default();
    for page in &pages {
        diagnostics.merge(&page.diagnostics);
    }

    Ok(DocumentAnalysis {
        pages,
        skipped,
        stats,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;
    use crate::redaction::Fill;

    fn raw(text: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> RawWord {
        RawWord::new(text, BBox::new(x0, y0, x1, y1), 0).with_font("Helvetica", 10.0)
    }

    fn black(x0: f64, y0: f64, x1: f64, y1: f64) -> RawShape {
        RawShape::drawing(BBox::new(x0, y0, x1, y1), 0, Fill::Gray(0.0))
    }

    fn sample_page(page_index: usize) -> PageGeometry {
        PageGeometry {
            page_index,
            width: 612.0,
            height: 792.0,
            words: vec![
                raw("Name:", 72.0, 100.0, 102.0, 110.0),
                raw("John", 120.0, 100.0, 140.0, 110.0),
                raw("Smith", 145.0, 100.0, 170.0, 110.0),
                raw("Account", 72.0, 120.0, 107.0, 130.0),
                raw("", 200.0, 120.0, 210.0, 130.0),
            ],
            shapes: vec![
                black(115.0, 98.0, 175.0, 112.0),
                black(0.0, 700.0, 612.0, 700.5),
            ],
        }
    }

    fn config() -> LayoutConfig {
        LayoutConfig {
            char_width: Some(5.0),
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn test_analyze_page_both_branches() {
        let page = analyze_page(sample_page(0), &config());

        let texts: Vec<&str> = page.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Name:    John Smith", "Account"]);

        assert_eq!(page.boxes.len(), 1);
        let hidden: Vec<&str> = page.hidden_words().map(|(w, _)| w.text.as_str()).collect();
        assert_eq!(hidden, vec!["John", "Smith"]);

        assert_eq!(page.counts.words_total, 4);
        assert_eq!(page.counts.words_hidden, 2);
        assert_eq!(page.counts.chars_hidden, 9);
        assert_eq!(page.diagnostics.words.empty_text, 1);
        assert_eq!(page.diagnostics.shapes.too_small, 1);
    }

    #[test]
    fn test_hidden_line_membership_is_exact() {
        // 10pt rows set 9pt apart; only the lower row is under the bar.
        let geometry = PageGeometry {
            page_index: 0,
            width: 612.0,
            height: 792.0,
            words: vec![
                raw("Public", 72.0, 100.0, 102.0, 110.0),
                raw("Secret", 72.0, 109.0, 102.0, 119.0),
            ],
            shapes: vec![black(70.0, 110.5, 110.0, 121.0)],
        };
        let page = analyze_page(geometry, &config());

        let flagged: Vec<&str> = page
            .lines
            .iter()
            .filter(|l| page.line_has_hidden_word(l))
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(flagged, vec!["Secret"]);
    }

    #[test]
    fn test_word_page_index_follows_geometry() {
        let mut geometry = sample_page(5);
        for w in &mut geometry.words {
            w.page_index = 0;
        }
        let page = analyze_page(geometry, &config());
        assert!(page.words.iter().all(|w| w.page_index == 5));
        assert!(page.lines.iter().all(|l| l.page_index == 5));
    }

    #[test]
    fn test_blank_page() {
        let page = analyze_page(
            PageGeometry {
                page_index: 0,
                width: 612.0,
                height: 792.0,
                ..PageGeometry::default()
            },
            &config(),
        );
        assert!(page.lines.is_empty());
        assert!(page.boxes.is_empty());
        assert_eq!(page.counts, PageCounts::default());
    }

    #[test]
    fn test_page_without_boxes_recovers_nothing() {
        let mut geometry = sample_page(0);
        geometry.shapes.clear();
        let page = analyze_page(geometry, &config());
        assert_eq!(page.counts.words_hidden, 0);
        assert_eq!(page.lines.len(), 2);
    }

    #[test]
    fn test_document_merges_by_page_index() {
        let inputs = vec![
            Ok(sample_page(2)),
            Err(PageFailure::new(1, "corrupt page object")),
            Ok(sample_page(0)),
        ];

        let doc = analyze_document(inputs, &config()).unwrap();
        let order: Vec<usize> = doc.pages.iter().map(|p| p.page_index).collect();
        assert_eq!(order, vec![0, 2]);
        assert_eq!(doc.skipped, vec![PageFailure::new(1, "corrupt page object")]);

        assert_eq!(doc.stats.boxes_found, 2);
        assert_eq!(doc.stats.words_recovered, 4);
        assert_eq!(doc.stats.words_total, 8);
        assert_eq!(doc.stats.recovery_rate, 50.0);
        assert_eq!(doc.diagnostics.words.empty_text, 2);
    }

    #[test]
    fn test_document_output_independent_of_input_order() {
        let forward = analyze_document(
            vec![Ok(sample_page(0)), Ok(sample_page(1))],
            &config(),
        )
        .unwrap();
        let reverse = analyze_document(
            vec![Ok(sample_page(1)), Ok(sample_page(0))],
            &config(),
        )
        .unwrap();
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_document_is_idempotent() {
        let run = || {
            let doc = analyze_document(vec![Ok(sample_page(0))], &config()).unwrap();
            let lines: Vec<RebuiltLine> = doc.lines().cloned().collect();
            (
                serde_json::to_string(&lines).unwrap(),
                serde_json::to_string(&doc.stats).unwrap(),
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_invalid_config_fails_before_pages() {
        let bad = LayoutConfig {
            line_tolerance: -2.0,
            ..LayoutConfig::default()
        };
        let err = analyze_document(vec![Ok(sample_page(0))], &bad).unwrap_err();
        assert!(err.to_string().contains("line-tolerance"));
    }

    #[test]
    fn test_empty_document() {
        let doc = analyze_document(Vec::new(), &config()).unwrap();
        assert!(doc.pages.is_empty());
        assert_eq!(doc.stats.recovery_rate, 0.0);
        assert_eq!(doc.stats.words_total, 0);
    }
}

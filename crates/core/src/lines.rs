//! Vertical clustering of words into lines.

use serde::{Deserialize, Serialize};

use crate::config::{BaselinePolicy, LayoutConfig};
use crate::normalize::Word;

/// Words of one page that share a baseline, ordered left-to-right by `x0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub page_index: usize,
    /// Reference value every word was compared against when it joined.
    pub baseline: f64,
    pub words: Vec<Word>,
    /// Position of each word in the sequence given to
    /// [`group_words_into_lines`], parallel to `words`.
    pub word_indices: Vec<usize>,
}

impl Line {
    fn from_members(mut members: Vec<(usize, Word)>, baseline: f64) -> Self {
        members.sort_by(|(_, a), (_, b)| a.bbox.x0.total_cmp(&b.bbox.x0));
        let page_index = members.first().map(|(_, w)| w.page_index).unwrap_or(0);
        let (word_indices, words) = members.into_iter().unzip();
        Line {
            page_index,
            baseline,
            words,
            word_indices,
        }
    }

    /// Word texts joined by a single space.
    pub fn plain_text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Group one page's normalized words into lines.
///
/// Words are visited in the order given (the normalizer's reading order).
/// A word joins the open line when its top edge is within
/// `config.line_tolerance` of the line baseline; otherwise the open line is
/// emitted and the word starts a new one.  Under [`BaselinePolicy::Fixed`]
/// the baseline stays at the first word's top edge; under
/// [`BaselinePolicy::RunningMean`] it is the mean top edge of the words
/// accepted so far.  Grouping is purely vertical: words far apart on the
/// same row stay in one line.
pub fn group_words_into_lines(words: Vec<Word>, config: &LayoutConfig) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<(usize, Word)> = Vec::new();
    let mut baseline = 0.0_f64;

    for (index, word) in words.into_iter().enumerate() {
        let top = word.bbox.y0;

        if current.is_empty() {
            baseline = top;
            current.push((index, word));
            continue;
        }

        // A page change always closes the line, whatever the geometry says.
        let same_page = current[0].1.page_index == word.page_index;

        if same_page && (top - baseline).abs() <= config.line_tolerance {
            current.push((index, word));
            if config.baseline == BaselinePolicy::RunningMean {
                let n = current.len() as f64;
                baseline = (baseline * (n - 1.0) + top) / n;
            }
        } else {
            lines.push(Line::from_members(std::mem::take(&mut current), baseline));
            baseline = top;
            current.push((index, word));
        }
    }

    if !current.is_empty() {
        lines.push(Line::from_members(current, baseline));
    }

    lines
}

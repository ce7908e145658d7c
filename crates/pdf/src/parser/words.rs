use unredact_core::{BBox, RawWord};

use super::cleanup::clean_word_text;
use super::content::Glyph;
use super::ExtractOptions;

/// A word being assembled from consecutive glyphs.
struct PendingWord {
    text: String,
    bbox: BBox,
    font_name: String,
    font_size: f64,
}

impl PendingWord {
    fn start(glyph: &Glyph) -> Self {
        PendingWord {
            text: glyph.text.clone(),
            bbox: glyph.bbox,
            font_name: glyph.font_name.clone(),
            font_size: glyph.font_size,
        }
    }

    /// Whether `glyph` continues this word on the same run of text.
    fn accepts(&self, glyph: &Glyph, options: &ExtractOptions) -> bool {
        let gap = glyph.bbox.x0 - self.bbox.x1;
        gap <= options.x_tolerance
            && gap >= -options.x_tolerance
            && (glyph.bbox.y0 - self.bbox.y0).abs() <= options.y_tolerance
    }

    fn push(&mut self, glyph: &Glyph) {
        self.text.push_str(&glyph.text);
        self.bbox = self.bbox.union(&glyph.bbox);
    }

    fn finish(self, page_index: usize) -> RawWord {
        let word = RawWord::new(clean_word_text(&self.text), self.bbox, page_index);
        if self.font_name.is_empty() {
            RawWord {
                font_size: Some(self.font_size),
                ..word
            }
        } else {
            word.with_font(self.font_name, self.font_size)
        }
    }
}

/// Group glyphs, in content-stream order, into words.
///
/// A whitespace glyph ends the current word.  A glyph that jumps more than
/// `x_tolerance` forward or backward from the word's right edge, or whose top
/// differs by more than `y_tolerance`, starts a new one.  Font name and size
/// come from the word's first glyph.
pub fn build_words(glyphs: &[Glyph], page_index: usize, options: &ExtractOptions) -> Vec<RawWord> {
    let mut words = Vec::new();
    let mut current: Option<PendingWord> = None;

    for glyph in glyphs {
        if glyph.text.chars().all(char::is_whitespace) {
            words.extend(current.take().map(|w| w.finish(page_index)));
            continue;
        }

        match current.as_mut() {
            Some(word) if word.accepts(glyph, options) => word.push(glyph),
            _ => {
                words.extend(current.take().map(|w| w.finish(page_index)));
                current = Some(PendingWord::start(glyph));
            }
        }
    }
    words.extend(current.map(|w| w.finish(page_index)));

    words
}

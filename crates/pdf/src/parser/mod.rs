pub mod backend;
pub mod cleanup;
pub mod content;
pub mod words;

use unredact_core::{ConfigError, PageFailure, PageGeometry};

use backend::{PageBox, PageId, PdfBackend};

use crate::PdfError;

/// Word-building tolerances, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractOptions {
    /// Largest horizontal jump between glyphs of one word.
    pub x_tolerance: f64,
    /// Largest difference between glyph tops within one word.
    pub y_tolerance: f64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
        }
    }
}

impl ExtractOptions {
    /// Both tolerances must be finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerances = [
            ("x-tolerance", self.x_tolerance),
            ("y-tolerance", self.y_tolerance),
        ];
        for (parameter, value) in tolerances {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::OutOfRange {
                    parameter,
                    value,
                    expected: ">= 0",
                });
            }
        }
        Ok(())
    }
}

/// Extract the word and shape geometry of a single page.
pub fn extract_page_geometry(
    backend: &dyn PdfBackend,
    page_index: usize,
    page_id: PageId,
    options: &ExtractOptions,
) -> Result<PageGeometry, PdfError> {
    let page_box = backend.page_box(page_id).unwrap_or_else(|e| {
        log::warn!("page {page_index}: {e}; assuming US Letter");
        PageBox::default()
    });

    let scanned = content::scan_page(backend, page_id, page_index, page_box)?;
    let words = words::build_words(&scanned.glyphs, page_index, options);

    log::debug!(
        "page {page_index}: {} glyphs, {} words, {} shapes",
        scanned.glyphs.len(),
        words.len(),
        scanned.shapes.len()
    );

    Ok(PageGeometry {
        page_index,
        width: page_box.width(),
        height: page_box.height(),
        words,
        shapes: scanned.shapes,
    })
}

/// Extract every page, in page order.
///
/// Pages are produced lazily; a page that cannot be read yields a
/// [`PageFailure`] and the remaining pages are still extracted.
pub fn extract_pages<'a>(
    backend: &'a dyn PdfBackend,
    options: &'a ExtractOptions,
) -> impl Iterator<Item = Result<PageGeometry, PageFailure>> + 'a {
    let page_ids: Vec<PageId> = backend.pages().into_values().collect();

    page_ids
        .into_iter()
        .enumerate()
        .map(move |(page_index, page_id)| {
            extract_page_geometry(backend, page_index, page_id, options)
                .map_err(|e| PageFailure::new(page_index, e.to_string()))
        })
}

//! Writing rebuilt lines back into a PDF.
//!
//! Both modes start from a copy of the source document and only add objects:
//! the base-14 fonts, one content stream per page and, for side-by-side
//! output, one Form XObject per page.

pub mod encoding;
pub mod fonts;
mod overlay;
mod side_by_side;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};
use serde::{Deserialize, Serialize};
use unredact_core::{PageAnalysis, RebuiltLine};

use crate::parser::backend::{LopdfBackend, PageBox, PageId, PdfBackend};
use crate::PdfError;
use encoding::encode_win_ansi;
use fonts::{match_font, BaseFont};

/// Distance from a line's top to its baseline, in em.
pub const BASELINE_RATIO: f64 = 0.85;

/// How rebuilt lines are written into the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Original page on the left, rebuilt text on the right.
    #[default]
    SideBySide,
    /// Rebuilt text drawn in white on top of the original page.
    OverlayWhite,
}

impl RenderMode {
    /// Suffix appended to the input file stem for the default output path.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            RenderMode::SideBySide => "_side_by_side.pdf",
            RenderMode::OverlayWhite => "_overlay_white.pdf",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::SideBySide => f.write_str("side-by-side"),
            RenderMode::OverlayWhite => f.write_str("overlay-white"),
        }
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "side-by-side" => Ok(RenderMode::SideBySide),
            "overlay-white" => Ok(RenderMode::OverlayWhite),
            other => Err(format!(
                "unknown render mode '{other}' (expected side-by-side or overlay-white)"
            )),
        }
    }
}

/// Options for [`render_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub mode: RenderMode,
    /// Map each line's dominant font to a base-14 family instead of always
    /// using Helvetica.
    pub match_font: bool,
}

/// Write the rebuilt lines of `pages` into a copy of the source document.
///
/// Pages are matched by zero-based page index.  Pages without an analysis
/// are still copied (and widened in side-by-side mode) but get no text.
pub fn render_document(
    backend: &LopdfBackend,
    pages: &[PageAnalysis],
    options: &RenderOptions,
) -> Result<Vec<u8>, PdfError> {
    let mut doc = backend.raw_doc().clone();
    let mut fonts = FontRegistry::default();

    let lines_by_page: BTreeMap<usize, &[RebuiltLine]> = pages
        .iter()
        .map(|p| (p.page_index, p.lines.as_slice()))
        .collect();

    for (page_index, page_id) in backend.pages().into_values().enumerate() {
        let page_box = backend.page_box(page_id).unwrap_or_else(|e| {
            log::warn!("page {page_index}: {e}; assuming US Letter");
            PageBox::default()
        });
        let lines = lines_by_page.get(&page_index).copied().unwrap_or_default();

        let page = PageTarget {
            backend,
            page_id,
            page_box,
        };
        match options.mode {
            RenderMode::SideBySide => {
                side_by_side::compose_page(&mut doc, &page, lines, &mut fonts, options)?
            }
            RenderMode::OverlayWhite => {
                overlay::compose_page(&mut doc, &page, lines, &mut fonts, options)?
            }
        }
        log::debug!("page {page_index}: wrote {} lines", lines.len());
    }

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| PdfError::Write(e.to_string()))?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// The source page being rewritten.
struct PageTarget<'a> {
    backend: &'a LopdfBackend,
    page_id: PageId,
    page_box: PageBox,
}

impl PageTarget<'_> {
    /// The page's resources as a self-contained dictionary.
    ///
    /// Inherited resources are copied onto the page and a referenced `/Font`
    /// dictionary is inlined so new fonts can be added without touching
    /// objects shared with other pages.
    fn inline_resources(&self) -> Dictionary {
        let mut resources = self
            .backend
            .page_resources(self.page_id)
            .cloned()
            .unwrap_or_else(Dictionary::new);

        if let Ok(Object::Reference(id)) = resources.get(b"Font") {
            let fonts = self
                .backend
                .raw_doc()
                .get_dictionary(*id)
                .cloned()
                .unwrap_or_else(|_| Dictionary::new());
            resources.set("Font", fonts);
        }
        resources
    }

    /// Decoded bytes of the page's content streams.
    fn content(&self) -> Result<Vec<u8>, PdfError> {
        self.backend.page_content(self.page_id)
    }
}

/// Base-14 font objects added to the output, created on first use.
#[derive(Debug, Default)]
struct FontRegistry {
    ids: BTreeMap<BaseFont, ObjectId>,
}

impl FontRegistry {
    fn object_id(&mut self, doc: &mut Document, font: BaseFont) -> ObjectId {
        *self.ids.entry(font).or_insert_with(|| {
            let mut dict = dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.postscript_name(),
            };
            if !font.is_symbolic() {
                dict.set("Encoding", "WinAnsiEncoding");
            }
            doc.add_object(dict)
        })
    }
}

/// Resource name of a base-14 font, e.g. `UnrTimesBold`.
fn font_key(font: BaseFont) -> String {
    format!("Unr{}", font.postscript_name().replace('-', ""))
}

/// Text operations drawing `lines` in gray level `gray`, shifted right by
/// `x_offset` points.  Returns the operations and the fonts they use.
fn text_layer(
    lines: &[RebuiltLine],
    page_box: &PageBox,
    x_offset: f64,
    gray: f64,
    options: &RenderOptions,
) -> (Vec<Operation>, Vec<BaseFont>) {
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("rg", vec![real(gray), real(gray), real(gray)]),
    ];
    let mut used = Vec::new();

    for line in lines.iter().filter(|l| !l.text.trim().is_empty()) {
        let font = if options.match_font {
            match_font(line.font_name.as_deref())
        } else {
            BaseFont::Helvetica
        };
        if !used.contains(&font) {
            used.push(font);
        }

        let (x, top) = line.start;
        let (ux, uy) = page_box.to_user_space(x + x_offset, top + line.font_size * BASELINE_RATIO);

        ops.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font_key(font).into_bytes()), real(line.font_size)],
            ),
            Operation::new(
                "Tm",
                vec![real(1.0), real(0.0), real(0.0), real(1.0), real(ux), real(uy)],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(&line.text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    ops.push(Operation::new("Q", vec![]));
    (ops, used)
}

/// Register `fonts` in the output and add them to `resources`.
fn add_fonts(doc: &mut Document, registry: &mut FontRegistry, resources: &mut Dictionary, fonts: &[BaseFont]) {
    if fonts.is_empty() {
        return;
    }
    let mut font_dict = match resources.get(b"Font") {
        Ok(Object::Dictionary(d)) => d.clone(),
        _ => Dictionary::new(),
    };
    for &font in fonts {
        let id = registry.object_id(doc, font);
        font_dict.set(font_key(font), Object::Reference(id));
    }
    resources.set("Font", font_dict);
}

fn encode_ops(operations: Vec<Operation>) -> Result<Vec<u8>, PdfError> {
    Content { operations }
        .encode()
        .map_err(|e| PdfError::Write(format!("cannot encode content stream: {e}")))
}

fn page_dict_mut(doc: &mut Document, page_id: PageId) -> Result<&mut Dictionary, PdfError> {
    doc.get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .map_err(|e| PdfError::Write(format!("cannot get page object: {e}")))
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

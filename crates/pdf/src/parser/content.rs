use std::collections::BTreeMap;

use unredact_core::{BBox, Fill, RawShape};

use super::backend::{get_number_from_value, BackendFontInfo, PageBox, PageId, PdfBackend, PdfValue};
use crate::PdfError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One shown glyph, positioned in top-left page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub text: String,
    pub bbox: BBox,
    /// Base font name of the font the glyph was shown with.
    pub font_name: String,
    /// Rendered font size, after the text matrix and CTM scale.
    pub font_size: f64,
}

/// Everything the scanner found on a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScannedPage {
    /// Glyphs in content-stream order.
    pub glyphs: Vec<Glyph>,
    /// Filled paths and `/Redact` annotations.
    pub shapes: Vec<RawShape>,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Glyph advance, in em, used when the font has no usable `/Widths` entry.
const APPROX_CHAR_WIDTH_RATIO: f64 = 0.5;

/// Glyph box extent below the baseline, in em.
const DESCENT_RATIO: f64 = 0.2;

/// Glyph box extent above the baseline, in em.
const ASCENT_RATIO: f64 = 0.8;

// ---------------------------------------------------------------------------
// Internal: matrices
// ---------------------------------------------------------------------------

/// A PDF transformation matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    fn from_operands(operands: &[PdfValue]) -> Option<Self> {
        let vals: Vec<f64> = operands
            .iter()
            .take(6)
            .filter_map(get_number_from_value)
            .collect();
        match vals[..] {
            [a, b, c, d, e, f] => Some(Matrix([a, b, c, d, e, f])),
            _ => None,
        }
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    /// Length of the transformed vertical unit vector.
    fn vertical_scale(&self) -> f64 {
        let [_, _, c, d, _, _] = self.0;
        (c * c + d * d).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Internal: graphics, text and path state
// ---------------------------------------------------------------------------

/// The parts of the graphics state saved by `q` and restored by `Q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill: Fill,
    fill_alpha: Option<f64>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            fill: Fill::Gray(0.0),
            fill_alpha: None,
        }
    }
}

/// Mutable text state tracked while walking a page's content stream.
#[derive(Debug, Clone)]
struct TextState {
    /// Current font resource name (the `/F1`-style key, not the full name).
    font_key: Vec<u8>,
    /// Position of the current font in the page's font list.
    font_index: Option<usize>,
    /// Resolved base-font name for the current font.
    font_name: String,
    font_size: f64,
    text_matrix: Matrix,
    /// Set by BT and updated by Td/TD/T*/Tm.
    line_matrix: Matrix,
    /// Horizontal scaling factor (percent / 100).
    horiz_scale: f64,
    char_spacing: f64,
    word_spacing: f64,
    text_rise: f64,
    leading: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_index: None,
            font_name: String::new(),
            font_size: 0.0,
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    /// Advance the text matrix horizontally by `dx` text-space units.
    fn advance_x(&mut self, dx: f64) {
        self.text_matrix = Matrix::translate(dx, 0.0).then(&self.text_matrix);
    }

    /// Move to a new line offset from the start of the current one.
    fn translate_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translate(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }
}

/// Subpaths of the path under construction, in user space.
#[derive(Debug, Default)]
struct PathState {
    subpaths: Vec<Vec<(f64, f64)>>,
    open: bool,
}

impl PathState {
    fn move_to(&mut self, p: (f64, f64)) {
        self.subpaths.push(vec![p]);
        self.open = true;
    }

    fn extend(&mut self, points: &[(f64, f64)]) {
        match self.subpaths.last_mut() {
            Some(last) if self.open => last.extend_from_slice(points),
            _ => {
                self.subpaths.push(points.to_vec());
                self.open = true;
            }
        }
    }

    fn rect(&mut self, corners: [(f64, f64); 4]) {
        self.subpaths.push(corners.to_vec());
        self.open = false;
    }

    fn clear(&mut self) {
        self.subpaths.clear();
        self.open = false;
    }
}

/// Everything the scanner carries from one operation to the next.
struct Scanner<'a> {
    backend: &'a dyn PdfBackend,
    page_id: PageId,
    page_index: usize,
    page_box: PageBox,
    fonts: &'a [BackendFontInfo],
    alphas: BTreeMap<Vec<u8>, f64>,
    gstate: GraphicsState,
    stack: Vec<GraphicsState>,
    text: TextState,
    path: PathState,
    out: ScannedPage,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Walk a page's content stream and collect its glyphs and filled shapes.
///
/// | Operators | Action |
/// |-----------|--------|
/// | `q` `Q` `cm` | Graphics state stack and CTM |
/// | `g` `rg` `k` `cs` `sc` `scn` `gs` | Fill color and fill alpha |
/// | `m` `l` `c` `v` `y` `h` `re` | Path construction |
/// | `f` `F` `f*` `B` `B*` `b` `b*` | Fill: one shape per subpath |
/// | `n` `S` `s` | Discard the path |
/// | `BT` `Tf` `Tm` `Td` `TD` `T*` `TL` `Tc` `Tw` `Tz` `Ts` | Text state |
/// | `Tj` `TJ` `'` `"` | Show text: one glyph per character code |
///
/// Form XObjects (`Do`) are not entered.  `/Redact` annotations of the page
/// are appended to the shapes after the content stream.
pub fn scan_page(
    backend: &dyn PdfBackend,
    page_id: PageId,
    page_index: usize,
    page_box: PageBox,
) -> Result<ScannedPage, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;

    let fonts = backend.page_fonts(page_id).unwrap_or_else(|e| {
        log::warn!("page {page_index}: {e}; using default glyph widths");
        Vec::new()
    });

    let mut scanner = Scanner {
        backend,
        page_id,
        page_index,
        page_box,
        fonts: &fonts,
        alphas: backend.page_fill_alphas(page_id),
        gstate: GraphicsState::default(),
        stack: Vec::new(),
        text: TextState::default(),
        path: PathState::default(),
        out: ScannedPage::default(),
    };

    for op in &ops {
        scanner.apply(&op.operator, &op.operands);
    }

    for [a, b, c, d] in backend.page_redactions(page_id) {
        let bbox = scanner.to_page_bbox(&[(a, b), (c, d)]);
        scanner.out.shapes.push(RawShape::annotation(bbox, page_index));
    }

    Ok(scanner.out)
}

// ---------------------------------------------------------------------------
// Internal: operator dispatch
// ---------------------------------------------------------------------------

impl Scanner<'_> {
    fn apply(&mut self, operator: &str, operands: &[PdfValue]) {
        let num = |i: usize| operands.get(i).and_then(get_number_from_value);

        match operator {
            // -- Graphics state -----------------------------------------
            "q" => self.stack.push(self.gstate.clone()),
            "Q" => {
                if let Some(saved) = self.stack.pop() {
                    self.gstate = saved;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.gstate.ctm = m.then(&self.gstate.ctm);
                }
            }
            "gs" => {
                if let Some(PdfValue::Name(name)) = operands.first() {
                    if let Some(alpha) = self.alphas.get(name) {
                        self.gstate.fill_alpha = Some(*alpha);
                    }
                }
            }

            // -- Fill color ---------------------------------------------
            "g" => {
                if let Some(v) = num(0) {
                    self.gstate.fill = Fill::Gray(v);
                }
            }
            "rg" => {
                if let (Some(r), Some(g), Some(b)) = (num(0), num(1), num(2)) {
                    self.gstate.fill = Fill::Rgb(r, g, b);
                }
            }
            "k" => {
                if let (Some(c), Some(m), Some(y), Some(k)) = (num(0), num(1), num(2), num(3)) {
                    self.gstate.fill = Fill::Cmyk(c, m, y, k);
                }
            }
            "cs" => {
                self.gstate.fill = match operands.first() {
                    Some(PdfValue::Name(n)) => initial_color(n),
                    _ => Fill::Unknown,
                };
            }
            "sc" | "scn" => self.gstate.fill = color_from_components(operands),

            // -- Path construction --------------------------------------
            "m" => {
                if let (Some(x), Some(y)) = (num(0), num(1)) {
                    let p = self.gstate.ctm.apply(x, y);
                    self.path.move_to(p);
                }
            }
            "l" | "c" | "v" | "y" => {
                let coords: Vec<f64> = operands.iter().filter_map(get_number_from_value).collect();
                let points: Vec<(f64, f64)> = coords
                    .chunks_exact(2)
                    .map(|xy| self.gstate.ctm.apply(xy[0], xy[1]))
                    .collect();
                if !points.is_empty() {
                    self.path.extend(&points);
                }
            }
            "h" => {}
            "re" => {
                if let (Some(x), Some(y), Some(w), Some(h)) = (num(0), num(1), num(2), num(3)) {
                    let ctm = self.gstate.ctm;
                    self.path.rect([
                        ctm.apply(x, y),
                        ctm.apply(x + w, y),
                        ctm.apply(x + w, y + h),
                        ctm.apply(x, y + h),
                    ]);
                }
            }

            // -- Path painting ------------------------------------------
            "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                self.emit_fill();
                self.path.clear();
            }
            "n" | "S" | "s" => self.path.clear(),

            // -- Text object delimiters ---------------------------------
            "BT" => {
                self.text.text_matrix = Matrix::IDENTITY;
                self.text.line_matrix = Matrix::IDENTITY;
            }
            "ET" => {
                // Font state survives across text objects.
            }

            // -- Font ---------------------------------------------------
            "Tf" => self.handle_tf(operands),

            // -- Text matrix / position ---------------------------------
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.text.text_matrix = m;
                    self.text.line_matrix = m;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                    self.text.translate_line(tx, ty);
                }
            }
            "TD" => {
                // TD is equivalent to: -ty TL ; tx ty Td
                if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                    self.text.leading = -ty;
                    self.text.translate_line(tx, ty);
                }
            }
            "T*" => {
                let leading = self.text.leading;
                self.text.translate_line(0.0, -leading);
            }
            "TL" => {
                if let Some(v) = num(0) {
                    self.text.leading = v;
                }
            }

            // -- Spacing / scaling --------------------------------------
            "Tc" => {
                if let Some(v) = num(0) {
                    self.text.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = num(0) {
                    self.text.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = num(0) {
                    self.text.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = num(0) {
                    self.text.text_rise = v;
                }
            }

            // -- Show text ----------------------------------------------
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = operands.first() {
                    self.show(bytes);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            PdfValue::Str(bytes) => self.show(bytes),
                            other => {
                                // Thousandths of text space; negative moves right.
                                if let Some(adj) = get_number_from_value(other) {
                                    let dx = -adj / 1000.0
                                        * self.text.font_size
                                        * self.text.horiz_scale;
                                    self.text.advance_x(dx);
                                }
                            }
                        }
                    }
                }
            }
            "'" => {
                let leading = self.text.leading;
                self.text.translate_line(0.0, -leading);
                if let Some(PdfValue::Str(bytes)) = operands.first() {
                    self.show(bytes);
                }
            }
            "\"" => {
                // aw ac string  =>  Tw, Tc, T*, Tj
                if let (Some(aw), Some(ac), Some(PdfValue::Str(bytes))) =
                    (num(0), num(1), operands.get(2))
                {
                    self.text.word_spacing = aw;
                    self.text.char_spacing = ac;
                    let leading = self.text.leading;
                    self.text.translate_line(0.0, -leading);
                    self.show(bytes);
                }
            }

            _ => {}
        }
    }

    /// Handle the `Tf` (set font) operator.
    fn handle_tf(&mut self, operands: &[PdfValue]) {
        let key = match operands.first() {
            Some(PdfValue::Name(n)) | Some(PdfValue::Str(n)) => n.clone(),
            _ => return,
        };
        let size = operands.get(1).and_then(get_number_from_value).unwrap_or(0.0);

        let index = self.fonts.iter().position(|info| info.name == key);
        self.text.font_name = index
            .and_then(|i| self.fonts[i].base_font.clone())
            .unwrap_or_else(|| String::from_utf8_lossy(&key).into_owned());
        self.text.font_index = index;
        self.text.font_key = key;
        self.text.font_size = size;
    }

    /// Show a string operand: one glyph per character code.
    fn show(&mut self, bytes: &[u8]) {
        let fonts = self.fonts;
        let font = self.text.font_index.and_then(|i| fonts.get(i));
        let code_len = if font.is_some_and(BackendFontInfo::is_composite) { 2 } else { 1 };

        for code_bytes in bytes.chunks(code_len) {
            let code = code_bytes
                .iter()
                .fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
            let w0 = font
                .and_then(|f| f.glyph_width(code))
                .unwrap_or(APPROX_CHAR_WIDTH_RATIO);
            let text = self
                .backend
                .decode_text(self.page_id, &self.text.font_key, code_bytes);

            if !text.is_empty() {
                let glyph = self.glyph(text, w0);
                self.out.glyphs.push(glyph);
            }

            let ts = &self.text;
            let mut tx = w0 * ts.font_size + ts.char_spacing;
            if code_len == 1 && code == 32 {
                tx += ts.word_spacing;
            }
            self.text.advance_x(tx * self.text.horiz_scale);
        }
    }

    /// Box of the glyph at the current text position.
    fn glyph(&self, text: String, w0: f64) -> Glyph {
        let ts = &self.text;
        let trm = ts.text_matrix.then(&self.gstate.ctm);
        let width = w0 * ts.font_size * ts.horiz_scale;
        let bottom = ts.text_rise - DESCENT_RATIO * ts.font_size;
        let top = ts.text_rise + ASCENT_RATIO * ts.font_size;

        let corners = [
            trm.apply(0.0, bottom),
            trm.apply(width, bottom),
            trm.apply(width, top),
            trm.apply(0.0, top),
        ];

        Glyph {
            text,
            bbox: self.to_page_bbox(&corners),
            font_name: ts.font_name.clone(),
            font_size: (ts.font_size * trm.vertical_scale()).abs(),
        }
    }

    /// Turn every pending subpath into a filled shape.
    fn emit_fill(&mut self) {
        let subpaths = std::mem::take(&mut self.path.subpaths);
        for points in subpaths.iter().filter(|p| p.len() >= 3) {
            let bbox = self.to_page_bbox(points);
            self.out.shapes.push(RawShape {
                opacity: self.gstate.fill_alpha,
                ..RawShape::drawing(bbox, self.page_index, self.gstate.fill)
            });
        }
    }

    /// Bounding box of user-space points, in top-left page coordinates.
    fn to_page_bbox(&self, points: &[(f64, f64)]) -> BBox {
        let mut x0 = f64::INFINITY;
        let mut y0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut y1 = f64::NEG_INFINITY;
        for &(ux, uy) in points {
            let (x, y) = self.page_box.to_top_left(ux, uy);
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        BBox::new(x0, y0, x1, y1)
    }
}

/// Initial fill color after `cs`.
fn initial_color(space: &[u8]) -> Fill {
    match space {
        b"DeviceGray" | b"CalGray" | b"G" => Fill::Gray(0.0),
        b"DeviceRGB" | b"CalRGB" | b"RGB" => Fill::Rgb(0.0, 0.0, 0.0),
        b"DeviceCMYK" | b"CMYK" => Fill::Cmyk(0.0, 0.0, 0.0, 1.0),
        _ => Fill::Unknown,
    }
}

/// Interpret `sc` / `scn` operands by component count.  Pattern fills (a
/// name operand) have no usable color.
fn color_from_components(operands: &[PdfValue]) -> Fill {
    if operands.iter().any(|o| matches!(o, PdfValue::Name(_))) {
        return Fill::Unknown;
    }
    let c: Vec<f64> = operands.iter().filter_map(get_number_from_value).collect();
    match c[..] {
        [g] => Fill::Gray(g),
        [r, g, b] => Fill::Rgb(r, g, b),
        [cy, m, y, k] => Fill::Cmyk(cy, m, y, k),
        _ => Fill::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use lopdf::{self, content::Content};

use crate::render::encoding::win_ansi_char;
use crate::PdfError;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Font information extracted from a page's resource dictionary.
#[derive(Debug, Clone, Default)]
pub struct BackendFontInfo {
    /// The font name key as it appears in the resource dictionary (e.g. `b"F1"`).
    pub name: Vec<u8>,
    /// Base font name from the font dictionary, if present.
    pub base_font: Option<String>,
    /// Font subtype (e.g. `Type1`, `TrueType`, `Type0`).
    pub subtype: Option<String>,
    /// Encoding entry from the font dictionary, if present.
    pub encoding: Option<String>,
    /// First character code covered by `widths`.
    pub first_char: u32,
    /// Glyph widths in thousandths of text space, indexed from `first_char`.
    pub widths: Vec<f64>,
}

impl BackendFontInfo {
    /// Composite fonts use two-byte codes.
    pub fn is_composite(&self) -> bool {
        self.subtype.as_deref() == Some("Type0")
            || self
                .encoding
                .as_deref()
                .is_some_and(|e| e.contains("Identity"))
    }

    /// Width of `code` in text space units per unit of font size, when the
    /// font's `/Widths` array covers it.
    pub fn glyph_width(&self, code: u32) -> Option<f64> {
        if self.is_composite() {
            return None;
        }
        let index = code.checked_sub(self.first_char)? as usize;
        self.widths
            .get(index)
            .filter(|w| w.is_finite() && **w > 0.0)
            .map(|w| w / 1000.0)
    }
}

/// A page box `[llx lly urx ury]` in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl PageBox {
    pub fn from_array(nums: &[f64]) -> Option<Self> {
        match nums {
            [a, b, c, d, ..] => Some(PageBox {
                llx: a.min(*c),
                lly: b.min(*d),
                urx: a.max(*c),
                ury: b.max(*d),
            }),
            _ => None,
        }
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }

    /// Map a user-space point to top-left page coordinates (y grows down).
    pub fn to_top_left(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.llx, self.ury - y)
    }

    /// Map a top-left page point back to user space.
    pub fn to_user_space(&self, x: f64, y: f64) -> (f64, f64) {
        (x + self.llx, self.ury - y)
    }
}

impl Default for PageBox {
    /// US Letter, used when a page carries no usable MediaBox.
    fn default() -> Self {
        PageBox {
            llx: 0.0,
            lly: 0.0,
            urx: 612.0,
            ury: 792.0,
        }
    }
}

/// A simplified, lopdf-independent representation of a PDF value.
///
/// This enum decouples the content scanner from the concrete `lopdf::Object`
/// type so that it can be driven by synthetic operations in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(Vec<(Vec<u8>, PdfValue)>),
    Reference(PageId),
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Extract an `f64` from a [`PdfValue`], accepting both `Integer` and `Real`.
pub fn get_number_from_value(val: &PdfValue) -> Option<f64> {
    match val {
        PdfValue::Integer(i) => Some(*i as f64),
        PdfValue::Real(f) => Some(*f as f64),
        _ => None,
    }
}

/// Convert a `lopdf::Object` into a [`PdfValue`].
///
/// References are preserved as `PdfValue::Reference`.  Stream dictionaries
/// are converted but the raw stream bytes are discarded (they must be
/// obtained through [`PdfBackend::page_content`]).
pub fn convert_object(obj: &lopdf::Object) -> PdfValue {
    match obj {
        lopdf::Object::Null => PdfValue::Null,
        lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
        lopdf::Object::Integer(i) => PdfValue::Integer(*i),
        lopdf::Object::Real(f) => PdfValue::Real(*f),
        lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
        lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
        lopdf::Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        lopdf::Object::Dictionary(dict) => PdfValue::Dict(
            dict.iter()
                .map(|(k, v)| (k.clone(), convert_object(v)))
                .collect(),
        ),
        lopdf::Object::Stream(stream) => PdfValue::Dict(
            stream
                .dict
                .iter()
                .map(|(k, v)| (k.clone(), convert_object(v)))
                .collect(),
        ),
        lopdf::Object::Reference(id) => PdfValue::Reference(*id),
    }
}

/// Best-effort decoding of raw PDF string bytes into a Rust `String`.
///
/// Handles three cases in order:
/// 1. UTF-16BE with BOM (`\xFE\xFF` prefix) -- strips BOM and decodes.
/// 2. Valid UTF-8 -- returned as-is.
/// 3. Fallback to Latin-1 (ISO 8859-1) -- each byte mapped to its Unicode
///    code point.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let code_units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&code_units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

fn object_to_f64(obj: &lopdf::Object) -> Option<f64> {
    match obj {
        lopdf::Object::Integer(i) => Some(*i as f64),
        lopdf::Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// PdfBackend trait
// ---------------------------------------------------------------------------

/// Abstraction over a PDF parsing backend (currently backed by `lopdf`).
///
/// The content scanner only talks to this trait, so it can be tested against
/// mock implementations that hand out pre-decoded operations.
pub trait PdfBackend {
    /// Return a mapping from 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// The page's MediaBox, inherited through the page tree.
    fn page_box(&self, page: PageId) -> Result<PageBox, PdfError>;

    /// Return font information for every font referenced by the given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError>;

    /// Fill alpha (`/ca`) of every ExtGState resource of the page that sets one.
    fn page_fill_alphas(&self, page: PageId) -> BTreeMap<Vec<u8>, f64>;

    /// `/Rect` arrays of the page's `/Redact` annotations, in user space.
    fn page_redactions(&self, page: PageId) -> Vec<[f64; 4]>;

    /// Return the raw (possibly compressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    /// Decode raw content-stream bytes into a sequence of [`ContentOp`]s.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// Decode raw string bytes found in a text-showing operator, using any
    /// font-specific encoding information the backend can find for the given
    /// page and font name.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] implementation backed by [`lopdf::Document`].
#[derive(Debug)]
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    /// Parse a PDF from an in-memory byte slice.
    ///
    /// Encrypted documents are rejected; this tool never tries to get around
    /// a document's security settings.
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self { doc })
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &lopdf::Document {
        &self.doc
    }

    /// Total number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// The page's `/Resources` dictionary, inherited through the page tree.
    pub fn page_resources(&self, page: PageId) -> Option<&lopdf::Dictionary> {
        let page_dict = self.doc.get_object(page).ok()?.as_dict().ok()?;
        let resources = self.find_inherited(page_dict, b"Resources")?;
        self.resolve(resources).as_dict().ok()
    }

    // -- private helpers ----------------------------------------------------

    /// Walk up the page tree until `key` is found.
    fn find_inherited<'a>(
        &'a self,
        dict: &'a lopdf::Dictionary,
        key: &[u8],
    ) -> Option<&'a lopdf::Object> {
        if let Ok(obj) = dict.get(key) {
            return Some(obj);
        }

        let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
        let parent_dict = self.doc.get_object(parent_id).ok()?.as_dict().ok()?;
        self.find_inherited(parent_dict, key)
    }

    /// Follow references until a direct object is reached.
    fn resolve<'a>(&'a self, obj: &'a lopdf::Object) -> &'a lopdf::Object {
        let mut current = obj;
        // Bounded so that a reference cycle cannot hang the scanner.
        for _ in 0..32 {
            match current {
                lopdf::Object::Reference(id) => match self.doc.get_object(*id) {
                    Ok(next) => current = next,
                    Err(_) => return current,
                },
                _ => return current,
            }
        }
        current
    }

    /// Resolve an object to a vector of numbers.  Any non-numeric element
    /// fails the whole array.
    fn resolve_numbers(&self, obj: &lopdf::Object) -> Option<Vec<f64>> {
        self.resolve(obj)
            .as_array()
            .ok()?
            .iter()
            .map(|o| object_to_f64(self.resolve(o)))
            .collect()
    }

    /// A sub-dictionary of the page resources, e.g. `/ExtGState`.
    fn resource_category(&self, page: PageId, category: &[u8]) -> Option<&lopdf::Dictionary> {
        let resources = self.page_resources(page)?;
        let entry = resources.get(category).ok()?;
        self.resolve(entry).as_dict().ok()
    }

    /// Look up the encoding name for a font on a page.
    fn font_encoding_name(&self, page: PageId, font_name: &[u8]) -> Option<String> {
        let fonts = self.doc.get_page_fonts(page).ok()?;
        let font_dict = fonts.get(font_name)?;
        let enc_obj = font_dict.get(b"Encoding").ok()?;
        match self.resolve(enc_obj) {
            lopdf::Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            lopdf::Object::Dictionary(d) => d
                .get(b"BaseEncoding")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PdfBackend implementation for LopdfBackend
// ---------------------------------------------------------------------------

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_box(&self, page: PageId) -> Result<PageBox, PdfError> {
        let page_dict = self
            .doc
            .get_object(page)
            .and_then(|o| o.as_dict())
            .map_err(|e| PdfError::Parse(format!("cannot get page object: {}", e)))?;

        let media_box = self
            .find_inherited(page_dict, b"MediaBox")
            .ok_or_else(|| PdfError::Parse("MediaBox not found for page".into()))?;

        let nums = self
            .resolve_numbers(media_box)
            .ok_or_else(|| PdfError::Parse("MediaBox is not a numeric array".into()))?;

        PageBox::from_array(&nums).ok_or_else(|| {
            PdfError::Parse(format!(
                "MediaBox has {} elements, expected 4",
                nums.len()
            ))
        })
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
        let fonts_map = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page fonts: {}", e)))?;

        let name_of = |dict: &lopdf::Dictionary, key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned())
        };

        let mut result = Vec::with_capacity(fonts_map.len());
        for (name, dict) in &fonts_map {
            let dict: &lopdf::Dictionary = dict;
            let first_char = dict
                .get(b"FirstChar")
                .ok()
                .and_then(|o| object_to_f64(self.resolve(o)))
                .filter(|c| *c >= 0.0)
                .map(|c| c as u32)
                .unwrap_or(0);

            let widths = dict
                .get(b"Widths")
                .ok()
                .and_then(|o| self.resolve_numbers(o))
                .unwrap_or_default();

            result.push(BackendFontInfo {
                name: name.clone(),
                base_font: name_of(dict, b"BaseFont"),
                subtype: name_of(dict, b"Subtype"),
                encoding: name_of(dict, b"Encoding"),
                first_char,
                widths,
            });
        }

        Ok(result)
    }

    fn page_fill_alphas(&self, page: PageId) -> BTreeMap<Vec<u8>, f64> {
        let mut alphas = BTreeMap::new();
        let Some(states) = self.resource_category(page, b"ExtGState") else {
            return alphas;
        };

        for (name, obj) in states.iter() {
            let alpha = self
                .resolve(obj)
                .as_dict()
                .ok()
                .and_then(|d| d.get(b"ca").ok())
                .and_then(|o| object_to_f64(self.resolve(o)));
            if let Some(alpha) = alpha {
                alphas.insert(name.clone(), alpha);
            }
        }

        alphas
    }

    fn page_redactions(&self, page: PageId) -> Vec<[f64; 4]> {
        let annots = self
            .doc
            .get_object(page)
            .and_then(|o| o.as_dict())
            .ok()
            .and_then(|d| d.get(b"Annots").ok())
            .and_then(|o| self.resolve(o).as_array().ok());

        let Some(annots) = annots else {
            return Vec::new();
        };

        annots
            .iter()
            .filter_map(|a| self.resolve(a).as_dict().ok())
            .filter(|d| {
                d.get(b"Subtype")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .is_some_and(|n| n == b"Redact")
            })
            .filter_map(|d| {
                let rect = self.resolve_numbers(d.get(b"Rect").ok()?)?;
                match rect[..] {
                    [a, b, c, e, ..] => Some([a, b, c, e]),
                    _ => None,
                }
            })
            .collect()
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {}", e)))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let content = Content::decode(data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {}", e)))?;

        let ops = content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect();

        Ok(ops)
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        match self.font_encoding_name(page, font_name).as_deref() {
            // Identity-H / Identity-V fonts typically use 2-byte CID codes
            // that map to Unicode.  Try UTF-16BE decoding.
            Some(enc) if enc.contains("Identity") && bytes.len() >= 2 && bytes.len() % 2 == 0 => {
                let code_units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                let decoded = String::from_utf16_lossy(&code_units);
                if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                    return decoded;
                }
                decode_text_simple(bytes)
            }
            Some("WinAnsiEncoding") => bytes.iter().map(|&b| win_ansi_char(b)).collect(),
            _ => decode_text_simple(bytes),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Fixtures shared by the unit tests of this crate.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};

use unredact_core::{analyze_document, LayoutConfig, PageAnalysis, RawWord};

use crate::parser::backend::{
    decode_text_simple, BackendFontInfo, ContentOp, LopdfBackend, PageBox, PageId, PdfBackend,
    PdfValue,
};
use crate::parser::{extract_pages, ExtractOptions};
use crate::PdfError;

// ---------------------------------------------------------------------------
// Mock backend
// ---------------------------------------------------------------------------

/// A backend that hands out pre-decoded operations.
pub struct MockBackend {
    pub page_ids: BTreeMap<u32, PageId>,
    /// `None` makes `page_box` fail.
    pub page_box: Option<PageBox>,
    pub fonts: Vec<BackendFontInfo>,
    pub ops: Vec<ContentOp>,
    pub alphas: BTreeMap<Vec<u8>, f64>,
    pub redactions: Vec<[f64; 4]>,
    /// Makes `page_content` fail.
    pub fail_content: bool,
}

impl MockBackend {
    /// One Letter page, font `F1` = Helvetica.
    pub fn with_ops(ops: Vec<ContentOp>) -> Self {
        MockBackend {
            page_ids: [(1, (1, 0))].into_iter().collect(),
            page_box: Some(PageBox::default()),
            fonts: helvetica_font(),
            ops,
            alphas: BTreeMap::new(),
            redactions: Vec::new(),
            fail_content: false,
        }
    }
}

impl PdfBackend for MockBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.page_ids.clone()
    }

    fn page_box(&self, _page: PageId) -> Result<PageBox, PdfError> {
        self.page_box
            .ok_or_else(|| PdfError::Parse("MediaBox not found for page".into()))
    }

    fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
        Ok(self.fonts.clone())
    }

    fn page_fill_alphas(&self, _page: PageId) -> BTreeMap<Vec<u8>, f64> {
        self.alphas.clone()
    }

    fn page_redactions(&self, _page: PageId) -> Vec<[f64; 4]> {
        self.redactions.clone()
    }

    fn page_content(&self, _page: PageId) -> Result<Vec<u8>, PdfError> {
        if self.fail_content {
            return Err(PdfError::Parse("cannot get page content: broken stream".into()));
        }
        Ok(vec![])
    }

    fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        Ok(self.ops.clone())
    }

    fn decode_text(&self, _page: PageId, _font_name: &[u8], bytes: &[u8]) -> String {
        decode_text_simple(bytes)
    }
}

pub fn helvetica_font() -> Vec<BackendFontInfo> {
    vec![BackendFontInfo {
        name: b"F1".to_vec(),
        base_font: Some("Helvetica".to_string()),
        ..BackendFontInfo::default()
    }]
}

pub fn make_op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
    ContentOp {
        operator: operator.to_string(),
        operands,
    }
}

pub fn n(value: f64) -> PdfValue {
    PdfValue::Real(value as f32)
}

pub fn name(value: &[u8]) -> PdfValue {
    PdfValue::Name(value.to_vec())
}

pub fn re_op(x: f64, y: f64, w: f64, h: f64) -> ContentOp {
    make_op("re", vec![n(x), n(y), n(w), n(h)])
}

pub fn tf_op(font: &[u8], size: f64) -> ContentOp {
    make_op("Tf", vec![name(font), n(size)])
}

pub fn tj_op(text: &[u8]) -> ContentOp {
    make_op("Tj", vec![PdfValue::Str(text.to_vec())])
}

// ---------------------------------------------------------------------------
// Real documents
// ---------------------------------------------------------------------------

/// Knobs for [`sample_pdf`].
#[derive(Debug, Clone)]
pub struct SampleOptions {
    /// Draw a black box over "John Smith".
    pub draw_box: bool,
    /// Add a `/Redact` annotation with this `/Rect`.
    pub redact_annotation: Option<[f64; 4]>,
    /// Add ExtGState `GS1` with this `/ca` and apply it to the box.
    pub fill_alpha: Option<f64>,
}

impl Default for SampleOptions {
    fn default() -> Self {
        SampleOptions {
            draw_box: true,
            redact_annotation: None,
            fill_alpha: None,
        }
    }
}

/// A one-page Letter document showing `Name: John Smith` in 12pt Courier
/// at (72, 700), optionally with the name covered by a black box.
///
/// Courier advances 7.2pt per character at 12pt, so "John" starts at 115.2
/// and "Smith" ends at 187.2.
pub fn sample_pdf(options: &SampleOptions) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
        "FirstChar" => Object::Integer(32),
        "LastChar" => Object::Integer(126),
        "Widths" => vec![Object::Integer(600); 95],
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), Object::Integer(12)]),
        Operation::new("Td", vec![Object::Integer(72), Object::Integer(700)]),
        Operation::new("Tj", vec![Object::string_literal("Name: John Smith")]),
        Operation::new("ET", vec![]),
    ];
    if options.draw_box {
        operations.push(Operation::new("q", vec![]));
        if options.fill_alpha.is_some() {
            operations.push(Operation::new("gs", vec!["GS1".into()]));
        }
        operations.extend([
            Operation::new("g", vec![Object::Integer(0)]),
            Operation::new(
                "re",
                vec![
                    Object::Integer(114),
                    Object::Integer(696),
                    Object::Integer(76),
                    Object::Integer(14),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }
    let content = Content { operations }.encode().unwrap();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let mut resources = dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_id),
        },
    };
    if let Some(alpha) = options.fill_alpha {
        resources.set(
            "ExtGState",
            dictionary! {
                "GS1" => dictionary! {
                    "Type" => "ExtGState",
                    "ca" => Object::Real(alpha as f32),
                },
            },
        );
    }

    let mut page_dict = dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
        "Contents" => Object::Reference(content_id),
        "Resources" => resources,
    };
    if let Some([a, b, c, d]) = options.redact_annotation {
        let annot_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Redact",
            "Rect" => vec![
                Object::Real(a as f32),
                Object::Real(b as f32),
                Object::Real(c as f32),
                Object::Real(d as f32),
            ],
        });
        page_dict.set("Annots", vec![Object::Reference(annot_id)]);
    }
    let page_id = doc.add_object(page_dict);

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => Object::Integer(1),
    });

    if let Ok(page_obj) = doc.get_object_mut(page_id) {
        if let Ok(dict) = page_obj.as_dict_mut() {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Run extraction and analysis with default settings.
pub fn analyze_sample(backend: &LopdfBackend) -> Vec<PageAnalysis> {
    let options = ExtractOptions::default();
    analyze_document(extract_pages(backend, &options), &LayoutConfig::default())
        .unwrap()
        .pages
}

/// Every word of every page of a serialized document.
pub fn extract_words(bytes: &[u8]) -> Vec<RawWord> {
    let backend = LopdfBackend::load_bytes(bytes).unwrap();
    let options = ExtractOptions::default();
    extract_pages(&backend, &options)
        .flat_map(|page| page.unwrap().words)
        .collect()
}

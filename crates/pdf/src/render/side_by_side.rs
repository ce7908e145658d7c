use lopdf::content::Operation;
use lopdf::{dictionary, Document, Object, Stream};
use unredact_core::RebuiltLine;

use super::{add_fonts, encode_ops, page_dict_mut, real, text_layer, FontRegistry, PageTarget, RenderOptions};
use crate::PdfError;

/// Resource name of the Form XObject holding the original page.
const ORIGINAL_FORM: &str = "UnrOrig";

/// Page boxes that would crop the widened page.
const STALE_BOXES: [&[u8]; 3] = [b"TrimBox", b"BleedBox", b"ArtBox"];

/// Widen the page to twice its width, draw the original content on the left
/// and the rebuilt lines, in black, on the right.
pub(super) fn compose_page(
    doc: &mut Document,
    page: &PageTarget,
    lines: &[RebuiltLine],
    fonts: &mut FontRegistry,
    options: &RenderOptions,
) -> Result<(), PdfError> {
    let page_box = page.page_box;
    let width = page_box.width();

    let original = page.content().unwrap_or_else(|e| {
        log::warn!("page {:?}: {e}; left half will be blank", page.page_id);
        Vec::new()
    });

    let form = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![
                real(page_box.llx),
                real(page_box.lly),
                real(page_box.urx),
                real(page_box.ury),
            ],
            "Resources" => page.inline_resources(),
        },
        original,
    );
    let form_id = doc.add_object(form);

    let (text_ops, used) = text_layer(lines, &page_box, width, 0.0, options);
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("Do", vec![Object::Name(ORIGINAL_FORM.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ];
    ops.extend(text_ops);
    let content_id = doc.add_object(Stream::new(dictionary! {}, encode_ops(ops)?));

    let mut resources = dictionary! {
        "XObject" => dictionary! {
            ORIGINAL_FORM => Object::Reference(form_id),
        },
    };
    add_fonts(doc, fonts, &mut resources, &used);

    let media_box: Vec<Object> = vec![
        real(page_box.llx),
        real(page_box.lly),
        real(page_box.llx + 2.0 * width),
        real(page_box.ury),
    ];

    let page_dict = page_dict_mut(doc, page.page_id)?;
    page_dict.set("MediaBox", media_box.clone());
    page_dict.set("CropBox", media_box);
    for key in STALE_BOXES {
        page_dict.remove(key);
    }
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", resources);
    Ok(())
}

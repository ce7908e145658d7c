use lopdf::{dictionary, Document, Object, Stream};
use unredact_core::RebuiltLine;

use super::{add_fonts, encode_ops, page_dict_mut, text_layer, FontRegistry, PageTarget, RenderOptions};
use crate::PdfError;

/// Append the rebuilt lines, in white, on top of the page's own content.
///
/// The original content is wrapped in `q`/`Q` so a state it leaves behind
/// (CTM, clipping) cannot move the new text.  Pages with nothing to draw
/// are left untouched.
pub(super) fn compose_page(
    doc: &mut Document,
    page: &PageTarget,
    lines: &[RebuiltLine],
    fonts: &mut FontRegistry,
    options: &RenderOptions,
) -> Result<(), PdfError> {
    if lines.iter().all(|l| l.text.trim().is_empty()) {
        return Ok(());
    }

    let original = match page.content() {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("page {:?}: {e}; left unchanged", page.page_id);
            return Ok(());
        }
    };

    let (ops, used) = text_layer(lines, &page.page_box, 0.0, 1.0, options);
    let mut resources = page.inline_resources();
    add_fonts(doc, fonts, &mut resources, &used);

    let mut content = b"q\n".to_vec();
    content.extend_from_slice(&original);
    content.extend_from_slice(b"\nQ\n");
    content.extend(encode_ops(ops)?);
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let page_dict = page_dict_mut(doc, page.page_id)?;
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", resources);
    Ok(())
}

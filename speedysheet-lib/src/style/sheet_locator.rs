use log::debug;

use crate::dom::dom_tree::{Document, ElementHandle, Node};
use crate::style::sheet::SheetHandle;

/// Find the sheet owned by `tag`, looking it up fresh every time.
///
/// Uses the element's own sheet reference when it has one. Some engines don't
/// reliably expose that, so otherwise walk `document.style_sheets()` and take
/// the first sheet whose owner node is `tag`. The scan reads the owner recorded
/// in the document's sheet list, never the sheets, so it is fine to call while
/// another sheet is borrowed for editing.
pub fn try_sheet_for_tag(document: &Document, tag: &ElementHandle) -> Option<SheetHandle> {
    if let Some(sheet) = direct_sheet(tag) {
        return Some(sheet);
    }

    debug!(
        "no direct sheet on element, scanning {} document sheets",
        document.sheet_count()
    );
    document.sheet_owned_by(tag)
}

/// Like [`try_sheet_for_tag`], but a style element without a sheet is a broken
/// caller invariant and panics.
pub fn sheet_for_tag(document: &Document, tag: &ElementHandle) -> SheetHandle {
    match try_sheet_for_tag(document, tag) {
        Some(sheet) => sheet,
        None => panic!("no stylesheet is owned by the <{}> element", tag_name(tag)),
    }
}

fn direct_sheet(tag: &ElementHandle) -> Option<SheetHandle> {
    match &*tag.borrow() {
        Node::Element(elem) => elem.sheet.clone(),
        _ => None,
    }
}

fn tag_name(tag: &ElementHandle) -> String {
    match &*tag.borrow() {
        Node::Element(elem) => elem.tag.clone(),
        Node::DocumentRoot(_) => "#document".to_string(),
        Node::Text(_) => "#text".to_string(),
    }
}

use crate::dom::dom_tree::Document;
use crate::error::EditError;
use crate::style::rule_helpers::{delete_range, insert_many};
use crate::style::sheet::RuleSheet;
use crate::style::sheet_locator::sheet_for_tag;

/// A range of rules to remove, counted downward from `removal_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRange {
    pub removal_index: usize,
    pub count: usize,
}

/// One round of edits against a single `<style>` element's sheet:
/// an optional deletion, then a batch insert.
#[derive(Debug, Clone, Default)]
pub struct SheetEdit {
    /// Which `<style>` element, in document order.
    pub style_index: usize,
    pub delete: Option<DeleteRange>,
    pub insert_rules: Vec<String>,
    /// Batch start index; `None` appends after the existing rules.
    pub insert_at: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditReport {
    pub injected: usize,
    pub rules: Vec<String>,
}

/// Locate the sheet for `edit.style_index`, run the deletion, then the batch insert.
pub fn apply(document: &Document, edit: &SheetEdit) -> Result<EditReport, EditError> {
    let tags = document.style_elements();
    let tag = tags
        .get(edit.style_index)
        .ok_or(EditError::MissingStyleElement {
            index: edit.style_index,
            found: tags.len(),
        })?;

    let handle = sheet_for_tag(document, tag);
    let mut sheet = handle.borrow_mut();

    if let Some(range) = edit.delete {
        delete_range(&mut *sheet, range.removal_index, range.count)?;
    }

    let start_index = edit.insert_at.unwrap_or_else(|| sheet.rule_count());
    let injected = insert_many(&mut *sheet, &edit.insert_rules, start_index);

    Ok(EditReport {
        injected,
        rules: sheet.rules().iter().map(|rule| rule.css_text.clone()).collect(),
    })
}

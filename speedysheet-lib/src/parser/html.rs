//! Parses HTML into the crate's DOM tree and builds a sheet for every `<style>`.
//!
//! html5ever does the tokenizing and tree construction; `SheetTreeSink` just
//! records the nodes. Once the tree exists, `attach_style_sheets` plays the part
//! of the browser creating the CSSOM for each style element.

use crate::config::HostConfig;
use crate::dom::dom_tree::{self, Document, NodeHandle};
use crate::error::SheetError;
use crate::style::sheet::CssStyleSheet;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    interface::{ElemName, NodeOrText, QuirksMode, TreeSink},
    LocalName, Namespace, QualName,
};
use log::{debug, info};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Parses HTML and attaches a sheet to each `<style>` element.
///
/// # Arguments
///
/// * `html_content` - The HTML to parse.
/// * `config` - Host options: whether elements expose their sheet directly and
///   whether bad rules in the initial CSS are dropped or fatal.
///
/// # Returns
///
/// The parsed `Document` with one registered sheet per `<style>` element, or the
/// `SheetError` for the first style element whose CSS could not be loaded.
pub fn create_document(html_content: &str, config: &HostConfig) -> Result<Document, SheetError> {
    let document = create_dom_tree(html_content);
    attach_style_sheets(&document, config)?;
    Ok(document)
}

/// Creates a DOM tree from the provided HTML content.
///
/// # Arguments
///
/// * `html_content` - A string slice containing the HTML to parse.
///
/// # Returns
///
/// A `dom_tree::Document` with no stylesheets attached yet.
pub fn create_dom_tree(html_content: &str) -> Document {
    let tree_sink = SheetTreeSink::new();
    html5ever::parse_document(tree_sink, Default::default()).one(html_content.to_string())
}

/// Give every `<style>` element a sheet built from its text, in document order,
/// and register each one with the document. Elements that already own a
/// registered sheet are left alone.
pub fn attach_style_sheets(document: &Document, config: &HostConfig) -> Result<(), SheetError> {
    for element in document.style_elements() {
        if document.sheet_owned_by(&element).is_some() {
            debug!("style element already owns a sheet, skipping");
            continue;
        }

        let css_text = match &*element.borrow() {
            dom_tree::Node::Element(elem) => elem.text_content(),
            _ => continue,
        };

        let mut sheet = CssStyleSheet::new(&element);
        sheet.replace_text(&css_text, config.recover_invalid_rules)?;
        let sheet = sheet.into_handle();

        if config.expose_direct_sheet {
            if let dom_tree::Node::Element(elem) = &mut *element.borrow_mut() {
                elem.sheet = Some(Rc::clone(&sheet));
            }
        }

        info!(
            "registered sheet #{} with {} rules",
            document.sheet_count(),
            sheet.borrow().rules().len()
        );
        document.register_sheet(&element, sheet);
    }
    Ok(())
}

/// TreeSink that builds a `dom_tree::Document`.
pub struct SheetTreeSink {
    document: Document,
    quirks_mode: RefCell<QuirksMode>,
}

impl SheetTreeSink {
    pub fn new() -> Self {
        Self {
            document: dom_tree::new_document(),
            quirks_mode: RefCell::new(QuirksMode::NoQuirks),
        }
    }
}

impl Default for SheetTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct SheetElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for SheetElemName {
    fn local_name(&self) -> &LocalName {
        &self.local
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }
}

fn children_mut(node: &mut dom_tree::Node) -> Option<&mut Vec<NodeHandle>> {
    match node {
        dom_tree::Node::DocumentRoot(root) => Some(&mut root.children),
        dom_tree::Node::Element(element) => Some(&mut element.children),
        // Text nodes cannot have children.
        dom_tree::Node::Text(_) => None,
    }
}

/// Parent of an element. Text nodes don't track theirs.
fn parent_of(node: &NodeHandle) -> Option<NodeHandle> {
    match &*node.borrow() {
        dom_tree::Node::Element(elem) => elem.parent.as_ref().and_then(Weak::upgrade),
        _ => None,
    }
}

fn set_parent(node: &NodeHandle, parent: Option<&NodeHandle>) {
    if let dom_tree::Node::Element(elem) = &mut *node.borrow_mut() {
        elem.parent = parent.map(Rc::downgrade);
    }
}

fn detach(node: &NodeHandle) {
    if let Some(parent) = parent_of(node) {
        if let Some(children) = children_mut(&mut parent.borrow_mut()) {
            children.retain(|child| !Rc::ptr_eq(child, node));
        }
    }
    set_parent(node, None);
}

/// Insert `child` under `parent` before `before` (or at the end). A node that is
/// still attached somewhere else is moved, never duplicated.
fn insert_child(parent: &NodeHandle, child: NodeHandle, before: Option<&NodeHandle>) {
    detach(&child);

    let inserted = match children_mut(&mut parent.borrow_mut()) {
        Some(children) => {
            let position = before
                .and_then(|sibling| children.iter().position(|c| Rc::ptr_eq(c, sibling)))
                .unwrap_or(children.len());
            children.insert(position, Rc::clone(&child));
            true
        }
        None => false,
    };
    if inserted {
        set_parent(&child, Some(parent));
    }
}

fn new_node(child: NodeOrText<NodeHandle>) -> NodeHandle {
    match child {
        NodeOrText::AppendNode(node) => node,
        NodeOrText::AppendText(text) => {
            Rc::new(RefCell::new(dom_tree::Node::Text(text.to_string())))
        }
    }
}

impl TreeSink for SheetTreeSink {
    type Handle = NodeHandle;
    type Output = Document;
    type ElemName<'a>
        = SheetElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.document
    }

    fn parse_error(&self, msg: std::borrow::Cow<'static, str>) {
        debug!("html parse error: {}", msg);
    }

    fn get_document(&self) -> Self::Handle {
        self.document.root.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        if let dom_tree::Node::Element(ref elem) = *target.borrow() {
            return SheetElemName {
                ns: elem.qual_name.ns.clone(),
                local: elem.qual_name.local.clone(),
            };
        }
        panic!("elem_name called on non-element node")
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<html5ever::Attribute>,
        _flags: html5ever::interface::ElementFlags,
    ) -> Self::Handle {
        let mut element = dom_tree::ElementNode::new(name.local.to_string(), name);
        element.attributes = attrs
            .into_iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        Rc::new(RefCell::new(dom_tree::Node::Element(element)))
    }

    /// Comments are kept as empty text so they never show up in `<style>` text.
    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        Rc::new(RefCell::new(dom_tree::Node::Text(String::new())))
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        Rc::new(RefCell::new(dom_tree::Node::Text(String::new())))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        insert_child(parent, new_node(child), None);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        if parent_of(element).is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        *self.document.doctype.borrow_mut() = Some(dom_tree::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        *self.quirks_mode.borrow_mut() = mode;
    }

    /// Used for content foster-parented out of tables.
    fn append_before_sibling(&self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>) {
        if let Some(parent) = parent_of(sibling) {
            insert_child(&parent, new_node(child), Some(sibling));
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<html5ever::Attribute>) {
        if let dom_tree::Node::Element(elem) = &mut *target.borrow_mut() {
            for attr in attrs {
                let key = attr.name.local.to_string();
                if elem.attribute(&key).is_none() {
                    elem.attributes.push((key, attr.value.to_string()));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        detach(target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let children = match children_mut(&mut node.borrow_mut()) {
            Some(children) => std::mem::take(children),
            None => return,
        };
        for child in children {
            insert_child(new_parent, child, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::sheet::RuleSheet;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<style id="base">.a { color: red; } .b { display: none; }</style>
<style id="empty"></style>
</head>
<body>
  <div class="a">Hello</div>
  <style id="late">.c { color: red; }</style>
</body>
</html>"#;

    #[test]
    fn test_one_sheet_per_style_element() {
        let document = create_document(PAGE, &HostConfig::default()).unwrap();
        let tags = document.style_elements();
        assert_eq!(tags.len(), 3);
        assert_eq!(document.style_sheets().len(), 3);

        let ids: Vec<String> = tags
            .iter()
            .map(|tag| match &*tag.borrow() {
                dom_tree::Node::Element(elem) => elem.attribute("id").unwrap_or("").to_string(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(ids, vec!["base", "empty", "late"]);

        let counts: Vec<usize> = document
            .style_sheets()
            .iter()
            .map(|sheet| sheet.borrow().rule_count())
            .collect();
        assert_eq!(counts, vec![2, 0, 1]);
    }

    #[test]
    fn test_sheets_record_owner() {
        let document = create_document(PAGE, &HostConfig::without_direct_sheet()).unwrap();
        for (tag, sheet) in document
            .style_elements()
            .iter()
            .zip(document.style_sheets().iter())
        {
            assert!(sheet.borrow().is_owned_by(tag));
            if let dom_tree::Node::Element(elem) = &*tag.borrow() {
                assert!(elem.sheet.is_none());
            }
        }
    }

    #[test]
    fn test_doctype_is_recorded() {
        let document = create_dom_tree(PAGE);
        let doctype = document.doctype.borrow();
        assert_eq!(doctype.as_ref().map(|d| d.name.as_str()), Some("html"));
        assert!(document.style_sheets().is_empty());
    }

    #[test]
    fn test_misnested_markup_keeps_one_sheet_per_element() {
        // The adoption agency moves the <div> out of the <a>.
        let page = "<body><a><div><style>.x{color:red}</style></a></div></body>";
        let document = create_document(page, &HostConfig::default()).unwrap();

        let tags = document.style_elements();
        assert_eq!(tags.len(), 1);
        assert_eq!(document.sheet_count(), 1);

        let direct = match &*tags[0].borrow() {
            dom_tree::Node::Element(elem) => elem.sheet.clone(),
            _ => None,
        };
        let direct = direct.expect("style element exposes its sheet");
        let scanned = document.sheet_owned_by(&tags[0]).unwrap();
        assert!(Rc::ptr_eq(&direct, &scanned));
        assert_eq!(scanned.borrow().rule_text(0), Some(".x{color:red}"));
    }

    #[test]
    fn test_moved_nodes_have_one_parent() {
        let document = create_dom_tree("<body><a><div><p>x</p></a></div></body>");
        let mut divs = 0;
        count_tag(&document.root, "div", &mut divs);
        assert_eq!(divs, 1);
    }

    fn count_tag(node: &NodeHandle, tag: &str, count: &mut usize) {
        let children = match &*node.borrow() {
            dom_tree::Node::DocumentRoot(root) => root.children.clone(),
            dom_tree::Node::Element(elem) => {
                if elem.tag == tag {
                    *count += 1;
                }
                elem.children.clone()
            }
            dom_tree::Node::Text(_) => Vec::new(),
        };
        for child in &children {
            count_tag(child, tag, count);
        }
    }

    #[test]
    fn test_attach_twice_does_not_duplicate() {
        let document = create_document(PAGE, &HostConfig::default()).unwrap();
        attach_style_sheets(&document, &HostConfig::default()).unwrap();
        assert_eq!(document.sheet_count(), 3);
    }

    #[test]
    fn test_invalid_initial_rules() {
        let page = "<style>.a{color:red} {color:red}</style>";
        let document = create_document(page, &HostConfig::default()).unwrap();
        assert_eq!(document.style_sheets()[0].borrow().rule_count(), 1);

        let strict = HostConfig {
            recover_invalid_rules: false,
            ..HostConfig::default()
        };
        assert!(create_document(page, &strict).is_err());
    }
}

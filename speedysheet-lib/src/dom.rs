use html5ever::QualName;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::style::sheet::SheetHandle;

pub mod dom_tree {
    use super::*;

    pub type NodeHandle = Rc<RefCell<Node>>;

    /// Handle to a style-carrying element. Two handles are the same element
    /// only if they point at the same allocation.
    pub type ElementHandle = NodeHandle;

    #[derive(Debug, Clone)]
    pub enum Node {
        DocumentRoot(DocumentRootNode),
        Element(ElementNode),
        Text(String),
    }

    #[derive(Debug, Clone, Default)]
    pub struct DocumentRootNode {
        pub children: Vec<NodeHandle>,
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        pub tag: String,
        pub qual_name: QualName,
        pub attributes: Vec<(String, String)>,
        pub children: Vec<NodeHandle>,
        /// Set while the element is attached; html5ever moves elements around
        /// when it repairs misnested markup.
        pub parent: Option<Weak<RefCell<Node>>>,
        /// Direct reference to the sheet this element owns, if the host exposes one.
        pub sheet: Option<SheetHandle>,
    }

    #[derive(Debug)]
    pub struct Document {
        pub root: NodeHandle,
        pub doctype: RefCell<Option<Doctype>>,
        style_sheets: RefCell<Vec<RegisteredSheet>>,
    }

    /// One entry of the document's sheet list. The owner is kept next to the
    /// sheet so the list can be searched without borrowing any sheet.
    #[derive(Debug, Clone)]
    pub struct RegisteredSheet {
        pub owner: Weak<RefCell<Node>>,
        pub sheet: SheetHandle,
    }

    impl RegisteredSheet {
        pub fn is_owned_by(&self, element: &ElementHandle) -> bool {
            self.owner
                .upgrade()
                .is_some_and(|owner| Rc::ptr_eq(&owner, element))
        }
    }

    #[derive(Debug)]
    pub struct Doctype {
        pub name: String,
        pub public_id: String,
        pub system_id: String,
    }

    impl DocumentRootNode {
        pub fn new() -> Self {
            DocumentRootNode {
                children: Vec::new(),
            }
        }
    }

    impl ElementNode {
        pub fn new(tag: String, qual_name: QualName) -> Self {
            ElementNode {
                tag,
                qual_name,
                attributes: Vec::new(),
                children: Vec::new(),
                parent: None,
                sheet: None,
            }
        }

        pub fn is_style(&self) -> bool {
            self.tag.eq_ignore_ascii_case("style")
        }

        pub fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }

        /// Concatenated text of the direct text children (the raw CSS for `<style>`).
        pub fn text_content(&self) -> String {
            let mut text = String::new();
            for child in &self.children {
                if let Node::Text(chunk) = &*child.borrow() {
                    text.push_str(chunk);
                }
            }
            text
        }
    }

    impl Document {
        /// The ordered list of every active sheet in the document.
        pub fn style_sheets(&self) -> Vec<SheetHandle> {
            self.style_sheets
                .borrow()
                .iter()
                .map(|entry| Rc::clone(&entry.sheet))
                .collect()
        }

        /// First registered sheet whose owner node is `element`.
        ///
        /// Only the registry's own owner records are read, so this works even
        /// while some sheet is mutably borrowed.
        pub fn sheet_owned_by(&self, element: &ElementHandle) -> Option<SheetHandle> {
            self.style_sheets
                .borrow()
                .iter()
                .find(|entry| entry.is_owned_by(element))
                .map(|entry| Rc::clone(&entry.sheet))
        }

        pub fn sheet_count(&self) -> usize {
            self.style_sheets.borrow().len()
        }

        /// Add `sheet` to the end of the sheet list under `owner`.
        pub fn register_sheet(&self, owner: &ElementHandle, sheet: SheetHandle) {
            self.style_sheets.borrow_mut().push(RegisteredSheet {
                owner: Rc::downgrade(owner),
                sheet,
            });
        }

        /// All `<style>` elements in document order.
        pub fn style_elements(&self) -> Vec<ElementHandle> {
            let mut found = Vec::new();
            collect_style_elements(&self.root, &mut found);
            found
        }
    }

    fn collect_style_elements(node: &NodeHandle, found: &mut Vec<ElementHandle>) {
        match &*node.borrow() {
            Node::DocumentRoot(root) => {
                for child in &root.children {
                    collect_style_elements(child, found);
                }
            }
            Node::Element(elem) => {
                if elem.is_style() {
                    found.push(Rc::clone(node));
                }
                for child in &elem.children {
                    collect_style_elements(child, found);
                }
            }
            Node::Text(_) => {}
        }
    }

    pub fn new_document() -> Document {
        Document {
            root: Rc::new(RefCell::new(Node::DocumentRoot(DocumentRootNode::new()))),
            doctype: RefCell::new(None),
            style_sheets: RefCell::new(Vec::new()),
        }
    }
}

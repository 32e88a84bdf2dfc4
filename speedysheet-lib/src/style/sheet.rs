//! The in-memory stylesheet engine standing in for a browser's `CSSStyleSheet`.
//!
//! Rules are validated with LightningCSS on the way in; a sheet remembers the
//! element that owns it through a weak reference so the DOM stays the owner.

use log::trace;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::dom::dom_tree::{ElementHandle, Node};
use crate::error::SheetError;
use crate::style::owned_css::{parse_rule, parse_rules, OwnedRule};

/// Shared, mutable handle to a sheet. Owned by the document, lent to callers.
pub type SheetHandle = Rc<RefCell<CssStyleSheet>>;

/// The operations rule helpers need from a stylesheet engine.
pub trait RuleSheet {
    /// Number of rules currently in the sheet.
    fn rule_count(&self) -> usize;

    /// Insert `rule` so that it ends up at `index`, returning that index.
    /// Fails if `index > rule_count()` or the engine refuses the rule.
    fn insert_rule(&mut self, rule: &str, index: usize) -> Result<usize, SheetError>;

    /// Remove the rule at `index`.
    fn delete_rule(&mut self, index: usize) -> Result<(), SheetError>;
}

#[derive(Debug, Default)]
pub struct CssStyleSheet {
    owner_node: Weak<RefCell<Node>>,
    rules: Vec<OwnedRule>,
}

impl CssStyleSheet {
    /// Creates an empty sheet owned by `owner`.
    ///
    /// # Arguments
    ///
    /// * `owner` - The `<style>` element the sheet is generated from. Only a weak
    ///   reference is kept, so the sheet never keeps its element alive.
    pub fn new(owner: &ElementHandle) -> Self {
        CssStyleSheet {
            owner_node: Rc::downgrade(owner),
            rules: Vec::new(),
        }
    }

    /// A sheet with no owner node (constructed sheets, benches).
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn into_handle(self) -> SheetHandle {
        Rc::new(RefCell::new(self))
    }

    /// The element this sheet was generated from, if it's still alive.
    pub fn owner_node(&self) -> Option<ElementHandle> {
        self.owner_node.upgrade()
    }

    pub fn is_owned_by(&self, element: &ElementHandle) -> bool {
        self.owner_node
            .upgrade()
            .is_some_and(|owner| Rc::ptr_eq(&owner, element))
    }

    /// Replace every rule with the ones parsed from `css_text`.
    ///
    /// # Arguments
    ///
    /// * `css_text` - The full stylesheet body.
    /// * `recover` - Drop rules LightningCSS can't parse instead of failing.
    ///
    /// # Returns
    ///
    /// `Ok(())` once the rules are swapped in. On error the old rules are kept.
    pub fn replace_text(&mut self, css_text: &str, recover: bool) -> Result<(), SheetError> {
        self.rules = parse_rules(css_text, recover)?;
        Ok(())
    }

    pub fn rules(&self) -> &[OwnedRule] {
        &self.rules
    }

    pub fn rule_text(&self, index: usize) -> Option<&str> {
        self.rules.get(index).map(|rule| rule.css_text.as_str())
    }

    /// The whole sheet, one rule per line.
    pub fn css_text(&self) -> String {
        self.rules
            .iter()
            .map(|rule| rule.css_text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn check_hierarchy(&self, rule: &OwnedRule, index: usize) -> Result<(), SheetError> {
        let rank = rule.kind.placement_rank();
        let misplaced = self.rules[..index]
            .iter()
            .any(|r| r.kind.placement_rank() > rank)
            || self.rules[index..]
                .iter()
                .any(|r| r.kind.placement_rank() < rank);

        if misplaced {
            return Err(SheetError::HierarchyRequest {
                kind: rule.kind,
                index,
            });
        }
        Ok(())
    }
}

impl RuleSheet for CssStyleSheet {
    fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn insert_rule(&mut self, rule: &str, index: usize) -> Result<usize, SheetError> {
        let owned = parse_rule(rule)?;
        if index > self.rules.len() {
            return Err(SheetError::IndexOutOfRange {
                index,
                len: self.rules.len(),
            });
        }
        self.check_hierarchy(&owned, index)?;

        trace!("insert_rule {} at {}", owned, index);
        self.rules.insert(index, owned);
        Ok(index)
    }

    fn delete_rule(&mut self, index: usize) -> Result<(), SheetError> {
        if index >= self.rules.len() {
            return Err(SheetError::IndexOutOfRange {
                index,
                len: self.rules.len(),
            });
        }
        let removed = self.rules.remove(index);
        trace!("delete_rule {} at {}", removed, index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::owned_css::RuleKind;
    use pretty_assertions::assert_eq;

    fn sheet_with(css: &str) -> CssStyleSheet {
        let mut sheet = CssStyleSheet::detached();
        sheet.replace_text(css, false).unwrap();
        sheet
    }

    #[test]
    fn test_insert_rule_at_position() {
        let mut sheet = sheet_with(".a{color:red} .c{color:red}");
        assert_eq!(sheet.insert_rule(".b{color:red}", 1), Ok(1));
        assert_eq!(sheet.rule_count(), 3);
        assert_eq!(sheet.rule_text(1), Some(".b{color:red}"));
        assert_eq!(sheet.css_text(), ".a{color:red}\n.b{color:red}\n.c{color:red}");
    }

    #[test]
    fn test_insert_rule_past_end_is_an_error() {
        let mut sheet = sheet_with(".a{color:red}");
        assert_eq!(
            sheet.insert_rule(".b{color:red}", 2),
            Err(SheetError::IndexOutOfRange { index: 2, len: 1 })
        );
        assert_eq!(sheet.rule_count(), 1);
    }

    #[test]
    fn test_insert_rule_rejects_invalid_text() {
        let mut sheet = CssStyleSheet::detached();
        assert!(matches!(
            sheet.insert_rule("{color:red}", 0),
            Err(SheetError::InvalidRule { .. })
        ));
        assert!(matches!(
            sheet.insert_rule(".a{color:red}.b{color:red}", 0),
            Err(SheetError::InvalidRule { .. })
        ));
        assert_eq!(sheet.rule_count(), 0);
    }

    #[test]
    fn test_import_must_precede_other_rules() {
        let mut sheet = sheet_with("@import url(a.css); .a{color:red}");
        assert_eq!(
            sheet.insert_rule("@import url(b.css);", 2),
            Err(SheetError::HierarchyRequest {
                kind: RuleKind::Import,
                index: 2
            })
        );
        assert_eq!(
            sheet.insert_rule(".b{color:red}", 0),
            Err(SheetError::HierarchyRequest {
                kind: RuleKind::Style,
                index: 0
            })
        );
        assert_eq!(sheet.insert_rule("@import url(b.css);", 1), Ok(1));
        assert_eq!(sheet.insert_rule(".b{color:red}", 2), Ok(2));
        assert_eq!(sheet.rule_count(), 4);
    }

    #[test]
    fn test_import_must_precede_namespace() {
        let mut sheet = sheet_with("@namespace svg url(http://www.w3.org/2000/svg); .a{color:red}");
        assert_eq!(
            sheet.insert_rule("@import url(a.css);", 1),
            Err(SheetError::HierarchyRequest {
                kind: RuleKind::Import,
                index: 1
            })
        );
        assert_eq!(
            sheet.insert_rule("@namespace xl url(http://www.w3.org/1999/xlink);", 2),
            Err(SheetError::HierarchyRequest {
                kind: RuleKind::Namespace,
                index: 2
            })
        );
        assert_eq!(sheet.insert_rule("@import url(a.css);", 0), Ok(0));
        assert_eq!(
            sheet.insert_rule("@namespace xl url(http://www.w3.org/1999/xlink);", 2),
            Ok(2)
        );
        let kinds: Vec<RuleKind> = sheet.rules().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RuleKind::Import,
                RuleKind::Namespace,
                RuleKind::Namespace,
                RuleKind::Style
            ]
        );
    }

    #[test]
    fn test_delete_rule() {
        let mut sheet = sheet_with(".a{color:red} .b{color:red}");
        assert_eq!(sheet.delete_rule(0), Ok(()));
        assert_eq!(sheet.rule_text(0), Some(".b{color:red}"));
        assert_eq!(
            sheet.delete_rule(1),
            Err(SheetError::IndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_owner_node_is_weak() {
        use html5ever::{namespace_url, ns, LocalName, QualName};

        let name = QualName::new(None, ns!(html), LocalName::from("style"));
        let element: ElementHandle = Rc::new(RefCell::new(Node::Element(
            crate::dom::dom_tree::ElementNode::new("style".to_string(), name),
        )));
        let sheet = CssStyleSheet::new(&element);
        assert!(sheet.is_owned_by(&element));

        drop(element);
        assert!(sheet.owner_node().is_none());
    }
}

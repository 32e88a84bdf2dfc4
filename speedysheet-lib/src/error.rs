//! Error types for stylesheet mutation.
//!
//! Rule insertion failures are expected and get folded into booleans/counts by
//! the helpers in `style::rule_helpers`; these types exist so the engine can say
//! *why* a rule was rejected and so deletion failures can reach the caller.

use thiserror::Error;

use crate::style::owned_css::RuleKind;

/// Failure reported by a stylesheet engine for a single rule operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// The text did not parse as exactly one CSS rule.
    #[error("invalid rule `{rule}`: {reason}")]
    InvalidRule { rule: String, reason: String },

    /// Index outside the rule list (`len` rules present).
    #[error("index {index} is out of range for a sheet with {len} rules")]
    IndexOutOfRange { index: usize, len: usize },

    /// A descending delete walked past index 0.
    #[error("cannot delete {count} rules downward from index {removal_index}")]
    RangeUnderflow { removal_index: usize, count: usize },

    /// The rule is valid but not allowed at that position
    /// (`@import`/`@namespace` must come before every other rule).
    #[error("{kind:?} rule cannot be placed at index {index}")]
    HierarchyRequest { kind: RuleKind, index: usize },
}

/// Why a single insertion did not happen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    #[error("empty rule text")]
    EmptyRule,

    #[error(transparent)]
    Rejected(#[from] SheetError),
}

/// Errors from applying a [`crate::sheet_edit::SheetEdit`] to a document.
#[derive(Error, Debug)]
pub enum EditError {
    #[error("document has {found} <style> elements, no element at index {index}")]
    MissingStyleElement { index: usize, found: usize },

    #[error("delete failed: {0}")]
    Delete(#[from] SheetError),
}

//! Low-level stylesheet mutation: find the sheet a `<style>` element owns,
//! insert rule text at clamped positions, and delete ranges of rules.

pub mod config;
pub mod dom;
pub mod error;
pub mod parser;
pub mod sheet_edit;
pub mod style;

pub use config::HostConfig;
pub use dom::dom_tree::{Document, ElementHandle};
pub use error::{EditError, InsertError, SheetError};
pub use style::rule_helpers::{delete_range, insert_many, insert_one, try_insert_one};
pub use style::sheet::{CssStyleSheet, RuleSheet, SheetHandle};
pub use style::sheet_locator::{sheet_for_tag, try_sheet_for_tag};

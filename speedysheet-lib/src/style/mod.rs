pub mod owned_css;
pub mod rule_helpers;
pub mod sheet;
pub mod sheet_locator;

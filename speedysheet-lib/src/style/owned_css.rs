// src/style/owned_css.rs: rules copied out of LightningCSS so a sheet can own them
// without holding on to the source text.
use std::fmt;

use lightningcss::error::PrinterError;
use lightningcss::printer::PrinterOptions;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use lightningcss::traits::ToCss;

use crate::error::SheetError;

/// The rule categories that matter for placement inside a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Import,
    Namespace,
    Style,
    Media,
    Other,
}

impl RuleKind {
    fn of(rule: &CssRule<'_>) -> Self {
        match rule {
            CssRule::Import(_) => RuleKind::Import,
            CssRule::Namespace(_) => RuleKind::Namespace,
            CssRule::Style(_) => RuleKind::Style,
            CssRule::Media(_) => RuleKind::Media,
            _ => RuleKind::Other,
        }
    }

    /// Where a rule may sit in a sheet: every `@import` first, then every
    /// `@namespace`, then everything else. A sheet's ranks never decrease.
    pub fn placement_rank(self) -> u8 {
        match self {
            RuleKind::Import => 0,
            RuleKind::Namespace => 1,
            _ => 2,
        }
    }
}

/// One accepted rule, stored as its minified serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRule {
    pub kind: RuleKind,
    /// e.g. ".a{color:red}"
    pub css_text: String,
}

impl OwnedRule {
    fn from_css_rule(rule: &CssRule<'_>) -> Result<Self, PrinterError> {
        let css_text = rule.to_css_string(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })?;
        Ok(OwnedRule {
            kind: RuleKind::of(rule),
            css_text,
        })
    }

    /// Selector text for style rules (everything before the block), else `None`.
    pub fn selector_text(&self) -> Option<&str> {
        match self.kind {
            RuleKind::Style => self.css_text.split('{').next().map(str::trim),
            _ => None,
        }
    }
}

impl fmt::Display for OwnedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css_text)
    }
}

/// Parse text that must contain exactly one rule, the way `insertRule` does.
pub fn parse_rule(rule_text: &str) -> Result<OwnedRule, SheetError> {
    let invalid = |reason: String| SheetError::InvalidRule {
        rule: rule_text.to_string(),
        reason,
    };

    let sheet = LightningStyleSheet::parse(rule_text, ParserOptions::default())
        .map_err(|e| invalid(e.to_string()))?;

    match sheet.rules.0.as_slice() {
        [rule] => OwnedRule::from_css_rule(rule).map_err(|e| invalid(e.to_string())),
        rules => Err(invalid(format!(
            "expected exactly one rule, found {}",
            rules.len()
        ))),
    }
}

/// Parse a whole stylesheet body (the text of a `<style>` element).
///
/// With `recover` set, rules LightningCSS can't parse are dropped the way a
/// browser drops them; otherwise the first bad rule fails the whole text.
pub fn parse_rules(css_text: &str, recover: bool) -> Result<Vec<OwnedRule>, SheetError> {
    let invalid = |reason: String| SheetError::InvalidRule {
        rule: css_text.to_string(),
        reason,
    };

    let parser_opts = ParserOptions {
        error_recovery: recover,
        ..ParserOptions::default()
    };
    let sheet =
        LightningStyleSheet::parse(css_text, parser_opts).map_err(|e| invalid(e.to_string()))?;

    let mut owned_rules = Vec::with_capacity(sheet.rules.0.len());
    for rule in &sheet.rules.0 {
        owned_rules.push(OwnedRule::from_css_rule(rule).map_err(|e| invalid(e.to_string()))?);
    }
    Ok(owned_rules)
}

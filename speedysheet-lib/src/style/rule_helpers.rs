//! Helpers around the engine's `insert_rule`/`delete_rule`.
//!
//! Insertion is defensive: indices are clamped to the end of the sheet and any
//! rejection turns into `false`, so one bad rule never stops a batch. Deletion
//! trusts the caller's bookkeeping and hands engine errors straight back.

use log::debug;

use crate::error::{InsertError, SheetError};
use crate::style::sheet::RuleSheet;

/// Insert one rule at `index`, clamped to `[0, rule_count]`.
///
/// Returns the index the rule landed at.
pub fn try_insert_one<S: RuleSheet + ?Sized>(
    sheet: &mut S,
    rule: &str,
    index: usize,
) -> Result<usize, InsertError> {
    if rule.is_empty() {
        return Err(InsertError::EmptyRule);
    }

    let max_index = sheet.rule_count();
    let index = index.min(max_index);

    sheet.insert_rule(rule, index).map_err(|err| {
        debug!("rule rejected at {}: {}", index, err);
        InsertError::Rejected(err)
    })
}

/// Insert one rule, reporting only whether it was injected.
pub fn insert_one<S: RuleSheet + ?Sized>(sheet: &mut S, rule: &str, index: usize) -> bool {
    try_insert_one(sheet, rule, index).is_ok()
}

/// Insert `rules` in order starting at `start_index`, returning how many made it in.
///
/// Every accepted rule moves the next insertion point up by one; a rejected
/// rule doesn't, so accepted rules stay contiguous and in order.
pub fn insert_many<S, I>(sheet: &mut S, rules: I, start_index: usize) -> usize
where
    S: RuleSheet + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    rules.into_iter().fold(0, |injected, rule| {
        let index = start_index.saturating_add(injected);
        if insert_one(sheet, rule.as_ref(), index) {
            injected + 1
        } else {
            injected
        }
    })
}

/// Delete `count` rules walking down from `removal_index`
/// (`removal_index`, `removal_index - 1`, ... `removal_index - count + 1`).
///
/// Stops at the first engine error and returns it.
pub fn delete_range<S: RuleSheet + ?Sized>(
    sheet: &mut S,
    removal_index: usize,
    count: usize,
) -> Result<(), SheetError> {
    for offset in 0..count {
        let index = removal_index
            .checked_sub(offset)
            .ok_or(SheetError::RangeUnderflow {
                removal_index,
                count,
            })?;
        sheet.delete_rule(index)?;
    }
    Ok(())
}

//! Sheet list ordering.
//!
//! Workbooks usually name their sheets `Sheet1`, `Sheet2`, ... or
//! `第1课`, `第2课`, ..., so sheets are ordered by the first number in their
//! name. Names without a number follow, in case-insensitive order.

use std::cmp::Ordering;

use crate::model::SheetRecord;

/// First run of ASCII digits in `name`, if it fits in a `u64`.
#[must_use]
pub fn leading_number(name: &str) -> Option<u64> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let digits = &name[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Compare two sheet names.
///
/// Numbered names sort before unnumbered ones and by their number; ties and
/// unnumbered names fall back to case-insensitive, then ordinal order.
#[must_use]
pub fn compare_sheet_names(a: &str, b: &str) -> Ordering {
    let by_number = match (leading_number(a), leading_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_number
        .then_with(|| caseless_cmp(a, b))
        .then_with(|| a.cmp(b))
}

fn caseless_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Sort sheet records in display order.
pub fn sort_sheets(sheets: &mut [SheetRecord]) {
    sheets.sort_by(|a, b| compare_sheet_names(&a.name, &b.name));
}

//! Pre-save attribute filter pipeline.
//!
//! # Responsibility
//! - Implement the `strip_tags` and `numeric` filter transformations.
//!
//! # Invariants
//! - Filters never touch falsy values.
//! - `strip_tags` collapses every run of newline sequences to one `\n`.

use crate::model::schema::FilterKind;
use crate::model::value::AttrValue;
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[^>]+>").expect("tag pattern is valid"));
static NEWLINE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\r\n|\r|\n)+").expect("newline pattern is valid"));

/// Removes tag-like substrings and collapses newline runs.
pub fn strip_tags(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, "");
    NEWLINE_RUN_RE.replace_all(&without_tags, "\n").into_owned()
}

/// Applies one filter kind to a value, returning the replacement when the
/// filter changes anything.
pub(crate) fn apply(kind: FilterKind, value: &AttrValue) -> Option<AttrValue> {
    if !value.is_truthy() {
        return None;
    }

    match kind {
        FilterKind::StripTags => value
            .as_text()
            .map(|text| AttrValue::Text(strip_tags(text))),
        FilterKind::Numeric => value.as_numeric().map(coerce),
    }
}

/// Prefers the integral shape when a coerced number has no fraction.
fn coerce(number: f64) -> AttrValue {
    if number.fract() == 0.0 && number >= i64::MIN as f64 && number <= i64::MAX as f64 {
        AttrValue::Int(number as i64)
    } else {
        AttrValue::Float(number)
    }
}

#[cfg(test)]
mod tests {
    use super::{apply, strip_tags};
    use crate::model::schema::FilterKind;
    use crate::model::value::AttrValue;

    #[test]
    fn strip_tags_removes_markup_and_collapses_newlines() {
        assert_eq!(strip_tags("<b>Hello</b>\n\nWorld"), "Hello\nWorld");
        assert_eq!(strip_tags("a\r\n\r\nb\rc"), "a\nb\nc");
        assert_eq!(strip_tags("<div class=\"x\">plain</div>"), "plain");
        assert_eq!(strip_tags("no markup"), "no markup");
    }

    #[test]
    fn numeric_filter_coerces_convertible_values() {
        assert_eq!(
            apply(FilterKind::Numeric, &AttrValue::from("42")),
            Some(AttrValue::Int(42))
        );
        assert_eq!(
            apply(FilterKind::Numeric, &AttrValue::from("2.5")),
            Some(AttrValue::Float(2.5))
        );
        assert_eq!(apply(FilterKind::Numeric, &AttrValue::from("12x")), None);
    }

    #[test]
    fn falsy_values_are_left_alone() {
        assert_eq!(apply(FilterKind::StripTags, &AttrValue::from("")), None);
        assert_eq!(apply(FilterKind::Numeric, &AttrValue::Null), None);
    }
}

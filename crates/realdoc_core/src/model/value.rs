//! Attribute value representation.
//!
//! # Responsibility
//! - Define the value shapes a declared attribute may hold.
//! - Provide the truthiness and numeric-coercion rules shared by the
//!   validator evaluator and the filter pipeline.
//!
//! # Invariants
//! - Numeric coercion only ever yields finite numbers.
//! - JSON round-trips preserve the variant (`Int` stays integral).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Value of a single model attribute.
///
/// Serialized untagged so persisted documents read as plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    /// Absence test used by the `required` validator.
    ///
    /// Empty text, zero, `false` and `Null` all count as absent.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
            Self::Float(value) => *value != 0.0,
            Self::Text(value) => !value.is_empty(),
        }
    }

    /// Interprets the value as a finite number.
    ///
    /// Text must parse as a number in its entirety (`"12x"` is not
    /// numeric). Booleans and `Null` are never numeric.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => value.is_finite().then_some(*value),
            Self::Text(value) => value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|parsed| parsed.is_finite()),
            Self::Null | Self::Bool(_) => None,
        }
    }

    /// Returns true when the value is numeric with a nonzero fractional
    /// part.
    pub fn is_fractional(&self) -> bool {
        self.as_numeric()
            .map_or(false, |number| number.fract() != 0.0)
    }

    /// Character count for `Text` values; `None` for everything else.
    pub fn char_len(&self) -> Option<usize> {
        match self {
            Self::Text(value) => Some(value.chars().count()),
            _ => None,
        }
    }

    /// String rendering used when deriving a document identity key.
    pub fn as_key_segment(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }

    /// Returns the text payload when this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key_segment())
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::AttrValue;

    #[test]
    fn truthiness_follows_absence_rules() {
        assert!(!AttrValue::Null.is_truthy());
        assert!(!AttrValue::Bool(false).is_truthy());
        assert!(!AttrValue::Int(0).is_truthy());
        assert!(!AttrValue::Float(0.0).is_truthy());
        assert!(!AttrValue::Text(String::new()).is_truthy());

        assert!(AttrValue::Bool(true).is_truthy());
        assert!(AttrValue::Int(-1).is_truthy());
        assert!(AttrValue::Text("x".to_string()).is_truthy());
    }

    #[test]
    fn numeric_coercion_requires_full_parse() {
        assert_eq!(AttrValue::from("42").as_numeric(), Some(42.0));
        assert_eq!(AttrValue::from(" 3.5 ").as_numeric(), Some(3.5));
        assert_eq!(AttrValue::from("12x").as_numeric(), None);
        assert_eq!(AttrValue::from("").as_numeric(), None);
        assert_eq!(AttrValue::Bool(true).as_numeric(), None);
        assert_eq!(AttrValue::Null.as_numeric(), None);
        assert_eq!(AttrValue::Float(f64::INFINITY).as_numeric(), None);
    }

    #[test]
    fn fractional_detection() {
        assert!(AttrValue::Float(1.5).is_fractional());
        assert!(AttrValue::from("2.25").is_fractional());
        assert!(!AttrValue::Float(2.0).is_fractional());
        assert!(!AttrValue::Int(7).is_fractional());
        assert!(!AttrValue::from("seven").is_fractional());
    }

    #[test]
    fn untagged_json_round_trip_keeps_variants() {
        let values = vec![
            AttrValue::Null,
            AttrValue::Bool(true),
            AttrValue::Int(7),
            AttrValue::Float(2.5),
            AttrValue::Text("hello".to_string()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        let decoded: Vec<AttrValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn key_segment_rendering() {
        assert_eq!(AttrValue::Int(7).as_key_segment(), "7");
        assert_eq!(AttrValue::from("7a").as_key_segment(), "7a");
        assert_eq!(AttrValue::Null.as_key_segment(), "");
    }
}

//! Model schema declaration contract.
//!
//! # Responsibility
//! - Define the static descriptor every concrete model type supplies.
//! - Define the typed validation rule and filter declarations.
//!
//! # Invariants
//! - Descriptor functions are pure and stable for a given type.
//! - A `ValidatorSpec` carries exactly one validator kind by construction.
//! - Malformed declarations (empty rule target, inverted bounds) abort
//!   model construction with `SchemaError`.

use crate::model::value::AttrValue;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Static schema descriptor for one concrete model type.
///
/// The engine (`Model<S>`) is generic over this trait; concrete types
/// declare their attribute surface, defaults, validation rules, filters
/// and update-protected attributes here. All defaults are empty, matching
/// a model with no rules.
pub trait ModelSchema {
    /// Type name used for identity derivation (`<lowercase name>-<key>`).
    fn type_name() -> &'static str;

    /// Ordered set of permitted attribute names. Defines the entire write
    /// surface of the model.
    fn attributes_list() -> &'static [&'static str];

    /// Default attribute values applied at construction, before
    /// caller-supplied attributes.
    fn default_values() -> Vec<(&'static str, AttrValue)> {
        Vec::new()
    }

    /// Declarative validation rules.
    fn rules() -> Vec<Rule> {
        Vec::new()
    }

    /// Pre-save filter declarations, applied in order.
    fn filters() -> Vec<FilterBinding> {
        Vec::new()
    }

    /// Attributes that may not be modified once the model is persisted.
    fn unsafe_attributes_list() -> &'static [&'static str] {
        &[]
    }
}

/// One validation rule: a validator applied to a set of attributes.
///
/// Rule names not present in the declared attribute list are skipped at
/// registration time.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub attributes: &'static [&'static str],
    pub spec: ValidatorSpec,
}

/// Validator kind discriminant, used as the registry key per attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidatorKind {
    Required,
    Numeric,
    Length,
}

impl ValidatorKind {
    /// Stable string id used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Numeric => "numeric",
            Self::Length => "length",
        }
    }
}

/// Parameters for a single validator kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatorSpec {
    /// Value must be present (non-falsy).
    Required,
    /// Value must parse as a finite number, with optional bounds.
    Numeric {
        min: Option<f64>,
        max: Option<f64>,
        allow_float: bool,
    },
    /// Text length must stay within the given character bounds.
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
}

impl ValidatorSpec {
    /// The kind this spec configures.
    pub fn kind(&self) -> ValidatorKind {
        match self {
            Self::Required => ValidatorKind::Required,
            Self::Numeric { .. } => ValidatorKind::Numeric,
            Self::Length { .. } => ValidatorKind::Length,
        }
    }

    /// Checks declaration-level invariants for this spec.
    pub(crate) fn ensure_well_formed(&self, rule_index: usize) -> Result<(), SchemaError> {
        match self {
            Self::Required => Ok(()),
            Self::Numeric {
                min: Some(min),
                max: Some(max),
                ..
            } if min > max => Err(SchemaError::InvertedBounds {
                rule_index,
                kind: ValidatorKind::Numeric,
                min: *min,
                max: *max,
            }),
            Self::Length {
                min: Some(min),
                max: Some(max),
            } if min > max => Err(SchemaError::InvertedBounds {
                rule_index,
                kind: ValidatorKind::Length,
                min: *min as f64,
                max: *max as f64,
            }),
            _ => Ok(()),
        }
    }
}

/// Filter kinds supported by the pre-save pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Remove tag-like substrings and collapse newline runs.
    StripTags,
    /// Coerce convertible values into numeric form.
    Numeric,
}

/// One filter declaration: a filter kind and the attributes it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBinding {
    pub kind: FilterKind,
    pub attributes: &'static [&'static str],
}

/// Configuration errors in a schema declaration.
///
/// These are static misdeclarations of a concrete model type, not runtime
/// data errors; they abort model construction.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A rule targets no attributes at all.
    EmptyRuleAttributes { rule_index: usize },
    /// A bounded validator declares `min` greater than `max`.
    InvertedBounds {
        rule_index: usize,
        kind: ValidatorKind,
        min: f64,
        max: f64,
    },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRuleAttributes { rule_index } => {
                write!(f, "rule #{rule_index} declares an empty attribute list")
            }
            Self::InvertedBounds {
                rule_index,
                kind,
                min,
                max,
            } => write!(
                f,
                "rule #{rule_index} declares {} bounds min {min} > max {max}",
                kind.as_str()
            ),
        }
    }
}

impl Error for SchemaError {}

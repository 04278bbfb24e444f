//! Validator registry types and field evaluation.
//!
//! # Responsibility
//! - Define the per-attribute validator registry shape.
//! - Evaluate one validator spec against one attribute value.
//!
//! # Invariants
//! - Registry keys stay within the declared attribute list; the engine
//!   enforces this on every registration path.
//! - A missing attribute value is treated as `Null`; evaluation itself
//!   never fails, it only produces messages.

use crate::model::schema::{ValidatorKind, ValidatorSpec};
use crate::model::value::AttrValue;
use std::collections::BTreeMap;

/// Validators registered for one attribute, keyed by kind.
///
/// Re-registering a kind overwrites its previous parameters.
pub type ValidatorMap = BTreeMap<ValidatorKind, ValidatorSpec>;

/// Full registry: attribute name to its validator map.
pub type ValidatorRegistry = BTreeMap<String, ValidatorMap>;

/// Evaluates a single validator against an attribute value.
///
/// Returns every violation message the spec produces for this value; an
/// empty vector means the value passes.
pub(crate) fn evaluate_field(
    name: &str,
    value: Option<&AttrValue>,
    spec: &ValidatorSpec,
) -> Vec<String> {
    let value = value.unwrap_or(&AttrValue::Null);
    let mut messages = Vec::new();

    match spec {
        ValidatorSpec::Required => {
            if !value.is_truthy() {
                messages.push(format!("Field {name} is required"));
            }
        }
        ValidatorSpec::Numeric {
            min,
            max,
            allow_float,
        } => match value.as_numeric() {
            Some(number) => {
                if !*allow_float && value.is_fractional() {
                    messages.push(format!("Field {name} can be only integer"));
                }
                if let Some(max) = max {
                    if number > *max {
                        messages.push(format!(
                            "Field {name} value can not be greater than {max}"
                        ));
                    }
                }
                if let Some(min) = min {
                    if number < *min {
                        messages.push(format!("Field {name} value can not be less than {min}"));
                    }
                }
            }
            None => messages.push(format!("Field {name} can be only numeric")),
        },
        ValidatorSpec::Length { min, max } => {
            // Length only makes sense for text; other shapes are skipped.
            if let Some(len) = value.char_len() {
                if let Some(max) = max {
                    if len > *max {
                        messages.push(format!(
                            "Field {name} length can not be greater than {max} symbols"
                        ));
                    }
                }
                if let Some(min) = min {
                    if len < *min {
                        messages.push(format!(
                            "Field {name} length can not be less than {min} symbols"
                        ));
                    }
                }
            }
        }
    }

    messages
}

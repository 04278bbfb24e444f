//! Model engine: attribute store, safety gate and persistence lifecycle.
//!
//! # Responsibility
//! - Hold one model instance's attributes, validators and error state.
//! - Gate writes by declaration and update-safety policy.
//! - Orchestrate the pre-save hook, validation and store calls.
//!
//! # Invariants
//! - `attributes` and the validator registry never hold a key outside the
//!   declared attribute list; system-generated fields live in the dynamic
//!   map instead.
//! - Once an instance is no longer new, unsafe attributes are immutable
//!   through the normal write path.
//! - Identity is derived exactly once per save, immediately before the
//!   store call, as `<lowercase type name>-<realty_id>`.

use crate::model::filter;
use crate::model::schema::{ModelSchema, SchemaError, ValidatorKind, ValidatorSpec};
use crate::model::validator::{evaluate_field, ValidatorMap, ValidatorRegistry};
use crate::model::value::AttrValue;
use crate::store::{Document, DocumentStore, InsertReceipt, StoreError};
use log::{error, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

/// Attribute the identity key is derived from.
pub const IDENTITY_ATTRIBUTE: &str = "realty_id";
/// Document field carrying the derived identity.
pub const IDENTITY_FIELD: &str = "_id";
/// Reserved error key for store rejections during save.
pub const STORE_ERROR_KEY: &str = "_store";

/// Rejected write signal from the safety gate.
///
/// Rejected writes are surfaced instead of dropped so callers cannot lose
/// a value without noticing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetError {
    /// Attribute is not part of the declared attribute list.
    UndeclaredAttribute(String),
    /// Attribute is update-protected and the instance is not new.
    UnsafeAttribute(String),
}

impl Display for SetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndeclaredAttribute(name) => {
                write!(f, "attribute `{name}` is not declared for this model")
            }
            Self::UnsafeAttribute(name) => {
                write!(f, "attribute `{name}` is unsafe on a persisted model")
            }
        }
    }
}

impl Error for SetError {}

/// One persistence-backed model instance, generic over its schema.
#[derive(Debug)]
pub struct Model<S: ModelSchema> {
    attributes: Document,
    dynamic_attributes: Document,
    validators: ValidatorRegistry,
    unsafe_attributes: Vec<String>,
    errors: BTreeMap<String, Vec<String>>,
    is_new: bool,
    identity: Option<String>,
    _schema: PhantomData<S>,
}

impl<S: ModelSchema> Model<S> {
    /// Builds a fresh (new, identity-less) instance.
    ///
    /// Seeds schema defaults, overlays `initial` filtered down to the
    /// declared list, registers rule validators and seeds the unsafe set.
    ///
    /// # Errors
    /// Returns `SchemaError` when the schema declares a malformed rule.
    pub fn new(initial: Document) -> Result<Self, SchemaError> {
        let mut model = Self {
            attributes: Document::new(),
            dynamic_attributes: Document::new(),
            validators: build_registry::<S>()?,
            unsafe_attributes: Vec::new(),
            errors: BTreeMap::new(),
            is_new: true,
            identity: None,
            _schema: PhantomData,
        };

        for (name, value) in S::default_values() {
            if Self::is_declared(name) {
                model.attributes.insert(name.to_string(), value);
            }
        }
        for (name, value) in initial {
            if Self::is_declared(&name) {
                model.attributes.insert(name, value);
            }
        }
        for name in S::unsafe_attributes_list() {
            model.add_unsafe_attribute(*name);
        }

        Ok(model)
    }

    /// Builds an instance with no caller-supplied attributes.
    pub fn empty() -> Result<Self, SchemaError> {
        Self::new(Document::new())
    }

    fn is_declared(name: &str) -> bool {
        S::attributes_list().contains(&name)
    }

    /// Returns the attribute value; declared attributes first, then
    /// dynamic ones.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .get(name)
            .or_else(|| self.dynamic_attributes.get(name))
    }

    /// Writes an attribute through the safety gate.
    ///
    /// # Errors
    /// Rejects undeclared names and unsafe attributes on persisted
    /// instances; the stored value is left untouched in both cases.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) -> Result<(), SetError> {
        if !Self::is_declared(name) {
            return Err(SetError::UndeclaredAttribute(name.to_string()));
        }
        if !self.is_safe_attribute(name) {
            return Err(SetError::UnsafeAttribute(name.to_string()));
        }
        self.attributes.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Writes a system-generated field outside the declared list.
    ///
    /// Dynamic fields bypass the gate and are merged into the persisted
    /// document.
    pub fn set_dynamic(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.dynamic_attributes
            .insert(name.to_string(), value.into());
    }

    /// Whether the attribute may currently be written.
    ///
    /// New instances accept everything; persisted instances reject names
    /// in the unsafe set.
    pub fn is_safe_attribute(&self, name: &str) -> bool {
        self.is_new
            || self.unsafe_attributes.is_empty()
            || !self
                .unsafe_attributes
                .iter()
                .any(|protected| protected.as_str() == name)
    }

    /// Declared attribute view of this instance.
    pub fn attributes(&self) -> &Document {
        &self.attributes
    }

    // ---- validator registry ------------------------------------------------

    /// Registers a validator for a declared attribute.
    ///
    /// No-op for undeclared names. Re-adding a kind overwrites its
    /// parameters; distinct kinds accumulate.
    pub fn add_validator(&mut self, name: &str, spec: ValidatorSpec) {
        if !Self::is_declared(name) {
            return;
        }
        self.validators
            .entry(name.to_string())
            .or_default()
            .insert(spec.kind(), spec);
    }

    /// Removes one validator kind, or every validator for the attribute
    /// when `kind` is `None`. No-op when nothing is registered.
    pub fn remove_validator(&mut self, name: &str, kind: Option<ValidatorKind>) {
        match kind {
            Some(kind) => {
                let emptied = match self.validators.get_mut(name) {
                    Some(map) => {
                        map.remove(&kind);
                        map.is_empty()
                    }
                    None => false,
                };
                if emptied {
                    self.validators.remove(name);
                }
            }
            None => {
                self.validators.remove(name);
            }
        }
    }

    /// Validators registered for one attribute.
    pub fn validator(&self, name: &str) -> Option<&ValidatorMap> {
        self.validators.get(name)
    }

    /// Full validator registry.
    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    // ---- unsafe attributes -------------------------------------------------

    /// Marks an attribute as update-protected. Duplicates are ignored.
    pub fn add_unsafe_attribute(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.unsafe_attributes.contains(&name) {
            self.unsafe_attributes.push(name);
        }
    }

    /// Marks several attributes as update-protected.
    pub fn add_unsafe_attributes<I, N>(&mut self, names: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        for name in names {
            self.add_unsafe_attribute(name);
        }
    }

    /// Current update-protected attribute names, in registration order.
    pub fn unsafe_attributes(&self) -> &[String] {
        &self.unsafe_attributes
    }

    // ---- errors ------------------------------------------------------------

    /// Appends an error message for an attribute.
    pub fn add_error(&mut self, name: &str, message: impl Into<String>) {
        self.errors
            .entry(name.to_string())
            .or_default()
            .push(message.into());
    }

    /// Accumulated validation and store errors.
    ///
    /// Entries persist across validation passes; callers clear them
    /// explicitly between attempts.
    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Drops every accumulated error.
    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    // ---- validation --------------------------------------------------------

    /// Runs every registered validator over the declared attribute surface.
    ///
    /// Returns true iff no error is recorded after the pass. Pre-existing
    /// errors are never cleared here.
    pub fn validate(&mut self) -> bool {
        let mut found = Vec::new();
        for (name, kinds) in &self.validators {
            let value = self.attributes.get(name);
            for spec in kinds.values() {
                for message in evaluate_field(name, value, spec) {
                    found.push((name.clone(), message));
                }
            }
        }
        for (name, message) in found {
            self.add_error(&name, message);
        }

        self.errors.is_empty()
    }

    // ---- lifecycle / persistence -------------------------------------------

    /// Derived identity, present once a save or load assigned it.
    pub fn id(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// The concrete model type name.
    pub fn class_name(&self) -> &'static str {
        S::type_name()
    }

    /// Whether this instance has been associated with a persisted record.
    pub fn is_new_model(&self) -> bool {
        self.is_new
    }

    /// Loads the record with the given identity from the store.
    ///
    /// On a hit, attributes are replaced by the declared-list subset of
    /// the record and the instance becomes persisted; returns `Ok(true)`.
    /// On a miss, attributes are cleared and `Ok(false)` is returned.
    ///
    /// # Errors
    /// Store failures are logged and surfaced to the caller.
    pub fn find_by_id(
        &mut self,
        store: &impl DocumentStore,
        id: &str,
    ) -> Result<bool, StoreError> {
        match store.get(id) {
            Ok(Some(record)) => {
                self.attributes.clear();
                for name in S::attributes_list() {
                    if let Some(value) = record.get(*name) {
                        self.attributes.insert((*name).to_string(), value.clone());
                    }
                }
                self.is_new = false;
                self.identity = Some(id.to_string());
                info!(
                    "event=model_find module=model status=ok type={} id={id}",
                    S::type_name()
                );
                Ok(true)
            }
            Ok(None) => {
                self.attributes.clear();
                info!(
                    "event=model_find module=model status=miss type={} id={id}",
                    S::type_name()
                );
                Ok(false)
            }
            Err(err) => {
                error!(
                    "event=model_find module=model status=error type={} id={id} error={err}",
                    S::type_name()
                );
                Err(err)
            }
        }
    }

    /// Pre-save hook: strips validators for unsafe attributes on persisted
    /// instances, runs the filter pipeline and derives identity.
    fn before_save(&mut self) {
        if !self.is_new && !self.unsafe_attributes.is_empty() {
            let protected = self.unsafe_attributes.clone();
            for name in protected {
                self.remove_validator(&name, None);
            }
        }

        self.apply_filters();

        let key = self
            .attributes
            .get(IDENTITY_ATTRIBUTE)
            .map(AttrValue::as_key_segment)
            .unwrap_or_default();
        self.identity = Some(format!("{}-{key}", S::type_name().to_lowercase()));
    }

    /// Applies declared filters in declaration order. Filter writes are
    /// engine-internal and bypass the safety gate.
    fn apply_filters(&mut self) {
        for binding in S::filters() {
            for name in binding.attributes {
                let replacement = self
                    .attributes
                    .get(*name)
                    .and_then(|value| filter::apply(binding.kind, value));
                if let Some(value) = replacement {
                    self.attributes.insert((*name).to_string(), value);
                }
            }
        }
    }

    /// Validates and persists this instance.
    ///
    /// Returns the store receipt, or `None` when validation failed or the
    /// store rejected the write; `errors()` distinguishes the two (store
    /// rejections land under the reserved `_store` key).
    pub fn save(&mut self, store: &impl DocumentStore) -> Option<InsertReceipt> {
        self.persist(store, true)
    }

    /// Persists this instance without running validation.
    pub fn save_unchecked(&mut self, store: &impl DocumentStore) -> Option<InsertReceipt> {
        self.persist(store, false)
    }

    fn persist(&mut self, store: &impl DocumentStore, run_validation: bool) -> Option<InsertReceipt> {
        self.before_save();

        if run_validation && !self.validate() {
            info!(
                "event=model_save module=model status=invalid type={} error_count={}",
                S::type_name(),
                self.errors.len()
            );
            return None;
        }

        match store.insert(&self.persisted_document()) {
            Ok(receipt) => {
                self.is_new = false;
                info!(
                    "event=model_save module=model status=ok type={} id={} revision={}",
                    S::type_name(),
                    receipt.id,
                    receipt.revision
                );
                Some(receipt)
            }
            Err(err) => {
                error!(
                    "event=model_save module=model status=error type={} error={err}",
                    S::type_name()
                );
                self.add_error(STORE_ERROR_KEY, err.to_string());
                None
            }
        }
    }

    /// Document handed to the store: declared attributes, dynamic fields
    /// and the derived identity.
    fn persisted_document(&self) -> Document {
        let mut document = self.attributes.clone();
        for (name, value) in &self.dynamic_attributes {
            document.insert(name.clone(), value.clone());
        }
        if let Some(identity) = &self.identity {
            document.insert(IDENTITY_FIELD.to_string(), AttrValue::Text(identity.clone()));
        }
        document
    }
}

fn build_registry<S: ModelSchema>() -> Result<ValidatorRegistry, SchemaError> {
    let mut registry = ValidatorRegistry::new();
    for (rule_index, rule) in S::rules().into_iter().enumerate() {
        if rule.attributes.is_empty() {
            return Err(SchemaError::EmptyRuleAttributes { rule_index });
        }
        rule.spec.ensure_well_formed(rule_index)?;

        for name in rule.attributes {
            if S::attributes_list().contains(name) {
                registry
                    .entry((*name).to_string())
                    .or_default()
                    .insert(rule.spec.kind(), rule.spec.clone());
            }
        }
    }
    Ok(registry)
}

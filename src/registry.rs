//! Validator selection and the schema walker.
//!
//! Selection is an ordered list of predicates evaluated top to bottom:
//!
//! 1. a caller-supplied override for the argument name;
//! 2. the sub-command selector uses the string validator (its value is a name);
//! 3. a constant-storing flag without a default is rejected;
//! 4. boolean-flag shapes use the boolean validator;
//! 5. the current value (or the default) picks by its own shape; without one,
//!    the list and string predicates decide, and the dummy validator catches
//!    everything else.

use std::collections::HashMap;

use crate::error::ClapfillError;
use crate::schema::{Action, ArgSpec, Schema};
use crate::types::Value;
use crate::validator::{Kind, Validator};
use crate::values::ArgValues;

/// Built-in validators plus per-argument overrides.
#[derive(Debug, Default)]
pub struct Validators {
    overrides: HashMap<String, Box<dyn Validator>>,
}

impl Validators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `validator` for every argument named `name`, at any depth.
    pub fn with(mut self, name: &str, validator: impl Validator + 'static) -> Self {
        self.insert(name, validator);
        self
    }

    pub fn insert(&mut self, name: &str, validator: impl Validator + 'static) {
        self.overrides.insert(name.to_string(), Box::new(validator));
    }

    /// Pick the validator for `spec`, given its current value if one is known.
    ///
    /// # Errors
    ///
    /// [`ClapfillError::UnsupportedShape`] for a constant-storing flag without
    /// a default.
    pub fn resolve(
        &self,
        spec: &ArgSpec,
        current: Option<&Value>,
    ) -> Result<&dyn Validator, ClapfillError> {
        if let Some(validator) = self.overrides.get(&spec.name) {
            return Ok(validator.as_ref());
        }
        Ok(infer(spec, current)?.validator())
    }

    /// Pair every non-meta argument of one schema node with its validator, in
    /// walk order (selector last). `current` supplies values from a previous
    /// pass, which take precedence over defaults when inferring the kind.
    ///
    /// # Errors
    ///
    /// Propagates [`resolve`](Self::resolve) failures.
    pub fn walk<'a>(
        &'a self,
        schema: &'a Schema,
        current: Option<&ArgValues>,
    ) -> Result<Vec<(&'a ArgSpec, &'a dyn Validator)>, ClapfillError> {
        let mut pairs = Vec::new();
        for spec in schema.specs() {
            if spec.is_meta() {
                continue;
            }
            let value = current.and_then(|values| values.get(&spec.name));
            let validator = self.resolve(spec, value)?;
            tracing::trace!(arg = %spec.name, validator = validator.name(), "resolved validator");
            pairs.push((spec, validator));
        }
        Ok(pairs)
    }
}

/// The built-in kind for `spec`.
///
/// # Errors
///
/// [`ClapfillError::UnsupportedShape`] for a constant-storing flag without a
/// default.
pub fn infer(spec: &ArgSpec, current: Option<&Value>) -> Result<Kind, ClapfillError> {
    if spec.is_selector() {
        return Ok(Kind::Str);
    }
    if spec.default.is_none() && matches!(spec.action, Action::Toggle { .. }) {
        return Err(ClapfillError::UnsupportedShape(spec.name.clone()));
    }
    if Kind::Bool.validator().matches(spec) {
        return Ok(Kind::Bool);
    }
    if let Some(value) = current.or(spec.default.as_ref()) {
        return Ok(Kind::of(value));
    }
    let kind = [Kind::List, Kind::Bool, Kind::Str]
        .into_iter()
        .find(|kind| kind.validator().matches(spec))
        .unwrap_or(Kind::Dummy);
    Ok(kind)
}

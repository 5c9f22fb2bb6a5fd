//! Request parameter validation
//!
//! `RequestValidator::validate` takes the raw string parameters of one
//! request and runs four phases:
//!
//! 1. field validation -- every declared field present in the input is
//!    parsed per its kind and checked; any failure returns immediately
//!    with only the error map populated (no defaulting on error)
//! 2. defaulting and coercion -- omitted fields get their defaults
//!    (factories evaluated now, per call), then the coercer normalizes
//!    special keys such as `geom`
//! 3. unchecked-parameter bookkeeping -- request keys the schema does not
//!    declare become a warning, never an error
//! 4. filter tree -- a supplied `filter` is JSON-decoded and validated
//!    against the request's network; every failure is reported in the
//!    error map, never raised

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::coerce::{parse_datetime, Coercer, DATETIME_FORMAT};
use super::errors::ValidationError;
use super::schema::{FieldKind, FieldSpec, Schema};
use super::tree::TreeValidator;
use crate::metadata::{NetworkRegistry, Session};
use crate::observability::Logger;

/// Outcome of validating one request's parameters.
///
/// Exactly one of two shapes: success (`errors` empty, `data` fully
/// populated with every declared field) or failure (`errors` non-empty,
/// `data` and `warnings` empty).
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    /// Declared field name (or dump name) -> validated, coerced value
    pub data: BTreeMap<String, Value>,
    /// Field or network name -> failure message
    pub errors: BTreeMap<String, String>,
    /// Non-fatal diagnostics, e.g. ignored parameters
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    /// Whether validation succeeded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn failure(errors: BTreeMap<String, String>) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }
}

/// Schema-driven validator for one endpoint's parameters.
pub struct RequestValidator<'a> {
    schema: &'a Schema,
    registry: &'a NetworkRegistry,
    coercer: Coercer,
}

impl<'a> RequestValidator<'a> {
    /// Creates a validator for a schema, with the standard coercers.
    pub fn new(schema: &'a Schema, registry: &'a NetworkRegistry) -> Self {
        Self {
            schema,
            registry,
            coercer: Coercer::with_defaults(),
        }
    }

    /// Validates one request's raw parameters.
    pub fn validate(
        &self,
        raw_args: &HashMap<String, String>,
        session: &Session,
    ) -> ValidationOutcome {
        // Phase 1: validate whatever was supplied; fail fast.
        let mut checked: BTreeMap<&str, Value> = BTreeMap::new();
        let mut errors: BTreeMap<String, String> = BTreeMap::new();

        for spec in self.schema.fields() {
            // The filter document is decoded and validated in phase 4.
            if spec.kind == FieldKind::Json {
                continue;
            }
            let Some(raw) = raw_args.get(spec.name) else {
                continue;
            };
            match parse_field(spec, raw) {
                Ok(value) => match &spec.check {
                    Some(check) => match check(&value) {
                        Ok(()) => {
                            checked.insert(spec.name, value);
                        }
                        Err(message) => {
                            errors.insert(spec.name.to_string(), message);
                        }
                    },
                    None => {
                        checked.insert(spec.name, value);
                    }
                },
                Err(message) => {
                    errors.insert(spec.name.to_string(), message);
                }
            }
        }
        if !errors.is_empty() {
            return ValidationOutcome::failure(errors);
        }

        // Phase 2: fill in defaults for everything omitted, then coerce.
        let mut data: BTreeMap<String, Value> = BTreeMap::new();
        for spec in self.schema.fields() {
            let value = checked
                .remove(spec.name)
                .unwrap_or_else(|| spec.default.materialize());
            data.insert(spec.output_name().to_string(), value);
        }
        self.coercer.convert(&mut data, session);

        // Phase 3: note request keys the schema does not declare.
        let mut warnings = Vec::new();
        let mut unchecked: Vec<&str> = raw_args
            .keys()
            .map(String::as_str)
            .filter(|key| !self.schema.declares(key))
            .collect();
        unchecked.sort_unstable();
        if !unchecked.is_empty() {
            let ignored = unchecked.join(", ");
            warnings.push(format!("Unused parameters: {}; they were ignored.", ignored));
            Logger::info("PARAMS_IGNORED", &[("params", ignored.as_str())]);
        }

        // Phase 4: decode and validate the filter tree, if any.
        if let Some(raw_filter) = raw_args.get("filter") {
            let network = data
                .get("network_name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let error_key = if network.is_empty() {
                "filter".to_string()
            } else {
                network.clone()
            };

            let tree: Value = match serde_json::from_str(raw_filter) {
                Ok(tree) => tree,
                Err(parse_err) => {
                    let err = ValidationError::BadTreeJson {
                        raw: raw_filter.clone(),
                        cause: parse_err.to_string(),
                    };
                    errors.insert(error_key, err.to_string());
                    return ValidationOutcome::failure(errors);
                }
            };

            let tree_validator = TreeValidator::new(self.registry, &self.coercer);
            if let Err(err) = tree_validator.valid_tree(&network, &tree, session) {
                errors.insert(error_key, err.to_string());
                return ValidationOutcome::failure(errors);
            }
            data.insert("filter".to_string(), tree);
        }

        ValidationOutcome {
            data,
            errors,
            warnings,
        }
    }
}

/// Parses a raw string parameter according to its declared kind.
fn parse_field(spec: &FieldSpec, raw: &str) -> Result<Value, String> {
    match spec.kind {
        FieldKind::Text => Ok(Value::String(raw.to_string())),
        FieldKind::TextList => {
            let items: Vec<Value> = raw
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect();
            Ok(Value::Array(items))
        }
        FieldKind::DateTime => match parse_datetime(raw) {
            Some(parsed) => Ok(Value::String(parsed.format(DATETIME_FORMAT).to_string())),
            None => Err(format!("'{}' is not a valid datetime.", raw)),
        },
        // Handled in the filter phase; kept raw if it ever gets here.
        FieldKind::Json => Ok(Value::String(raw.to_string())),
    }
}

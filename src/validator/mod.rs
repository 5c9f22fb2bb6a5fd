//! Validation subsystem for sensornet
//!
//! Raw request parameters flow through here before anything touches the
//! observation store:
//!
//! - `Schema` declares each endpoint's parameter surface
//! - `RequestValidator` validates, defaults, and coerces one request
//! - `Coercer` performs best-effort string-to-typed conversion
//! - `TreeValidator` checks condition trees against a network's table
//!
//! # Design principles
//!
//! - Errors are values: nothing validation-related panics or escapes
//!   `validate()` as a raised failure
//! - Fail fast on field errors; no defaulting once anything is wrong
//! - Coercion is best-effort; a failed conversion is abandoned, not retried
//! - Schemas are immutable and shareable; the per-request `Session` is not

mod coerce;
mod errors;
mod ops;
mod request;
mod schema;
mod tree;

pub use coerce::{CoerceFailure, Coercer, Converter, DATETIME_FORMAT};
pub use errors::{ValidationError, ValidationResult};
pub use ops::{CombineOp, FieldOp};
pub use request::{RequestValidator, ValidationOutcome};
pub use schema::{FieldCheck, FieldDefault, FieldKind, FieldSpec, Schema};
pub use tree::{ConditionNode, TreeValidator};

//! Validation error taxonomy
//!
//! Field-level failures never surface as these errors; they are collected
//! into the outcome's error map as plain messages. This enum covers the
//! condition-tree side, where errors are produced during recursion and
//! converted into the outcome map at the request-validator boundary. They
//! must never escape `validate()` as raised failures.

use thiserror::Error;

/// Result type for condition-tree validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors raised while validating a condition tree.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    // ==================
    // Tree structure
    // ==================
    /// Node is an empty mapping or not a mapping at all
    #[error("Empty or malformed tree.")]
    MalformedTree,

    /// Node has no usable `op` keyword
    #[error("Invalid keyword in {0}")]
    InvalidKeyword(String),

    /// Leaf is missing `col` or `val`
    #[error("Missing or invalid keyword in {0} -- use format {{'op': OP, 'col': COL, 'val': VAL}}")]
    MissingOrInvalidKeyword(String),

    /// `op` names neither a combinator nor a field operator
    #[error("Invalid operation {0}")]
    InvalidOperation(String),

    // ==================
    // Leaf semantics
    // ==================
    /// Condition names a column the table does not declare
    #[error("Invalid column name {0}")]
    UnknownColumn(String),

    /// Value cannot be read or coerced as the column's declared type
    #[error("Invalid value type for {value}. Was expecting {expected}")]
    TypeMismatch {
        /// The offending value
        value: String,
        /// The column's declared type name
        expected: &'static str,
    },

    // ==================
    // Request surface
    // ==================
    /// The filter parameter is not valid JSON
    #[error("Bad tree: {raw} -- causes error {cause}.")]
    BadTreeJson {
        /// The raw filter string as supplied
        raw: String,
        /// Parse error reported by the JSON decoder
        cause: String,
    },

    /// The network identifier has no corresponding observation table
    #[error("Unknown network {0}")]
    UnknownNetwork(String),
}

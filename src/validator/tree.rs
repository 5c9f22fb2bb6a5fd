//! Condition-tree validation
//!
//! A filter arrives as a JSON-decoded tree of boolean combinators over leaf
//! comparisons. Every node must be structurally well-formed, every leaf
//! column must exist in the target network's observation table, and every
//! leaf value must match (or be coercible to) the column's declared type.
//!
//! Trees are validate-then-discard: validation returns a typed view of the
//! tree, but the raw decoded JSON is what the query layer consumes.

use serde_json::Value;
use std::collections::BTreeMap;

use super::coerce::{parse_datetime, Coercer, DATETIME_FORMAT};
use super::errors::{ValidationError, ValidationResult};
use super::ops::{CombineOp, FieldOp};
use crate::metadata::{ColumnType, NetworkRegistry, Session, TableMeta};

/// Typed view of one validated condition-tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    /// `and`/`or` over an ordered sequence of subtrees
    Combinator {
        op: CombineOp,
        children: Vec<ConditionNode>,
    },
    /// Field comparison against one column, with the coerced value
    Leaf {
        op: FieldOp,
        col: String,
        val: Value,
    },
}

/// Validates condition trees against a network's observation table.
pub struct TreeValidator<'a> {
    registry: &'a NetworkRegistry,
    coercer: &'a Coercer,
}

impl<'a> TreeValidator<'a> {
    /// Creates a tree validator over the given registry and coercer.
    pub fn new(registry: &'a NetworkRegistry, coercer: &'a Coercer) -> Self {
        Self { registry, coercer }
    }

    /// Validates a whole condition tree for a network.
    ///
    /// The network is resolved to its observation table once, up front;
    /// an unknown network fails with `UnknownNetwork` before any node is
    /// inspected. Validation short-circuits on the first failing node.
    pub fn valid_tree(
        &self,
        network_name: &str,
        tree: &Value,
        session: &Session,
    ) -> ValidationResult<ConditionNode> {
        let table = self
            .registry
            .lookup(network_name)
            .ok_or_else(|| ValidationError::UnknownNetwork(network_name.to_string()))?;
        self.valid_node(table, tree, session)
    }

    /// Validates one node, recursing into combinator children.
    fn valid_node(
        &self,
        table: &TableMeta,
        node: &Value,
        session: &Session,
    ) -> ValidationResult<ConditionNode> {
        let object = node.as_object().ok_or(ValidationError::MalformedTree)?;
        if object.is_empty() {
            return Err(ValidationError::MalformedTree);
        }

        let op = object
            .get("op")
            .and_then(Value::as_str)
            .filter(|op| !op.is_empty())
            .ok_or_else(|| ValidationError::InvalidKeyword(node.to_string()))?;

        if let Some(combine) = CombineOp::parse(op) {
            // A combinator's val must be a sequence of subtrees.
            let subtrees = object
                .get("val")
                .and_then(Value::as_array)
                .ok_or(ValidationError::MalformedTree)?;

            let mut children = Vec::with_capacity(subtrees.len());
            for subtree in subtrees {
                children.push(self.valid_node(table, subtree, session)?);
            }
            return Ok(ConditionNode::Combinator {
                op: combine,
                children,
            });
        }

        if let Some(field_op) = FieldOp::parse(op) {
            let col = object.get("col").filter(|v| is_truthy(v)).and_then(Value::as_str);
            let val = object.get("val").filter(|v| is_truthy(v));

            let (Some(col), Some(val)) = (col, val) else {
                return Err(ValidationError::MissingOrInvalidKeyword(node.to_string()));
            };

            let coerced = self.valid_column_condition(table, col, val, session)?;
            return Ok(ConditionNode::Leaf {
                op: field_op,
                col: col.to_string(),
                val: coerced,
            });
        }

        Err(ValidationError::InvalidOperation(op.to_string()))
    }

    /// Decides whether `{column: value}` makes a legal condition for the
    /// table, returning the value as coerced for comparison.
    ///
    /// The value first passes through the coercer (datetime strings and
    /// geometry fragments), then must match the column's declared type or
    /// survive a last-chance construction of that type.
    pub fn valid_column_condition(
        &self,
        table: &TableMeta,
        column_name: &str,
        value: &Value,
        session: &Session,
    ) -> ValidationResult<Value> {
        let mut condition = BTreeMap::new();
        condition.insert(column_name.to_string(), value.clone());
        self.coercer.convert(&mut condition, session);
        let value = condition
            .remove(column_name)
            .unwrap_or_else(|| value.clone());

        let declared = table
            .column(column_name)
            .ok_or_else(|| ValidationError::UnknownColumn(column_name.to_string()))?;

        if matches_declared(&value, declared) {
            return Ok(value);
        }

        coerce_to_declared(&value, declared).ok_or_else(|| ValidationError::TypeMismatch {
            value: value.to_string(),
            expected: declared.type_name(),
        })
    }
}

/// Python-style truthiness: missing keys and falsy values both count as
/// absent in a leaf node.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Whether the value's runtime type already matches the declared type.
fn matches_declared(value: &Value, declared: ColumnType) -> bool {
    match declared {
        ColumnType::Varchar => value.is_string(),
        ColumnType::Integer => value.is_i64() || value.is_u64(),
        ColumnType::DoublePrecision => value.is_number(),
        ColumnType::Boolean => value.is_boolean(),
        // Timestamps travel as strings; a string matches if it parses.
        ColumnType::Timestamp => value.as_str().map(|s| parse_datetime(s).is_some()).unwrap_or(false),
    }
}

/// Last-chance construction of the declared type from the value.
fn coerce_to_declared(value: &Value, declared: ColumnType) -> Option<Value> {
    match declared {
        ColumnType::Varchar => match value {
            Value::Null => None,
            Value::String(s) => Some(Value::String(s.clone())),
            other => Some(Value::String(other.to_string())),
        },
        ColumnType::Integer => {
            let raw = value.as_str()?;
            raw.trim().parse::<i64>().ok().map(Value::from)
        }
        ColumnType::DoublePrecision => {
            let raw = value.as_str()?;
            let parsed: f64 = raw.trim().parse().ok()?;
            serde_json::Number::from_f64(parsed).map(Value::Number)
        }
        ColumnType::Boolean => match value.as_str()?.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        ColumnType::Timestamp => {
            let raw = value.as_str()?;
            parse_datetime(raw).map(|dt| Value::String(dt.format(DATETIME_FORMAT).to_string()))
        }
    }
}

//! Operator registries for condition trees
//!
//! A tree node's `op` is either a boolean combinator (`and`/`or`) or one of
//! a fixed set of field-comparison operators. Anything else is rejected.

use serde::{Deserialize, Serialize};

/// Boolean combinators over subtrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineOp {
    And,
    Or,
}

impl CombineOp {
    /// Parses a combinator from its wire name.
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "and" => Some(CombineOp::And),
            "or" => Some(CombineOp::Or),
            _ => None,
        }
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CombineOp::And => "and",
            CombineOp::Or => "or",
        }
    }
}

/// Field-comparison operators usable in a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOp {
    /// Equals
    Eq,
    /// Not equals
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal
    Ge,
    /// Less than
    Lt,
    /// Less than or equal
    Le,
    /// Pattern match
    Like,
    /// Value in list
    In,
}

impl FieldOp {
    /// Parses a field operator from its wire name.
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "eq" => Some(FieldOp::Eq),
            "ne" => Some(FieldOp::Ne),
            "gt" => Some(FieldOp::Gt),
            "ge" => Some(FieldOp::Ge),
            "lt" => Some(FieldOp::Lt),
            "le" => Some(FieldOp::Le),
            "like" => Some(FieldOp::Like),
            "in" => Some(FieldOp::In),
            _ => None,
        }
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOp::Eq => "eq",
            FieldOp::Ne => "ne",
            FieldOp::Gt => "gt",
            FieldOp::Ge => "ge",
            FieldOp::Lt => "lt",
            FieldOp::Le => "le",
            FieldOp::Like => "like",
            FieldOp::In => "in",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_op_parse() {
        assert_eq!(CombineOp::parse("and"), Some(CombineOp::And));
        assert_eq!(CombineOp::parse("or"), Some(CombineOp::Or));
        assert_eq!(CombineOp::parse("xor"), None);
    }

    #[test]
    fn test_field_op_round_trip() {
        for op in ["eq", "ne", "gt", "ge", "lt", "le", "like", "in"] {
            assert_eq!(FieldOp::parse(op).unwrap().as_str(), op);
        }
    }

    #[test]
    fn test_combinators_are_not_field_ops() {
        assert_eq!(FieldOp::parse("and"), None);
        assert_eq!(FieldOp::parse("or"), None);
    }
}

//! Declared column types and per-table column metadata
//!
//! Observation tables declare their columns with Redshift-ish types:
//! - varchar: UTF-8 string
//! - integer: 64-bit signed integer
//! - double precision: 64-bit floating point
//! - timestamp: datetime without time zone
//! - boolean: true/false

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared type of an observation-table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// UTF-8 string
    Varchar,
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    DoublePrecision,
    /// Datetime without time zone
    Timestamp,
    /// Boolean
    Boolean,
}

impl ColumnType {
    /// Returns the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Varchar => "varchar",
            ColumnType::Integer => "integer",
            ColumnType::DoublePrecision => "double precision",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Boolean => "boolean",
        }
    }

    /// Parses a declared type from its DDL spelling.
    ///
    /// Accepts the spellings that appear in dataset column manifests
    /// (`VARCHAR`, `INTEGER`, `DOUBLE PRECISION`, `TIMESTAMP`, `DATE`,
    /// `BOOLEAN`), case-insensitively.
    pub fn from_ddl(spelling: &str) -> Option<Self> {
        match spelling.trim().to_ascii_uppercase().as_str() {
            "VARCHAR" | "TEXT" => Some(ColumnType::Varchar),
            "INTEGER" | "INT" | "BIGINT" => Some(ColumnType::Integer),
            "DOUBLE PRECISION" | "DOUBLE" | "FLOAT" => Some(ColumnType::DoublePrecision),
            "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" | "DATE" => Some(ColumnType::Timestamp),
            "BOOLEAN" | "BOOL" => Some(ColumnType::Boolean),
            _ => None,
        }
    }
}

/// Read-only column metadata for one observation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    /// Table name (matches the network name it backs)
    pub name: String,
    /// Column name -> declared type, deterministically ordered
    pub columns: BTreeMap<String, ColumnType>,
}

impl TableMeta {
    /// Creates an empty table with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: BTreeMap::new(),
        }
    }

    /// Adds a column, replacing any previous declaration of the same name.
    pub fn with_column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.insert(name.into(), column_type);
        self
    }

    /// Looks up a column's declared type.
    pub fn column(&self, name: &str) -> Option<ColumnType> {
        self.columns.get(name).copied()
    }

    /// Returns whether the table declares the given column.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(ColumnType::Varchar.type_name(), "varchar");
        assert_eq!(ColumnType::Integer.type_name(), "integer");
        assert_eq!(ColumnType::DoublePrecision.type_name(), "double precision");
        assert_eq!(ColumnType::Timestamp.type_name(), "timestamp");
        assert_eq!(ColumnType::Boolean.type_name(), "boolean");
    }

    #[test]
    fn test_from_ddl_spellings() {
        assert_eq!(ColumnType::from_ddl("VARCHAR"), Some(ColumnType::Varchar));
        assert_eq!(ColumnType::from_ddl("integer"), Some(ColumnType::Integer));
        assert_eq!(
            ColumnType::from_ddl("DOUBLE PRECISION"),
            Some(ColumnType::DoublePrecision)
        );
        assert_eq!(ColumnType::from_ddl("DATE"), Some(ColumnType::Timestamp));
        assert_eq!(ColumnType::from_ddl("GEOMETRY"), None);
    }

    #[test]
    fn test_column_lookup() {
        let table = TableMeta::new("chicago_aot")
            .with_column("temperature", ColumnType::DoublePrecision)
            .with_column("sensor", ColumnType::Varchar);

        assert_eq!(table.column("temperature"), Some(ColumnType::DoublePrecision));
        assert_eq!(table.column("humidity"), None);
        assert!(table.has_column("sensor"));
    }
}

//! Declarative per-endpoint parameter schemas
//!
//! A schema is an explicit ordered list of field records interpreted by the
//! request validator; no reflection, no derive magic. Fields declare a
//! semantic kind, a default (a fixed value or a factory evaluated at
//! validation time), an optional membership/element check, and optionally a
//! different name to dump under.
//!
//! Four endpoint variants exist. They are independent field sets built from
//! the same base surface; none is mutated after construction.

use chrono::{Duration, Utc};
use serde_json::Value;
use std::collections::BTreeSet;

use super::coerce::DATETIME_FORMAT;
use crate::metadata::NetworkRegistry;

/// Semantic kind of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain string
    Text,
    /// Comma-separated list of strings
    TextList,
    /// ISO datetime
    DateTime,
    /// JSON document (decoded and validated in the filter phase)
    Json,
}

/// Default applied when a field is absent from the request.
pub enum FieldDefault {
    /// No default; the field dumps as null
    None,
    /// A fixed value
    Value(Value),
    /// A factory evaluated per validation call, never at schema
    /// construction (defaults like "now" must not freeze)
    Factory(fn() -> Value),
}

impl FieldDefault {
    /// Produces the default value for this call.
    pub fn materialize(&self) -> Value {
        match self {
            FieldDefault::None => Value::Null,
            FieldDefault::Value(value) => value.clone(),
            FieldDefault::Factory(factory) => factory(),
        }
    }
}

/// Validation predicate run against a parsed field value.
pub type FieldCheck = Box<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// One declared parameter.
pub struct FieldSpec {
    /// Parameter name on the request surface
    pub name: &'static str,
    /// Semantic kind
    pub kind: FieldKind,
    /// Default for omitted fields
    pub default: FieldDefault,
    /// Name to dump under, when it differs from `name`
    pub dump_as: Option<&'static str>,
    /// Extra validation beyond the kind check
    pub check: Option<FieldCheck>,
}

impl FieldSpec {
    /// Declares a plain text field with no default.
    pub fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            default: FieldDefault::None,
            dump_as: None,
            check: None,
        }
    }

    /// Declares a comma-separated list field.
    pub fn text_list(name: &'static str) -> Self {
        Self {
            kind: FieldKind::TextList,
            ..Self::text(name)
        }
    }

    /// Declares a datetime field.
    pub fn datetime(name: &'static str) -> Self {
        Self {
            kind: FieldKind::DateTime,
            ..Self::text(name)
        }
    }

    /// Declares a JSON document field.
    pub fn json(name: &'static str) -> Self {
        Self {
            kind: FieldKind::Json,
            ..Self::text(name)
        }
    }

    /// Sets a fixed default value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = FieldDefault::Value(value);
        self
    }

    /// Sets a default factory, evaluated per validation call.
    pub fn with_factory(mut self, factory: fn() -> Value) -> Self {
        self.default = FieldDefault::Factory(factory);
        self
    }

    /// Dumps the field under a different name.
    pub fn dump_as(mut self, name: &'static str) -> Self {
        self.dump_as = Some(name);
        self
    }

    /// Requires the value to be one of the given choices.
    pub fn one_of(mut self, choices: BTreeSet<String>) -> Self {
        self.check = Some(Box::new(move |value| match value.as_str() {
            Some(s) if choices.contains(s) => Ok(()),
            _ => Err(format!("Not a valid choice: {}.", value)),
        }));
        self
    }

    /// Requires every list element to be a registered node ID.
    pub fn each_node_in(mut self, valid_nodes: BTreeSet<String>) -> Self {
        self.check = Some(Box::new(move |value| {
            let nodes = value.as_array().ok_or("Expected a list of node IDs.".to_string())?;
            for node in nodes {
                match node.as_str() {
                    Some(id) if valid_nodes.contains(id) => {}
                    _ => return Err(format!("Invalid node ID: {}.", node)),
                }
            }
            Ok(())
        }));
        self
    }

    /// Name this field dumps under.
    pub fn output_name(&self) -> &'static str {
        self.dump_as.unwrap_or(self.name)
    }
}

/// Ordered set of declared parameters for one endpoint.
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Base parameter surface shared by the sensor-network endpoints.
    pub fn base(registry: &NetworkRegistry) -> Self {
        let node_ids = registry.node_ids();
        let all_nodes = Value::Array(node_ids.iter().cloned().map(Value::String).collect());

        Self {
            fields: vec![
                FieldSpec::text("location_geom__within").dump_as("geom"),
                FieldSpec::text("network_name").one_of(registry.network_names()),
                FieldSpec::text("node_id").one_of(node_ids.clone()),
                FieldSpec::text_list("nodes")
                    .with_default(all_nodes)
                    .each_node_in(node_ids),
                FieldSpec::datetime("start_datetime").with_factory(default_start_datetime),
                FieldSpec::datetime("end_datetime").with_factory(default_end_datetime),
                FieldSpec::json("filter"),
            ],
        }
    }

    /// Variant for endpoints that cannot serve GeoJSON responses.
    pub fn no_geojson(registry: &NetworkRegistry) -> Self {
        Self::base(registry).with_data_type(&["csv", "json"])
    }

    /// Variant for shape-export endpoints.
    pub fn export_formats(registry: &NetworkRegistry) -> Self {
        Self::base(registry).with_data_type(&["shapefile", "kml", "json"])
    }

    /// Variant for the sensor-network endpoints proper.
    pub fn sensor_network(registry: &NetworkRegistry) -> Self {
        Self::base(registry)
    }

    /// Adds a `data_type` enum field with the given format set.
    fn with_data_type(mut self, formats: &[&str]) -> Self {
        let choices: BTreeSet<String> = formats.iter().map(|s| s.to_string()).collect();
        self.fields.push(
            FieldSpec::text("data_type")
                .with_default(Value::String("json".into()))
                .one_of(choices),
        );
        self
    }

    /// Declared fields, in order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by request-surface name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Whether the schema declares the parameter.
    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// Default observation window start: 90 days before now.
fn default_start_datetime() -> Value {
    let start = Utc::now().naive_utc() - Duration::days(90);
    Value::String(start.format(DATETIME_FORMAT).to_string())
}

/// Default observation window end: now.
fn default_end_datetime() -> Value {
    Value::String(Utc::now().naive_utc().format(DATETIME_FORMAT).to_string())
}

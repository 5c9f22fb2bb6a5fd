//! Validator Invariant Tests
//!
//! End-to-end tests for the request validation pipeline:
//! - Validation is deterministic and side-effect free on success
//! - Field errors fail fast and suppress defaulting
//! - Condition-tree errors are reported structurally, never raised
//! - Defaults are evaluated per call, not per schema construction
//! - One session per request; rollbacks stay local to the request

use sensornet::metadata::{ColumnType, NetworkRegistry, Session, TableMeta};
use sensornet::validator::{
    Coercer, ConditionNode, RequestValidator, Schema, TreeValidator, ValidationError,
};
use serde_json::json;
use std::collections::HashMap;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_registry() -> NetworkRegistry {
    let mut registry = NetworkRegistry::new();
    registry.register_network("chicago_aot");
    registry.add_column("chicago_aot", "temperature", ColumnType::DoublePrecision);
    registry.register_node("node_01");
    registry.register_node("node_02");
    registry
}

fn request(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// =============================================================================
// Determinism Tests
// =============================================================================

/// The same request validates the same way every time.
#[test]
fn test_validation_is_deterministic() {
    let registry = setup_registry();
    let schema = Schema::sensor_network(&registry);
    let validator = RequestValidator::new(&schema, &registry);

    let args = request(&[
        ("network_name", "chicago_aot"),
        ("filter", r#"{"op":"eq","col":"temperature","val":"20.5"}"#),
    ]);

    for _ in 0..50 {
        let session = Session::new();
        let outcome = validator.validate(&args, &session);
        assert!(outcome.is_ok());
        assert_eq!(session.rollback_count(), 0);
    }
}

/// An invalid request fails consistently.
#[test]
fn test_invalid_request_fails_consistently() {
    let registry = setup_registry();
    let schema = Schema::sensor_network(&registry);
    let validator = RequestValidator::new(&schema, &registry);

    let args = request(&[("network_name", "atlantis")]);

    for _ in 0..50 {
        let session = Session::new();
        let outcome = validator.validate(&args, &session);
        assert!(!outcome.is_ok());
    }
}

// =============================================================================
// Outcome Shape Tests
// =============================================================================

/// On failure the outcome carries only errors: no data, no warnings.
#[test]
fn test_failure_outcome_is_errors_only() {
    let registry = setup_registry();
    let schema = Schema::sensor_network(&registry);
    let validator = RequestValidator::new(&schema, &registry);
    let session = Session::new();

    let outcome = validator.validate(
        &request(&[("network_name", "atlantis"), ("junk_param", "1")]),
        &session,
    );
    assert!(!outcome.errors.is_empty());
    assert!(outcome.data.is_empty());
    assert!(outcome.warnings.is_empty());
}

/// On success every declared field appears in the data, supplied or not.
#[test]
fn test_success_outcome_covers_every_field() {
    let registry = setup_registry();
    let schema = Schema::sensor_network(&registry);
    let validator = RequestValidator::new(&schema, &registry);
    let session = Session::new();

    let outcome = validator.validate(&request(&[("node_id", "node_01")]), &session);
    assert!(outcome.is_ok());

    for key in ["geom", "network_name", "node_id", "nodes", "start_datetime", "end_datetime", "filter"] {
        assert!(outcome.data.contains_key(key), "missing {}", key);
    }
    assert_eq!(outcome.data["node_id"], json!("node_01"));
}

// =============================================================================
// Default Evaluation Tests
// =============================================================================

/// Datetime defaults move with the clock: two validations on one schema
/// never freeze at schema construction time.
#[test]
fn test_defaults_are_evaluated_per_call() {
    let registry = setup_registry();
    let schema = Schema::sensor_network(&registry);
    let validator = RequestValidator::new(&schema, &registry);

    let first = validator.validate(&request(&[]), &Session::new());
    std::thread::sleep(std::time::Duration::from_millis(1100));
    let second = validator.validate(&request(&[]), &Session::new());

    // Second-resolution timestamps; after sleeping past a second boundary
    // the two calls must not produce the identical frozen default.
    assert_ne!(first.data["end_datetime"], second.data["end_datetime"]);
}

// =============================================================================
// Condition Tree Tests
// =============================================================================

/// An `and` combinator is valid iff every child is valid.
#[test]
fn test_and_requires_all_children() {
    let registry = setup_registry();
    let coercer = Coercer::with_defaults();
    let validator = TreeValidator::new(&registry, &coercer);
    let session = Session::new();

    let both_good = json!({"op": "and", "val": [
        {"op": "gt", "col": "temperature", "val": 10},
        {"op": "lt", "col": "temperature", "val": 30}
    ]});
    assert!(validator.valid_tree("chicago_aot", &both_good, &session).is_ok());

    let one_bad = json!({"op": "and", "val": [
        {"op": "gt", "col": "temperature", "val": 10},
        {"op": "lt", "col": "humidity", "val": 30}
    ]});
    let err = validator.valid_tree("chicago_aot", &one_bad, &session).unwrap_err();
    assert!(matches!(err, ValidationError::UnknownColumn(col) if col == "humidity"));
}

/// Tree validation failures surface as structured errors from validate(),
/// keyed by the network name.
#[test]
fn test_tree_errors_never_escape_validate() {
    let registry = setup_registry();
    let schema = Schema::sensor_network(&registry);
    let validator = RequestValidator::new(&schema, &registry);
    let session = Session::new();

    let outcome = validator.validate(
        &request(&[
            ("network_name", "chicago_aot"),
            ("filter", r#"{"op": "and", "val": [{"op": "frob", "col": "x", "val": 1}]}"#),
        ]),
        &session,
    );
    assert!(!outcome.is_ok());
    assert!(outcome.errors["chicago_aot"].contains("Invalid operation frob"));
}

/// The concrete round-trip from the API surface: a stringified double on a
/// DOUBLE PRECISION column validates, and the decoded tree lands in data.
#[test]
fn test_filter_round_trip_scenario() {
    let registry = setup_registry();
    let schema = Schema::sensor_network(&registry);
    let validator = RequestValidator::new(&schema, &registry);
    let session = Session::new();

    let outcome = validator.validate(
        &request(&[
            ("network_name", "chicago_aot"),
            ("filter", r#"{"op":"eq","col":"temperature","val":"20.5"}"#),
        ]),
        &session,
    );
    assert!(outcome.is_ok(), "{:?}", outcome.errors);
    assert_eq!(
        outcome.data["filter"],
        json!({"op": "eq", "col": "temperature", "val": "20.5"})
    );
    assert!(outcome.errors.is_empty());
}

/// The concrete bad-JSON scenario: a Bad tree error keyed by the network
/// name, with empty data.
#[test]
fn test_bad_tree_json_scenario() {
    let registry = setup_registry();
    let schema = Schema::sensor_network(&registry);
    let validator = RequestValidator::new(&schema, &registry);
    let session = Session::new();

    let outcome = validator.validate(
        &request(&[("network_name", "chicago_aot"), ("filter", "{not valid json")]),
        &session,
    );
    assert!(outcome.errors["chicago_aot"].contains("Bad tree"));
    assert!(outcome.data.is_empty());
}

/// Typed view of a validated tree mirrors its structure.
#[test]
fn test_typed_tree_structure() {
    let registry = setup_registry();
    let coercer = Coercer::with_defaults();
    let validator = TreeValidator::new(&registry, &coercer);
    let session = Session::new();

    let tree = json!({"op": "or", "val": [
        {"op": "eq", "col": "sensor", "val": "tmp112"},
        {"op": "ge", "col": "temperature", "val": "12.5"}
    ]});
    let node = validator.valid_tree("chicago_aot", &tree, &session).unwrap();

    let ConditionNode::Combinator { children, .. } = node else {
        panic!("expected combinator");
    };
    assert_eq!(children.len(), 2);
    // Leaf values carry the coerced form in the typed view.
    let ConditionNode::Leaf { val, .. } = &children[1] else {
        panic!("expected leaf");
    };
    assert_eq!(*val, json!(12.5));
}

// =============================================================================
// Session Isolation Tests
// =============================================================================

/// A poisoned session is rolled back by coercion and the request still
/// completes; a fresh session is untouched.
#[test]
fn test_rollback_is_local_to_the_request() {
    let registry = setup_registry();
    let schema = Schema::sensor_network(&registry);
    let validator = RequestValidator::new(&schema, &registry);

    let poisoned = Session::new();
    poisoned.poison();
    let outcome = validator.validate(
        &request(&[(
            "location_geom__within",
            r#"{"type": "Point", "coordinates": [-87.6, 41.8]}"#,
        )]),
        &poisoned,
    );
    // Conversion was abandoned, not retried: raw value survives.
    assert!(outcome.is_ok());
    assert_eq!(
        outcome.data["geom"],
        json!(r#"{"type": "Point", "coordinates": [-87.6, 41.8]}"#)
    );
    assert_eq!(poisoned.rollback_count(), 1);
    assert!(!poisoned.is_poisoned());

    let fresh = Session::new();
    let outcome = validator.validate(
        &request(&[(
            "location_geom__within",
            r#"{"type": "Point", "coordinates": [-87.6, 41.8]}"#,
        )]),
        &fresh,
    );
    assert!(outcome.is_ok());
    assert!(outcome.data["geom"].as_str().unwrap().starts_with("SRID=4326;"));
    assert_eq!(fresh.rollback_count(), 0);
}

// =============================================================================
// Table Metadata Tests
// =============================================================================

/// Conditions validate against explicit table definitions too.
#[test]
fn test_custom_table_condition() {
    let mut registry = NetworkRegistry::new();
    registry.register_table(
        TableMeta::new("flu_shot_clinics")
            .with_column("zip", ColumnType::Integer)
            .with_column("facility_name", ColumnType::Varchar)
            .with_column("latitude", ColumnType::DoublePrecision),
    );

    let coercer = Coercer::with_defaults();
    let validator = TreeValidator::new(&registry, &coercer);
    let session = Session::new();

    let table = registry.lookup("flu_shot_clinics").unwrap();
    assert!(validator
        .valid_column_condition(table, "zip", &json!("60615"), &session)
        .is_ok());
    assert!(validator
        .valid_column_condition(table, "zip", &json!("downtown"), &session)
        .is_err());
    assert!(matches!(
        validator
            .valid_column_condition(table, "nonexistent_col", &json!(5), &session)
            .unwrap_err(),
        ValidationError::UnknownColumn(_)
    ));
}

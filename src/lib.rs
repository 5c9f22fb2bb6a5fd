//! sensornet - parameter validation and condition-tree evaluation for a
//! sensor-network observation API
//!
//! Raw query-string parameters are validated and coerced against
//! per-endpoint schemas, defaults are filled in, and JSON filter trees are
//! recursively checked against the target network's observation table.

pub mod geometry;
pub mod metadata;
pub mod observability;
pub mod validator;

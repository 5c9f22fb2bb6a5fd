//! Observability for sensornet
//!
//! Structured, synchronous JSON-line logging with deterministic output.
//! Observability is read-only: a log call never affects validation results,
//! and a failed write to stdout/stderr is silently dropped.

mod logger;

pub use logger::{Logger, Severity};

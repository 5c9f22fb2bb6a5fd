//! Best-effort type coercion of request values
//!
//! Certain parameters arrive as raw strings but are consumed as richer
//! values: a geometry fragment, a normalized timestamp. The coercer holds a
//! registry of per-key converters and rewrites a parameter map in place.
//! Coercion is best-effort, not mandatory: a key with no converter, or a
//! converter that fails recoverably, leaves the original value untouched.
//!
//! Converters that touch the database can instead fail because the
//! session's transaction is already aborted. That failure must roll the
//! session back immediately, or every later lookup on it would fail too.

use chrono::NaiveDateTime;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::geometry::extract_first_fragment;
use crate::metadata::Session;
use crate::observability::Logger;

/// Normalized form for timestamp values.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// How a converter failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoerceFailure {
    /// Recoverable: wrong type, unparseable value, unknown table.
    /// The original value stays.
    Soft,
    /// The session's transaction is aborted; it must be rolled back.
    /// The original value stays.
    Transaction(String),
}

/// A conversion function for one registered key.
pub type Converter = fn(&Value, &Session) -> Result<Value, CoerceFailure>;

/// Registry of per-key converters applied in place over a parameter map.
pub struct Coercer {
    converters: BTreeMap<String, Converter>,
}

impl Coercer {
    /// Creates an empty coercer with no registered converters.
    pub fn new() -> Self {
        Self {
            converters: BTreeMap::new(),
        }
    }

    /// Creates a coercer with the standard converters registered:
    /// `geom` plus the timestamp keys.
    pub fn with_defaults() -> Self {
        let mut coercer = Self::new();
        coercer.register("geom", convert_geom);
        coercer.register("datetime", convert_datetime);
        coercer.register("start_datetime", convert_datetime);
        coercer.register("end_datetime", convert_datetime);
        coercer
    }

    /// Registers a converter for a key, replacing any existing one.
    pub fn register(&mut self, key: impl Into<String>, converter: Converter) {
        self.converters.insert(key.into(), converter);
    }

    /// Converts every registered key of `args` in place.
    ///
    /// Soft failures are swallowed. Transaction failures roll the session
    /// back before moving on; the value is still left unconverted.
    pub fn convert(&self, args: &mut BTreeMap<String, Value>, session: &Session) {
        for (key, value) in args.iter_mut() {
            let Some(converter) = self.converters.get(key) else {
                continue;
            };
            match converter(value, session) {
                Ok(converted) => *value = converted,
                Err(CoerceFailure::Soft) => {}
                Err(CoerceFailure::Transaction(cause)) => {
                    Logger::warn("COERCE_ROLLBACK", &[("key", key.as_str()), ("cause", cause.as_str())]);
                    session.rollback();
                }
            }
        }
    }
}

impl Default for Coercer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Fails with a transaction error if the session is already aborted.
fn ensure_transaction(session: &Session) -> Result<(), CoerceFailure> {
    if session.is_poisoned() {
        Err(CoerceFailure::Transaction(
            "current transaction is aborted, commands ignored until end of transaction block"
                .into(),
        ))
    } else {
        Ok(())
    }
}

/// Converts a raw GeoJSON/WKT string into the normalized fragment form.
///
/// Fragment normalization runs against the database in production, so an
/// aborted transaction surfaces here.
fn convert_geom(value: &Value, session: &Session) -> Result<Value, CoerceFailure> {
    ensure_transaction(session)?;
    let raw = value.as_str().ok_or(CoerceFailure::Soft)?;
    let fragment = extract_first_fragment(raw).map_err(|_| CoerceFailure::Soft)?;
    Ok(Value::String(fragment.to_fragment_string()))
}

/// Converts a datetime string into the normalized timestamp form.
fn convert_datetime(value: &Value, _session: &Session) -> Result<Value, CoerceFailure> {
    let raw = value.as_str().ok_or(CoerceFailure::Soft)?;
    let parsed = parse_datetime(raw).ok_or(CoerceFailure::Soft)?;
    Ok(Value::String(parsed.format(DATETIME_FORMAT).to_string()))
}

/// Parses the datetime spellings accepted on the request surface.
///
/// RFC 3339, ISO without offset, space-separated, and bare dates
/// (midnight) are all accepted. Offsets are dropped; observation tables
/// store timestamps without time zone.
pub(crate) fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();

    if let Ok(with_offset) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(with_offset.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    None
}

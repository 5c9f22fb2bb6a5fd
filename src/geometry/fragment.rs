//! Geometry fragment extraction
//!
//! Spatial request parameters arrive as raw GeoJSON (a bare geometry, a
//! Feature, or a FeatureCollection) or as a WKT point literal. The filter
//! layer only ever needs one normalized geometry, so extraction takes the
//! first fragment it can find and discards the rest.

use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;
use thiserror::Error;

/// Spatial reference used for all fragments.
pub const DEFAULT_SRID: u32 = 4326;

/// GeoJSON geometry types a fragment may carry.
const GEOMETRY_TYPES: [&str; 7] = [
    "Point",
    "LineString",
    "Polygon",
    "MultiPoint",
    "MultiLineString",
    "MultiPolygon",
    "GeometryCollection",
];

/// Errors raised while extracting a geometry fragment.
#[derive(Debug, Clone, Error)]
pub enum GeometryError {
    /// Input is neither JSON nor a recognized WKT literal
    #[error("Not a geometry: {0}")]
    NotGeometry(String),

    /// JSON input has no geometry in it
    #[error("No geometry fragment in input")]
    NoFragment,

    /// FeatureCollection with no features
    #[error("Empty feature collection")]
    EmptyCollection,
}

/// A normalized geometry fragment with its spatial reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// GeoJSON geometry object
    pub geometry: Value,
    /// Spatial reference identifier
    pub srid: u32,
}

impl Fragment {
    /// Renders the fragment in its normalized string form,
    /// `SRID=<srid>;<compact geojson>`.
    pub fn to_fragment_string(&self) -> String {
        format!("SRID={};{}", self.srid, self.geometry)
    }
}

/// Extracts the first geometry fragment from raw GeoJSON or WKT input.
///
/// - A bare geometry object is taken as-is.
/// - A Feature contributes its `geometry` member.
/// - A FeatureCollection contributes the first feature's geometry.
/// - A WKT `POINT (x y)` literal is converted to a GeoJSON point.
pub fn extract_first_fragment(raw: &str) -> Result<Fragment, GeometryError> {
    let trimmed = raw.trim();

    if trimmed.starts_with('{') {
        let value: Value = serde_json::from_str(trimmed)
            .map_err(|_| GeometryError::NotGeometry(trimmed.to_string()))?;
        let geometry = first_geometry(&value)?;
        return Ok(Fragment {
            geometry,
            srid: DEFAULT_SRID,
        });
    }

    if let Some(point) = parse_wkt_point(trimmed) {
        return Ok(Fragment {
            geometry: point,
            srid: DEFAULT_SRID,
        });
    }

    Err(GeometryError::NotGeometry(trimmed.to_string()))
}

/// Finds the first geometry object inside a decoded GeoJSON value.
fn first_geometry(value: &Value) -> Result<Value, GeometryError> {
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or(GeometryError::NoFragment)?;
            let first = features.first().ok_or(GeometryError::EmptyCollection)?;
            first_geometry(first)
        }
        Some("Feature") => {
            let geometry = value.get("geometry").ok_or(GeometryError::NoFragment)?;
            first_geometry(geometry)
        }
        Some(kind) if GEOMETRY_TYPES.contains(&kind) => Ok(value.clone()),
        _ => Err(GeometryError::NoFragment),
    }
}

/// Parses a WKT `POINT (x y)` literal into a GeoJSON point.
fn parse_wkt_point(input: &str) -> Option<Value> {
    static POINT_RE: OnceLock<Regex> = OnceLock::new();
    let re = POINT_RE.get_or_init(|| {
        Regex::new(r"(?i)^POINT\s*\(\s*(-?\d+(?:\.\d+)?)\s+(-?\d+(?:\.\d+)?)\s*\)$")
            .expect("WKT point pattern is a valid regex")
    });

    let caps = re.captures(input)?;
    let x: f64 = caps.get(1)?.as_str().parse().ok()?;
    let y: f64 = caps.get(2)?.as_str().parse().ok()?;

    Some(json!({ "type": "Point", "coordinates": [x, y] }))
}

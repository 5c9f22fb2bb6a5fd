//! Geometry fragment handling for spatial request parameters

mod fragment;

pub use fragment::{extract_first_fragment, Fragment, GeometryError, DEFAULT_SRID};

//! Network and table metadata for sensornet
//!
//! The validators treat the outside world as three read-only lookups plus
//! one mutable resource:
//!
//! - column metadata: network -> observation table -> column -> declared type
//! - node registry: the set of valid node IDs
//! - network registry: the set of valid network names
//! - the per-request database `Session`, the only thing a request mutates

mod registry;
mod session;
mod table;

pub use registry::NetworkRegistry;
pub use session::Session;
pub use table::{ColumnType, TableMeta};

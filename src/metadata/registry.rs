//! In-memory registry of sensor networks, their observation tables,
//! and the node IDs known to the system
//!
//! The registry is the validators' only view of the outside world: a
//! read-only key-value store of network name -> observation table metadata,
//! plus the membership sets used to build enum validators. It is populated
//! once at startup and never mutated during request handling.

use std::collections::{BTreeMap, BTreeSet};

use super::table::{ColumnType, TableMeta};

/// Registry of known sensor networks and nodes.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    /// Network name -> observation table metadata
    tables: BTreeMap<String, TableMeta>,
    /// IDs of registered sensor nodes
    node_ids: BTreeSet<String>,
}

impl NetworkRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a network with the standard observation-table column set.
    ///
    /// Every network table starts with the same shape: a node reference,
    /// an observation timestamp, the observed feature and sensor names,
    /// and up to three numeric observation properties.
    pub fn register_network(&mut self, network_name: impl Into<String>) -> &mut Self {
        let name = network_name.into();
        let table = observation_table(&name);
        self.tables.insert(name, table);
        self
    }

    /// Registers a network backed by an explicit table definition.
    pub fn register_table(&mut self, table: TableMeta) -> &mut Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    /// Adds a column to an existing network's observation table.
    ///
    /// Returns false if the network is unknown.
    pub fn add_column(
        &mut self,
        network_name: &str,
        column_name: impl Into<String>,
        column_type: ColumnType,
    ) -> bool {
        match self.tables.get_mut(network_name) {
            Some(table) => {
                table.columns.insert(column_name.into(), column_type);
                true
            }
            None => false,
        }
    }

    /// Registers a sensor node ID.
    pub fn register_node(&mut self, node_id: impl Into<String>) -> &mut Self {
        self.node_ids.insert(node_id.into());
        self
    }

    /// Looks up the observation table for a network.
    pub fn lookup(&self, network_name: &str) -> Option<&TableMeta> {
        self.tables.get(network_name)
    }

    /// Returns whether the network is known.
    pub fn exists(&self, network_name: &str) -> bool {
        self.tables.contains_key(network_name)
    }

    /// Names of all registered networks, deterministically ordered.
    pub fn network_names(&self) -> BTreeSet<String> {
        self.tables.keys().cloned().collect()
    }

    /// IDs of all registered nodes, deterministically ordered.
    pub fn node_ids(&self) -> BTreeSet<String> {
        self.node_ids.clone()
    }

    /// Returns whether the node ID is registered.
    pub fn node_exists(&self, node_id: &str) -> bool {
        self.node_ids.contains(node_id)
    }
}

/// Builds the standard observation table for a network.
fn observation_table(network_name: &str) -> TableMeta {
    TableMeta::new(network_name)
        .with_column("nodeId", ColumnType::Varchar)
        .with_column("datetime", ColumnType::Timestamp)
        .with_column("feature", ColumnType::Varchar)
        .with_column("sensor", ColumnType::Varchar)
        .with_column("property1", ColumnType::DoublePrecision)
        .with_column("property2", ColumnType::DoublePrecision)
        .with_column("property3", ColumnType::DoublePrecision)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_network_standard_columns() {
        let mut registry = NetworkRegistry::new();
        registry.register_network("chicago_aot");

        let table = registry.lookup("chicago_aot").unwrap();
        assert_eq!(table.column("nodeId"), Some(ColumnType::Varchar));
        assert_eq!(table.column("datetime"), Some(ColumnType::Timestamp));
        assert_eq!(table.column("property1"), Some(ColumnType::DoublePrecision));
        assert_eq!(table.columns.len(), 7);
    }

    #[test]
    fn test_unknown_network() {
        let registry = NetworkRegistry::new();
        assert!(!registry.exists("nowhere"));
        assert!(registry.lookup("nowhere").is_none());
    }

    #[test]
    fn test_add_column() {
        let mut registry = NetworkRegistry::new();
        registry.register_network("chicago_aot");

        assert!(registry.add_column("chicago_aot", "temperature", ColumnType::DoublePrecision));
        assert!(!registry.add_column("nowhere", "temperature", ColumnType::DoublePrecision));

        let table = registry.lookup("chicago_aot").unwrap();
        assert_eq!(table.column("temperature"), Some(ColumnType::DoublePrecision));
    }

    #[test]
    fn test_node_membership() {
        let mut registry = NetworkRegistry::new();
        registry.register_node("node_01").register_node("node_02");

        assert!(registry.node_exists("node_01"));
        assert!(!registry.node_exists("node_99"));
        assert_eq!(registry.node_ids().len(), 2);
    }

    #[test]
    fn test_network_names_ordering() {
        let mut registry = NetworkRegistry::new();
        registry.register_network("zebra_net");
        registry.register_network("alpha_net");

        let names: Vec<String> = registry.network_names().into_iter().collect();
        assert_eq!(names, vec!["alpha_net", "zebra_net"]);
    }
}

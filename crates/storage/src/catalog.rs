use std::collections::{BTreeMap, HashMap};
use std::fs;

use serde::{Deserialize, Serialize};
use vfq_common::{Result, VfqError};
use vfq_planner::{CollectionSchema, FieldType};

/// Definition of one registered collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDef {
    pub name: String,
    /// Known metadata fields and their types.
    pub fields: BTreeMap<String, FieldType>,
    /// Declared vector dimensionality, when known.
    #[serde(default)]
    pub vector_dim: Option<usize>,
    /// Backend-specific options (endpoints, credentials references, ...).
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl CollectionDef {
    /// Planner-facing schema view of this definition.
    pub fn schema(&self) -> CollectionSchema {
        CollectionSchema {
            fields: self.fields.clone(),
            vector_dim: self.vector_dim,
        }
    }
}

/// Registry of collection definitions and logical namespaces.
///
/// A namespace groups physical collections behind one queryable name; its
/// schema is the first member's, and every member must carry an identical
/// field map so planning stays single-pass.
#[derive(Debug, Default)]
pub struct CollectionCatalog {
    collections: HashMap<String, CollectionDef>,
    namespaces: HashMap<String, Vec<String>>,
}

impl CollectionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_collection(&mut self, collection: CollectionDef) {
        self.collections.insert(collection.name.clone(), collection);
    }

    /// Register `name` as a namespace over existing member collections.
    ///
    /// # Errors
    /// `InvalidConfig` when a member is unknown, the member list is empty,
    /// the name is already a collection, or member schemas disagree.
    pub fn register_namespace(&mut self, name: impl Into<String>, members: Vec<String>) -> Result<()> {
        let name = name.into();
        if members.is_empty() {
            return Err(VfqError::InvalidConfig(format!(
                "namespace '{name}' must have at least one member collection"
            )));
        }
        if self.collections.contains_key(&name) {
            return Err(VfqError::InvalidConfig(format!(
                "'{name}' is already a collection and cannot also be a namespace"
            )));
        }
        let member_def = |member: &String| {
            self.collections.get(member).ok_or_else(|| {
                VfqError::InvalidConfig(format!(
                    "namespace member is not a registered collection: {member}"
                ))
            })
        };
        let first = member_def(&members[0])?.clone();
        for member in &members[1..] {
            let def = member_def(member)?;
            if def.fields != first.fields || def.vector_dim != first.vector_dim {
                return Err(VfqError::InvalidConfig(format!(
                    "namespace '{name}' member '{member}' schema differs from '{}'",
                    first.name
                )));
            }
        }
        self.namespaces.insert(name, members);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&CollectionDef> {
        self.collections
            .get(name)
            .ok_or_else(|| VfqError::Planning(format!("unknown collection: {name}")))
    }

    /// Schema for a collection or namespace by name.
    pub fn source_schema(&self, source: &str) -> Result<CollectionSchema> {
        if let Some(members) = self.namespaces.get(source) {
            // Members were validated schema-compatible at registration.
            return Ok(self.get(&members[0])?.schema());
        }
        self.collections
            .get(source)
            .map(CollectionDef::schema)
            .ok_or_else(|| VfqError::Planning(format!("unknown collection or namespace: {source}")))
    }

    pub fn namespace_members(&self, source: &str) -> Option<Vec<String>> {
        self.namespaces.get(source).cloned()
    }

    pub fn collections(&self) -> Vec<&CollectionDef> {
        self.collections.values().collect()
    }

    /// Load collection definitions from a JSON array file.
    pub fn load_from_json(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let defs: Vec<CollectionDef> =
            serde_json::from_str(&text).map_err(|e| VfqError::InvalidConfig(e.to_string()))?;
        let mut catalog = CollectionCatalog::new();
        for def in defs {
            catalog.register_collection(def);
        }
        Ok(catalog)
    }
}

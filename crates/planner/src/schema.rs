use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use vfq_common::Result;

/// Declared type of a metadata field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
}

impl FieldType {
    /// Whether ordering comparisons (`<`, `<=`, `>`, `>=`) are defined
    /// for the field.
    pub fn is_ordinal(self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
        };
        write!(f, "{name}")
    }
}

/// Known metadata fields and vector dimensionality of one queryable source.
///
/// Field iteration order is the map's sorted order, which makes `SELECT *`
/// expansion deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub fields: BTreeMap<String, FieldType>,
    /// Declared vector dimensionality, when known.
    pub vector_dim: Option<usize>,
}

impl CollectionSchema {
    pub fn field(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }
}

/// The planner needs schemas to resolve field references.
/// The client (Engine) provides this from its catalog.
pub trait SchemaProvider {
    /// Schema for a collection or namespace by name.
    ///
    /// # Errors
    /// Returns `Planning` when the source is not registered.
    fn source_schema(&self, source: &str) -> Result<CollectionSchema>;

    /// Member collections when `source` is a registered logical namespace,
    /// `None` when it is a plain collection.
    fn namespace_members(&self, source: &str) -> Option<Vec<String>>;
}

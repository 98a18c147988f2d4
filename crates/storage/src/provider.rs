use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use vfq_common::{Result, VfqError};
use vfq_planner::Predicate;

/// One raw record returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub id: String,
    /// Metadata fields as stored by the backend.
    pub metadata: Map<String, Value>,
    /// Similarity score, when the backend scored the record.
    pub score: Option<f32>,
    pub vector: Option<Vec<f32>>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: Map::new(),
            score: None,
            vector: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = Some(vector);
        self
    }
}

/// A plan restricted to one collection, serialized for pushdown.
#[derive(Debug, Clone)]
pub struct CollectionQuery {
    pub collection: String,
    /// Metadata filter; best-effort for providers, always re-applied by
    /// the executor.
    pub filter: Option<Predicate>,
    /// Query vector for similarity search.
    pub vector: Option<Vec<f32>>,
    /// Nearest-neighbor count when `vector` is set.
    pub top_k: Option<usize>,
    /// Row cap covering the caller's global limit+offset.
    pub fetch_limit: Option<usize>,
}

/// Abstract asynchronous capability to query exactly one collection.
///
/// Implementations bridge to a concrete backend and return a bounded
/// record sequence. Pushdown inputs (`filter`, `fetch_limit`) are
/// best-effort; providers may partially apply or ignore unsupported
/// predicates, and the executor preserves correctness by re-filtering.
pub trait CollectionProvider: Send + Sync {
    fn query<'a>(&'a self, request: CollectionQuery) -> BoxFuture<'a, Result<Vec<RawRecord>>>;
}

/// Shared provider handle.
pub type SharedProvider = Arc<dyn CollectionProvider>;

/// Name → provider bindings, consumed as a read-only snapshot during one
/// execution.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, SharedProvider>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.providers.keys().collect();
        names.sort();
        f.debug_struct("ProviderRegistry")
            .field("collections", &names)
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, collection: impl Into<String>, provider: SharedProvider) {
        self.providers.insert(collection.into(), provider);
    }

    pub fn get(&self, collection: &str) -> Result<SharedProvider> {
        self.providers
            .get(collection)
            .cloned()
            .ok_or_else(|| {
                VfqError::InvalidConfig(format!(
                    "no provider registered for collection: {collection}"
                ))
            })
    }
}

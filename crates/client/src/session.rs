use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use vfq_common::{EngineConfig, Result};
use vfq_execution::MetadataRouter;
use vfq_planner::{CollectionSchema, SchemaProvider};
use vfq_storage::{CollectionCatalog, ProviderRegistry};

pub type SharedSession = Arc<Session>;

/// Shared state behind one [`crate::Engine`].
///
/// Registries are mutated only through registration calls; during an
/// execution they are read as snapshots.
#[derive(Debug)]
pub struct Session {
    pub config: EngineConfig,
    pub catalog: RwLock<CollectionCatalog>,
    pub providers: RwLock<ProviderRegistry>,
    /// Routing registries, one per registered namespace.
    pub routers: RwLock<HashMap<String, MetadataRouter>>,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            catalog: RwLock::new(CollectionCatalog::new()),
            providers: RwLock::new(ProviderRegistry::new()),
            routers: RwLock::new(HashMap::new()),
        }
    }
}

impl SchemaProvider for Session {
    fn source_schema(&self, source: &str) -> Result<CollectionSchema> {
        self.catalog
            .read()
            .expect("catalog lock poisoned")
            .source_schema(source)
    }

    fn namespace_members(&self, source: &str) -> Option<Vec<String>> {
        self.catalog
            .read()
            .expect("catalog lock poisoned")
            .namespace_members(source)
    }
}

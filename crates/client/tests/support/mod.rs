#![allow(dead_code)]

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use serde_json::json;
use vfq_client::{
    CollectionDef, CollectionProvider, CollectionQuery, Engine, EngineConfig, FieldType, Literal,
    MemoryProvider, RawRecord, Result, VfqError,
};

/// Collection definition used across tests: text `category`/`tenant`,
/// integer `rank`, optional vector dimensionality.
pub fn docs_def(vector_dim: Option<usize>) -> CollectionDef {
    let mut fields = BTreeMap::new();
    fields.insert("category".to_string(), FieldType::Text);
    fields.insert("tenant".to_string(), FieldType::Text);
    fields.insert("rank".to_string(), FieldType::Integer);
    CollectionDef {
        name: "docs".to_string(),
        fields,
        vector_dim,
        options: HashMap::new(),
    }
}

pub fn scored_record(id: &str, category: &str, score: f32) -> RawRecord {
    RawRecord::new(id)
        .with_metadata("category", json!(category))
        .with_score(score)
}

pub fn tenant_record(id: &str, tenant: &str, score: f32) -> RawRecord {
    RawRecord::new(id)
        .with_metadata("tenant", json!(tenant))
        .with_score(score)
}

/// Provider that delays its inner provider's response, for simulating
/// slow backends and permuting completion order.
pub struct DelayedProvider {
    inner: MemoryProvider,
    delay: Duration,
}

impl DelayedProvider {
    pub fn new(inner: MemoryProvider, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl CollectionProvider for DelayedProvider {
    fn query<'a>(&'a self, request: CollectionQuery) -> BoxFuture<'a, Result<Vec<RawRecord>>> {
        async move {
            tokio::time::sleep(self.delay).await;
            self.inner.query(request).await
        }
        .boxed()
    }
}

/// Provider that always fails, for failure-policy tests.
pub struct FailingProvider {
    message: String,
}

impl FailingProvider {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl CollectionProvider for FailingProvider {
    fn query<'a>(&'a self, _request: CollectionQuery) -> BoxFuture<'a, Result<Vec<RawRecord>>> {
        let message = self.message.clone();
        async move {
            Err(VfqError::Execution {
                collection: None,
                message,
            })
        }
        .boxed()
    }
}

/// Engine with three tenant collections behind the `docs` namespace and
/// equality routing rules on `tenant`.
///
/// Per-collection providers come from `providers`; pass `None` to use a
/// default in-memory provider with two scored records.
pub fn tenant_engine(
    config: EngineConfig,
    providers: Vec<(&str, Option<Arc<dyn CollectionProvider>>)>,
) -> Engine {
    let engine = Engine::new(config);
    for (index, (name, provider)) in providers.into_iter().enumerate() {
        let mut def = docs_def(None);
        def.name = name.to_string();
        engine.register_collection(name, def);
        let provider = provider.unwrap_or_else(|| {
            let base = (index as f32 + 1.0) / 10.0;
            Arc::new(MemoryProvider::with_records(vec![
                tenant_record(&format!("{name}-a"), &format!("t{}", index + 1), base + 0.05),
                tenant_record(&format!("{name}-b"), &format!("t{}", index + 1), base),
            ]))
        });
        engine.register_provider(name, provider);
    }
    engine
        .register_namespace(
            "docs",
            vec![
                "t1_docs".to_string(),
                "t2_docs".to_string(),
                "t3_docs".to_string(),
            ],
        )
        .expect("namespace");
    for (value, collection) in [("t1", "t1_docs"), ("t2", "t2_docs"), ("t3", "t3_docs")] {
        engine
            .add_routing_rule("docs", "tenant", Literal::Text(value.to_string()), collection)
            .expect("routing rule");
    }
    engine
}

//! Embedding facade for VFQ.
//!
//! Architecture role:
//! - [`Engine`]: register collections, namespaces, providers, and routing
//!   rules; compile SQL into prepared queries
//! - [`PreparedQuery`]: inspect, explain, and execute a compiled plan
//!
//! Feature flags:
//! - `federation` (default): multi-collection fan-out via
//!   `vfq-execution/federation`.

mod engine;
mod session;

pub use engine::{Engine, PreparedQuery};

pub use vfq_common::{EngineConfig, FailurePolicy, Result, VfqError};
pub use vfq_execution::{
    CollectionFailure, ExecutionDiagnostics, ExecutionResult, MetadataRouter, ResultRow,
};
pub use vfq_planner::{plan_to_value, CollectionSchema, FieldType, Params, QueryPlan};
pub use vfq_sql::{parse, Literal, Statement};
pub use vfq_storage::{
    CollectionCatalog, CollectionDef, CollectionProvider, CollectionQuery, MemoryProvider,
    ProviderRegistry, RawRecord, SharedProvider,
};

use std::sync::Arc;

use serde_json::Value;
use vfq_common::{EngineConfig, Result, VfqError};
use vfq_execution::{execute_plan, ExecutionResult};
use vfq_planner::{
    build_plan_with_params, plan_to_value, CollectionSchema, Params, QueryPlan,
};
use vfq_sql::{parse, Literal};
use vfq_storage::{CollectionDef, SharedProvider};

use crate::session::{Session, SharedSession};

/// Query engine over registered collections and providers.
#[derive(Clone)]
pub struct Engine {
    session: SharedSession,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            session: Arc::new(Session::new(config)),
        }
    }

    /// Register a collection under a given name.
    /// We override `collection.name` to avoid ambiguity.
    pub fn register_collection(&self, name: impl Into<String>, mut collection: CollectionDef) {
        collection.name = name.into();
        self.session
            .catalog
            .write()
            .expect("catalog lock poisoned")
            .register_collection(collection);
    }

    /// Bind a provider to a collection name.
    pub fn register_provider(&self, collection: impl Into<String>, provider: SharedProvider) {
        self.session
            .providers
            .write()
            .expect("provider lock poisoned")
            .register(collection, provider);
    }

    /// Register `name` as a logical namespace over member collections and
    /// create its routing registry.
    pub fn register_namespace(
        &self,
        name: impl Into<String>,
        members: Vec<String>,
    ) -> Result<()> {
        let name = name.into();
        self.session
            .catalog
            .write()
            .expect("catalog lock poisoned")
            .register_namespace(name.clone(), members.clone())?;
        self.session
            .routers
            .write()
            .expect("router lock poisoned")
            .insert(name, vfq_execution::MetadataRouter::with_collections(members));
        Ok(())
    }

    /// Add an equality routing rule to a namespace's registry.
    pub fn add_routing_rule(
        &self,
        namespace: &str,
        field: impl Into<String>,
        value: Literal,
        collection: impl Into<String>,
    ) -> Result<()> {
        let mut routers = self.session.routers.write().expect("router lock poisoned");
        let router = routers.get_mut(namespace).ok_or_else(|| {
            VfqError::InvalidConfig(format!("unknown namespace: {namespace}"))
        })?;
        router.add_rule(field, value, collection)
    }

    /// Compile query text into a prepared query.
    pub fn sql(&self, query: &str) -> Result<PreparedQuery> {
        self.sql_with_params(query, Params::new())
    }

    /// Compile query text, binding named `:parameters` (query vectors).
    pub fn sql_with_params(&self, query: &str, params: Params) -> Result<PreparedQuery> {
        let statement = parse(query)?;
        let plan = build_plan_with_params(&statement, self.session.as_ref(), &params)?;
        Ok(PreparedQuery {
            session: self.session.clone(),
            plan,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.session.config
    }

    pub fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .session
            .catalog
            .read()
            .expect("catalog lock poisoned")
            .collections()
            .into_iter()
            .map(|c| c.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn collection_schema(&self, name: &str) -> Result<CollectionSchema> {
        self.session
            .catalog
            .read()
            .expect("catalog lock poisoned")
            .source_schema(name)
    }
}

/// A compiled query bound to its session, ready to explain or execute.
#[derive(Clone, Debug)]
pub struct PreparedQuery {
    session: SharedSession,
    plan: QueryPlan,
}

impl PreparedQuery {
    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    /// Introspectable rendering of the plan; never used for execution.
    pub fn explain(&self) -> Value {
        plan_to_value(&self.plan)
    }

    /// Execute the plan and collect the result.
    ///
    /// Plans resolved to one collection run the single-collection path;
    /// namespace plans are routed and fanned out (feature `federation`).
    pub async fn collect(&self) -> Result<ExecutionResult> {
        let plan = self.effective_plan();
        if plan.collections.len() == 1 {
            let provider = self
                .session
                .providers
                .read()
                .expect("provider lock poisoned")
                .get(&plan.collections[0])?;
            execute_plan(&plan, provider.as_ref()).await
        } else {
            self.collect_federated(&plan).await
        }
    }

    /// The plan as executed: an engine-level row cap applies when the
    /// query carries no LIMIT.
    fn effective_plan(&self) -> QueryPlan {
        if self.plan.limit.is_some() {
            return self.plan.clone();
        }
        let mut plan = self.plan.clone();
        plan.limit = Some(self.session.config.default_limit);
        plan
    }

    #[cfg(feature = "federation")]
    async fn collect_federated(&self, plan: &QueryPlan) -> Result<ExecutionResult> {
        use vfq_execution::{execute_multi_collection, route, FederationPolicy};

        let routes = {
            let routers = self.session.routers.read().expect("router lock poisoned");
            let router = routers.get(&plan.source).ok_or_else(|| {
                VfqError::Planning(format!(
                    "unresolved routing: '{}' has no routing registry",
                    plan.source
                ))
            })?;
            route(plan, router)?
        };
        let providers = self
            .session
            .providers
            .read()
            .expect("provider lock poisoned")
            .clone();
        let policy = FederationPolicy::from_config(&self.session.config);
        execute_multi_collection(plan, &providers, &routes, &policy).await
    }

    #[cfg(not(feature = "federation"))]
    async fn collect_federated(&self, _plan: &QueryPlan) -> Result<ExecutionResult> {
        Err(VfqError::Unsupported(
            "multi-collection execution requires the 'federation' feature".to_string(),
        ))
    }
}

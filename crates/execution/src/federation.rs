use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use vfq_common::{EngineConfig, FailurePolicy, Result, VfqError};
use vfq_planner::QueryPlan;
use vfq_storage::ProviderRegistry;

use crate::executor::execute_plan;
use crate::merge::merge_rows;
use crate::result::{CollectionFailure, ExecutionDiagnostics, ExecutionResult, ResultRow};
use crate::router::CollectionRoute;

/// Fan-out behavior knobs for one multi-collection execution.
#[derive(Debug, Clone)]
pub struct FederationPolicy {
    pub failure: FailurePolicy,
    /// Overall deadline; tasks not completed in time count as failures.
    pub deadline: Option<Duration>,
    /// Bounded wait for cancelled tasks to settle before abandoning them.
    pub cancel_grace: Duration,
}

impl Default for FederationPolicy {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl FederationPolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            failure: config.failure_policy,
            deadline: (config.deadline_ms > 0).then(|| Duration::from_millis(config.deadline_ms)),
            cancel_grace: Duration::from_millis(config.cancel_grace_ms),
        }
    }
}

/// Execute a plan across routed collections and merge the results.
///
/// One task per route is spawned in route order; each runs the
/// single-collection executor against that collection's provider with a
/// shard plan widened to `limit + offset`. Tasks fold their outcome into
/// the accumulator only at completion, through a channel, so completion
/// order never reaches result order — the k-way merge is the single
/// ordering authority.
///
/// Failure handling follows `policy.failure`: `FailFast` cancels the
/// remaining tasks on the first failure (best-effort, bounded by
/// `cancel_grace`) and raises it; `BestEffort` records per-collection
/// failures as diagnostics and returns rows from the collections that
/// succeeded. Tasks that miss `policy.deadline` are failures, never
/// silent omissions.
pub async fn execute_multi_collection(
    plan: &QueryPlan,
    providers: &ProviderRegistry,
    routes: &[CollectionRoute],
    policy: &FederationPolicy,
) -> Result<ExecutionResult> {
    if routes.is_empty() {
        return Ok(ExecutionResult::default());
    }

    // Resolve every provider before fanning out; a missing binding is a
    // configuration error, not a per-collection failure.
    let mut tasks = Vec::with_capacity(routes.len());
    for route in routes {
        tasks.push((
            route.collection.clone(),
            providers.get(&route.collection)?,
            shard_plan(plan, route),
        ));
    }

    let (cancel_tx, cancel_rx) = watch::channel(false);
    // Capacity covers one completion per task, so sends never block even
    // after this function stops receiving.
    let (done_tx, mut done_rx) = mpsc::channel(routes.len());

    for (index, (collection, provider, shard)) in tasks.into_iter().enumerate() {
        let mut cancel = cancel_rx.clone();
        let done = done_tx.clone();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.changed() => Err(VfqError::execution(
                    collection.clone(),
                    "cancelled before completion",
                )),
                result = execute_plan(&shard, provider.as_ref()) => result.map(|r| r.rows),
            };
            let _ = done.send((index, collection, outcome)).await;
        });
    }
    drop(done_tx);

    let deadline_at = policy.deadline.map(|d| tokio::time::Instant::now() + d);
    let mut shard_rows: Vec<Option<Vec<ResultRow>>> = (0..routes.len()).map(|_| None).collect();
    let mut failures: Vec<CollectionFailure> = Vec::new();
    let mut first_error: Option<VfqError> = None;
    let mut pending = routes.len();

    while pending > 0 {
        let received = match deadline_at {
            Some(at) => tokio::select! {
                received = done_rx.recv() => received,
                _ = tokio::time::sleep_until(at) => {
                    let _ = cancel_tx.send(true);
                    expire_pending(routes, &shard_rows, &mut failures, &mut first_error, policy);
                    break;
                }
            },
            None => done_rx.recv().await,
        };
        let Some((index, collection, outcome)) = received else {
            break;
        };
        pending -= 1;

        match outcome {
            Ok(rows) => {
                info!(collection = %collection, rows = rows.len(), "collection query succeeded");
                shard_rows[index] = Some(rows);
            }
            Err(error) => {
                warn!(collection = %collection, error = %error, "collection query failed");
                failures.push(CollectionFailure {
                    collection,
                    message: failure_message(&error),
                });
                if policy.failure == FailurePolicy::FailFast {
                    let _ = cancel_tx.send(true);
                    first_error = Some(error);
                    break;
                }
            }
        }
    }

    if let Some(error) = first_error {
        // Bounded grace for cancelled tasks to settle; never block on
        // acknowledgement beyond it.
        let drain = async {
            while done_rx.recv().await.is_some() {}
        };
        let _ = tokio::time::timeout(policy.cancel_grace, drain).await;
        return Err(error);
    }

    let mut contributing = Vec::new();
    let mut runs = Vec::new();
    for (index, route) in routes.iter().enumerate() {
        if let Some(rows) = shard_rows[index].take() {
            contributing.push(route.collection.clone());
            runs.push(rows);
        }
    }

    let rows = merge_rows(runs, plan.order_by.as_ref(), plan.offset, plan.limit);
    Ok(ExecutionResult {
        rows,
        diagnostics: ExecutionDiagnostics {
            contributing,
            failures,
        },
    })
}

/// Per-shard plan: same predicate and order, limit widened to
/// `limit + offset` with offset zero, so the global top-K never
/// under-fetches.
fn shard_plan(plan: &QueryPlan, route: &CollectionRoute) -> QueryPlan {
    let mut shard = plan.clone();
    shard.collections = vec![route.collection.clone()];
    shard.predicate = route.predicate.clone();
    shard.limit = plan.fetch_limit();
    shard.offset = 0;
    shard
}

fn expire_pending(
    routes: &[CollectionRoute],
    shard_rows: &[Option<Vec<ResultRow>>],
    failures: &mut Vec<CollectionFailure>,
    first_error: &mut Option<VfqError>,
    policy: &FederationPolicy,
) {
    for (index, route) in routes.iter().enumerate() {
        let finished = shard_rows[index].is_some()
            || failures.iter().any(|f| f.collection == route.collection);
        if finished {
            continue;
        }
        warn!(collection = %route.collection, "collection query missed the deadline");
        failures.push(CollectionFailure {
            collection: route.collection.clone(),
            message: "deadline exceeded".to_string(),
        });
        if policy.failure == FailurePolicy::FailFast && first_error.is_none() {
            *first_error = Some(VfqError::execution(
                route.collection.clone(),
                "deadline exceeded",
            ));
        }
    }
}

fn failure_message(error: &VfqError) -> String {
    match error {
        VfqError::Execution { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

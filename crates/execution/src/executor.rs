use serde_json::Value;
use tracing::debug;
use vfq_common::{Result, VfqError};
use vfq_planner::{OrderKey, QueryPlan};
use vfq_sql::ProjectionTarget;
use vfq_storage::{CollectionProvider, CollectionQuery, RawRecord};

use crate::filter;
use crate::merge::compare_rows;
use crate::result::{ExecutionDiagnostics, ExecutionResult, ResultRow};

/// Execute a plan against exactly one collection.
///
/// Pushes predicate/vector/limit down to the provider, then re-applies the
/// full predicate locally so results stay correct under partial-pushdown
/// providers, projects surviving records into rows, sorts by the plan's
/// ordering key, and applies offset/limit.
///
/// # Errors
/// `Execution` (carrying the collection name) when the provider call fails
/// or returns malformed data. Not retried here; retry policy belongs to
/// the caller or the provider.
pub async fn execute_plan(
    plan: &QueryPlan,
    provider: &dyn CollectionProvider,
) -> Result<ExecutionResult> {
    let collection = plan.collections.first().cloned().ok_or_else(|| VfqError::Execution {
        collection: None,
        message: "plan has no resolved target collection; route it first".to_string(),
    })?;

    let request = CollectionQuery {
        collection: collection.clone(),
        filter: plan.predicate.clone(),
        vector: plan.similarity.as_ref().map(|s| s.query.clone()),
        top_k: plan.similarity.as_ref().map(|s| s.top_k),
        fetch_limit: plan.fetch_limit(),
    };

    let records = provider
        .query(request)
        .await
        .map_err(|e| attach_collection(e, &collection))?;
    let fetched = records.len();

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        if record.id.is_empty() {
            return Err(VfqError::execution(
                &collection,
                "provider returned a record without an identifier",
            ));
        }
        if let Some(predicate) = &plan.predicate {
            if !filter::matches(predicate, &record.metadata) {
                continue;
            }
        }
        rows.push(project_record(plan, record));
    }

    rows.sort_by(|a, b| compare_rows(a, b, plan.order_by.as_ref()));
    let rows: Vec<ResultRow> = rows
        .into_iter()
        .skip(plan.offset)
        .take(plan.limit.unwrap_or(usize::MAX))
        .collect();

    debug!(
        collection = %collection,
        fetched,
        returned = rows.len(),
        "collection query complete"
    );

    Ok(ExecutionResult {
        rows,
        diagnostics: ExecutionDiagnostics {
            contributing: vec![collection],
            failures: Vec::new(),
        },
    })
}

fn project_record(plan: &QueryPlan, record: RawRecord) -> ResultRow {
    let mut columns = Vec::with_capacity(plan.projection.len());
    for item in &plan.projection {
        let value = match &item.target {
            ProjectionTarget::Field(name) => record
                .metadata
                .get(name.as_str())
                .cloned()
                .unwrap_or(Value::Null),
            ProjectionTarget::RecordId => Value::from(record.id.clone()),
            ProjectionTarget::Similarity => record.score.map(Value::from).unwrap_or(Value::Null),
            ProjectionTarget::Vector => record
                .vector
                .as_ref()
                .map(|v| Value::Array(v.iter().map(|x| Value::from(*x)).collect()))
                .unwrap_or(Value::Null),
        };
        columns.push((item.output_name().to_string(), value));
    }

    let order_value = match plan.order_by.as_ref().map(|o| &o.key) {
        Some(OrderKey::Field(name)) => record.metadata.get(name.as_str()).cloned(),
        _ => None,
    };

    ResultRow::new(record.id, columns)
        .with_score(record.score)
        .with_order_value(order_value)
}

fn attach_collection(error: VfqError, collection: &str) -> VfqError {
    match error {
        VfqError::Execution {
            collection: None,
            message,
        } => VfqError::execution(collection, message),
        other => other,
    }
}

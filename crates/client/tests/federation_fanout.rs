#![cfg(feature = "federation")]

mod support;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use support::{tenant_engine, tenant_record, DelayedProvider, FailingProvider};
use vfq_client::{
    EngineConfig, ExecutionResult, FailurePolicy, MemoryProvider, Result, VfqError,
};

fn delayed(records: Vec<vfq_client::RawRecord>, delay_ms: u64) -> Arc<DelayedProvider> {
    Arc::new(DelayedProvider::new(
        MemoryProvider::with_records(records),
        Duration::from_millis(delay_ms),
    ))
}

async fn collect_with_delays(delays: [u64; 3]) -> Result<ExecutionResult> {
    let engine = tenant_engine(
        EngineConfig::default(),
        vec![
            (
                "t1_docs",
                Some(delayed(
                    vec![
                        tenant_record("a", "t1", 0.9),
                        tenant_record("b", "t1", 0.5),
                    ],
                    delays[0],
                ) as _),
            ),
            (
                "t2_docs",
                Some(delayed(
                    vec![
                        tenant_record("c", "t2", 0.95),
                        tenant_record("d", "t2", 0.4),
                    ],
                    delays[1],
                ) as _),
            ),
            (
                "t3_docs",
                Some(delayed(vec![tenant_record("e", "t3", 0.7)], delays[2]) as _),
            ),
        ],
    );
    engine
        .sql("SELECT id FROM docs ORDER BY SIMILARITY LIMIT 4")
        .expect("sql")
        .collect()
        .await
}

fn ids(result: &ExecutionResult) -> Vec<String> {
    result
        .rows
        .iter()
        .map(|r| r.record_id.clone())
        .collect()
}

#[tokio::test]
async fn merged_rows_are_globally_ordered_and_limited() {
    let result = collect_with_delays([0, 0, 0]).await.expect("collect");
    assert_eq!(ids(&result), vec!["c", "a", "e", "b"]);
    assert_eq!(result.diagnostics.contributing.len(), 3);
    assert!(result.diagnostics.failures.is_empty());
}

#[tokio::test]
async fn completion_order_never_changes_result_order() {
    // Permute which collection answers first; the merge is the only
    // ordering authority, so the result must not move.
    let fast_first = collect_with_delays([0, 40, 80]).await.expect("collect");
    let fast_last = collect_with_delays([80, 40, 0]).await.expect("collect");
    let middle = collect_with_delays([40, 0, 80]).await.expect("collect");

    assert_eq!(ids(&fast_first), vec!["c", "a", "e", "b"]);
    assert_eq!(ids(&fast_first), ids(&fast_last));
    assert_eq!(ids(&fast_first), ids(&middle));
}

#[tokio::test]
async fn duplicate_record_ids_appear_once() {
    let engine = tenant_engine(
        EngineConfig::default(),
        vec![
            (
                "t1_docs",
                Some(Arc::new(MemoryProvider::with_records(vec![
                    tenant_record("dup", "t1", 0.9),
                ])) as _),
            ),
            (
                "t2_docs",
                Some(Arc::new(MemoryProvider::with_records(vec![
                    tenant_record("dup", "t2", 0.9),
                    tenant_record("only", "t2", 0.5),
                ])) as _),
            ),
            ("t3_docs", None),
        ],
    );

    let result = engine
        .sql("SELECT id, tenant FROM docs WHERE tenant IN ('t1', 't2') ORDER BY SIMILARITY")
        .expect("sql")
        .collect()
        .await
        .expect("collect");

    assert_eq!(ids(&result), vec!["dup", "only"]);
    // First occurrence in merge order wins: equal score and id tie-break
    // falls back to launch order, so the t1 row is the one kept.
    assert_eq!(result.rows[0].get("tenant"), Some(&json!("t1")));
}

#[tokio::test]
async fn best_effort_returns_partial_rows_with_diagnostics() {
    let config = EngineConfig {
        failure_policy: FailurePolicy::BestEffort,
        ..EngineConfig::default()
    };
    let engine = tenant_engine(
        config,
        vec![
            ("t1_docs", None),
            ("t2_docs", Some(Arc::new(FailingProvider::new("backend unavailable")) as _)),
            ("t3_docs", None),
        ],
    );

    let result = engine
        .sql("SELECT id FROM docs ORDER BY SIMILARITY")
        .expect("sql")
        .collect()
        .await
        .expect("collect");

    assert_eq!(
        result.diagnostics.contributing,
        vec!["t1_docs".to_string(), "t3_docs".to_string()]
    );
    assert_eq!(result.diagnostics.failures.len(), 1);
    assert_eq!(result.diagnostics.failures[0].collection, "t2_docs");
    assert!(result
        .diagnostics
        .failures[0]
        .message
        .contains("backend unavailable"));
    assert_eq!(result.row_count(), 4);
}

#[tokio::test]
async fn fail_fast_raises_the_first_collection_failure() {
    let engine = tenant_engine(
        EngineConfig::default(), // FailFast is the default policy
        vec![
            ("t1_docs", None),
            ("t2_docs", Some(Arc::new(FailingProvider::new("backend unavailable")) as _)),
            ("t3_docs", None),
        ],
    );

    let err = engine
        .sql("SELECT id FROM docs ORDER BY SIMILARITY")
        .expect("sql")
        .collect()
        .await
        .expect_err("must fail");

    match err {
        VfqError::Execution {
            collection,
            message,
        } => {
            assert_eq!(collection.as_deref(), Some("t2_docs"));
            assert!(message.contains("backend unavailable"), "message: {message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn deadline_expiry_is_a_diagnosed_failure_under_best_effort() {
    let config = EngineConfig {
        failure_policy: FailurePolicy::BestEffort,
        deadline_ms: 50,
        ..EngineConfig::default()
    };
    let engine = tenant_engine(
        config,
        vec![
            ("t1_docs", None),
            (
                "t2_docs",
                Some(delayed(vec![tenant_record("slow", "t2", 0.9)], 5_000) as _),
            ),
            ("t3_docs", None),
        ],
    );

    let result = engine
        .sql("SELECT id FROM docs ORDER BY SIMILARITY")
        .expect("sql")
        .collect()
        .await
        .expect("collect");

    assert_eq!(
        result.diagnostics.contributing,
        vec!["t1_docs".to_string(), "t3_docs".to_string()]
    );
    assert_eq!(result.diagnostics.failures.len(), 1);
    assert_eq!(result.diagnostics.failures[0].collection, "t2_docs");
    assert!(result.diagnostics.failures[0].message.contains("deadline"));
    assert_eq!(result.row_count(), 4);
}

#[tokio::test]
async fn deadline_expiry_raises_under_fail_fast() {
    let config = EngineConfig {
        deadline_ms: 50,
        ..EngineConfig::default()
    };
    let engine = tenant_engine(
        config,
        vec![
            ("t1_docs", None),
            (
                "t2_docs",
                Some(delayed(vec![tenant_record("slow", "t2", 0.9)], 5_000) as _),
            ),
            ("t3_docs", None),
        ],
    );

    let err = engine
        .sql("SELECT id FROM docs ORDER BY SIMILARITY")
        .expect("sql")
        .collect()
        .await
        .expect_err("must fail");

    match err {
        VfqError::Execution { collection, message } => {
            assert_eq!(collection.as_deref(), Some("t2_docs"));
            assert!(message.contains("deadline"), "message: {message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

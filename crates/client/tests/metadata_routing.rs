#![cfg(feature = "federation")]

mod support;

use serde_json::json;
use support::tenant_engine;
use vfq_client::{Engine, EngineConfig};

fn engine() -> Engine {
    tenant_engine(
        EngineConfig::default(),
        vec![("t1_docs", None), ("t2_docs", None), ("t3_docs", None)],
    )
}

#[tokio::test]
async fn equality_on_routing_field_queries_one_collection() {
    let result = engine()
        .sql("SELECT id, tenant FROM docs WHERE tenant = 't1' ORDER BY SIMILARITY")
        .expect("sql")
        .collect()
        .await
        .expect("collect");

    // Point lookup: only the rule's collection is queried, no fan-out.
    assert_eq!(result.diagnostics.contributing, vec!["t1_docs".to_string()]);
    assert_eq!(result.row_count(), 2);
    for row in &result.rows {
        assert_eq!(row.get("tenant"), Some(&json!("t1")));
    }
}

#[tokio::test]
async fn in_list_queries_matching_collections_only() {
    let result = engine()
        .sql("SELECT id FROM docs WHERE tenant IN ('t1', 't3') ORDER BY SIMILARITY")
        .expect("sql")
        .collect()
        .await
        .expect("collect");

    assert_eq!(
        result.diagnostics.contributing,
        vec!["t1_docs".to_string(), "t3_docs".to_string()]
    );
    assert_eq!(result.row_count(), 4);
}

#[tokio::test]
async fn unconstrained_queries_fan_out_to_all_members() {
    let result = engine()
        .sql("SELECT id FROM docs ORDER BY SIMILARITY")
        .expect("sql")
        .collect()
        .await
        .expect("collect");

    assert_eq!(
        result.diagnostics.contributing,
        vec![
            "t1_docs".to_string(),
            "t2_docs".to_string(),
            "t3_docs".to_string()
        ]
    );
    assert_eq!(result.row_count(), 6);
}

#[tokio::test]
async fn unmapped_routing_value_falls_back_to_full_fan_out() {
    // 't9' has no rule; it could live anywhere, so every member is asked
    // and the predicate filters everything out downstream.
    let result = engine()
        .sql("SELECT id FROM docs WHERE tenant = 't9'")
        .expect("sql")
        .collect()
        .await
        .expect("collect");

    assert_eq!(result.diagnostics.contributing.len(), 3);
    assert_eq!(result.row_count(), 0);
}

#[test]
fn namespace_plans_defer_collection_resolution() {
    let prepared = engine()
        .sql("SELECT id FROM docs WHERE tenant = 't1'")
        .expect("sql");
    assert!(prepared.plan().collections.is_empty());
    assert_eq!(prepared.explain()["collections"], json!([]));
}

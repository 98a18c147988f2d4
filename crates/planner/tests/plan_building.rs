use std::collections::{BTreeMap, HashMap};

use vfq_common::{Result, VfqError};
use vfq_planner::{
    build_plan, build_plan_with_params, CollectionSchema, FieldType, OrderKey, Params, Predicate,
    QueryPlan, SchemaProvider,
};
use vfq_sql::{parse, CompareOp, Literal, ProjectionTarget};

struct StaticSchemas {
    schemas: HashMap<String, CollectionSchema>,
    namespaces: HashMap<String, Vec<String>>,
}

impl StaticSchemas {
    fn docs() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("category".to_string(), FieldType::Text);
        fields.insert("tenant".to_string(), FieldType::Text);
        fields.insert("rank".to_string(), FieldType::Integer);
        fields.insert("flagged".to_string(), FieldType::Boolean);
        let schema = CollectionSchema {
            fields,
            vector_dim: Some(3),
        };

        let mut schemas = HashMap::new();
        schemas.insert("docs".to_string(), schema.clone());
        schemas.insert("all_docs".to_string(), schema);

        let mut namespaces = HashMap::new();
        namespaces.insert(
            "all_docs".to_string(),
            vec!["t1_docs".to_string(), "t2_docs".to_string()],
        );
        Self {
            schemas,
            namespaces,
        }
    }
}

impl SchemaProvider for StaticSchemas {
    fn source_schema(&self, source: &str) -> Result<CollectionSchema> {
        self.schemas
            .get(source)
            .cloned()
            .ok_or_else(|| VfqError::Planning(format!("unknown collection or namespace: {source}")))
    }

    fn namespace_members(&self, source: &str) -> Option<Vec<String>> {
        self.namespaces.get(source).cloned()
    }
}

fn plan(text: &str) -> Result<QueryPlan> {
    build_plan(&parse(text).expect("parse"), &StaticSchemas::docs())
}

fn planning_message(result: Result<QueryPlan>) -> String {
    match result.expect_err("planning must fail") {
        VfqError::Planning(message) => message,
        other => panic!("expected planning error, got: {other}"),
    }
}

#[test]
fn resolves_single_collection_and_projection() {
    let plan = plan("SELECT id, category AS cat, similarity FROM docs LIMIT 2").expect("plan");
    assert_eq!(plan.source, "docs");
    assert_eq!(plan.collections, vec!["docs".to_string()]);
    assert_eq!(plan.limit, Some(2));
    assert_eq!(plan.offset, 0);

    let names: Vec<&str> = plan.projection.iter().map(|p| p.output_name()).collect();
    assert_eq!(names, vec!["id", "cat", "similarity"]);
}

#[test]
fn wildcard_expands_id_then_schema_fields_in_order() {
    let plan = plan("SELECT * FROM docs").expect("plan");
    let names: Vec<&str> = plan.projection.iter().map(|p| p.output_name()).collect();
    assert_eq!(names, vec!["id", "category", "flagged", "rank", "tenant"]);
    assert_eq!(plan.projection[0].target, ProjectionTarget::RecordId);
}

#[test]
fn namespace_source_defers_collections_to_routing() {
    let plan = plan("SELECT id FROM all_docs").expect("plan");
    assert_eq!(plan.source, "all_docs");
    assert!(plan.collections.is_empty());
}

#[test]
fn unknown_source_fails() {
    let message = planning_message(plan("SELECT id FROM nothere"));
    assert!(message.contains("nothere"), "message: {message}");
}

#[test]
fn unknown_field_fails_naming_the_field() {
    let message = planning_message(plan("SELECT missing FROM docs"));
    assert!(message.contains("missing"), "message: {message}");

    let message = planning_message(plan("SELECT id FROM docs WHERE missing = 1"));
    assert!(message.contains("missing"), "message: {message}");

    let message = planning_message(plan("SELECT id FROM docs ORDER BY missing"));
    assert!(message.contains("missing"), "message: {message}");
}

#[test]
fn ordering_comparison_on_text_field_is_rejected() {
    let message = planning_message(plan("SELECT id FROM docs WHERE category > 'a'"));
    assert!(message.contains("ordinal"), "message: {message}");
}

#[test]
fn literal_type_mismatch_is_rejected() {
    let message = planning_message(plan("SELECT id FROM docs WHERE flagged = 'yes'"));
    assert!(message.contains("flagged"), "message: {message}");
}

#[test]
fn in_requires_element_compatible_list() {
    let plan_ok = plan("SELECT id FROM docs WHERE tenant IN ('t1', 't2')").expect("plan");
    match plan_ok.predicate.expect("predicate") {
        Predicate::Compare { op, .. } => assert_eq!(op, CompareOp::In),
        other => panic!("unexpected predicate: {other:?}"),
    }

    let message = planning_message(plan("SELECT id FROM docs WHERE tenant IN ('t1', 2)"));
    assert!(message.contains("tenant"), "message: {message}");
}

#[test]
fn predicate_is_flattened() {
    let plan = plan("SELECT id FROM docs WHERE tenant = 't1' AND rank > 3 AND flagged = false")
        .expect("plan");
    match plan.predicate.expect("predicate") {
        Predicate::All(children) => assert_eq!(children.len(), 3),
        other => panic!("expected flattened conjunction, got: {other:?}"),
    }
}

#[test]
fn match_clause_is_extracted_from_the_predicate() {
    let plan = plan(
        "SELECT id FROM docs WHERE category = 'a' AND MATCH [1.0, 0.0, 0.0] WITHIN 5",
    )
    .expect("plan");

    let similarity = plan.similarity.expect("similarity");
    assert_eq!(similarity.query, vec![1.0, 0.0, 0.0]);
    assert_eq!(similarity.top_k, 5);

    // Residual predicate keeps only the metadata comparison.
    assert_eq!(
        plan.predicate,
        Some(Predicate::Compare {
            field: "category".to_string(),
            op: CompareOp::Eq,
            value: Literal::Text("a".to_string()),
        })
    );

    // Similarity search orders nearest-first even without ORDER BY.
    let order = plan.order_by.expect("order");
    assert_eq!(order.key, OrderKey::Similarity);
    assert!(order.descending);
}

#[test]
fn match_under_or_or_not_is_rejected() {
    let message = planning_message(plan(
        "SELECT id FROM docs WHERE category = 'a' OR MATCH [1.0, 0.0, 0.0] WITHIN 5",
    ));
    assert!(message.contains("MATCH"), "message: {message}");

    let message = planning_message(plan(
        "SELECT id FROM docs WHERE NOT MATCH [1.0, 0.0, 0.0] WITHIN 5",
    ));
    assert!(message.contains("MATCH"), "message: {message}");
}

#[test]
fn two_match_clauses_are_rejected() {
    let message = planning_message(plan(
        "SELECT id FROM docs WHERE MATCH [1.0, 0.0, 0.0] WITHIN 5 AND MATCH [0.0, 1.0, 0.0] WITHIN 5",
    ));
    assert!(message.contains("at most one MATCH"), "message: {message}");
}

#[test]
fn vector_dimension_is_checked_against_schema() {
    let message = planning_message(plan("SELECT id FROM docs WHERE MATCH [1.0, 0.0] WITHIN 5"));
    assert!(message.contains("dimension"), "message: {message}");
}

#[test]
fn match_param_binds_or_fails_by_name() {
    let statement = parse("SELECT id FROM docs WHERE MATCH :q WITHIN 4").expect("parse");
    let schemas = StaticSchemas::docs();

    let message = match build_plan(&statement, &schemas).expect_err("must fail") {
        VfqError::Planning(message) => message,
        other => panic!("expected planning error, got: {other}"),
    };
    assert!(message.contains(":q"), "message: {message}");

    let mut params = Params::new();
    params.insert("q".to_string(), vec![0.0, 1.0, 0.0]);
    let plan = build_plan_with_params(&statement, &schemas, &params).expect("plan");
    assert_eq!(plan.similarity.expect("similarity").query, vec![0.0, 1.0, 0.0]);
}

#[test]
fn negative_limit_and_offset_are_rejected() {
    let message = planning_message(plan("SELECT id FROM docs LIMIT -1"));
    assert!(message.contains("LIMIT"), "message: {message}");

    let message = planning_message(plan("SELECT id FROM docs LIMIT 5 OFFSET -2"));
    assert!(message.contains("OFFSET"), "message: {message}");
}

#[test]
fn duplicate_aliases_are_rejected() {
    let message = planning_message(plan("SELECT category AS x, tenant AS x FROM docs"));
    assert!(message.contains("duplicate"), "message: {message}");
}

#[test]
fn within_must_be_positive() {
    let message = planning_message(plan(
        "SELECT id FROM docs WHERE MATCH [1.0, 0.0, 0.0] WITHIN 0",
    ));
    assert!(message.contains("WITHIN"), "message: {message}");
}

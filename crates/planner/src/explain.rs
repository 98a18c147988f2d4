use serde_json::{Map, Value};
use vfq_sql::{Literal, ProjectionTarget};

use crate::plan::{OrderKey, PlanProjectionItem, Predicate, QueryPlan};

/// Render a plan as a nested, order-preserving key/value structure.
///
/// Pure function used for display and golden tests, never for execution.
/// The rendering is lossless: every projection, predicate, similarity,
/// order, and limit detail of the plan appears in the output.
pub fn plan_to_value(plan: &QueryPlan) -> Value {
    let mut out = Map::new();
    out.insert("source".to_string(), Value::from(plan.source.clone()));
    out.insert(
        "collections".to_string(),
        Value::Array(plan.collections.iter().cloned().map(Value::from).collect()),
    );
    out.insert(
        "projection".to_string(),
        Value::Array(plan.projection.iter().map(projection_value).collect()),
    );
    out.insert(
        "predicate".to_string(),
        plan.predicate
            .as_ref()
            .map(predicate_value)
            .unwrap_or(Value::Null),
    );
    out.insert(
        "similarity".to_string(),
        plan.similarity
            .as_ref()
            .map(|s| {
                let mut m = Map::new();
                m.insert(
                    "query".to_string(),
                    Value::Array(s.query.iter().map(|x| Value::from(*x)).collect()),
                );
                m.insert("top_k".to_string(), Value::from(s.top_k));
                Value::Object(m)
            })
            .unwrap_or(Value::Null),
    );
    out.insert(
        "order_by".to_string(),
        plan.order_by
            .as_ref()
            .map(|o| {
                let mut m = Map::new();
                let key = match &o.key {
                    OrderKey::Similarity => Value::from("similarity"),
                    OrderKey::Field(name) => {
                        let mut f = Map::new();
                        f.insert("field".to_string(), Value::from(name.clone()));
                        Value::Object(f)
                    }
                };
                m.insert("key".to_string(), key);
                m.insert(
                    "direction".to_string(),
                    Value::from(if o.descending { "descending" } else { "ascending" }),
                );
                Value::Object(m)
            })
            .unwrap_or(Value::Null),
    );
    out.insert(
        "limit".to_string(),
        plan.limit.map(Value::from).unwrap_or(Value::Null),
    );
    out.insert("offset".to_string(), Value::from(plan.offset));
    Value::Object(out)
}

fn projection_value(item: &PlanProjectionItem) -> Value {
    let mut m = Map::new();
    let select = match &item.target {
        ProjectionTarget::Field(name) => {
            let mut f = Map::new();
            f.insert("field".to_string(), Value::from(name.clone()));
            Value::Object(f)
        }
        ProjectionTarget::RecordId => Value::from("id"),
        ProjectionTarget::Similarity => Value::from("similarity"),
        ProjectionTarget::Vector => Value::from("vector"),
    };
    m.insert("select".to_string(), select);
    m.insert(
        "alias".to_string(),
        item.alias.clone().map(Value::from).unwrap_or(Value::Null),
    );
    m.insert("output".to_string(), Value::from(item.output_name()));
    Value::Object(m)
}

fn predicate_value(predicate: &Predicate) -> Value {
    let mut m = Map::new();
    match predicate {
        Predicate::All(children) => {
            m.insert(
                "all".to_string(),
                Value::Array(children.iter().map(predicate_value).collect()),
            );
        }
        Predicate::Any(children) => {
            m.insert(
                "any".to_string(),
                Value::Array(children.iter().map(predicate_value).collect()),
            );
        }
        Predicate::Not(inner) => {
            m.insert("not".to_string(), predicate_value(inner));
        }
        Predicate::Compare { field, op, value } => {
            m.insert("field".to_string(), Value::from(field.clone()));
            m.insert("op".to_string(), Value::from(op.to_string()));
            m.insert("value".to_string(), literal_to_value(value));
        }
    }
    Value::Object(m)
}

/// Convert a query literal into its JSON value form.
pub fn literal_to_value(literal: &Literal) -> Value {
    match literal {
        Literal::Integer(v) => Value::from(*v),
        Literal::Float(v) => Value::from(*v),
        Literal::Text(v) => Value::from(v.clone()),
        Literal::Boolean(v) => Value::from(*v),
        Literal::Null => Value::Null,
        Literal::List(values) => Value::Array(values.iter().map(literal_to_value).collect()),
    }
}

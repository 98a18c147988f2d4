use std::collections::{HashMap, HashSet};

use vfq_common::{Result, VfqError};
use vfq_sql::{
    CompareOp, Expr, Literal, OrderDirection, OrderTarget, Projection, ProjectionTarget,
    Statement, VectorExpr,
};

use crate::normalize::normalize_predicate;
use crate::plan::{OrderBy, OrderKey, PlanProjectionItem, Predicate, QueryPlan, SimilaritySearch};
use crate::schema::{CollectionSchema, FieldType, SchemaProvider};

/// Named query parameters bound at planning time (query vectors).
pub type Params = HashMap<String, Vec<f32>>;

/// Build a [`QueryPlan`] from a parsed statement, without parameters.
pub fn build_plan(statement: &Statement, provider: &dyn SchemaProvider) -> Result<QueryPlan> {
    build_plan_with_params(statement, provider, &Params::new())
}

/// Build a [`QueryPlan`] from a parsed statement.
///
/// Guarantees:
/// - every field reference in projection/predicate/order resolves against
///   the provided schema, or planning fails naming the field;
/// - comparison operators are type-checked against field types;
/// - the residual predicate is normalized (flattened n-ary AND/OR,
///   double negation removed);
/// - the similarity clause, if any, is extracted with its parameter bound
///   and its dimensionality checked;
/// - limit/offset are validated non-negative.
///
/// Fails fast: the first validation error aborts planning; no partial
/// plan is ever returned.
pub fn build_plan_with_params(
    statement: &Statement,
    provider: &dyn SchemaProvider,
    params: &Params,
) -> Result<QueryPlan> {
    let schema = provider.source_schema(&statement.source)?;

    // A namespace resolves to concrete collections at routing time; a
    // plain collection binds directly.
    let collections = match provider.namespace_members(&statement.source) {
        Some(_) => Vec::new(),
        None => vec![statement.source.clone()],
    };

    let projection = resolve_projection(&statement.projection, &schema)?;

    let (predicate, similarity) = match &statement.predicate {
        Some(expr) => lower_expr(expr, &schema, params, true)?,
        None => (None, None),
    };
    let predicate = predicate.map(normalize_predicate);

    let order_by = resolve_order(statement.order_by.as_ref(), &schema, similarity.is_some())?;
    let (limit, offset) = resolve_limit(statement)?;

    Ok(QueryPlan {
        source: statement.source.clone(),
        collections,
        projection,
        predicate,
        similarity,
        order_by,
        limit,
        offset,
    })
}

fn resolve_projection(
    projection: &Projection,
    schema: &CollectionSchema,
) -> Result<Vec<PlanProjectionItem>> {
    let items = match projection {
        Projection::All => {
            // `*` = record id first, then metadata fields in schema order.
            // A metadata field literally named "id" is shadowed by the
            // record id projection.
            let mut items = vec![PlanProjectionItem {
                target: ProjectionTarget::RecordId,
                alias: None,
            }];
            items.extend(
                schema
                    .fields
                    .keys()
                    .filter(|name| name.as_str() != "id")
                    .map(|name| PlanProjectionItem {
                        target: ProjectionTarget::Field(name.clone()),
                        alias: None,
                    }),
            );
            items
        }
        Projection::Items(items) => {
            let mut resolved = Vec::with_capacity(items.len());
            for item in items {
                if let ProjectionTarget::Field(name) = &item.target {
                    if schema.field(name).is_none() {
                        return Err(VfqError::Planning(format!("unknown field: {name}")));
                    }
                }
                resolved.push(PlanProjectionItem {
                    target: item.target.clone(),
                    alias: item.alias.clone(),
                });
            }
            resolved
        }
    };

    let mut seen = HashSet::new();
    for item in &items {
        if !seen.insert(item.output_name().to_string()) {
            return Err(VfqError::Planning(format!(
                "duplicate projection alias: {}",
                item.output_name()
            )));
        }
    }
    Ok(items)
}

/// Lower an AST expression into a residual predicate plus an optional
/// similarity search.
///
/// `allow_match` is true only in conjunctive positions: a `MATCH` clause
/// under `NOT` or `OR` has no defined pushdown semantics and is rejected.
fn lower_expr(
    expr: &Expr,
    schema: &CollectionSchema,
    params: &Params,
    allow_match: bool,
) -> Result<(Option<Predicate>, Option<SimilaritySearch>)> {
    match expr {
        Expr::And(left, right) => {
            let (lp, lm) = lower_expr(left, schema, params, allow_match)?;
            let (rp, rm) = lower_expr(right, schema, params, allow_match)?;
            let similarity = match (lm, rm) {
                (Some(_), Some(_)) => {
                    return Err(VfqError::Planning(
                        "a query may carry at most one MATCH clause".to_string(),
                    ))
                }
                (m, None) | (None, m) => m,
            };
            let predicate = match (lp, rp) {
                (Some(a), Some(b)) => Some(Predicate::All(vec![a, b])),
                (Some(p), None) | (None, Some(p)) => Some(p),
                (None, None) => None,
            };
            Ok((predicate, similarity))
        }
        Expr::Or(left, right) => {
            let (lp, _) = lower_expr(left, schema, params, false)?;
            let (rp, _) = lower_expr(right, schema, params, false)?;
            let (a, b) = match (lp, rp) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(match_misplaced()),
            };
            Ok((Some(Predicate::Any(vec![a, b])), None))
        }
        Expr::Not(inner) => {
            let (p, _) = lower_expr(inner, schema, params, false)?;
            let p = p.ok_or_else(match_misplaced)?;
            Ok((Some(Predicate::Not(Box::new(p))), None))
        }
        Expr::Compare { field, op, value } => {
            let predicate = lower_compare(field, *op, value, schema)?;
            Ok((Some(predicate), None))
        }
        Expr::Match { vector, within } => {
            if !allow_match {
                return Err(match_misplaced());
            }
            let similarity = resolve_similarity(vector, *within, schema, params)?;
            Ok((None, Some(similarity)))
        }
    }
}

fn match_misplaced() -> VfqError {
    VfqError::Planning("MATCH may not appear under NOT or OR".to_string())
}

fn lower_compare(
    field: &str,
    op: CompareOp,
    value: &Literal,
    schema: &CollectionSchema,
) -> Result<Predicate> {
    let field_type = schema
        .field(field)
        .ok_or_else(|| VfqError::Planning(format!("unknown field: {field}")))?;

    match op {
        CompareOp::In => {
            let elements = match value {
                Literal::List(elements) => elements,
                other => {
                    return Err(VfqError::Planning(format!(
                        "IN requires a literal list, got {}",
                        other.kind()
                    )))
                }
            };
            for element in elements {
                check_compatible(field, field_type, element)?;
            }
        }
        CompareOp::Eq | CompareOp::NotEq => {
            if matches!(value, Literal::List(_)) {
                return Err(VfqError::Planning(format!(
                    "operator {op} does not accept a list literal (field '{field}')"
                )));
            }
            // NULL is always comparable for presence checks.
            if !matches!(value, Literal::Null) {
                check_compatible(field, field_type, value)?;
            }
        }
        CompareOp::Lt | CompareOp::LtEq | CompareOp::Gt | CompareOp::GtEq => {
            if !field_type.is_ordinal() {
                return Err(VfqError::Planning(format!(
                    "operator {op} requires an ordinal field, '{field}' is {field_type}"
                )));
            }
            if !matches!(value, Literal::Integer(_) | Literal::Float(_)) {
                return Err(VfqError::Planning(format!(
                    "operator {op} requires a numeric literal, got {} (field '{field}')",
                    value.kind()
                )));
            }
        }
    }

    Ok(Predicate::Compare {
        field: field.to_string(),
        op,
        value: value.clone(),
    })
}

fn check_compatible(field: &str, field_type: FieldType, value: &Literal) -> Result<()> {
    let ok = match field_type {
        FieldType::Text => matches!(value, Literal::Text(_)),
        FieldType::Integer | FieldType::Float => {
            matches!(value, Literal::Integer(_) | Literal::Float(_))
        }
        FieldType::Boolean => matches!(value, Literal::Boolean(_)),
    };
    if ok {
        Ok(())
    } else {
        Err(VfqError::Planning(format!(
            "type mismatch: field '{field}' is {field_type}, literal is {}",
            value.kind()
        )))
    }
}

fn resolve_similarity(
    vector: &VectorExpr,
    within: i64,
    schema: &CollectionSchema,
    params: &Params,
) -> Result<SimilaritySearch> {
    if within <= 0 {
        return Err(VfqError::Planning(
            "WITHIN must be a positive integer".to_string(),
        ));
    }
    let query = match vector {
        VectorExpr::Literal(values) => values.clone(),
        VectorExpr::Param(name) => params
            .get(name)
            .cloned()
            .ok_or_else(|| VfqError::Planning(format!("missing query parameter: :{name}")))?,
    };
    if let Some(dim) = schema.vector_dim {
        if query.len() != dim {
            return Err(VfqError::Planning(format!(
                "query vector dimension {} does not match declared dimension {dim}",
                query.len()
            )));
        }
    }
    Ok(SimilaritySearch {
        query,
        top_k: within as usize,
    })
}

fn resolve_order(
    clause: Option<&vfq_sql::OrderClause>,
    schema: &CollectionSchema,
    has_similarity: bool,
) -> Result<Option<OrderBy>> {
    match clause {
        Some(clause) => {
            let (key, default_descending) = match &clause.target {
                OrderTarget::Similarity => (OrderKey::Similarity, true),
                OrderTarget::Field(name) => {
                    if schema.field(name).is_none() {
                        return Err(VfqError::Planning(format!("unknown field: {name}")));
                    }
                    (OrderKey::Field(name.clone()), false)
                }
            };
            let descending = match clause.direction {
                Some(OrderDirection::Asc) => false,
                Some(OrderDirection::Desc) => true,
                None => default_descending,
            };
            Ok(Some(OrderBy { key, descending }))
        }
        // A similarity search without an explicit ORDER BY still returns
        // nearest-first.
        None if has_similarity => Ok(Some(OrderBy {
            key: OrderKey::Similarity,
            descending: true,
        })),
        None => Ok(None),
    }
}

fn resolve_limit(statement: &Statement) -> Result<(Option<usize>, usize)> {
    match &statement.limit {
        Some(clause) => {
            if clause.limit < 0 {
                return Err(VfqError::Planning("LIMIT must be non-negative".to_string()));
            }
            let offset = match clause.offset {
                Some(offset) if offset < 0 => {
                    return Err(VfqError::Planning(
                        "OFFSET must be non-negative".to_string(),
                    ))
                }
                Some(offset) => offset as usize,
                None => 0,
            };
            Ok((Some(clause.limit as usize), offset))
        }
        None => Ok((None, 0)),
    }
}

use serde_json::{Map, Value};
use vfq_planner::Predicate;
use vfq_sql::{CompareOp, Literal};

/// Evaluate a resolved predicate against a record's metadata.
///
/// Semantics over JSON metadata:
/// - `= NULL` matches a missing or null field; `!=` is the negation of `=`;
/// - ordering comparisons require both sides numeric, anything else is false;
/// - `IN` is membership by equality;
/// - a missing field never satisfies `=`/`IN`/ordering comparisons.
pub fn matches(predicate: &Predicate, metadata: &Map<String, Value>) -> bool {
    match predicate {
        Predicate::All(children) => children.iter().all(|c| matches(c, metadata)),
        Predicate::Any(children) => children.iter().any(|c| matches(c, metadata)),
        Predicate::Not(inner) => !matches(inner, metadata),
        Predicate::Compare { field, op, value } => {
            compare(*op, value, metadata.get(field.as_str()))
        }
    }
}

fn compare(op: CompareOp, literal: &Literal, found: Option<&Value>) -> bool {
    match op {
        CompareOp::Eq => equals(literal, found),
        CompareOp::NotEq => !equals(literal, found),
        CompareOp::In => match literal {
            Literal::List(elements) => elements.iter().any(|e| equals(e, found)),
            _ => false,
        },
        CompareOp::Lt | CompareOp::LtEq | CompareOp::Gt | CompareOp::GtEq => {
            match (found.and_then(Value::as_f64), literal_as_f64(literal)) {
                (Some(lhs), Some(rhs)) => match op {
                    CompareOp::Lt => lhs < rhs,
                    CompareOp::LtEq => lhs <= rhs,
                    CompareOp::Gt => lhs > rhs,
                    CompareOp::GtEq => lhs >= rhs,
                    _ => false,
                },
                _ => false,
            }
        }
    }
}

fn equals(literal: &Literal, found: Option<&Value>) -> bool {
    match (literal, found) {
        (Literal::Null, None) => true,
        (Literal::Null, Some(value)) => value.is_null(),
        (_, None) => false,
        (Literal::Text(text), Some(Value::String(s))) => text == s,
        (Literal::Boolean(b), Some(Value::Bool(v))) => b == v,
        (Literal::Integer(_) | Literal::Float(_), Some(value)) => {
            match (literal_as_f64(literal), value.as_f64()) {
                (Some(lhs), Some(rhs)) => lhs == rhs,
                _ => false,
            }
        }
        _ => false,
    }
}

fn literal_as_f64(literal: &Literal) -> Option<f64> {
    match literal {
        Literal::Integer(v) => Some(*v as f64),
        Literal::Float(v) => Some(*v),
        _ => None,
    }
}

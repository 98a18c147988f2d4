use crate::plan::Predicate;

/// Best-effort predicate simplification.
///
/// Pass order is fixed and intentionally conservative:
/// 1. flatten nested conjunctions/disjunctions into n-ary `All`/`Any`
/// 2. collapse single-child `All`/`Any`
/// 3. remove double negation
///
/// This is a cleanup step, not an optimizer: it never changes which rows
/// a predicate matches.
pub fn normalize_predicate(predicate: Predicate) -> Predicate {
    match predicate {
        Predicate::All(children) => rebuild(children, true),
        Predicate::Any(children) => rebuild(children, false),
        Predicate::Not(inner) => match normalize_predicate(*inner) {
            Predicate::Not(grandchild) => *grandchild,
            other => Predicate::Not(Box::new(other)),
        },
        compare @ Predicate::Compare { .. } => compare,
    }
}

fn rebuild(children: Vec<Predicate>, conjunctive: bool) -> Predicate {
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        match normalize_predicate(child) {
            Predicate::All(nested) if conjunctive => flat.extend(nested),
            Predicate::Any(nested) if !conjunctive => flat.extend(nested),
            other => flat.push(other),
        }
    }
    if flat.len() == 1 {
        return flat.remove(0);
    }
    if conjunctive {
        Predicate::All(flat)
    } else {
        Predicate::Any(flat)
    }
}

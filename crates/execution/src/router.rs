use vfq_common::{Result, VfqError};
use vfq_planner::{Predicate, QueryPlan};
use vfq_sql::{CompareOp, Literal};

/// Metadata-based routing rules for one namespace.
///
/// Binds a designated routing field to equality rules (`value →
/// collection`) over a registered collection universe. Read-only snapshot
/// during an execution; insertion order is the deterministic launch order
/// for fan-out.
#[derive(Debug, Clone, Default)]
pub struct MetadataRouter {
    routing_field: Option<String>,
    rules: Vec<(Literal, String)>,
    collections: Vec<String>,
}

impl MetadataRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router over a fixed collection universe, with no rules yet.
    pub fn with_collections(collections: Vec<String>) -> Self {
        Self {
            routing_field: None,
            rules: Vec::new(),
            collections,
        }
    }

    pub fn register_collection(&mut self, collection: impl Into<String>) {
        let collection = collection.into();
        if !self.collections.contains(&collection) {
            self.collections.push(collection);
        }
    }

    /// Add an equality rule: records whose routing field equals `value`
    /// live in `collection`.
    ///
    /// # Errors
    /// `InvalidConfig` when the rule names a different routing field than
    /// earlier rules, or a collection outside the universe.
    pub fn add_rule(
        &mut self,
        field: impl Into<String>,
        value: Literal,
        collection: impl Into<String>,
    ) -> Result<()> {
        let field = field.into();
        let collection = collection.into();
        match &self.routing_field {
            Some(existing) if *existing != field => {
                return Err(VfqError::InvalidConfig(format!(
                    "routing field is already '{existing}', cannot also route on '{field}'"
                )))
            }
            Some(_) => {}
            None => self.routing_field = Some(field),
        }
        if !self.collections.contains(&collection) {
            return Err(VfqError::InvalidConfig(format!(
                "routing rule targets unregistered collection: {collection}"
            )));
        }
        self.rules.push((value, collection));
        Ok(())
    }

    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    fn rule_for(&self, value: &Literal) -> Option<&str> {
        self.rules
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, c)| c.as_str())
    }
}

/// One collection to query, with the predicate it must evaluate.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRoute {
    pub collection: String,
    /// Predicate subset this collection is responsible for; the full plan
    /// predicate in the simple case.
    pub predicate: Option<Predicate>,
}

/// What a predicate pins the routing field to.
enum RouteConstraint {
    /// No usable equality constraint; fan out.
    Unconstrained,
    /// The field must equal one of these values.
    Values(Vec<Literal>),
}

/// Decide which collections a plan must be sent to.
///
/// Pure decision function over a routing snapshot:
/// - plans with resolved collections route directly, one route each;
/// - exactly one equality value on the routing field with a matching rule
///   is a point lookup, no fan-out;
/// - disjunctions (`IN`, `OR`) over the routing field route to every
///   collection whose rule could match; any unmapped value widens to the
///   whole universe (correctness over precision — false positives are
///   filtered downstream, false negatives are never permitted);
/// - ranges, negations, or an unconstrained field fan out to every
///   registered collection.
pub fn route(plan: &QueryPlan, router: &MetadataRouter) -> Result<Vec<CollectionRoute>> {
    if !plan.collections.is_empty() {
        return Ok(plan
            .collections
            .iter()
            .map(|collection| CollectionRoute {
                collection: collection.clone(),
                predicate: plan.predicate.clone(),
            })
            .collect());
    }

    if router.collections.is_empty() {
        return Err(VfqError::Planning(format!(
            "unresolved routing: no collections registered for namespace '{}'",
            plan.source
        )));
    }

    let constraint = match (&router.routing_field, &plan.predicate) {
        (Some(field), Some(predicate)) => routing_constraint(predicate, field),
        _ => RouteConstraint::Unconstrained,
    };

    let selected: Vec<String> = match constraint {
        RouteConstraint::Unconstrained => router.collections.to_vec(),
        RouteConstraint::Values(values) => {
            let mut selected = Vec::new();
            let mut widened = false;
            for value in &values {
                match router.rule_for(value) {
                    Some(collection) => {
                        if !selected.contains(&collection.to_string()) {
                            selected.push(collection.to_string());
                        }
                    }
                    // A value with no rule could live anywhere.
                    None => {
                        widened = true;
                        break;
                    }
                }
            }
            if widened {
                router.collections.to_vec()
            } else {
                // Preserve registry order for deterministic launches.
                router
                    .collections
                    .iter()
                    .filter(|c| selected.contains(c))
                    .cloned()
                    .collect()
            }
        }
    };

    Ok(selected
        .into_iter()
        .map(|collection| CollectionRoute {
            collection,
            predicate: plan.predicate.clone(),
        })
        .collect())
}

/// Equality constraints on `field` provable from conjunctive positions.
fn routing_constraint(predicate: &Predicate, field: &str) -> RouteConstraint {
    match predicate {
        Predicate::Compare {
            field: f,
            op: CompareOp::Eq,
            value,
        } if f == field => RouteConstraint::Values(vec![value.clone()]),
        Predicate::Compare {
            field: f,
            op: CompareOp::In,
            value: Literal::List(values),
        } if f == field => RouteConstraint::Values(values.clone()),
        // Ranges on the routing field, other fields, and negations give no
        // usable pinning.
        Predicate::Compare { .. } | Predicate::Not(_) => RouteConstraint::Unconstrained,
        Predicate::All(children) => {
            // Conjunction: any pinned child narrows the whole predicate;
            // multiple pinned children intersect.
            let mut result: Option<Vec<Literal>> = None;
            for child in children {
                if let RouteConstraint::Values(values) = routing_constraint(child, field) {
                    result = Some(match result {
                        None => values,
                        Some(existing) => existing
                            .into_iter()
                            .filter(|v| values.contains(v))
                            .collect(),
                    });
                }
            }
            match result {
                Some(values) => RouteConstraint::Values(values),
                None => RouteConstraint::Unconstrained,
            }
        }
        Predicate::Any(children) => {
            // Disjunction pins the field only when every branch pins it.
            let mut union: Vec<Literal> = Vec::new();
            for child in children {
                match routing_constraint(child, field) {
                    RouteConstraint::Values(values) => {
                        for value in values {
                            if !union.contains(&value) {
                                union.push(value);
                            }
                        }
                    }
                    RouteConstraint::Unconstrained => return RouteConstraint::Unconstrained,
                }
            }
            RouteConstraint::Values(union)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vfq_planner::{PlanProjectionItem, QueryPlan};
    use vfq_sql::ProjectionTarget;

    fn tenant_router() -> MetadataRouter {
        let mut router = MetadataRouter::with_collections(vec![
            "t1_docs".to_string(),
            "t2_docs".to_string(),
            "t3_docs".to_string(),
        ]);
        router
            .add_rule("tenant", Literal::Text("t1".to_string()), "t1_docs")
            .expect("rule");
        router
            .add_rule("tenant", Literal::Text("t2".to_string()), "t2_docs")
            .expect("rule");
        router
            .add_rule("tenant", Literal::Text("t3".to_string()), "t3_docs")
            .expect("rule");
        router
    }

    fn unrouted_plan(predicate: Option<Predicate>) -> QueryPlan {
        QueryPlan {
            source: "docs".to_string(),
            collections: Vec::new(),
            projection: vec![PlanProjectionItem {
                target: ProjectionTarget::RecordId,
                alias: None,
            }],
            predicate,
            similarity: None,
            order_by: None,
            limit: None,
            offset: 0,
        }
    }

    fn tenant_eq(value: &str) -> Predicate {
        Predicate::Compare {
            field: "tenant".to_string(),
            op: CompareOp::Eq,
            value: Literal::Text(value.to_string()),
        }
    }

    fn collections(routes: &[CollectionRoute]) -> Vec<&str> {
        routes.iter().map(|r| r.collection.as_str()).collect()
    }

    #[test]
    fn equality_on_routing_field_is_a_point_lookup() {
        let plan = unrouted_plan(Some(tenant_eq("t1")));
        let routes = route(&plan, &tenant_router()).expect("route");
        assert_eq!(collections(&routes), vec!["t1_docs"]);
    }

    #[test]
    fn equality_inside_a_conjunction_still_pins() {
        let plan = unrouted_plan(Some(Predicate::All(vec![
            Predicate::Compare {
                field: "category".to_string(),
                op: CompareOp::Eq,
                value: Literal::Text("a".to_string()),
            },
            tenant_eq("t2"),
        ])));
        let routes = route(&plan, &tenant_router()).expect("route");
        assert_eq!(collections(&routes), vec!["t2_docs"]);
    }

    #[test]
    fn in_list_fans_out_to_matching_collections_only() {
        let plan = unrouted_plan(Some(Predicate::Compare {
            field: "tenant".to_string(),
            op: CompareOp::In,
            value: Literal::List(vec![
                Literal::Text("t3".to_string()),
                Literal::Text("t1".to_string()),
            ]),
        }));
        let routes = route(&plan, &tenant_router()).expect("route");
        // Registry order, not IN-list order.
        assert_eq!(collections(&routes), vec!["t1_docs", "t3_docs"]);
    }

    #[test]
    fn unmapped_value_widens_to_all_collections() {
        let plan = unrouted_plan(Some(tenant_eq("t9")));
        let routes = route(&plan, &tenant_router()).expect("route");
        assert_eq!(collections(&routes), vec!["t1_docs", "t2_docs", "t3_docs"]);
    }

    #[test]
    fn range_and_unconstrained_predicates_fan_out() {
        let range = unrouted_plan(Some(Predicate::Compare {
            field: "tenant".to_string(),
            op: CompareOp::Gt,
            value: Literal::Text("t1".to_string()),
        }));
        assert_eq!(
            collections(&route(&range, &tenant_router()).expect("route")).len(),
            3
        );

        let unconstrained = unrouted_plan(None);
        assert_eq!(
            collections(&route(&unconstrained, &tenant_router()).expect("route")).len(),
            3
        );
    }

    #[test]
    fn disjunction_over_routing_field_unions_branches() {
        let plan = unrouted_plan(Some(Predicate::Any(vec![
            tenant_eq("t1"),
            tenant_eq("t3"),
        ])));
        let routes = route(&plan, &tenant_router()).expect("route");
        assert_eq!(collections(&routes), vec!["t1_docs", "t3_docs"]);
    }

    #[test]
    fn resolved_plans_bypass_rules() {
        let mut plan = unrouted_plan(Some(tenant_eq("t1")));
        plan.collections = vec!["pinned".to_string()];
        let routes = route(&plan, &tenant_router()).expect("route");
        assert_eq!(collections(&routes), vec!["pinned"]);
    }

    #[test]
    fn routing_without_collections_is_a_planning_error() {
        let plan = unrouted_plan(None);
        let err = route(&plan, &MetadataRouter::new()).expect_err("must fail");
        assert!(matches!(err, VfqError::Planning(_)));
    }

    #[test]
    fn rules_validate_field_and_collection() {
        let mut router = MetadataRouter::with_collections(vec!["t1_docs".to_string()]);
        router
            .add_rule("tenant", Literal::Text("t1".to_string()), "t1_docs")
            .expect("rule");
        assert!(router
            .add_rule("region", Literal::Text("eu".to_string()), "t1_docs")
            .is_err());
        assert!(router
            .add_rule("tenant", Literal::Text("t2".to_string()), "missing")
            .is_err());
    }
}

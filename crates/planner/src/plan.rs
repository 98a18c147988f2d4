use serde::{Deserialize, Serialize};
use vfq_sql::{CompareOp, Literal, ProjectionTarget};

/// Validated, resolved form of a statement.
///
/// Invariant: a `QueryPlan` is never mutated after construction;
/// re-planning (including shard-plan derivation in the federation engine)
/// produces a new instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Collection or namespace named in FROM, as written.
    pub source: String,
    /// Resolved target collections. Empty means "resolve via router"
    /// (the source is a logical namespace spanning physical collections).
    pub collections: Vec<String>,
    /// Ordered projection; output names are unique within the plan.
    pub projection: Vec<PlanProjectionItem>,
    /// Residual predicate after similarity extraction, normalized.
    pub predicate: Option<Predicate>,
    /// Similarity search extracted from the predicate's MATCH clause.
    pub similarity: Option<SimilaritySearch>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl QueryPlan {
    /// Rows a single collection must be asked for so the global
    /// offset+limit can be satisfied without under-fetching.
    pub fn fetch_limit(&self) -> Option<usize> {
        self.limit.map(|l| l.saturating_add(self.offset))
    }
}

/// One resolved projection item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanProjectionItem {
    pub target: ProjectionTarget,
    pub alias: Option<String>,
}

impl PlanProjectionItem {
    /// Output column name: the alias when present, the natural name
    /// of the target otherwise.
    pub fn output_name(&self) -> &str {
        if let Some(alias) = &self.alias {
            return alias;
        }
        match &self.target {
            ProjectionTarget::Field(name) => name,
            ProjectionTarget::RecordId => "id",
            ProjectionTarget::Similarity => "similarity",
            ProjectionTarget::Vector => "vector",
        }
    }
}

/// Resolved predicate tree.
///
/// Conjunctions and disjunctions are n-ary after normalization; every
/// comparison's field is bound to a known metadata field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
    Compare {
        field: String,
        op: CompareOp,
        value: Literal,
    },
}

/// Vector similarity search directive extracted from `MATCH … WITHIN k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilaritySearch {
    /// Resolved query vector (literal or bound parameter).
    pub query: Vec<f32>,
    /// Nearest-neighbor count requested from each collection.
    pub top_k: usize,
}

/// Requested result ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub key: OrderKey,
    pub descending: bool,
}

/// What result rows are ordered by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderKey {
    /// Similarity score; orders descending by default.
    Similarity,
    /// A named metadata field; orders ascending by default.
    Field(String),
}

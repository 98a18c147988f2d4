use serde_json::{Map, Value};

/// One result row: projected output columns in projection order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// Record identifier; retained even when not projected, for dedup and
    /// deterministic tie-breaking during merges.
    pub record_id: String,
    /// Similarity score, when the provider supplied one.
    pub score: Option<f32>,
    /// Value of the plan's ordering field, when ordering by field.
    pub order_value: Option<Value>,
    columns: Vec<(String, Value)>,
}

impl ResultRow {
    pub fn new(record_id: impl Into<String>, columns: Vec<(String, Value)>) -> Self {
        Self {
            record_id: record_id.into(),
            score: None,
            order_value: None,
            columns,
        }
    }

    pub fn with_score(mut self, score: Option<f32>) -> Self {
        self.score = score;
        self
    }

    pub fn with_order_value(mut self, order_value: Option<Value>) -> Self {
        self.order_value = order_value;
        self
    }

    /// Value of an output column by name.
    pub fn get(&self, output: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == output)
            .map(|(_, value)| value)
    }

    /// Output columns in projection order.
    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }

    /// Row as an order-preserving JSON object.
    pub fn to_object(&self) -> Map<String, Value> {
        self.columns.iter().cloned().collect()
    }
}

/// Which collections contributed to a result, and which failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionDiagnostics {
    /// Collections whose rows are present, in launch order.
    pub contributing: Vec<String>,
    /// Per-collection failures tolerated by the failure policy.
    pub failures: Vec<CollectionFailure>,
}

/// One tolerated per-collection failure.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionFailure {
    pub collection: String,
    pub message: String,
}

/// Ordered rows plus diagnostics, produced fresh per execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    pub rows: Vec<ResultRow>,
    pub diagnostics: ExecutionDiagnostics,
}

impl ExecutionResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

use serde::{Deserialize, Serialize};

/// A parsed SELECT statement.
///
/// Produced only by [`crate::parse`]; structurally comparable (same text
/// always parses to an equal `Statement`) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub projection: Projection,
    /// Collection or logical namespace named in FROM.
    pub source: String,
    pub predicate: Option<Expr>,
    pub order_by: Option<OrderClause>,
    pub limit: Option<LimitClause>,
}

/// The SELECT projection clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// `SELECT *`
    All,
    /// Explicit comma-separated projection items.
    Items(Vec<ProjectionItem>),
}

/// One projection item with its optional output alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionItem {
    pub target: ProjectionTarget,
    pub alias: Option<String>,
}

/// What a projection item selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectionTarget {
    /// A metadata field by name.
    Field(String),
    /// The record identifier (`ID`).
    RecordId,
    /// The similarity score (`SIMILARITY`).
    Similarity,
    /// The raw vector (`VECTOR`).
    Vector,
}

/// Predicate expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare {
        field: String,
        op: CompareOp,
        value: Literal,
    },
    /// `MATCH <vector> WITHIN <k>` similarity clause.
    Match { vector: VectorExpr, within: i64 },
}

/// Comparison operators accepted in predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
            CompareOp::In => "IN",
        };
        write!(f, "{text}")
    }
}

/// Literal values appearing in predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Null,
    /// Parenthesized list, only valid as the right side of `IN`.
    List(Vec<Literal>),
}

impl Literal {
    /// Kind name used in type-mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Integer(_) => "integer",
            Literal::Float(_) => "float",
            Literal::Text(_) => "text",
            Literal::Boolean(_) => "boolean",
            Literal::Null => "null",
            Literal::List(_) => "list",
        }
    }
}

/// A query vector: written inline or bound later from named parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VectorExpr {
    /// Bracketed float list, e.g. `[0.1, 0.2, 0.3]`.
    Literal(Vec<f32>),
    /// Named parameter, e.g. `:q`.
    Param(String),
}

/// The ORDER BY clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderClause {
    pub target: OrderTarget,
    /// Explicit ASC/DESC when written; the planner picks the default
    /// direction otherwise (similarity orders descending).
    pub direction: Option<OrderDirection>,
}

/// What ORDER BY sorts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderTarget {
    Similarity,
    Field(String),
}

/// Explicit sort direction keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// The LIMIT clause, with its optional OFFSET.
///
/// Values are kept signed; non-negativity is validated during planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitClause {
    pub limit: i64,
    pub offset: Option<i64>,
}

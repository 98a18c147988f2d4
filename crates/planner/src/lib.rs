//! Plan model and planner for VFQ queries.
//!
//! Architecture role:
//! - defines the immutable [`QueryPlan`] consumed by executors
//! - resolves parsed statements against collection schemas
//! - normalizes predicate trees and renders plans for introspection
//!
//! Key modules:
//! - [`plan`]
//! - [`schema`]
//! - [`planner`]
//! - [`normalize`]
//! - [`explain`]

pub mod explain;
pub mod normalize;
pub mod plan;
pub mod planner;
pub mod schema;

pub use explain::{literal_to_value, plan_to_value};
pub use normalize::normalize_predicate;
pub use plan::{
    OrderBy, OrderKey, PlanProjectionItem, Predicate, QueryPlan, SimilaritySearch,
};
pub use planner::{build_plan, build_plan_with_params, Params};
pub use schema::{CollectionSchema, FieldType, SchemaProvider};

//! Execution layer: single-collection execution, routing, merging, and
//! multi-collection federation.
//!
//! Architecture role:
//! - translates plans into provider pushdown requests and result rows
//! - local predicate re-evaluation for partial-pushdown providers
//! - metadata-based collection routing
//! - k-way ordered merge with dedup and global limit/offset
//! - concurrent fan-out with failure policy (feature `federation`)
//!
//! Key modules:
//! - [`executor`]
//! - [`filter`]
//! - [`merge`]
//! - [`result`]
//! - [`router`]
//! - `federation` (feature-gated)
//!
//! Feature flags:
//! - `federation`: enables [`federation::execute_multi_collection`] and its
//!   tokio dependency.

pub mod executor;
pub mod filter;
pub mod merge;
pub mod result;
pub mod router;

#[cfg(feature = "federation")]
pub mod federation;

pub use executor::execute_plan;
pub use merge::merge_rows;
pub use result::{CollectionFailure, ExecutionDiagnostics, ExecutionResult, ResultRow};
pub use router::{route, CollectionRoute, MetadataRouter};

#[cfg(feature = "federation")]
pub use federation::{execute_multi_collection, FederationPolicy};

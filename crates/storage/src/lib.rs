//! Collection catalog and the abstract provider boundary.
//!
//! Architecture role:
//! - collection/namespace definitions and their JSON-loadable catalog
//! - the asynchronous [`CollectionProvider`] capability executors consume
//! - an in-memory provider for tests and embedded deployments
//!
//! Key modules:
//! - [`catalog`]
//! - [`provider`]
//! - [`memory`]

pub mod catalog;
pub mod memory;
pub mod provider;

pub use catalog::{CollectionCatalog, CollectionDef};
pub use memory::MemoryProvider;
pub use provider::{CollectionProvider, CollectionQuery, ProviderRegistry, RawRecord, SharedProvider};

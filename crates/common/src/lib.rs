//! Shared configuration and error types for VFQ crates.
//!
//! Architecture role:
//! - defines engine configuration passed across layers
//! - provides common [`VfqError`] / [`Result`] contracts
//!
//! Key modules:
//! - [`config`]
//! - [`error`]

pub mod config;
pub mod error;

pub use config::{EngineConfig, FailurePolicy};
pub use error::{Result, VfqError};

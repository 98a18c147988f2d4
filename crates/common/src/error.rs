use thiserror::Error;

/// Canonical VFQ error taxonomy used across crates.
///
/// Classification guidance:
/// - [`VfqError::Parse`]: malformed query text, reported before any schema lookup
/// - [`VfqError::Planning`]: query shape/name/type issues discovered before execution
/// - [`VfqError::Execution`]: provider call failures, timeouts, or data-shape failures
/// - [`VfqError::InvalidConfig`]: catalog/config/registration contract violations
/// - [`VfqError::Unsupported`]: syntactically valid but intentionally unimplemented behavior
/// - [`VfqError::Io`]: raw filesystem IO failures from std APIs
#[derive(Debug, Error)]
pub enum VfqError {
    /// Query text failed to lex or parse.
    ///
    /// Carries the offending token and its byte position so callers can
    /// display the failure without a stack trace. Never retried.
    #[error("parse error at position {position}: {message} (near '{token}')")]
    Parse {
        /// What the parser expected or rejected.
        message: String,
        /// The offending token as written in the query text.
        token: String,
        /// Character offset of the offending token in the query text.
        position: usize,
    },

    /// Query planning/validation failures.
    ///
    /// Examples:
    /// - unknown collection/namespace or metadata field
    /// - operator/type mismatch in a comparison
    /// - invalid LIMIT/OFFSET or query-vector dimensionality
    /// - missing named parameter
    #[error("planning error: {0}")]
    Planning(String),

    /// Runtime execution failures after planning succeeded.
    ///
    /// `collection` names the backend that failed when the failure is
    /// attributable to one; federation diagnostics are built from it.
    #[error("execution error{}: {message}", fmt_collection(.collection))]
    Execution {
        /// Collection whose provider call failed, when known.
        collection: Option<String>,
        /// Failure description from the provider or executor.
        message: String,
    },

    /// Invalid or inconsistent configuration/catalog state.
    ///
    /// Examples:
    /// - malformed catalog JSON
    /// - namespace member with an incompatible schema
    /// - routing rule referencing an unregistered collection
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Valid request for a feature/shape not implemented in current version.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Transparent std IO failures.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VfqError {
    /// Convenience constructor for execution failures tied to one collection.
    pub fn execution(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            collection: Some(collection.into()),
            message: message.into(),
        }
    }
}

fn fmt_collection(collection: &Option<String>) -> String {
    match collection {
        Some(c) => format!(" in collection '{c}'"),
        None => String::new(),
    }
}

/// Standard VFQ result alias.
pub type Result<T> = std::result::Result<T, VfqError>;

use serde::{Deserialize, Serialize};

/// Failure policy applied when a query fans out across collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// First per-collection failure aborts the whole operation after
    /// best-effort cancellation of the remaining tasks.
    FailFast,
    /// Per-collection failures become diagnostics; rows from the
    /// collections that succeeded are still returned.
    BestEffort,
}

/// Engine behavior/configuration knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Row cap applied when a query carries no LIMIT clause.
    pub default_limit: usize,
    /// Overall fan-out deadline in milliseconds; `0` disables the deadline.
    pub deadline_ms: u64,
    /// Grace period granted to cancelled tasks before they are abandoned.
    pub cancel_grace_ms: u64,
    /// Failure policy for multi-collection execution.
    pub failure_policy: FailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: 1_000,
            deadline_ms: 0,
            cancel_grace_ms: 250,
            failure_policy: FailurePolicy::FailFast,
        }
    }
}

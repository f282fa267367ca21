//! Lifecycle configuration with type-safe validation.
//!
//! Every tunable is a `nutype` so an out-of-range value is rejected when it is
//! constructed rather than when the driver trips over it.

use nutype::nutype;
use serde::{Deserialize, Serialize};

use crate::types::Facing;

/// Maximum number of transitions a single dispatch cycle may chain.
///
/// Entry hooks that keep requesting further transitions past this limit
/// indicate a cycle in the transition graph, which is a programmer error.
#[nutype(
    validate(greater_or_equal = 1, less_or_equal = 64),
    default = 16,
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Default,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct MaxChainedTransitions(usize);

/// Number of queued events above which the driver warns about backlog.
#[nutype(
    validate(greater_or_equal = 1, less_or_equal = 10_000),
    default = 32,
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Default,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct BacklogWarnThreshold(usize);

/// Configuration for a capture-session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Bound on chained transitions within one dispatch cycle.
    pub max_chained_transitions: MaxChainedTransitions,
    /// Queue depth at which the driver logs a backlog warning.
    pub backlog_warn_threshold: BacklogWarnThreshold,
    /// Facing used when the facing setting expresses no preference.
    pub fallback_facing: Facing,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_chained_transitions: MaxChainedTransitions::default(),
            backlog_warn_threshold: BacklogWarnThreshold::default(),
            fallback_facing: Facing::Back,
        }
    }
}

impl LifecycleConfig {
    /// Sets the chained transition bound.
    #[must_use]
    pub const fn with_max_chained_transitions(mut self, limit: MaxChainedTransitions) -> Self {
        self.max_chained_transitions = limit;
        self
    }

    /// Sets the backlog warning threshold.
    #[must_use]
    pub const fn with_backlog_warn_threshold(mut self, threshold: BacklogWarnThreshold) -> Self {
        self.backlog_warn_threshold = threshold;
        self
    }

    /// Sets the fallback facing.
    #[must_use]
    pub const fn with_fallback_facing(mut self, facing: Facing) -> Self {
        self.fallback_facing = facing;
        self
    }
}

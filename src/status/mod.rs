//! PerformanceProfile status engine
//!
//! - [`StatusResolver`] asks the condition sources in priority order and picks
//!   the conditions to publish
//! - [`StatusUpdater`] writes them, skipping writes that would only move
//!   timestamps, and records query failures as Degraded
//! - [`conditions`] builds complete condition sets and holds the reason codes

pub mod conditions;
mod degraded;
mod resolver;
mod source;
mod writer;

pub use conditions::{
    available_conditions, degraded_conditions, progressing_conditions, FailureTag,
};
pub use resolver::StatusResolver;
pub use source::{ConditionSource, FnSource, PoolRef, PoolResolver, SourceOutcome};
pub use writer::{KubeProfileStatusClient, ProfileStatusClient, StatusUpdater, UpdateOutcome};

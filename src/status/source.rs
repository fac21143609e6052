//! Condition sources and the owning-pool lookup
//!
//! A source inspects one downstream subsystem (kubelet, MachineConfigPool,
//! tuned) and answers with a three-way [`SourceOutcome`]. How a source derives
//! its answer is its own business; the resolver only cares about the order in
//! which they are asked.

use std::future::Future;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::crd::{ConditionSet, PerformanceProfile};
use crate::status::conditions::FailureTag;
use crate::Error;

/// Answer of a single condition source
#[derive(Debug)]
pub enum SourceOutcome {
    /// No opinion; the next source is asked
    Healthy,
    /// The source describes the profile; this set wins
    Reported(ConditionSet),
    /// The query itself failed
    Failed(Error),
}

impl From<crate::Result<Option<ConditionSet>>> for SourceOutcome {
    fn from(result: crate::Result<Option<ConditionSet>>) -> Self {
        match result {
            Ok(None) => Self::Healthy,
            Ok(Some(conditions)) => Self::Reported(conditions),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Reference to the MachineConfigPool that renders a profile
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolRef {
    /// Pool name
    pub name: String,
    /// Pool UID, when known
    pub uid: Option<String>,
}

impl PoolRef {
    /// Reference a pool by name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: None,
        }
    }
}

/// One downstream subsystem consulted by the resolver
#[async_trait]
pub trait ConditionSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Degraded reason recorded when [`evaluate`](Self::evaluate) fails
    fn failure_tag(&self) -> FailureTag;

    /// Whether the owning pool must be resolved before this source is asked
    fn needs_pool(&self) -> bool {
        false
    }

    /// Inspect the profile
    ///
    /// `pool` is `Some` whenever [`needs_pool`](Self::needs_pool) is true.
    async fn evaluate(&self, profile: &PerformanceProfile, pool: Option<&PoolRef>)
        -> SourceOutcome;
}

/// Locates the MachineConfigPool owning a profile
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PoolResolver: Send + Sync {
    /// Find the pool whose selectors match the profile
    async fn owning_pool(&self, profile: &PerformanceProfile) -> Result<PoolRef, Error>;
}

/// Adapts an async closure into a [`ConditionSource`]
///
/// The closure returns `Ok(None)` for no opinion, `Ok(Some(set))` to report
/// and `Err` when the query failed.
pub struct FnSource<F> {
    name: String,
    tag: FailureTag,
    needs_pool: bool,
    query: F,
}

impl<F, Fut> FnSource<F>
where
    F: Fn(PerformanceProfile, Option<PoolRef>) -> Fut + Send + Sync,
    Fut: Future<Output = crate::Result<Option<ConditionSet>>> + Send,
{
    /// Wrap a query that does not need the owning pool
    pub fn new(name: impl Into<String>, tag: FailureTag, query: F) -> Self {
        Self {
            name: name.into(),
            tag,
            needs_pool: false,
            query,
        }
    }

    /// Wrap a query that is evaluated against the owning pool
    pub fn with_pool(name: impl Into<String>, tag: FailureTag, query: F) -> Self {
        Self {
            needs_pool: true,
            ..Self::new(name, tag, query)
        }
    }
}

#[async_trait]
impl<F, Fut> ConditionSource for FnSource<F>
where
    F: Fn(PerformanceProfile, Option<PoolRef>) -> Fut + Send + Sync,
    Fut: Future<Output = crate::Result<Option<ConditionSet>>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn failure_tag(&self) -> FailureTag {
        self.tag
    }

    fn needs_pool(&self) -> bool {
        self.needs_pool
    }

    async fn evaluate(
        &self,
        profile: &PerformanceProfile,
        pool: Option<&PoolRef>,
    ) -> SourceOutcome {
        (self.query)(profile.clone(), pool.cloned()).await.into()
    }
}

//! Condition resolver
//!
//! Asks the condition sources in priority order and publishes the first
//! reported set. Kubelet is the most proximal live signal and goes first; pool
//! degradation is structural and beats tuned detail; tuned is the last resort.
//! When nobody reports, the profile is Available.
//!
//! No status is written for a profile without an owning MachineConfigPool. The
//! pool is looked up once per pass, right after the first source answers.

use std::sync::Arc;

use kube::api::DynamicObject;
use kube::ResourceExt;
use tracing::{debug, info, instrument};

use crate::crd::PerformanceProfile;
use crate::status::conditions::available_conditions;
use crate::status::source::{ConditionSource, PoolRef, PoolResolver, SourceOutcome};
use crate::status::writer::StatusUpdater;
use crate::Error;

/// Runs the source waterfall for one profile per call
pub struct StatusResolver {
    sources: Vec<Arc<dyn ConditionSource>>,
    pools: Arc<dyn PoolResolver>,
    updater: StatusUpdater,
}

impl StatusResolver {
    /// Create a resolver with no sources; every pass reports Available
    pub fn new(pools: Arc<dyn PoolResolver>, updater: StatusUpdater) -> Self {
        Self {
            sources: Vec::new(),
            pools,
            updater,
        }
    }

    /// Kubelet, then MachineConfigPool, then tuned
    pub fn standard(
        kubelet: Arc<dyn ConditionSource>,
        pool: Arc<dyn ConditionSource>,
        tuned: Arc<dyn ConditionSource>,
        pools: Arc<dyn PoolResolver>,
        updater: StatusUpdater,
    ) -> Self {
        Self::new(pools, updater)
            .with_source(kubelet)
            .with_source(pool)
            .with_source(tuned)
    }

    /// Append a source with lower priority than the ones already added
    pub fn with_source(mut self, source: Arc<dyn ConditionSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// The status updater used for writes
    pub fn updater(&self) -> &StatusUpdater {
        &self.updater
    }

    /// Derive the profile's conditions and persist them if they changed
    ///
    /// A failed source query is written as Degraded and its error returned.
    /// The owning pool is resolved once the first source has answered; if it
    /// cannot be found the pass ends without a write, whatever was reported.
    #[instrument(skip(self, profile), fields(profile = %profile.name_any()))]
    pub async fn resolve(&self, profile: &PerformanceProfile) -> Result<(), Error> {
        let mut pool: Option<PoolRef> = None;
        let mut reported = None;

        for source in &self.sources {
            if source.needs_pool() && pool.is_none() {
                match self.lookup_pool(profile).await {
                    Some(found) => pool = Some(found),
                    None => return Ok(()),
                }
            }

            let conditions = match source.evaluate(profile, pool.as_ref()).await {
                SourceOutcome::Healthy => None,
                SourceOutcome::Reported(conditions) => Some(conditions),
                SourceOutcome::Failed(cause) => {
                    return Err(self
                        .updater
                        .report_degraded(profile, source.failure_tag(), cause)
                        .await);
                }
            };

            if pool.is_none() {
                match self.lookup_pool(profile).await {
                    Some(found) => pool = Some(found),
                    None => return Ok(()),
                }
            }

            if let Some(conditions) = conditions {
                debug!(source = source.name(), "source reported conditions");
                reported = Some(conditions);
                break;
            }
        }

        if pool.is_none() && self.lookup_pool(profile).await.is_none() {
            return Ok(());
        }

        let conditions = reported.unwrap_or_else(|| available_conditions(""));
        let outcome = self.updater.update(profile, Some(conditions)).await?;
        info!(?outcome, "resolved performance profile conditions");
        Ok(())
    }

    /// Look up the owning pool; `None` means the pass must not write
    async fn lookup_pool(&self, profile: &PerformanceProfile) -> Option<PoolRef> {
        match self.pools.owning_pool(profile).await {
            Ok(pool) => Some(pool),
            Err(e) => {
                debug!(
                    error = %e,
                    "owning machine config pool not resolved, skipping status update"
                );
                None
            }
        }
    }

    /// [`resolve`](Self::resolve) for an untyped object
    ///
    /// Fails with [`Error::WrongKind`] before any query if the object is not a
    /// PerformanceProfile.
    pub async fn resolve_dynamic(&self, obj: &DynamicObject) -> Result<(), Error> {
        let profile = PerformanceProfile::from_dynamic(obj)?;
        self.resolve(&profile).await
    }
}

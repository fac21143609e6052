//! Status update executor
//!
//! Folds a candidate condition set into a copy of the profile, fills in the
//! derived Tuned and RuntimeClass references, and writes the status subresource
//! only when something other than a timestamp changed. Writing on timestamp
//! churn alone would re-trigger the watch and spin the reconciler forever.

use std::sync::Arc;

use async_trait::async_trait;
use kube::api::{Api, DynamicObject, PostParams};
use kube::{Client, ResourceExt};
#[cfg(test)]
use mockall::automock;
use tracing::{debug, error, instrument};

use crate::config::NamingConfig;
use crate::crd::{ConditionSet, PerformanceProfile};
use crate::{Error, FIELD_MANAGER};

/// Writes the status subresource of a PerformanceProfile
///
/// Implementations must update status only, never spec.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProfileStatusClient: Send + Sync {
    /// Replace the status of the given profile
    async fn replace_status(&self, profile: &PerformanceProfile) -> Result<(), Error>;
}

/// Real Kubernetes client implementation
pub struct KubeProfileStatusClient {
    client: Client,
}

impl KubeProfileStatusClient {
    /// Create a new KubeProfileStatusClient wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProfileStatusClient for KubeProfileStatusClient {
    async fn replace_status(&self, profile: &PerformanceProfile) -> Result<(), Error> {
        let api: Api<PerformanceProfile> = Api::all(self.client.clone());
        let data = serde_json::to_vec(profile)
            .map_err(|e| Error::serialization(format!("encoding profile status: {e}")))?;
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };

        // resourceVersion travels with the object, so a stale copy gets a 409
        api.replace_status(&profile.name_any(), &params, data).await?;
        Ok(())
    }
}

/// Result of a status update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing of substance changed; no request was made
    Unchanged,
    /// The status subresource was written once
    Written,
}

/// Diffs candidate conditions against the stored status and writes when needed
#[derive(Clone)]
pub struct StatusUpdater {
    client: Arc<dyn ProfileStatusClient>,
    naming: NamingConfig,
}

impl StatusUpdater {
    /// Create an updater with the default naming conventions
    pub fn new(client: Arc<dyn ProfileStatusClient>) -> Self {
        Self::with_naming(client, NamingConfig::default())
    }

    /// Create an updater with explicit naming conventions
    pub fn with_naming(client: Arc<dyn ProfileStatusClient>, naming: NamingConfig) -> Self {
        Self { client, naming }
    }

    /// Naming conventions used for derived references
    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    /// Apply `conditions` (if any) and persist the status when it changed
    ///
    /// The caller's profile is never mutated. `None` keeps the stored
    /// conditions and only fills in missing derived references.
    #[instrument(skip(self, profile, conditions), fields(profile = %profile.name_any()))]
    pub async fn update(
        &self,
        profile: &PerformanceProfile,
        conditions: Option<ConditionSet>,
    ) -> Result<UpdateOutcome, Error> {
        let name = profile.name_any();
        let mut updated = profile.clone();
        let status = updated.status.get_or_insert_with(Default::default);

        if let Some(conditions) = conditions {
            status.conditions = conditions;
        }

        let previous = profile.status.as_ref().map(|s| &s.conditions);
        let mut modified = conditions_changed(previous, &status.conditions);

        if status.tuned.is_none() {
            status.tuned = Some(self.naming.tuned_ref(&name));
            modified = true;
        }

        if status.runtime_class.is_none() {
            status.runtime_class = Some(self.naming.runtime_class_name(&name));
            modified = true;
        }

        if !modified {
            debug!("status unchanged, skipping write");
            return Ok(UpdateOutcome::Unchanged);
        }

        debug!("updating performance profile status");
        if let Err(e) = self.client.replace_status(&updated).await {
            error!(profile = %name, error = %e, "failed to update performance profile status");
            return Err(e);
        }
        Ok(UpdateOutcome::Written)
    }

    /// [`update`](Self::update) for an untyped object
    ///
    /// Fails with [`Error::WrongKind`] before any I/O if the object is not a
    /// PerformanceProfile.
    pub async fn update_dynamic(
        &self,
        obj: &DynamicObject,
        conditions: Option<ConditionSet>,
    ) -> Result<UpdateOutcome, Error> {
        let profile = PerformanceProfile::from_dynamic(obj)?;
        self.update(&profile, conditions).await
    }
}

/// True if any candidate condition is new or differs in status, reason or message
///
/// Timestamps are ignored. Types absent from the candidate are not considered:
/// every constructor emits all four, so nothing is ever left behind.
fn conditions_changed(previous: Option<&ConditionSet>, candidate: &ConditionSet) -> bool {
    candidate
        .iter()
        .any(|new| match previous.and_then(|p| p.find(new.type_)) {
            Some(old) => !old.same_state(new),
            None => true,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Mutex;

    use crate::crd::{ConditionType, PerformanceProfileSpec, PerformanceProfileStatus};
    use crate::status::conditions::{available_conditions, degraded_conditions, REASON_MCP_DEGRADED};

    /// Captured status writes, so tests can assert on what was persisted
    #[derive(Clone, Default)]
    struct StatusCapture {
        writes: Arc<Mutex<Vec<PerformanceProfile>>>,
    }

    impl StatusCapture {
        fn record(&self, profile: PerformanceProfile) {
            self.writes
                .lock()
                .expect("mutex should not be poisoned")
                .push(profile);
        }

        fn count(&self) -> usize {
            self.writes
                .lock()
                .expect("mutex should not be poisoned")
                .len()
        }

        fn last(&self) -> PerformanceProfile {
            self.writes
                .lock()
                .expect("mutex should not be poisoned")
                .last()
                .cloned()
                .expect("at least one write")
        }
    }

    fn sample_profile(name: &str) -> PerformanceProfile {
        PerformanceProfile::new(name, PerformanceProfileSpec::default())
    }

    fn capturing_updater() -> (StatusUpdater, StatusCapture) {
        let capture = StatusCapture::default();
        let recorder = capture.clone();
        let mut client = MockProfileStatusClient::new();
        client.expect_replace_status().returning(move |profile| {
            recorder.record(profile.clone());
            Ok(())
        });
        (StatusUpdater::new(Arc::new(client)), capture)
    }

    fn shift_timestamps(set: &ConditionSet, hours: i64) -> ConditionSet {
        set.iter()
            .cloned()
            .map(|mut c| {
                c.last_transition_time += Duration::hours(hours);
                c.last_heartbeat_time = c.last_heartbeat_time.map(|t| t + Duration::hours(hours));
                c
            })
            .collect()
    }

    mod change_detection {
        use super::*;

        #[test]
        fn test_missing_type_is_a_change() {
            let previous = ConditionSet::default();
            assert!(conditions_changed(Some(&previous), &available_conditions("")));
            assert!(conditions_changed(None, &available_conditions("")));
        }

        #[test]
        fn test_empty_candidate_is_not_a_change() {
            let previous = available_conditions("");
            assert!(!conditions_changed(Some(&previous), &ConditionSet::default()));
        }

        #[test]
        fn test_timestamps_are_ignored() {
            let previous = available_conditions("");
            let candidate = shift_timestamps(&previous, 5);
            assert!(!conditions_changed(Some(&previous), &candidate));
        }

        #[test]
        fn test_reason_or_message_change_is_detected() {
            let previous = degraded_conditions(REASON_MCP_DEGRADED, "one node");
            assert!(conditions_changed(
                Some(&previous),
                &degraded_conditions(REASON_MCP_DEGRADED, "two nodes")
            ));
            assert!(conditions_changed(
                Some(&previous),
                &degraded_conditions("TunedProfileDegraded", "one node")
            ));
            assert!(conditions_changed(Some(&previous), &available_conditions("")));
        }
    }

    /// Stories for the write discipline of the executor
    mod update_flow {
        use super::*;

        /// Story: a brand new profile gets conditions and both derived references in one write
        #[tokio::test]
        async fn story_first_update_writes_everything() {
            let (updater, capture) = capturing_updater();
            let profile = sample_profile("perf-a");

            let outcome = updater
                .update(&profile, Some(available_conditions("")))
                .await
                .unwrap();

            assert_eq!(outcome, UpdateOutcome::Written);
            assert_eq!(capture.count(), 1);
            let written = capture.last();
            let status = written.status.expect("status written");
            assert!(status.conditions.is_true(ConditionType::Available));
            assert_eq!(
                status.tuned.as_deref(),
                Some("openshift-tuning/perf-a-performance")
            );
            assert_eq!(status.runtime_class.as_deref(), Some("perf-a-performance"));

            // the caller's object is untouched
            assert!(profile.status.is_none());
        }

        /// Story: reconciling the same state twice writes once
        #[tokio::test]
        async fn story_update_is_idempotent() {
            let (updater, capture) = capturing_updater();
            let profile = sample_profile("perf-a");

            updater
                .update(&profile, Some(available_conditions("")))
                .await
                .unwrap();
            let stored = capture.last();

            let outcome = updater
                .update(&stored, Some(available_conditions("")))
                .await
                .unwrap();

            assert_eq!(outcome, UpdateOutcome::Unchanged);
            assert_eq!(capture.count(), 1);
        }

        /// Story: fresh timestamps alone never cause a write
        #[tokio::test]
        async fn story_timestamp_churn_does_not_write() {
            let mut client = MockProfileStatusClient::new();
            client.expect_replace_status().never();
            let updater = StatusUpdater::new(Arc::new(client));

            let stored_conditions = degraded_conditions(REASON_MCP_DEGRADED, "pool degraded");
            let mut profile = sample_profile("perf-a");
            profile.status = Some(PerformanceProfileStatus {
                conditions: stored_conditions.clone(),
                tuned: Some("openshift-tuning/perf-a-performance".to_string()),
                runtime_class: Some("perf-a-performance".to_string()),
            });

            let candidate = shift_timestamps(&stored_conditions, 24);
            let outcome = updater.update(&profile, Some(candidate)).await.unwrap();
            assert_eq!(outcome, UpdateOutcome::Unchanged);
        }

        /// Story: derived references are filled in once and then left alone
        #[tokio::test]
        async fn story_derived_references_are_stable() {
            let (updater, capture) = capturing_updater();
            let mut profile = sample_profile("perf-a");
            profile.status = Some(PerformanceProfileStatus {
                conditions: available_conditions(""),
                tuned: Some("custom-ns/hand-picked".to_string()),
                runtime_class: None,
            });

            let outcome = updater.update(&profile, None).await.unwrap();
            assert_eq!(outcome, UpdateOutcome::Written);
            let written = capture.last().status.unwrap();
            assert_eq!(written.tuned.as_deref(), Some("custom-ns/hand-picked"));
            assert_eq!(written.runtime_class.as_deref(), Some("perf-a-performance"));

            let outcome = updater.update(&capture.last(), None).await.unwrap();
            assert_eq!(outcome, UpdateOutcome::Unchanged);
            assert_eq!(capture.count(), 1);
        }

        /// Story: no conditions supplied keeps the stored ones
        #[tokio::test]
        async fn story_none_keeps_stored_conditions() {
            let (updater, capture) = capturing_updater();
            let profile = sample_profile("perf-a");

            updater.update(&profile, None).await.unwrap();
            let written = capture.last().status.unwrap();
            assert!(written.conditions.is_empty());
            assert!(written.tuned.is_some());
        }

        #[tokio::test]
        async fn story_custom_naming_is_used() {
            let capture = StatusCapture::default();
            let recorder = capture.clone();
            let mut client = MockProfileStatusClient::new();
            client.expect_replace_status().returning(move |p| {
                recorder.record(p.clone());
                Ok(())
            });
            let naming = NamingConfig {
                tuned_namespace: "openshift-cluster-node-tuning-operator".to_string(),
                ..Default::default()
            };
            let updater = StatusUpdater::with_naming(Arc::new(client), naming);

            updater
                .update(&sample_profile("rt"), Some(available_conditions("")))
                .await
                .unwrap();
            assert_eq!(
                capture.last().status.unwrap().tuned.as_deref(),
                Some("openshift-cluster-node-tuning-operator/rt-performance")
            );
        }

        /// Story: a failed write is returned as-is and not retried
        #[tokio::test]
        async fn story_write_failure_is_returned() {
            let mut client = MockProfileStatusClient::new();
            client
                .expect_replace_status()
                .times(1)
                .returning(|_| Err(Error::serialization("encoding profile status: boom")));
            let updater = StatusUpdater::new(Arc::new(client));

            let err = updater
                .update(&sample_profile("perf-a"), Some(available_conditions("")))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "serialization error: encoding profile status: boom");
        }
    }

    mod dynamic_objects {
        use super::*;
        use kube::api::{ApiResource, GroupVersionKind};

        #[tokio::test]
        async fn test_wrong_kind_fails_before_io() {
            let mut client = MockProfileStatusClient::new();
            client.expect_replace_status().never();
            let updater = StatusUpdater::new(Arc::new(client));

            let ar = ApiResource::from_gvk(&GroupVersionKind::gvk("", "v1", "ConfigMap"));
            let obj = DynamicObject::new("perf-a", &ar);

            let err = updater
                .update_dynamic(&obj, Some(available_conditions("")))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::WrongKind { .. }));
        }

        #[tokio::test]
        async fn test_profile_object_is_updated() {
            let (updater, capture) = capturing_updater();
            let ar = ApiResource::from_gvk(&GroupVersionKind::gvk(
                "performance.openshift.io",
                "v2",
                "PerformanceProfile",
            ));
            let mut obj = DynamicObject::new("perf-b", &ar);
            obj.data = serde_json::json!({ "spec": {} });

            let outcome = updater
                .update_dynamic(&obj, Some(available_conditions("")))
                .await
                .unwrap();
            assert_eq!(outcome, UpdateOutcome::Written);
            assert_eq!(capture.last().name_any(), "perf-b");
        }
    }
}

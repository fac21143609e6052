//! Degraded-path reporting for failed source queries

use kube::ResourceExt;
use tracing::{error, warn};

use crate::crd::PerformanceProfile;
use crate::status::conditions::{degraded_conditions, FailureTag};
use crate::status::writer::StatusUpdater;
use crate::Error;

impl StatusUpdater {
    /// Record a failed source query as a Degraded status and hand back the error to return
    ///
    /// The Degraded condition carries `tag` as reason and the cause's text as
    /// message. Exactly one write is attempted. If that write fails, the write
    /// error is returned instead of `cause`.
    pub async fn report_degraded(
        &self,
        profile: &PerformanceProfile,
        tag: FailureTag,
        cause: Error,
    ) -> Error {
        let name = profile.name_any();
        warn!(
            profile = %name,
            reason = %tag,
            error = %cause,
            "marking performance profile degraded"
        );

        let conditions = degraded_conditions(tag.reason(), cause.to_string());
        match self.update(profile, Some(conditions)).await {
            Ok(_) => cause,
            Err(write_err) => {
                error!(
                    profile = %name,
                    error = %write_err,
                    "failed to update performance profile status"
                );
                write_err
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::crd::{ConditionType, PerformanceProfileSpec};
    use crate::status::writer::MockProfileStatusClient;

    fn sample_profile() -> PerformanceProfile {
        PerformanceProfile::new("perf-a", PerformanceProfileSpec::default())
    }

    /// Story: a kubelet query failure shows up in status and is still returned
    #[tokio::test]
    async fn story_cause_is_recorded_and_returned() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let recorder = written.clone();
        let mut client = MockProfileStatusClient::new();
        client.expect_replace_status().times(1).returning(move |p| {
            recorder
                .lock()
                .expect("mutex should not be poisoned")
                .push(p.clone());
            Ok(())
        });
        let updater = StatusUpdater::new(Arc::new(client));

        let cause = Error::query_failed("kubelet", "KubeletConfig performance-perf-a not found");
        let cause_text = cause.to_string();
        let returned = updater
            .report_degraded(&sample_profile(), FailureTag::KubeletStatusUnavailable, cause)
            .await;

        assert_eq!(returned.to_string(), cause_text);
        let written = written.lock().expect("mutex should not be poisoned");
        let status = written[0].status.clone().unwrap();
        let degraded = status.conditions.find(ConditionType::Degraded).unwrap();
        assert_eq!(degraded.reason, "GettingKubeletStatusFailed");
        assert_eq!(degraded.message, cause_text);
        assert!(!status.conditions.is_true(ConditionType::Available));
    }

    /// Story: the same failure on the next pass keeps status as is and still errors
    #[tokio::test]
    async fn story_repeated_failure_writes_once() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let recorder = written.clone();
        let mut client = MockProfileStatusClient::new();
        client.expect_replace_status().times(1).returning(move |p| {
            recorder
                .lock()
                .expect("mutex should not be poisoned")
                .push(p.clone());
            Ok(())
        });
        let updater = StatusUpdater::new(Arc::new(client));
        let failure =
            || Error::query_failed("machine-config-pool", "get pool worker-cnf: timeout");

        let first = updater
            .report_degraded(&sample_profile(), FailureTag::McpStatusUnavailable, failure())
            .await;
        let stored = written
            .lock()
            .expect("mutex should not be poisoned")
            .last()
            .cloned()
            .expect("degraded status written");

        let second = updater
            .report_degraded(&stored, FailureTag::McpStatusUnavailable, failure())
            .await;

        assert!(matches!(second, Error::Source { .. }));
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(written.lock().expect("mutex should not be poisoned").len(), 1);
    }

    /// Story: a failed degraded write is never swallowed
    #[tokio::test]
    async fn story_write_failure_replaces_cause() {
        let mut client = MockProfileStatusClient::new();
        client
            .expect_replace_status()
            .times(1)
            .returning(|_| Err(Error::serialization("status write rejected")));
        let updater = StatusUpdater::new(Arc::new(client));

        let returned = updater
            .report_degraded(
                &sample_profile(),
                FailureTag::TunedProfileStatusUnavailable,
                Error::query_failed("tuned", "list profiles: timeout"),
            )
            .await;

        assert!(matches!(returned, Error::Serialization(_)));
    }
}

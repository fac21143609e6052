//! PerformanceProfile Custom Resource Definition
//!
//! A PerformanceProfile describes the desired low-latency tuning of a group of
//! nodes: reserved/isolated CPUs and the node and MachineConfigPool selectors
//! that pick the nodes. This crate only owns its status.

use std::collections::BTreeMap;

use kube::api::DynamicObject;
use kube::{CustomResource, Resource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::ConditionSet;
use crate::Error;

/// Specification for a PerformanceProfile
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "performance.openshift.io",
    version = "v2",
    kind = "PerformanceProfile",
    plural = "performanceprofiles",
    status = "PerformanceProfileStatus",
    derive = "PartialEq",
    printcolumn = r#"{"name":"Tuned","type":"string","jsonPath":".status.tuned"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceProfileSpec {
    /// CPU partitioning
    #[serde(default)]
    pub cpu: CpuSpec,

    /// Selects the nodes the profile applies to
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    /// Selects the MachineConfigPool that renders the profile's MachineConfigs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_config_pool_selector: Option<BTreeMap<String, String>>,

    /// Labels set on the generated MachineConfig
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_config_label: Option<BTreeMap<String, String>>,
}

/// Reserved and isolated CPU sets, in cpuset list syntax (e.g. "0-1,4")
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct CpuSpec {
    /// CPUs for housekeeping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved: Option<String>,

    /// CPUs for latency-sensitive workloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolated: Option<String>,
}

/// Status for a PerformanceProfile
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceProfileStatus {
    /// Available, Upgradeable, Progressing and Degraded, always written together
    #[serde(default, skip_serializing_if = "ConditionSet::is_empty")]
    pub conditions: ConditionSet,

    /// Namespaced name of the Tuned resource created for this profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuned: Option<String>,

    /// Name of the RuntimeClass created for this profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_class: Option<String>,
}

impl PerformanceProfile {
    /// `apiVersion/kind` this resource is served under
    pub fn type_id() -> String {
        format!("{}/{}", Self::api_version(&()), Self::kind(&()))
    }

    /// Convert an untyped object, rejecting anything that is not a PerformanceProfile
    pub fn from_dynamic(obj: &DynamicObject) -> Result<Self, Error> {
        let expected = Self::type_id();
        let got = obj
            .types
            .as_ref()
            .map(|t| format!("{}/{}", t.api_version, t.kind))
            .unwrap_or_else(|| "<untyped>".to_string());
        if got != expected {
            return Err(Error::wrong_kind(expected, got));
        }

        let value = serde_json::to_value(obj)
            .map_err(|e| Error::serialization(format!("encoding {got}: {e}")))?;
        serde_json::from_value(value)
            .map_err(|e| Error::serialization(format!("decoding {got}: {e}")))
    }

    /// Current conditions, empty when no status has been written yet
    pub fn conditions(&self) -> ConditionSet {
        self.status
            .as_ref()
            .map(|s| s.conditions.clone())
            .unwrap_or_default()
    }
}

//! Condition set constructors and reason codes
//!
//! Every constructor emits all four condition types so a written status never
//! mixes conditions from different passes.

use crate::crd::{Condition, ConditionSet, ConditionStatus, ConditionType};

/// A KubeletConfig rendered for the profile reports a failure
pub const REASON_KUBELET_FAILED: &str = "KubeletConfig failure";
/// The KubeletConfig status could not be read
pub const REASON_FAILED_GETTING_KUBELET_STATUS: &str = "GettingKubeletStatusFailed";
/// The owning MachineConfigPool reports degradation
pub const REASON_MCP_DEGRADED: &str = "MCPDegraded";
/// The MachineConfigPool status could not be read
pub const REASON_FAILED_GETTING_MCP_STATUS: &str = "GettingMCPStatusFailed";
/// No MachineConfigPool matches the profile selectors
pub const REASON_FAILED_TO_FIND_MCP: &str = "GettingMachineConfigPoolFailed";
/// The profile's machineConfigLabel does not match the pool selector
pub const REASON_BAD_MACHINE_CONFIG_LABELS: &str = "BadMachineConfigLabels";
/// One or more tuned Profiles for the profile's nodes report degradation
pub const REASON_TUNED_DEGRADED: &str = "TunedProfileDegraded";
/// The tuned Profile status could not be read
pub const REASON_FAILED_GETTING_TUNED_STATUS: &str = "GettingTunedStatusFailed";
/// Rendering or creating the profile's components failed
pub const REASON_COMPONENTS_CREATION_FAILED: &str = "ComponentCreationFailed";

/// Why a condition source could not produce an answer
///
/// Used as the Degraded reason when a source query itself errors, so operators
/// can tell which subsystem was unreachable from the status alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureTag {
    /// The kubelet status query failed
    KubeletStatusUnavailable,
    /// The MachineConfigPool status query failed
    McpStatusUnavailable,
    /// The tuned Profile status query failed
    TunedProfileStatusUnavailable,
}

impl FailureTag {
    /// Reason code written into the Degraded condition
    pub fn reason(&self) -> &'static str {
        match self {
            Self::KubeletStatusUnavailable => REASON_FAILED_GETTING_KUBELET_STATUS,
            Self::McpStatusUnavailable => REASON_FAILED_GETTING_MCP_STATUS,
            Self::TunedProfileStatusUnavailable => REASON_FAILED_GETTING_TUNED_STATUS,
        }
    }
}

impl std::fmt::Display for FailureTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Healthy profile: Available and Upgradeable, neither Progressing nor Degraded
pub fn available_conditions(message: impl Into<String>) -> ConditionSet {
    ConditionSet::new([
        Condition::new(
            ConditionType::Available,
            ConditionStatus::True,
            "",
            message,
        ),
        Condition::new(ConditionType::Upgradeable, ConditionStatus::True, "", ""),
        Condition::new(ConditionType::Progressing, ConditionStatus::False, "", ""),
        Condition::new(ConditionType::Degraded, ConditionStatus::False, "", ""),
    ])
}

/// Degraded profile; the reason and message land on the Degraded condition
pub fn degraded_conditions(reason: impl Into<String>, message: impl Into<String>) -> ConditionSet {
    ConditionSet::new([
        Condition::new(ConditionType::Available, ConditionStatus::False, "", ""),
        Condition::new(ConditionType::Upgradeable, ConditionStatus::False, "", ""),
        Condition::new(ConditionType::Progressing, ConditionStatus::False, "", ""),
        Condition::new(
            ConditionType::Degraded,
            ConditionStatus::True,
            reason,
            message,
        ),
    ])
}

/// Rollout in progress; the reason and message land on the Progressing condition
pub fn progressing_conditions(
    reason: impl Into<String>,
    message: impl Into<String>,
) -> ConditionSet {
    ConditionSet::new([
        Condition::new(ConditionType::Available, ConditionStatus::False, "", ""),
        Condition::new(ConditionType::Upgradeable, ConditionStatus::False, "", ""),
        Condition::new(
            ConditionType::Progressing,
            ConditionStatus::True,
            reason,
            message,
        ),
        Condition::new(ConditionType::Degraded, ConditionStatus::False, "", ""),
    ])
}

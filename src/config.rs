//! Naming conventions for references derived from a profile name
//!
//! The status carries two references that are computed from the profile's own
//! name: the Tuned resource (`<namespace>/<name>-<suffix>`) and the RuntimeClass
//! (`<name>-<prefix>`). They are stable once written, so the conventions must be
//! identical for every pass of the same operator build.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_COMPONENT_PREFIX, DEFAULT_TUNED_NAMESPACE, DEFAULT_TUNED_PROFILE_SUFFIX};

/// Naming configuration for derived status references
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NamingConfig {
    /// Namespace holding the Tuned resources
    pub tuned_namespace: String,
    /// Suffix for the Tuned resource name
    pub tuned_profile_suffix: String,
    /// Suffix for component names such as the RuntimeClass
    pub component_prefix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            tuned_namespace: DEFAULT_TUNED_NAMESPACE.to_string(),
            tuned_profile_suffix: DEFAULT_TUNED_PROFILE_SUFFIX.to_string(),
            component_prefix: DEFAULT_COMPONENT_PREFIX.to_string(),
        }
    }
}

impl NamingConfig {
    /// Namespaced reference (`namespace/name`) of the Tuned resource for a profile
    pub fn tuned_ref(&self, profile_name: &str) -> String {
        format!(
            "{}/{}",
            self.tuned_namespace,
            component_name(profile_name, &self.tuned_profile_suffix)
        )
    }

    /// RuntimeClass name for a profile
    pub fn runtime_class_name(&self, profile_name: &str) -> String {
        component_name(profile_name, &self.component_prefix)
    }
}

/// Build a component name from a profile name and a fixed suffix
pub fn component_name(profile_name: &str, suffix: &str) -> String {
    format!("{profile_name}-{suffix}")
}

//! Status engine for PerformanceProfile resources
//!
//! Derives the Available, Upgradeable, Degraded and Progressing conditions of a
//! `PerformanceProfile` from the health reported by kubelet, the owning
//! MachineConfigPool and the tuned daemon, and writes them back to the status
//! subresource only when something other than a timestamp changed.
//!
//! # Modules
//!
//! - [`crd`] - The PerformanceProfile custom resource and condition types
//! - [`status`] - Condition sources, the resolver waterfall and the status writer
//! - [`config`] - Naming conventions for derived status references
//! - [`telemetry`] - Tracing subscriber setup
//! - [`error`] - Error types for the engine

#![deny(missing_docs)]

pub mod config;
pub mod crd;
pub mod error;
pub mod status;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================

/// Namespace the tuned operand (and its Tuned resources) lives in
pub const DEFAULT_TUNED_NAMESPACE: &str = "openshift-tuning";

/// Suffix appended to the profile name to form the Tuned resource name
pub const DEFAULT_TUNED_PROFILE_SUFFIX: &str = "performance";

/// Suffix appended to the profile name to form component names (RuntimeClass)
pub const DEFAULT_COMPONENT_PREFIX: &str = "performance";

/// Field manager recorded on status writes
pub const FIELD_MANAGER: &str = "performance-profile-status";

//! Custom Resource Definitions
//!
//! The PerformanceProfile CRD and the condition types its status carries.

mod performance_profile;
mod types;

pub use performance_profile::{
    CpuSpec, PerformanceProfile, PerformanceProfileSpec, PerformanceProfileStatus,
};
pub use types::{Condition, ConditionSet, ConditionStatus, ConditionType};

//! Condition types shared by PerformanceProfile status

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// The four condition kinds a profile always reports together
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum ConditionType {
    /// Tuning has been applied and the profile is healthy
    Available,
    /// The profile does not block a cluster upgrade
    Upgradeable,
    /// Something downstream failed; the reason says what
    Degraded,
    /// Tuning is being rolled out
    Progressing,
}

impl ConditionType {
    /// All condition types, in the order constructors emit them
    pub const ALL: [ConditionType; 4] = [
        ConditionType::Available,
        ConditionType::Upgradeable,
        ConditionType::Progressing,
        ConditionType::Degraded,
    ];
}

impl std::fmt::Display for ConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "Available"),
            Self::Upgradeable => write!(f, "Upgradeable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Progressing => write!(f, "Progressing"),
        }
    }
}

/// Condition status following Kubernetes conventions
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionStatus {
    /// Condition is true
    True,
    /// Condition is false
    False,
    /// Condition status is unknown
    #[default]
    Unknown,
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

impl From<bool> for ConditionStatus {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

/// Kubernetes-style condition for profile status reporting
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    #[serde(rename = "type")]
    pub type_: ConditionType,

    /// Status of the condition (True, False, Unknown)
    pub status: ConditionStatus,

    /// Machine-readable reason for the condition
    #[serde(default)]
    pub reason: String,

    /// Human-readable message
    #[serde(default)]
    pub message: String,

    /// Last time the condition transitioned
    ///
    /// A missing or null value decodes as the Unix epoch.
    #[serde(default, deserialize_with = "null_as_epoch")]
    pub last_transition_time: DateTime<Utc>,

    /// Last time the condition was probed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat_time: Option<DateTime<Utc>>,
}

fn null_as_epoch<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DateTime<Utc>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Condition {
    /// Create a new condition with the current timestamp
    pub fn new(
        type_: ConditionType,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            type_,
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: now,
            last_heartbeat_time: Some(now),
        }
    }

    /// Compare status, reason and message, ignoring both timestamps
    pub fn same_state(&self, other: &Condition) -> bool {
        self.type_ == other.type_
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

/// Ordered set of conditions with at most one entry per type
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(transparent)]
pub struct ConditionSet(Vec<Condition>);

impl ConditionSet {
    /// Build a set from conditions; a later duplicate type replaces the earlier entry
    pub fn new(conditions: impl IntoIterator<Item = Condition>) -> Self {
        conditions.into_iter().collect()
    }

    /// Find the condition of the given type
    pub fn find(&self, type_: ConditionType) -> Option<&Condition> {
        self.0.iter().find(|c| c.type_ == type_)
    }

    /// True if a condition of the given type exists with status True
    pub fn is_true(&self, type_: ConditionType) -> bool {
        self.find(type_)
            .is_some_and(|c| c.status == ConditionStatus::True)
    }

    /// Insert or replace the condition of the same type, keeping its position
    pub fn set(&mut self, condition: Condition) {
        match self.0.iter_mut().find(|c| c.type_ == condition.type_) {
            Some(existing) => *existing = condition,
            None => self.0.push(condition),
        }
    }

    /// Iterate over the conditions in order
    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.0.iter()
    }

    /// Number of conditions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the set holds no conditions
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Condition> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        let mut set = ConditionSet::default();
        for condition in iter {
            set.set(condition);
        }
        set
    }
}

impl IntoIterator for ConditionSet {
    type Item = Condition;
    type IntoIter = std::vec::IntoIter<Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConditionSet {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

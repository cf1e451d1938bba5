//! Shared types for Foundry custom resources
//!
//! Condition handling follows Kubernetes API conventions: one entry per
//! condition type, transition timestamps that only move when the condition
//! actually changes, and an optional severity used for informational
//! conditions (e.g. a component that is intentionally Removed).

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Desired management state for a component or service
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum ManagementState {
    /// The operator actively manages the component
    Managed,
    /// The component is not installed; existing resources are removed
    Removed,
}

impl ManagementState {
    /// Normalize an optional management state: unset means Removed
    pub fn normalize(state: Option<ManagementState>) -> ManagementState {
        state.unwrap_or(ManagementState::Removed)
    }

    /// Returns true if the state is Managed
    pub fn is_managed(self) -> bool {
        self == ManagementState::Managed
    }
}

impl std::fmt::Display for ManagementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Managed => write!(f, "Managed"),
            Self::Removed => write!(f, "Removed"),
        }
    }
}

/// Condition status following Kubernetes conventions
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
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

/// Severity classification for False/Unknown conditions
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionSeverity {
    /// Informational only (e.g. component intentionally disabled)
    Info,
    /// Degraded but functional
    Warning,
    /// Requires attention
    Error,
}

/// Kubernetes-style condition for status reporting
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct Condition {
    /// Type of condition (e.g. Ready, DeploymentsAvailable)
    #[serde(rename = "type")]
    pub type_: String,

    /// Status of the condition (True, False, Unknown)
    pub status: ConditionStatus,

    /// Machine-readable reason for the condition
    pub reason: String,

    /// Human-readable message
    pub message: String,

    /// Severity of the condition, when not True
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<ConditionSeverity>,

    /// Last time the condition transitioned
    #[serde(rename = "lastTransitionTime")]
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Create a new condition with the current timestamp
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            message: message.into(),
            severity: None,
            last_transition_time: Utc::now(),
        }
    }

    /// Attach a severity and return self for chaining
    pub fn severity(mut self, severity: ConditionSeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    fn same_content(&self, other: &Condition) -> bool {
        self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
            && self.severity == other.severity
    }
}

/// A set of conditions with exactly one entry per condition type.
///
/// Marking an already-present condition with unchanged content preserves the
/// existing transition timestamp, so repeated aggregation passes over an
/// unchanged cluster produce byte-identical status.
#[derive(Clone, Debug, Default)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
}

impl ConditionSet {
    /// Create a condition set from existing status conditions
    pub fn from_existing(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    /// Set a condition, replacing any existing entry of the same type.
    ///
    /// The previous transition timestamp is kept when the condition content
    /// (status, reason, message, severity) is unchanged, and also when only
    /// the status is unchanged (Kubernetes transition-time convention).
    pub fn set(&mut self, mut condition: Condition) {
        if let Some(existing) = self.conditions.iter_mut().find(|c| c.type_ == condition.type_) {
            if existing.same_content(&condition) || existing.status == condition.status {
                condition.last_transition_time = existing.last_transition_time;
            }
            *existing = condition;
        } else {
            self.conditions.push(condition);
        }
    }

    /// Mark a condition True
    pub fn mark_true(
        &mut self,
        type_: impl Into<String>,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.set(Condition::new(type_, ConditionStatus::True, reason, message));
    }

    /// Mark a condition False
    pub fn mark_false(
        &mut self,
        type_: impl Into<String>,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.set(Condition::new(
            type_,
            ConditionStatus::False,
            reason,
            message,
        ));
    }

    /// Mark a condition False with a severity
    pub fn mark_false_with_severity(
        &mut self,
        type_: impl Into<String>,
        reason: impl Into<String>,
        message: impl Into<String>,
        severity: ConditionSeverity,
    ) {
        self.set(Condition::new(type_, ConditionStatus::False, reason, message).severity(severity));
    }

    /// Mirror an existing condition under a new type, copying status, reason,
    /// message, and severity verbatim
    pub fn mark_from(&mut self, type_: impl Into<String>, source: &Condition) {
        let mut condition = Condition::new(
            type_,
            source.status,
            source.reason.clone(),
            source.message.clone(),
        );
        condition.severity = source.severity;
        self.set(condition);
    }

    /// Find a condition by type
    pub fn find(&self, type_: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.type_ == type_)
    }

    /// Consume the set, returning the underlying conditions
    pub fn into_vec(self) -> Vec<Condition> {
        self.conditions
    }
}

/// Find a condition by type in a plain condition slice
pub fn find_condition<'a>(conditions: &'a [Condition], type_: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.type_ == type_)
}

/// Deployed release information recorded in resource status
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    /// Release name (the variant's internal name)
    pub name: String,
    /// Release version (semver)
    pub version: String,
}

/// Detailed status a component publishes and the parent mirrors
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentReleaseStatus {
    /// Component name
    pub name: String,
    /// Installed component version
    pub version: String,
}

/// Condition type for component Deployment availability
pub const CONDITION_DEPLOYMENTS_AVAILABLE: &str = "DeploymentsAvailable";

/// Condition type for overall readiness
pub const CONDITION_READY: &str = "Ready";

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Condition Set Stories
    // =========================================================================

    /// Story: the set never holds two entries for the same condition type
    #[test]
    fn story_one_entry_per_condition_type() {
        let mut set = ConditionSet::default();
        set.mark_false(CONDITION_READY, "NotReady", "starting up");
        set.mark_true(CONDITION_READY, "Available", "all deployments ready");

        let conditions = set.into_vec();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].status, ConditionStatus::True);
        assert_eq!(conditions[0].reason, "Available");
    }

    /// Story: re-marking an unchanged condition preserves the timestamp
    ///
    /// Status aggregation runs on every reconcile. If nothing changed, the
    /// resulting status must be byte-identical, including transition times.
    #[test]
    fn story_unchanged_condition_keeps_transition_time() {
        let mut set = ConditionSet::default();
        set.mark_true(CONDITION_READY, "Available", "ok");
        let first = set.find(CONDITION_READY).unwrap().clone();

        set.mark_true(CONDITION_READY, "Available", "ok");
        let second = set.find(CONDITION_READY).unwrap();
        assert_eq!(first, *second);
    }

    /// Story: a status flip moves the transition timestamp forward
    #[test]
    fn story_status_change_updates_content() {
        let mut set = ConditionSet::default();
        set.mark_true(CONDITION_READY, "Available", "ok");
        set.mark_false(CONDITION_READY, "DeploymentFailed", "0/3 replicas");

        let cond = set.find(CONDITION_READY).unwrap();
        assert_eq!(cond.status, ConditionStatus::False);
        assert_eq!(cond.reason, "DeploymentFailed");
    }

    /// Story: mirroring copies status, reason, and message verbatim
    #[test]
    fn story_mark_from_mirrors_verbatim() {
        let source = Condition::new(CONDITION_READY, ConditionStatus::True, "Available", "2/2 up");
        let mut set = ConditionSet::default();
        set.mark_from("DashboardReady", &source);

        let mirrored = set.find("DashboardReady").unwrap();
        assert_eq!(mirrored.status, ConditionStatus::True);
        assert_eq!(mirrored.reason, "Available");
        assert_eq!(mirrored.message, "2/2 up");
    }

    /// Story: severity survives serialization only when present
    #[test]
    fn story_severity_is_optional_on_the_wire() {
        let plain = Condition::new(CONDITION_READY, ConditionStatus::True, "Available", "ok");
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("severity").is_none());

        let informational = Condition::new("DashboardReady", ConditionStatus::False, "Removed", "disabled")
            .severity(ConditionSeverity::Info);
        let json = serde_json::to_value(&informational).unwrap();
        assert_eq!(json["severity"], "Info");
    }

    // =========================================================================
    // Management State Stories
    // =========================================================================

    /// Story: an unset management state is treated as Removed
    #[test]
    fn story_unset_management_state_normalizes_to_removed() {
        assert_eq!(ManagementState::normalize(None), ManagementState::Removed);
        assert_eq!(
            ManagementState::normalize(Some(ManagementState::Managed)),
            ManagementState::Managed
        );
    }

    /// Story: the stringified state is used verbatim as a condition reason
    #[test]
    fn story_management_state_display_matches_reason_contract() {
        assert_eq!(ManagementState::Removed.to_string(), "Removed");
        assert_eq!(ManagementState::Managed.to_string(), "Managed");
    }
}

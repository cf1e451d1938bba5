//! FoundryPlatform Custom Resource Definition
//!
//! FoundryPlatform is the top-level platform-components resource: a
//! cluster-scoped singleton (fixed name `default-foundry`) whose spec selects
//! which platform components are managed, and whose status aggregates the
//! readiness of every component the operator owns.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{Condition, ComponentReleaseStatus, ManagementState, ReleaseInfo};

/// Specification for FoundryPlatform
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "foundry.dev",
    version = "v1alpha1",
    kind = "FoundryPlatform",
    plural = "foundryplatforms",
    shortname = "fp",
    status = "FoundryPlatformStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#,
    printcolumn = r#"{"name":"Reason","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].reason"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct FoundryPlatformSpec {
    /// Per-component desired state
    #[serde(default)]
    pub components: ComponentsSpec,
}

/// Desired state for every platform component
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentsSpec {
    /// Web dashboard
    #[serde(default)]
    pub dashboard: DashboardSelector,

    /// ML pipelines engine
    #[serde(default)]
    pub pipelines: PipelinesSelector,

    /// Model serving stack
    #[serde(default)]
    pub model_serving: ModelServingSelector,

    /// User workbenches (notebook environments)
    #[serde(default)]
    pub workbenches: WorkbenchesSelector,
}

/// Dashboard component selector
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSelector {
    /// Whether the component is managed. Unset means Removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_state: Option<ManagementState>,

    /// Title shown in the dashboard banner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Pipelines component selector
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelinesSelector {
    /// Whether the component is managed. Unset means Removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_state: Option<ManagementState>,

    /// Object storage bucket for pipeline artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_bucket: Option<String>,
}

/// Model serving component selector
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelServingSelector {
    /// Whether the component is managed. Unset means Removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_state: Option<ManagementState>,

    /// Default serving runtime image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_runtime: Option<String>,
}

/// Workbenches component selector
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkbenchesSelector {
    /// Whether the component is managed. Unset means Removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_state: Option<ManagementState>,

    /// Namespace where user notebooks are created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_namespace: Option<String>,
}

/// Status for FoundryPlatform
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoundryPlatformStatus {
    /// Conditions: one `<Kind>Ready` per component plus the aggregate `Ready`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Per-component observed state
    #[serde(default)]
    pub components: ComponentsStatus,

    /// Release this status was produced by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<ReleaseInfo>,
}

/// Observed state for every platform component
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentsStatus {
    /// Web dashboard
    #[serde(default)]
    pub dashboard: ComponentStatusEntry,

    /// ML pipelines engine
    #[serde(default)]
    pub pipelines: ComponentStatusEntry,

    /// Model serving stack
    #[serde(default)]
    pub model_serving: ComponentStatusEntry,

    /// User workbenches
    #[serde(default)]
    pub workbenches: ComponentStatusEntry,
}

/// Observed state for a single component on the parent resource
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStatusEntry {
    /// Normalized management state observed by the last aggregation pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_state: Option<ManagementState>,

    /// Detailed status mirrored from the component CR while enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<ComponentReleaseStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Story: an empty platform spec leaves every component Removed
    ///
    /// A user creating `FoundryPlatform` with no components block gets an
    /// installed-but-empty platform; nothing is deployed until a component is
    /// explicitly set to Managed.
    #[test]
    fn story_empty_platform_spec_disables_all_components() {
        let spec: FoundryPlatformSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(
            ManagementState::normalize(spec.components.dashboard.management_state),
            ManagementState::Removed
        );
        assert_eq!(
            ManagementState::normalize(spec.components.model_serving.management_state),
            ManagementState::Removed
        );
    }

    /// Story: component selectors parse from the user-facing camelCase form
    #[test]
    fn story_component_selectors_parse_from_camel_case() {
        let spec: FoundryPlatformSpec = serde_json::from_value(serde_json::json!({
            "components": {
                "dashboard": {"managementState": "Managed", "title": "Team ML"},
                "modelServing": {"managementState": "Managed"},
                "workbenches": {"managementState": "Removed"}
            }
        }))
        .unwrap();

        assert_eq!(
            spec.components.dashboard.management_state,
            Some(ManagementState::Managed)
        );
        assert_eq!(spec.components.dashboard.title.as_deref(), Some("Team ML"));
        assert_eq!(
            spec.components.model_serving.management_state,
            Some(ManagementState::Managed)
        );
        assert_eq!(
            spec.components.workbenches.management_state,
            Some(ManagementState::Removed)
        );
        assert!(spec.components.pipelines.management_state.is_none());
    }

    /// Story: a default status entry serializes to an empty object
    ///
    /// Before the first aggregation pass, the per-component entries carry no
    /// observed state at all.
    #[test]
    fn story_default_status_entry_is_empty() {
        let entry = ComponentStatusEntry::default();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}

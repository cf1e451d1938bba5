//! Component Custom Resource Definitions
//!
//! Each platform component owns a cluster-scoped singleton CR generated by the
//! platform controller from the corresponding `FoundryPlatform` selector. The
//! component reconcilers maintain the CR's own conditions; the platform
//! controller mirrors them back onto the parent.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{Condition, ComponentReleaseStatus};

/// Annotation recording the management state the parent requested for a
/// generated component CR
pub const MANAGEMENT_STATE_ANNOTATION: &str = "foundry.dev/management-state";

/// Common behavior of component custom resources.
///
/// Used by the generic component reconciler and by status aggregation.
pub trait ComponentCr {
    /// CRD kind, e.g. `Dashboard`
    const KIND: &'static str;
    /// Fixed singleton instance name, e.g. `default-dashboard`
    const INSTANCE: &'static str;
    /// Component name used in labels and registries, e.g. `dashboard`
    const COMPONENT: &'static str;

    /// Status conditions published by the component reconciler
    fn conditions(&self) -> &[Condition];

    /// Release detail published by the component reconciler
    fn release(&self) -> Option<&ComponentReleaseStatus>;
}

/// Parent condition type that mirrors a component's Ready condition
pub fn ready_condition_type(kind: &str) -> String {
    format!("{kind}Ready")
}

/// Shared status shape for all component CRs
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentCrStatus {
    /// Conditions representing component state
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Installed release detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<ComponentReleaseStatus>,
}

macro_rules! impl_component_cr {
    ($cr:ident, $kind:literal, $instance:literal, $component:literal) => {
        impl ComponentCr for $cr {
            const KIND: &'static str = $kind;
            const INSTANCE: &'static str = $instance;
            const COMPONENT: &'static str = $component;

            fn conditions(&self) -> &[Condition] {
                self.status
                    .as_ref()
                    .map(|s| s.conditions.as_slice())
                    .unwrap_or_default()
            }

            fn release(&self) -> Option<&ComponentReleaseStatus> {
                self.status.as_ref().and_then(|s| s.release.as_ref())
            }
        }
    };
}

/// Specification for the Dashboard component
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "foundry.dev",
    version = "v1alpha1",
    kind = "Dashboard",
    plural = "dashboards",
    status = "ComponentCrStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSpec {
    /// Title shown in the dashboard banner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl_component_cr!(Dashboard, "Dashboard", "default-dashboard", "dashboard");

/// Specification for the Pipelines component
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "foundry.dev",
    version = "v1alpha1",
    kind = "Pipelines",
    plural = "pipelineses",
    status = "ComponentCrStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PipelinesSpec {
    /// Object storage bucket for pipeline artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_bucket: Option<String>,
}

impl_component_cr!(Pipelines, "Pipelines", "default-pipelines", "pipelines");

/// Specification for the ModelServing component
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "foundry.dev",
    version = "v1alpha1",
    kind = "ModelServing",
    plural = "modelservings",
    status = "ComponentCrStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ModelServingSpec {
    /// Default serving runtime image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_runtime: Option<String>,
}

impl_component_cr!(
    ModelServing,
    "ModelServing",
    "default-model-serving",
    "model-serving"
);

/// Specification for the Workbenches component
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "foundry.dev",
    version = "v1alpha1",
    kind = "Workbenches",
    plural = "workbencheses",
    status = "ComponentCrStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct WorkbenchesSpec {
    /// Namespace where user notebooks are created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_namespace: Option<String>,
}

impl_component_cr!(
    Workbenches,
    "Workbenches",
    "default-workbenches",
    "workbenches"
);

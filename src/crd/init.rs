//! FoundryInit Custom Resource Definition
//!
//! FoundryInit is the cluster-scoped singleton that bootstraps platform-wide
//! prerequisites: the application namespace, the monitoring namespace, the
//! admin group binding, and the trusted CA bundle. Exactly one instance named
//! `default-init` is reconciled; the operator creates it on startup for
//! variants whose policy table says so.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{Condition, ManagementState, ReleaseInfo};

/// Specification for FoundryInit
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "foundry.dev",
    version = "v1alpha1",
    kind = "FoundryInit",
    plural = "foundryinits",
    shortname = "finit",
    status = "FoundryInitStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct FoundryInitSpec {
    /// Application namespace override. When unset, the variant default is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_namespace: Option<String>,

    /// Monitoring stack configuration
    #[serde(default)]
    pub monitoring: MonitoringSpec,

    /// Trusted CA bundle distributed to platform namespaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_ca_bundle: Option<TrustedCaBundleSpec>,

    /// Development-only overrides. Must be unset on vanilla Kubernetes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_flags: Option<DevFlags>,
}

/// Monitoring stack configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringSpec {
    /// Whether the monitoring stack is managed. Unset means Removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_state: Option<ManagementState>,
}

impl MonitoringSpec {
    /// Returns true if monitoring is enabled
    pub fn is_enabled(&self) -> bool {
        ManagementState::normalize(self.management_state).is_managed()
    }
}

/// Trusted CA bundle configuration
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrustedCaBundleSpec {
    /// Additional PEM-encoded certificates appended to the bundle
    #[serde(default)]
    pub custom_ca_bundle: String,
}

/// Development-only overrides
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DevFlags {
    /// Alternate manifests location for development builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifests_uri: Option<String>,

    /// Log level override for development builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Status for FoundryInit
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoundryInitStatus {
    /// Conditions representing initialization state
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Release recorded by the last successful reconcile. Read on the next
    /// startup to decide whether upgrade cleanup is needed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<ReleaseInfo>,
}

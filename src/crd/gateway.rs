//! GatewayConfig Custom Resource Definition
//!
//! GatewayConfig describes the platform ingress gateway. The operator creates
//! a default instance on startup (blocking for every variant whose policy
//! table requires it) and the gateway service reconciles its certificate
//! readiness.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::Condition;

/// Specification for GatewayConfig
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "foundry.dev",
    version = "v1alpha1",
    kind = "GatewayConfig",
    plural = "gatewayconfigs",
    shortname = "gwc",
    status = "GatewayConfigStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfigSpec {
    /// TLS certificate configuration for the gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateSpec>,
}

/// TLS certificate source for the gateway
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSpec {
    /// How the certificate is obtained
    #[serde(rename = "type")]
    pub cert_type: CertificateType,

    /// Secret holding the certificate when the type is Provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
}

/// Certificate provisioning strategy
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum CertificateType {
    /// Use the cluster's default ingress certificate
    #[default]
    ClusterDefault,
    /// Use a user-provided certificate from a Secret
    Provided,
}

/// Status for GatewayConfig
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfigStatus {
    /// Conditions representing gateway state
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

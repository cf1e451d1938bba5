//! Platform type resolution
//!
//! Resolution order: an explicit configuration override wins unconditionally;
//! otherwise the cluster is probed for a managed add-on marker, then a
//! self-managed enterprise marker, and finally falls back to the community
//! identity. Vanilla is only ever selected by explicit override.
//!
//! Probes that fail with "not found" are a negative signal (resolution
//! continues); any other probe error propagates and resolution fails closed.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{Api, Client};
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use super::PlatformType;
use crate::Result;

/// Name of the ConfigMap delivered by the managed add-on installer
pub const MANAGED_ADDON_MARKER: &str = "foundry-addon-params";

/// Name of the Deployment installed by the enterprise operator bundle
pub const ENTERPRISE_OPERATOR_MARKER: &str = "foundry-enterprise-operator";

/// Probes for the cluster markers that distinguish platform flavors
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MarkerProbe: Send + Sync {
    /// Returns true if the managed add-on marker resource exists
    async fn managed_addon_exists(&self) -> Result<bool>;

    /// Returns true if the self-managed enterprise operator marker exists
    async fn enterprise_operator_exists(&self) -> Result<bool>;
}

/// Real probe implementation backed by the Kubernetes API.
///
/// Both markers live in the operator namespace.
pub struct ClusterMarkerProbe {
    client: Client,
    operator_namespace: String,
}

impl ClusterMarkerProbe {
    /// Create a probe scoped to the operator namespace
    pub fn new(client: Client, operator_namespace: impl Into<String>) -> Self {
        Self {
            client,
            operator_namespace: operator_namespace.into(),
        }
    }
}

#[async_trait]
impl MarkerProbe for ClusterMarkerProbe {
    async fn managed_addon_exists(&self) -> Result<bool> {
        let api: Api<ConfigMap> =
            Api::namespaced(self.client.clone(), &self.operator_namespace);
        // get_opt maps 404 to None; any other error propagates (fail closed)
        Ok(api.get_opt(MANAGED_ADDON_MARKER).await?.is_some())
    }

    async fn enterprise_operator_exists(&self) -> Result<bool> {
        let api: Api<Deployment> =
            Api::namespaced(self.client.clone(), &self.operator_namespace);
        Ok(api.get_opt(ENTERPRISE_OPERATOR_MARKER).await?.is_some())
    }
}

/// Resolve the platform type from an optional explicit override and cluster
/// probes.
///
/// The override string comes from `FOUNDRY_PLATFORM_TYPE`; an unparseable
/// value is an error (no silent fallback to an arbitrary platform).
pub async fn resolve_platform(
    override_value: Option<&str>,
    probe: &dyn MarkerProbe,
) -> Result<PlatformType> {
    if let Some(value) = override_value {
        let platform: PlatformType = value.parse()?;
        info!(platform = %platform, "Platform type set by explicit override");
        return Ok(platform);
    }

    if probe.managed_addon_exists().await? {
        info!("Managed add-on marker found, resolving to Managed");
        return Ok(PlatformType::Managed);
    }
    debug!("No managed add-on marker");

    if probe.enterprise_operator_exists().await? {
        info!("Enterprise operator marker found, resolving to SelfManaged");
        return Ok(PlatformType::SelfManaged);
    }
    debug!("No enterprise operator marker, defaulting to Community");

    Ok(PlatformType::Community)
}

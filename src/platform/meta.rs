//! Cluster metadata discovery
//!
//! [`Meta`] is produced once during the Init phase and is immutable afterward.
//! It is owned by the platform instance and injected into consumers; there is
//! deliberately no process-global mirror.

use k8s_openapi::api::core::v1::ConfigMap;
use kube::{Api, Client, Discovery};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::PlatformType;
use crate::{config, Result};

/// API group whose presence identifies an OpenShift distribution
const OPENSHIFT_CONFIG_GROUP: &str = "config.openshift.io";

/// ConfigMap holding the cluster install configuration (FIPS flag)
const INSTALL_CONFIG_NAME: &str = "cluster-config-v1";
const INSTALL_CONFIG_NAMESPACE: &str = "kube-system";

/// Discovered cluster facts, populated once during Init
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Meta {
    /// Resolved platform type
    pub platform: PlatformType,
    /// Running operator version
    pub version: String,
    /// Kubernetes distribution ("OpenShift" or "Kubernetes")
    pub distribution: String,
    /// Distribution version (API server git version)
    pub distribution_version: String,
    /// Whether the cluster runs in FIPS mode
    pub fips_enabled: bool,
}

/// Discover cluster metadata.
///
/// Individual discovery failures are logged and defaulted rather than fatal:
/// a cluster that hides its version or FIPS state is still serviceable. In
/// CI mode cluster discovery is short-circuited entirely.
pub async fn discover(client: &Client, platform: PlatformType) -> Result<Meta> {
    let version = config::operator_version();

    if config::ci_mode() {
        debug!("CI mode, skipping cluster discovery");
        return Ok(Meta {
            platform,
            version,
            distribution: "Kubernetes".to_string(),
            distribution_version: String::new(),
            fips_enabled: false,
        });
    }

    let distribution = match discover_distribution(client).await {
        Ok(distribution) => distribution,
        Err(err) => {
            warn!(error = %err, "unable to discover distribution, assuming Kubernetes");
            "Kubernetes".to_string()
        }
    };

    let distribution_version = match client.apiserver_version().await {
        Ok(version_info) => version_info.git_version,
        Err(err) => {
            warn!(error = %err, "unable to discover cluster version");
            String::new()
        }
    };

    let fips_enabled = match discover_fips_enabled(client).await {
        Ok(enabled) => enabled,
        Err(err) => {
            warn!(error = %err, "unable to determine FIPS status, defaulting to false");
            false
        }
    };

    let meta = Meta {
        platform,
        version,
        distribution,
        distribution_version,
        fips_enabled,
    };
    info!(
        platform = %meta.platform,
        version = %meta.version,
        distribution = %meta.distribution,
        distribution_version = %meta.distribution_version,
        fips = meta.fips_enabled,
        "Discovered cluster metadata"
    );
    Ok(meta)
}

/// Identify the distribution by probing for well-known API groups
async fn discover_distribution(client: &Client) -> Result<String> {
    let discovery = Discovery::new(client.clone()).run().await?;
    let is_openshift = discovery
        .groups()
        .any(|group| group.name() == OPENSHIFT_CONFIG_GROUP);

    Ok(if is_openshift {
        "OpenShift".to_string()
    } else {
        "Kubernetes".to_string()
    })
}

/// Check the cluster install-config for the FIPS flag
async fn discover_fips_enabled(client: &Client) -> Result<bool> {
    let api: Api<ConfigMap> = Api::namespaced(client.clone(), INSTALL_CONFIG_NAMESPACE);
    let Some(cm) = api.get_opt(INSTALL_CONFIG_NAME).await? else {
        return Ok(false);
    };

    let install_config = cm
        .data
        .as_ref()
        .and_then(|d| d.get("install-config"))
        .map(String::as_str)
        .unwrap_or_default();

    Ok(parse_fips_flag(install_config))
}

#[derive(Deserialize)]
struct InstallConfig {
    #[serde(default)]
    fips: bool,
}

/// Parse the FIPS flag out of an install-config YAML document.
///
/// Falls back to a case-insensitive string search when the document does not
/// unmarshal, since some distributions embed non-standard fields.
fn parse_fips_flag(install_config: &str) -> bool {
    if install_config.is_empty() {
        return false;
    }

    match serde_yaml::from_str::<InstallConfig>(install_config) {
        Ok(parsed) => parsed.fips,
        Err(_) => install_config.to_lowercase().contains("fips: true"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // FIPS Flag Parsing Stories
    // =========================================================================

    /// Story: a well-formed install-config yields its FIPS flag
    #[test]
    fn story_fips_flag_parses_from_yaml() {
        let config = "apiVersion: v1\nbaseDomain: example.com\nfips: true\n";
        assert!(parse_fips_flag(config));

        let config = "apiVersion: v1\nfips: false\n";
        assert!(!parse_fips_flag(config));
    }

    /// Story: a missing fips key defaults to disabled
    #[test]
    fn story_missing_fips_key_defaults_false() {
        let config = "apiVersion: v1\nbaseDomain: example.com\n";
        assert!(!parse_fips_flag(config));
        assert!(!parse_fips_flag(""));
    }

    /// Story: unparseable configs fall back to a string search
    ///
    /// Real install-configs sometimes carry vendor extensions that break the
    /// strict schema; the flag must still be honored.
    #[test]
    fn story_unparseable_config_falls_back_to_search() {
        let config = "{{ invalid yaml\nFIPS: TRUE\n";
        assert!(parse_fips_flag(config));

        let config = "{{ invalid yaml\nnothing here\n";
        assert!(!parse_fips_flag(config));
    }
}

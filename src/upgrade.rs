//! Upgrade-phase cleanup of obsoleted resources
//!
//! On startup, the previously deployed release is read from the FoundryInit
//! status (recorded by the init controller on every reconcile). A fresh
//! install (no prior release, or the zero version) performs no cleanup at
//! all; otherwise resources obsoleted by the version delta are removed.

use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{DeleteParams, DynamicObject, GroupVersionKind};
use kube::discovery::ApiResource;
use kube::{Api, Client};
use semver::Version;
use tracing::{debug, info};

use crate::controller::is_not_found;
use crate::crd::FoundryInit;
use crate::platform::Variant;
use crate::{Error, Result, DEFAULT_INIT_NAME};

/// Legacy monitoring ConfigMap replaced by the monitoring namespace defaults
const LEGACY_MONITORING_CONFIGMAP: &str = "foundry-monitoring-config";

/// Legacy webhook configuration replaced by the variant validators
const LEGACY_WEBHOOK_CONFIG: &str = "foundry-legacy-validator";

/// Legacy console link ConfigMap (managed variant only)
const LEGACY_CONSOLE_CONFIGMAP: &str = "foundry-console-link";

/// Releases older than this carry the legacy resources removed below
const LEGACY_CUTOFF: Version = Version::new(2, 0, 0);

/// Read the previously deployed release version from cluster state.
///
/// Returns `None` when no FoundryInit exists or no release was recorded -
/// both mean a fresh install.
pub async fn deployed_release(client: &Client) -> Result<Option<Version>> {
    let api: Api<FoundryInit> = Api::all(client.clone());
    let Some(init) = api.get_opt(DEFAULT_INIT_NAME).await? else {
        return Ok(None);
    };

    let Some(release) = init.status.and_then(|s| s.release) else {
        return Ok(None);
    };

    let version = Version::parse(&release.version).map_err(|err| {
        Error::upgrade(format!(
            "recorded release version '{}' is not valid semver: {err}",
            release.version
        ))
    })?;
    Ok(Some(version))
}

/// Returns true when the deployed version requires the legacy cleanup
fn needs_legacy_cleanup(deployed: &Version) -> bool {
    *deployed < LEGACY_CUTOFF
}

/// Run upgrade cleanup for the version delta between the deployed release and
/// the running operator.
///
/// A fresh install (no recorded release, or the zero version) is a no-op.
pub async fn run(client: &Client, variant: &Variant) -> Result<()> {
    let Some(deployed) = deployed_release(client).await? else {
        info!("no previously deployed release found, skipping upgrade cleanup");
        return Ok(());
    };

    if deployed == Version::new(0, 0, 0) {
        info!("previously deployed release is the zero version, skipping upgrade cleanup");
        return Ok(());
    }

    info!(deployed = %deployed, "running upgrade cleanup");

    if needs_legacy_cleanup(&deployed) {
        cleanup_legacy_resources(client, variant).await?;
    } else {
        debug!(deployed = %deployed, "no cleanup needed for this version delta");
    }

    Ok(())
}

/// Remove resources obsoleted by releases before the legacy cutoff
async fn cleanup_legacy_resources(client: &Client, variant: &Variant) -> Result<()> {
    delete_configmap(
        client,
        variant.monitoring_namespace,
        LEGACY_MONITORING_CONFIGMAP,
    )
    .await?;

    if variant.has_console_namespace() {
        delete_configmap(client, variant.console_namespace, LEGACY_CONSOLE_CONFIGMAP).await?;
    }

    delete_legacy_webhook_config(client).await?;

    Ok(())
}

/// Delete a ConfigMap, tolerating its absence
async fn delete_configmap(client: &Client, namespace: &str, name: &str) -> Result<()> {
    let api: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);
    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            info!(namespace = namespace, name = name, "deleted legacy ConfigMap");
            Ok(())
        }
        Err(err) if is_not_found(&err) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Delete the legacy ValidatingWebhookConfiguration, tolerating its absence
async fn delete_legacy_webhook_config(client: &Client) -> Result<()> {
    let gvk = GroupVersionKind {
        group: "admissionregistration.k8s.io".to_string(),
        version: "v1".to_string(),
        kind: "ValidatingWebhookConfiguration".to_string(),
    };
    let resource = ApiResource::from_gvk(&gvk);
    let api: Api<DynamicObject> = Api::all_with(client.clone(), &resource);

    match api.delete(LEGACY_WEBHOOK_CONFIG, &DeleteParams::default()).await {
        Ok(_) => {
            info!(name = LEGACY_WEBHOOK_CONFIG, "deleted legacy webhook configuration");
            Ok(())
        }
        Err(err) if is_not_found(&err) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Version Gating Stories
    // =========================================================================

    /// Story: pre-2.0 releases require the legacy cleanup
    #[test]
    fn story_old_releases_need_cleanup() {
        assert!(needs_legacy_cleanup(&Version::new(1, 8, 3)));
        assert!(needs_legacy_cleanup(&Version::new(0, 9, 0)));
    }

    /// Story: releases at or past the cutoff are left alone
    #[test]
    fn story_current_releases_need_no_cleanup() {
        assert!(!needs_legacy_cleanup(&Version::new(2, 0, 0)));
        assert!(!needs_legacy_cleanup(&Version::new(2, 4, 1)));
    }

    /// Story: an unparseable recorded version is an upgrade error
    ///
    /// Silent fallback could skip a required migration; the operator must
    /// fail loudly instead.
    #[test]
    fn story_bad_recorded_version_is_an_error() {
        let err = Version::parse("not-a-version").unwrap_err();
        let wrapped = Error::upgrade(format!(
            "recorded release version 'not-a-version' is not valid semver: {err}"
        ));
        assert!(wrapped.to_string().contains("not valid semver"));
    }
}

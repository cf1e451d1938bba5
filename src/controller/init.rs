//! FoundryInit controller implementation
//!
//! Reconciles the cluster-initialization singleton: ensures the platform
//! namespaces, the admin group binding, and the trusted CA bundle, then
//! records readiness and the running release in status. The recorded release
//! is what the Upgrade phase inspects on the next operator start.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kube::api::{Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::runtime::Controller;
use kube::{Api, Client, ResourceExt};
use tracing::{debug, info, instrument, warn};

use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
use k8s_openapi::api::rbac::v1::ClusterRoleBinding;

use super::{
    default_error_policy, log_reconcile_result, watcher_config, ControllerContext,
    ControllerFuture,
};
use crate::crd::{ConditionSet, FoundryInit, ReleaseInfo, CONDITION_READY};
use crate::{Result, DEFAULT_INIT_NAME, FIELD_MANAGER};

/// Label identifying the platform application namespace
const APPLICATION_NAMESPACE_LABEL: &str = "foundry.dev/application-namespace";

/// Name of the ClusterRoleBinding granting the admin group platform access
const ADMIN_GROUP_BINDING: &str = "foundry-platform-admins";

/// Name of the ConfigMap carrying the trusted CA bundle
const TRUSTED_CA_CONFIGMAP: &str = "foundry-trusted-ca-bundle";

/// Build the FoundryInit controller future
pub fn init_controller(ctx: Arc<ControllerContext>) -> ControllerFuture {
    let inits: Api<FoundryInit> = Api::all(ctx.client.clone());

    info!("- FoundryInit controller");

    Box::pin(
        Controller::new(inits, watcher_config())
            .shutdown_on_signal()
            .run(reconcile, default_error_policy, ctx)
            .for_each(log_reconcile_result("FoundryInit")),
    )
}

/// Reconcile the cluster-initialization singleton
#[instrument(skip_all, fields(name = %obj.name_any()))]
async fn reconcile(obj: Arc<FoundryInit>, ctx: Arc<ControllerContext>) -> Result<Action> {
    if obj.name_any() != DEFAULT_INIT_NAME {
        warn!(
            expected = DEFAULT_INIT_NAME,
            "ignoring FoundryInit with unexpected name"
        );
        return Ok(Action::await_change());
    }

    let client = &ctx.client;
    let variant = ctx.variant;

    // Application namespace: spec override wins, else the variant default
    let app_namespace = obj
        .spec
        .application_namespace
        .as_deref()
        .unwrap_or(variant.application_namespace);
    ensure_namespace(client, app_namespace, true).await?;

    if obj.spec.monitoring.is_enabled() {
        ensure_namespace(client, variant.monitoring_namespace, false).await?;
    }

    if variant.has_console_namespace() {
        ensure_namespace(client, variant.console_namespace, false).await?;
    }

    ensure_admin_group_binding(client, variant.admin_group).await?;

    if let Some(bundle) = &obj.spec.trusted_ca_bundle {
        ensure_trusted_ca_bundle(client, app_namespace, &bundle.custom_ca_bundle).await?;
    }

    // Record readiness and the running release
    let mut status = obj.status.clone().unwrap_or_default();
    let mut conditions = ConditionSet::from_existing(status.conditions.clone());
    conditions.mark_true(
        CONDITION_READY,
        "ReconcileComplete",
        "cluster initialization complete",
    );
    status.conditions = conditions.into_vec();
    status.release = Some(ReleaseInfo {
        name: variant.name.to_string(),
        version: ctx.meta.version.clone(),
    });

    if obj.status.as_ref() != Some(&status) {
        let api: Api<FoundryInit> = Api::all(client.clone());
        api.patch_status(
            DEFAULT_INIT_NAME,
            &PatchParams::apply(FIELD_MANAGER),
            &Patch::Merge(&serde_json::json!({ "status": status })),
        )
        .await?;
        debug!("init status updated");
    }

    Ok(Action::requeue(Duration::from_secs(120)))
}

/// Ensure a namespace exists via server-side apply
async fn ensure_namespace(client: &Client, name: &str, application: bool) -> Result<()> {
    let api: Api<Namespace> = Api::all(client.clone());

    let mut labels = serde_json::Map::new();
    if application {
        labels.insert(
            APPLICATION_NAMESPACE_LABEL.to_string(),
            serde_json::Value::String("true".to_string()),
        );
    }

    let ns = serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "labels": labels,
        }
    });

    api.patch(
        name,
        &PatchParams::apply(FIELD_MANAGER).force(),
        &Patch::Apply(&ns),
    )
    .await?;

    debug!(namespace = %name, "ensured namespace");
    Ok(())
}

/// Ensure the admin group ClusterRoleBinding exists via server-side apply
async fn ensure_admin_group_binding(client: &Client, admin_group: &str) -> Result<()> {
    let api: Api<ClusterRoleBinding> = Api::all(client.clone());

    let binding = serde_json::json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "ClusterRoleBinding",
        "metadata": { "name": ADMIN_GROUP_BINDING },
        "roleRef": {
            "apiGroup": "rbac.authorization.k8s.io",
            "kind": "ClusterRole",
            "name": "admin",
        },
        "subjects": [{
            "apiGroup": "rbac.authorization.k8s.io",
            "kind": "Group",
            "name": admin_group,
        }]
    });

    api.patch(
        ADMIN_GROUP_BINDING,
        &PatchParams::apply(FIELD_MANAGER).force(),
        &Patch::Apply(&binding),
    )
    .await?;

    debug!(group = %admin_group, "ensured admin group binding");
    Ok(())
}

/// Ensure the trusted CA bundle ConfigMap in the application namespace
async fn ensure_trusted_ca_bundle(client: &Client, namespace: &str, bundle: &str) -> Result<()> {
    let api: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);

    let cm = serde_json::json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": TRUSTED_CA_CONFIGMAP,
            "namespace": namespace,
        },
        "data": {
            "ca-bundle.crt": bundle,
        }
    });

    api.patch(
        TRUSTED_CA_CONFIGMAP,
        &PatchParams::apply(FIELD_MANAGER).force(),
        &Patch::Apply(&cm),
    )
    .await?;

    debug!(namespace = %namespace, "ensured trusted CA bundle");
    Ok(())
}

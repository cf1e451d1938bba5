//! Setup service handler
//!
//! Watches for uninstall trigger ConfigMaps in the operator namespace and
//! performs platform uninstall: the FoundryPlatform singleton is deleted, and
//! the operator subscription is deleted unless the variant's subscription
//! name is empty (the managed add-on's subscription is owned by the hosting
//! service and must be left alone).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{DeleteParams, DynamicObject, GroupVersionKind};
use kube::discovery::ApiResource;
use kube::runtime::controller::Action;
use kube::runtime::Controller;
use kube::{Api, Client, ResourceExt};
use tracing::{info, instrument, warn};

#[cfg(test)]
use mockall::automock;

use super::ServiceHandler;
use crate::controller::{
    default_error_policy, is_not_found, log_reconcile_result, watcher_config, ControllerContext,
    ControllerFuture,
};
use crate::crd::{FoundryInit, FoundryPlatform, ManagementState};
use crate::platform::{PlatformType, Variant};
use crate::registry::Named;
use crate::{Result, DEFAULT_PLATFORM_NAME, UNINSTALL_LABEL};

/// Handler for the setup/uninstall service
pub struct SetupService;

impl Named for SetupService {
    fn name(&self) -> &'static str {
        "setup"
    }
}

#[async_trait]
impl ServiceHandler for SetupService {
    fn init(&self, _platform: PlatformType) -> Result<()> {
        Ok(())
    }

    fn management_state(
        &self,
        _platform: PlatformType,
        _init: Option<&FoundryInit>,
    ) -> ManagementState {
        ManagementState::Managed
    }

    fn new_reconciler(&self, ctx: Arc<ControllerContext>) -> Result<ControllerFuture> {
        let configmaps: Api<ConfigMap> =
            Api::namespaced(ctx.client.clone(), &ctx.operator_namespace);
        let config = watcher_config().labels(&format!("{UNINSTALL_LABEL}=true"));

        info!("- setup (uninstall trigger) controller");

        Ok(Box::pin(
            Controller::new(configmaps, config)
                .shutdown_on_signal()
                .run(reconcile, default_error_policy, ctx)
                .for_each(log_reconcile_result("Setup")),
        ))
    }
}

/// Reconcile an uninstall trigger ConfigMap
#[instrument(skip_all, fields(name = %obj.name_any()))]
async fn reconcile(obj: Arc<ConfigMap>, ctx: Arc<ControllerContext>) -> Result<Action> {
    warn!(
        trigger = %obj.name_any(),
        "uninstall trigger found, removing platform resources"
    );

    let ops = ClusterUninstall {
        client: ctx.client.clone(),
        operator_namespace: ctx.operator_namespace.clone(),
    };
    run_uninstall(&ops, ctx.variant).await?;

    // Leave the trigger in place as an audit record; re-running uninstall is
    // idempotent.
    Ok(Action::requeue(Duration::from_secs(3600)))
}

/// Side-effecting operations performed during uninstall
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UninstallOps: Send + Sync {
    /// Delete the FoundryPlatform singleton
    async fn delete_platform_resource(&self) -> Result<()>;

    /// Delete the named operator subscription
    async fn delete_subscription(&self, name: &str) -> Result<()>;
}

/// Uninstall the platform according to the variant's ownership rules
pub async fn run_uninstall(ops: &dyn UninstallOps, variant: &Variant) -> Result<()> {
    ops.delete_platform_resource().await?;

    if variant.skip_subscription_delete() {
        info!(
            variant = variant.name,
            "subscription is externally owned, leaving it in place"
        );
    } else {
        ops.delete_subscription(variant.subscription_name).await?;
    }

    Ok(())
}

/// Real uninstall implementation backed by the Kubernetes API
pub struct ClusterUninstall {
    /// Kubernetes client
    pub client: Client,
    /// Namespace holding the operator subscription
    pub operator_namespace: String,
}

#[async_trait]
impl UninstallOps for ClusterUninstall {
    async fn delete_platform_resource(&self) -> Result<()> {
        let api: Api<FoundryPlatform> = Api::all(self.client.clone());
        match api.delete(DEFAULT_PLATFORM_NAME, &DeleteParams::default()).await {
            Ok(_) => {
                info!(name = DEFAULT_PLATFORM_NAME, "deleted FoundryPlatform");
                Ok(())
            }
            Err(err) if is_not_found(&err) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_subscription(&self, name: &str) -> Result<()> {
        // Subscriptions belong to the OLM API group; use a dynamic client so
        // the operator does not hard-depend on OLM types being present.
        let gvk = GroupVersionKind {
            group: "operators.coreos.com".to_string(),
            version: "v1alpha1".to_string(),
            kind: "Subscription".to_string(),
        };
        let resource = ApiResource::from_gvk(&gvk);
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), &self.operator_namespace, &resource);

        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => {
                info!(subscription = name, "deleted operator subscription");
                Ok(())
            }
            Err(err) if is_not_found(&err) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::variant::{MANAGED, SELF_MANAGED, VANILLA};
    use crate::Error;

    // =========================================================================
    // Uninstall Stories
    // =========================================================================

    /// Story: the managed variant never touches its subscription
    ///
    /// The managed add-on's subscription is owned by the hosting service; an
    /// empty subscription name on the variant encodes "skip on uninstall".
    #[tokio::test]
    async fn story_managed_uninstall_skips_subscription() {
        let mut ops = MockUninstallOps::new();
        ops.expect_delete_platform_resource()
            .times(1)
            .returning(|| Ok(()));
        // delete_subscription must not be called at all

        run_uninstall(&ops, &MANAGED).await.unwrap();
    }

    /// Story: self-managed uninstall deletes its own subscription by name
    #[tokio::test]
    async fn story_self_managed_uninstall_deletes_subscription() {
        let mut ops = MockUninstallOps::new();
        ops.expect_delete_platform_resource()
            .times(1)
            .returning(|| Ok(()));
        ops.expect_delete_subscription()
            .times(1)
            .withf(|name| name == "foundry-enterprise-operator")
            .returning(|_| Ok(()));

        run_uninstall(&ops, &SELF_MANAGED).await.unwrap();
    }

    /// Story: vanilla has no subscription to delete
    #[tokio::test]
    async fn story_vanilla_uninstall_skips_subscription() {
        let mut ops = MockUninstallOps::new();
        ops.expect_delete_platform_resource()
            .times(1)
            .returning(|| Ok(()));

        run_uninstall(&ops, &VANILLA).await.unwrap();
    }

    /// Story: a failed platform delete aborts before touching the subscription
    #[tokio::test]
    async fn story_platform_delete_failure_aborts_uninstall() {
        let mut ops = MockUninstallOps::new();
        ops.expect_delete_platform_resource()
            .times(1)
            .returning(|| Err(Error::validation("simulated delete failure")));

        let err = run_uninstall(&ops, &SELF_MANAGED).await.unwrap_err();
        assert!(err.to_string().contains("simulated delete failure"));
    }
}

//! FoundryPlatform controller implementation
//!
//! Reconciles the platform-components singleton: ensures the child component
//! CR for every enabled component (and removes it for disabled ones), then
//! runs the status aggregation pass across all registered component handlers.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kube::api::{Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::runtime::reflector::ObjectRef;
use kube::runtime::Controller;
use kube::{Api, ResourceExt};
use tracing::{debug, info, instrument, warn};

use super::{
    default_error_policy, log_reconcile_result, watcher_config, ControllerContext,
    ControllerFuture,
};
use crate::components::ComponentHandler;
use crate::crd::{
    ConditionSet, Dashboard, FoundryPlatform, ModelServing, Pipelines, ReleaseInfo, Workbenches,
};
use crate::registry::{Named, Registry};
use crate::status::{summarize_ready, ComponentReadiness};
use crate::{Result, DEFAULT_PLATFORM_NAME, FIELD_MANAGER};

/// Context for the FoundryPlatform controller: the shared controller context
/// plus the frozen component registry.
pub struct PlatformContext {
    /// Shared controller context
    pub base: Arc<ControllerContext>,
    /// Component handlers registered for the active variant
    pub components: Arc<Registry<Box<dyn ComponentHandler>>>,
}

/// Build the FoundryPlatform controller future.
///
/// Child component CRs are watched so a component flipping its own Ready
/// condition re-triggers aggregation on the parent immediately.
pub fn platform_controller(
    base: Arc<ControllerContext>,
    components: Arc<Registry<Box<dyn ComponentHandler>>>,
) -> ControllerFuture {
    let client = base.client.clone();
    let ctx = Arc::new(PlatformContext { base, components });

    let platforms: Api<FoundryPlatform> = Api::all(client.clone());
    let dashboards: Api<Dashboard> = Api::all(client.clone());
    let pipelines: Api<Pipelines> = Api::all(client.clone());
    let servings: Api<ModelServing> = Api::all(client.clone());
    let workbenches: Api<Workbenches> = Api::all(client);

    fn to_default(_: impl kube::Resource) -> Option<ObjectRef<FoundryPlatform>> {
        Some(ObjectRef::new(DEFAULT_PLATFORM_NAME))
    }

    info!("- FoundryPlatform controller");

    Box::pin(
        Controller::new(platforms, watcher_config())
            .watches(dashboards, watcher_config(), to_default)
            .watches(pipelines, watcher_config(), to_default)
            .watches(servings, watcher_config(), to_default)
            .watches(workbenches, watcher_config(), to_default)
            .shutdown_on_signal()
            .run(reconcile, default_error_policy, ctx)
            .for_each(log_reconcile_result("FoundryPlatform")),
    )
}

/// Reconcile the platform-components singleton
#[instrument(skip_all, fields(name = %obj.name_any()))]
async fn reconcile(obj: Arc<FoundryPlatform>, ctx: Arc<PlatformContext>) -> Result<Action> {
    if obj.name_any() != DEFAULT_PLATFORM_NAME {
        warn!(
            expected = DEFAULT_PLATFORM_NAME,
            "ignoring FoundryPlatform with unexpected name"
        );
        return Ok(Action::await_change());
    }

    let client = &ctx.base.client;
    let spec = &obj.spec;

    // Drive child CR existence from enablement
    for handler in ctx.components.iter() {
        if handler.is_enabled(spec) {
            handler.ensure_cr(client, spec).await?;
        } else {
            handler.delete_cr(client).await?;
        }
    }

    // Aggregate per-component status onto the parent
    let mut status = obj.status.clone().unwrap_or_default();
    let mut conditions = ConditionSet::from_existing(status.conditions.clone());
    let mut readiness = Vec::with_capacity(ctx.components.len());

    for handler in ctx.components.iter() {
        let aggregate = handler
            .update_status(client, spec, &mut status, &mut conditions)
            .await?;
        readiness.push(ComponentReadiness {
            name: handler.name(),
            enabled: handler.is_enabled(spec),
            status: aggregate,
        });
    }

    summarize_ready(&mut conditions, &readiness);
    status.conditions = conditions.into_vec();
    status.release = Some(ReleaseInfo {
        name: ctx.base.variant.name.to_string(),
        version: ctx.base.meta.version.clone(),
    });

    if obj.status.as_ref() != Some(&status) {
        let api: Api<FoundryPlatform> = Api::all(client.clone());
        api.patch_status(
            DEFAULT_PLATFORM_NAME,
            &PatchParams::apply(FIELD_MANAGER),
            &Patch::Merge(&serde_json::json!({ "status": status })),
        )
        .await?;
        debug!("platform status updated");
    }

    Ok(Action::requeue(Duration::from_secs(60)))
}

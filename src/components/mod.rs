//! Component handlers
//!
//! A component handler is the self-contained unit implementing
//! init/enablement/reconciler-registration for one platform component.
//! Handlers are assembled into explicit per-variant constructor lists by
//! [`crate::platform::PlatformInstance`]; there is no import-side-effect
//! self-registration.

mod dashboard;
mod model_serving;
mod pipelines;
mod workbenches;

pub use dashboard::DashboardHandler;
pub use model_serving::ModelServingHandler;
pub use pipelines::PipelinesHandler;
pub use workbenches::WorkbenchesHandler;

use std::sync::Arc;

use async_trait::async_trait;
use kube::api::{DeleteParams, Patch, PatchParams};
use kube::{Api, Client};
use tracing::debug;

use crate::controller::component::ReconcilableComponent;
use crate::controller::{is_not_found, ControllerContext, ControllerFuture};
use crate::crd::{
    ComponentCr, ConditionSet, ConditionStatus, FoundryPlatformSpec, FoundryPlatformStatus,
};
use crate::platform::PlatformType;
use crate::registry::Named;
use crate::{Result, FIELD_MANAGER};

/// A self-contained unit managing one platform component.
///
/// Registered once into the component registry at startup; invoked by the
/// Init phase (`init`), the Run phase (`new_reconciler`), and the
/// FoundryPlatform controller (`is_enabled`, `ensure_cr`, `delete_cr`,
/// `update_status`).
#[async_trait]
pub trait ComponentHandler: Named + Send + Sync {
    /// One-time initialization during the platform Init phase
    fn init(&self, platform: PlatformType) -> Result<()>;

    /// Whether the parent spec enables this component
    fn is_enabled(&self, spec: &FoundryPlatformSpec) -> bool;

    /// Create or update the component's child CR from the parent spec
    async fn ensure_cr(&self, client: &Client, spec: &FoundryPlatformSpec) -> Result<()>;

    /// Delete the component's child CR (no-op when absent)
    async fn delete_cr(&self, client: &Client) -> Result<()>;

    /// Build the component's controller future for the Run phase
    fn new_reconciler(&self, ctx: Arc<ControllerContext>) -> Result<ControllerFuture>;

    /// Contribute this component's slice of the parent status.
    ///
    /// Performs the live read of the child CR; a read failure other than
    /// not-found aborts this component's update for the cycle without error.
    async fn update_status(
        &self,
        client: &Client,
        spec: &FoundryPlatformSpec,
        status: &mut FoundryPlatformStatus,
        conditions: &mut ConditionSet,
    ) -> Result<ConditionStatus>;
}

/// Server-side apply a component's singleton CR
pub(crate) async fn apply_component_cr<C: ReconcilableComponent>(
    client: &Client,
    cr: &C,
) -> Result<()> {
    let api: Api<C> = Api::all(client.clone());
    api.patch(
        C::INSTANCE,
        &PatchParams::apply(FIELD_MANAGER).force(),
        &Patch::Apply(cr),
    )
    .await?;
    debug!(component = C::COMPONENT, "ensured component CR");
    Ok(())
}

/// Delete a component's singleton CR, tolerating its absence
pub(crate) async fn delete_component_cr<C: ReconcilableComponent>(client: &Client) -> Result<()> {
    let api: Api<C> = Api::all(client.clone());
    match api.delete(C::INSTANCE, &DeleteParams::default()).await {
        Ok(_) => {
            debug!(component = C::COMPONENT, "deleted component CR");
            Ok(())
        }
        Err(err) if is_not_found(&err) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Best-effort read of a component's singleton CR for status aggregation.
///
/// Returns `None` when the read failed with anything other than not-found;
/// the caller must then skip this component's status update for the cycle.
/// `Some(None)` means the CR does not exist.
pub(crate) async fn read_component_cr<C: ReconcilableComponent>(
    client: &Client,
) -> Option<Option<C>> {
    let api: Api<C> = Api::all(client.clone());
    match api.get_opt(C::INSTANCE).await {
        Ok(live) => Some(live),
        Err(err) => {
            debug!(
                component = C::COMPONENT,
                error = %err,
                "component read failed, skipping status update this cycle"
            );
            None
        }
    }
}

//! Workbenches component handler

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use kube::Client;

use super::{
    apply_component_cr, delete_component_cr, read_component_cr, ComponentHandler,
};
use crate::controller::component::component_controller;
use crate::controller::{ControllerContext, ControllerFuture};
use crate::crd::{
    ComponentCr, ComponentStatusEntry, ConditionSet, ConditionStatus, FoundryPlatformSpec,
    FoundryPlatformStatus, ManagementState, Workbenches, WorkbenchesSpec,
    MANAGEMENT_STATE_ANNOTATION,
};
use crate::platform::PlatformType;
use crate::registry::Named;
use crate::status::mirror_component_status;
use crate::Result;

/// Handler for the user workbenches component
pub struct WorkbenchesHandler;

impl Named for WorkbenchesHandler {
    fn name(&self) -> &'static str {
        Workbenches::COMPONENT
    }
}

/// Build the desired Workbenches CR from the parent spec
fn desired_cr(spec: &FoundryPlatformSpec) -> Workbenches {
    let selector = &spec.components.workbenches;
    let mut cr = Workbenches::new(
        Workbenches::INSTANCE,
        WorkbenchesSpec {
            notebook_namespace: selector.notebook_namespace.clone(),
        },
    );
    cr.metadata.annotations = Some(BTreeMap::from([(
        MANAGEMENT_STATE_ANNOTATION.to_string(),
        ManagementState::normalize(selector.management_state).to_string(),
    )]));
    cr
}

#[async_trait]
impl ComponentHandler for WorkbenchesHandler {
    fn init(&self, _platform: PlatformType) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self, spec: &FoundryPlatformSpec) -> bool {
        ManagementState::normalize(spec.components.workbenches.management_state).is_managed()
    }

    async fn ensure_cr(&self, client: &Client, spec: &FoundryPlatformSpec) -> Result<()> {
        apply_component_cr(client, &desired_cr(spec)).await
    }

    async fn delete_cr(&self, client: &Client) -> Result<()> {
        delete_component_cr::<Workbenches>(client).await
    }

    fn new_reconciler(&self, ctx: Arc<ControllerContext>) -> Result<ControllerFuture> {
        Ok(component_controller::<Workbenches>(ctx))
    }

    async fn update_status(
        &self,
        client: &Client,
        spec: &FoundryPlatformSpec,
        status: &mut FoundryPlatformStatus,
        conditions: &mut ConditionSet,
    ) -> Result<ConditionStatus> {
        let Some(live) = read_component_cr::<Workbenches>(client).await else {
            return Ok(ConditionStatus::Unknown);
        };

        let outcome = mirror_component_status(
            live.as_ref(),
            spec.components.workbenches.management_state,
            conditions,
        );
        status.components.workbenches = ComponentStatusEntry {
            management_state: Some(outcome.management_state),
            release: outcome.release,
        };
        Ok(outcome.aggregate)
    }
}

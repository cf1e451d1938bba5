//! Model serving component handler
//!
//! Model serving is the one component available on every platform flavor,
//! including vanilla Kubernetes.

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
    FoundryPlatformStatus, ManagementState, ModelServing, ModelServingSpec,
    MANAGEMENT_STATE_ANNOTATION,
};
use crate::platform::PlatformType;
use crate::registry::Named;
use crate::status::mirror_component_status;
use crate::Result;

/// Fallback serving runtime when the parent spec names none
const DEFAULT_RUNTIME_IMAGE: &str = "foundry-serving-runtime:latest";

/// Handler for the model serving component
pub struct ModelServingHandler;

impl Named for ModelServingHandler {
    fn name(&self) -> &'static str {
        ModelServing::COMPONENT
    }
}

/// Build the desired ModelServing CR from the parent spec
fn desired_cr(spec: &FoundryPlatformSpec) -> ModelServing {
    let selector = &spec.components.model_serving;
    let mut cr = ModelServing::new(
        ModelServing::INSTANCE,
        ModelServingSpec {
            default_runtime: Some(
                selector
                    .default_runtime
                    .clone()
                    .unwrap_or_else(|| DEFAULT_RUNTIME_IMAGE.to_string()),
            ),
        },
    );
    cr.metadata.annotations = Some(BTreeMap::from([(
        MANAGEMENT_STATE_ANNOTATION.to_string(),
        ManagementState::normalize(selector.management_state).to_string(),
    )]));
    cr
}

#[async_trait]
impl ComponentHandler for ModelServingHandler {
    fn init(&self, _platform: PlatformType) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self, spec: &FoundryPlatformSpec) -> bool {
        ManagementState::normalize(spec.components.model_serving.management_state).is_managed()
    }

    async fn ensure_cr(&self, client: &Client, spec: &FoundryPlatformSpec) -> Result<()> {
        apply_component_cr(client, &desired_cr(spec)).await
    }

    async fn delete_cr(&self, client: &Client) -> Result<()> {
        delete_component_cr::<ModelServing>(client).await
    }

    fn new_reconciler(&self, ctx: Arc<ControllerContext>) -> Result<ControllerFuture> {
        Ok(component_controller::<ModelServing>(ctx))
    }

    async fn update_status(
        &self,
        client: &Client,
        spec: &FoundryPlatformSpec,
        status: &mut FoundryPlatformStatus,
        conditions: &mut ConditionSet,
    ) -> Result<ConditionStatus> {
        let Some(live) = read_component_cr::<ModelServing>(client).await else {
            return Ok(ConditionStatus::Unknown);
        };

        let outcome = mirror_component_status(
            live.as_ref(),
            spec.components.model_serving.management_state,
            conditions,
        );
        status.components.model_serving = ComponentStatusEntry {
            management_state: Some(outcome.management_state),
            release: outcome.release,
        };
        Ok(outcome.aggregate)
    }
}

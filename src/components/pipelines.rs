//! Pipelines component handler

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
    FoundryPlatformStatus, ManagementState, Pipelines, PipelinesSpec,
    MANAGEMENT_STATE_ANNOTATION,
};
use crate::platform::PlatformType;
use crate::registry::Named;
use crate::status::mirror_component_status;
use crate::Result;

/// Handler for the ML pipelines component
pub struct PipelinesHandler;

impl Named for PipelinesHandler {
    fn name(&self) -> &'static str {
        Pipelines::COMPONENT
    }
}

/// Build the desired Pipelines CR from the parent spec
fn desired_cr(spec: &FoundryPlatformSpec) -> Pipelines {
    let selector = &spec.components.pipelines;
    let mut cr = Pipelines::new(
        Pipelines::INSTANCE,
        PipelinesSpec {
            artifact_bucket: selector.artifact_bucket.clone(),
        },
    );
    cr.metadata.annotations = Some(BTreeMap::from([(
        MANAGEMENT_STATE_ANNOTATION.to_string(),
        ManagementState::normalize(selector.management_state).to_string(),
    )]));
    cr
}

#[async_trait]
impl ComponentHandler for PipelinesHandler {
    fn init(&self, _platform: PlatformType) -> Result<()> {
        // Artifact storage is validated at reconcile time, not at startup
        Ok(())
    }

    fn is_enabled(&self, spec: &FoundryPlatformSpec) -> bool {
        ManagementState::normalize(spec.components.pipelines.management_state).is_managed()
    }

    async fn ensure_cr(&self, client: &Client, spec: &FoundryPlatformSpec) -> Result<()> {
        apply_component_cr(client, &desired_cr(spec)).await
    }

    async fn delete_cr(&self, client: &Client) -> Result<()> {
        delete_component_cr::<Pipelines>(client).await
    }

    fn new_reconciler(&self, ctx: Arc<ControllerContext>) -> Result<ControllerFuture> {
        Ok(component_controller::<Pipelines>(ctx))
    }

    async fn update_status(
        &self,
        client: &Client,
        spec: &FoundryPlatformSpec,
        status: &mut FoundryPlatformStatus,
        conditions: &mut ConditionSet,
    ) -> Result<ConditionStatus> {
        let Some(live) = read_component_cr::<Pipelines>(client).await else {
            return Ok(ConditionStatus::Unknown);
        };

        let outcome = mirror_component_status(
            live.as_ref(),
            spec.components.pipelines.management_state,
            conditions,
        );
        status.components.pipelines = ComponentStatusEntry {
            management_state: Some(outcome.management_state),
            release: outcome.release,
        };
        Ok(outcome.aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::PipelinesSelector;

    fn spec_with_bucket(state: Option<ManagementState>) -> FoundryPlatformSpec {
        FoundryPlatformSpec {
            components: crate::crd::ComponentsSpec {
                pipelines: PipelinesSelector {
                    management_state: state,
                    artifact_bucket: Some("ml-artifacts".to_string()),
                },
                ..Default::default()
            },
        }
    }

    /// Story: enablement follows the normalized management state
    #[test]
    fn story_enablement_from_management_state() {
        let handler = PipelinesHandler;
        assert!(handler.is_enabled(&spec_with_bucket(Some(ManagementState::Managed))));
        assert!(!handler.is_enabled(&spec_with_bucket(None)));
    }

    /// Story: the artifact bucket flows into the generated CR
    #[test]
    fn story_desired_cr_carries_artifact_bucket() {
        let cr = desired_cr(&spec_with_bucket(Some(ManagementState::Managed)));
        assert_eq!(cr.spec.artifact_bucket.as_deref(), Some("ml-artifacts"));
        assert_eq!(cr.metadata.name.as_deref(), Some(Pipelines::INSTANCE));
    }
}

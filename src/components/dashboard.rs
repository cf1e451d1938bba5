//! Dashboard component handler

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
    ComponentCr, ComponentStatusEntry, ConditionSet, ConditionStatus, Dashboard, DashboardSpec,
    FoundryPlatformSpec, FoundryPlatformStatus, ManagementState, MANAGEMENT_STATE_ANNOTATION,
};
use crate::platform::PlatformType;
use crate::registry::Named;
use crate::status::mirror_component_status;
use crate::Result;

/// Handler for the web dashboard component
pub struct DashboardHandler;

impl Named for DashboardHandler {
    fn name(&self) -> &'static str {
        Dashboard::COMPONENT
    }
}

/// Build the desired Dashboard CR from the parent spec
fn desired_cr(spec: &FoundryPlatformSpec) -> Dashboard {
    let selector = &spec.components.dashboard;
    let mut cr = Dashboard::new(
        Dashboard::INSTANCE,
        DashboardSpec {
            title: selector.title.clone(),
        },
    );
    cr.metadata.annotations = Some(BTreeMap::from([(
        MANAGEMENT_STATE_ANNOTATION.to_string(),
        ManagementState::normalize(selector.management_state).to_string(),
    )]));
    cr
}

#[async_trait]
impl ComponentHandler for DashboardHandler {
    fn init(&self, _platform: PlatformType) -> Result<()> {
        // Dashboard manifests ship with the operator image, nothing to stage
        Ok(())
    }

    fn is_enabled(&self, spec: &FoundryPlatformSpec) -> bool {
        ManagementState::normalize(spec.components.dashboard.management_state).is_managed()
    }

    async fn ensure_cr(&self, client: &Client, spec: &FoundryPlatformSpec) -> Result<()> {
        apply_component_cr(client, &desired_cr(spec)).await
    }

    async fn delete_cr(&self, client: &Client) -> Result<()> {
        delete_component_cr::<Dashboard>(client).await
    }

    fn new_reconciler(&self, ctx: Arc<ControllerContext>) -> Result<ControllerFuture> {
        Ok(component_controller::<Dashboard>(ctx))
    }

    async fn update_status(
        &self,
        client: &Client,
        spec: &FoundryPlatformSpec,
        status: &mut FoundryPlatformStatus,
        conditions: &mut ConditionSet,
    ) -> Result<ConditionStatus> {
        let Some(live) = read_component_cr::<Dashboard>(client).await else {
            return Ok(ConditionStatus::Unknown);
        };

        let outcome = mirror_component_status(
            live.as_ref(),
            spec.components.dashboard.management_state,
            conditions,
        );
        status.components.dashboard = ComponentStatusEntry {
            management_state: Some(outcome.management_state),
            release: outcome.release,
        };
        Ok(outcome.aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::DashboardSelector;

    fn spec_with_state(state: Option<ManagementState>) -> FoundryPlatformSpec {
        FoundryPlatformSpec {
            components: crate::crd::ComponentsSpec {
                dashboard: DashboardSelector {
                    management_state: state,
                    title: Some("Team ML".to_string()),
                },
                ..Default::default()
            },
        }
    }

    /// Story: enablement follows the normalized management state
    #[test]
    fn story_enablement_from_management_state() {
        let handler = DashboardHandler;
        assert!(handler.is_enabled(&spec_with_state(Some(ManagementState::Managed))));
        assert!(!handler.is_enabled(&spec_with_state(Some(ManagementState::Removed))));
        assert!(!handler.is_enabled(&spec_with_state(None)));
    }

    /// Story: the generated CR carries the parent's fields and state annotation
    #[test]
    fn story_desired_cr_mirrors_parent_spec() {
        let cr = desired_cr(&spec_with_state(Some(ManagementState::Managed)));

        assert_eq!(cr.metadata.name.as_deref(), Some(Dashboard::INSTANCE));
        assert_eq!(cr.spec.title.as_deref(), Some("Team ML"));
        assert_eq!(
            cr.metadata
                .annotations
                .as_ref()
                .and_then(|a| a.get(MANAGEMENT_STATE_ANNOTATION))
                .map(String::as_str),
            Some("Managed")
        );
    }
}

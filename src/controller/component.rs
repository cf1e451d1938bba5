//! Generic component CR reconciler
//!
//! Every component CR is reconciled the same way: observe the Deployments
//! labeled as belonging to the component in the application namespace, derive
//! a DeploymentsAvailable condition, mirror it onto the component's Ready
//! condition, and record the installed release. Component handlers instantiate
//! this controller for their concrete CR type.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use kube::api::{ListParams, Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::runtime::reflector::ObjectRef;
use kube::runtime::Controller;
use kube::{Api, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{
    default_error_policy, log_reconcile_result, watcher_config, ControllerContext,
    ControllerFuture,
};
use crate::crd::{
    ComponentCr, ComponentCrStatus, ComponentReleaseStatus, Condition, ConditionSet,
    ConditionStatus, CONDITION_DEPLOYMENTS_AVAILABLE, CONDITION_READY,
};
use crate::{Result, FIELD_MANAGER, PART_OF_LABEL};

/// Bounds a component CR type must satisfy to be reconciled generically
pub trait ReconcilableComponent:
    ComponentCr
    + kube::Resource<DynamicType = (), Scope = k8s_openapi::ClusterResourceScope>
    + Clone
    + DeserializeOwned
    + Serialize
    + Debug
    + Send
    + Sync
    + 'static
{
}

impl<C> ReconcilableComponent for C where
    C: ComponentCr
        + kube::Resource<DynamicType = (), Scope = k8s_openapi::ClusterResourceScope>
        + Clone
        + DeserializeOwned
        + Serialize
        + Debug
        + Send
        + Sync
        + 'static
{
}

/// Build a controller future for a component CR type.
///
/// The controller also watches Deployments in the application namespace so a
/// rollout flips the component's conditions without waiting for the periodic
/// requeue.
pub fn component_controller<C: ReconcilableComponent>(
    ctx: Arc<ControllerContext>,
) -> ControllerFuture {
    let api: Api<C> = Api::all(ctx.client.clone());
    let deployments: Api<Deployment> =
        Api::namespaced(ctx.client.clone(), ctx.variant.application_namespace);

    tracing::info!("- {} controller", C::KIND);

    Box::pin(
        Controller::new(api, watcher_config())
            .watches(deployments, watcher_config(), |deployment| {
                let part_of = deployment
                    .metadata
                    .labels
                    .as_ref()
                    .and_then(|labels| labels.get(PART_OF_LABEL))
                    .map(String::as_str);
                (part_of == Some(C::COMPONENT)).then(|| ObjectRef::<C>::new(C::INSTANCE))
            })
            .shutdown_on_signal()
            .run(reconcile::<C>, default_error_policy, ctx)
            .for_each(log_reconcile_result(C::KIND)),
    )
}

/// Reconcile one component CR from observed Deployments
async fn reconcile<C: ReconcilableComponent>(
    obj: Arc<C>,
    ctx: Arc<ControllerContext>,
) -> Result<Action> {
    let name = obj.name_any();
    if name != C::INSTANCE {
        debug!(kind = C::KIND, name = %name, "ignoring non-default instance");
        return Ok(Action::await_change());
    }

    let deployments: Api<Deployment> =
        Api::namespaced(ctx.client.clone(), ctx.variant.application_namespace);
    let selector = format!("{PART_OF_LABEL}={}", C::COMPONENT);
    let list = deployments
        .list(&ListParams::default().labels(&selector))
        .await?;

    let (total, available) = deployment_summary(&list.items);

    let mut conditions = ConditionSet::from_existing(obj.conditions().to_vec());
    mark_availability(&mut conditions, C::KIND, total, available);

    let release = ComponentReleaseStatus {
        name: C::COMPONENT.to_string(),
        version: ctx.meta.version.clone(),
    };

    let status = ComponentCrStatus {
        conditions: conditions.into_vec(),
        release: Some(release),
    };

    // Only write when something actually changed; condition timestamps are
    // preserved for unchanged content, so this keeps reconciles quiet.
    let unchanged =
        obj.conditions() == status.conditions.as_slice() && obj.release() == status.release.as_ref();
    if !unchanged {
        let api: Api<C> = Api::all(ctx.client.clone());
        api.patch_status(
            C::INSTANCE,
            &PatchParams::apply(FIELD_MANAGER),
            &Patch::Merge(&serde_json::json!({ "status": status })),
        )
        .await?;
    }

    Ok(Action::requeue(Duration::from_secs(60)))
}

/// Count total and available Deployments
fn deployment_summary(deployments: &[Deployment]) -> (usize, usize) {
    let available = deployments.iter().filter(|d| deployment_available(d)).count();
    (deployments.len(), available)
}

/// A Deployment is available when its Available condition is True
fn deployment_available(deployment: &Deployment) -> bool {
    deployment
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Available" && c.status == "True")
        })
        .unwrap_or(false)
}

/// Derive DeploymentsAvailable and Ready conditions from observed counts
fn mark_availability(conditions: &mut ConditionSet, kind: &str, total: usize, available: usize) {
    let availability = if total == 0 {
        Condition::new(
            CONDITION_DEPLOYMENTS_AVAILABLE,
            ConditionStatus::False,
            "NoDeployments",
            format!("no deployments found for {kind}"),
        )
    } else if available == total {
        Condition::new(
            CONDITION_DEPLOYMENTS_AVAILABLE,
            ConditionStatus::True,
            "Available",
            format!("{available}/{total} deployments available"),
        )
    } else {
        Condition::new(
            CONDITION_DEPLOYMENTS_AVAILABLE,
            ConditionStatus::False,
            "DeploymentsNotReady",
            format!("{available}/{total} deployments available"),
        )
    };

    // Ready mirrors deployment availability; richer health checks can feed in
    // additional conditions later without changing the mirroring contract.
    conditions.mark_from(CONDITION_READY, &availability);
    conditions.set(availability);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::ConditionStatus;
    use k8s_openapi::api::apps::v1::DeploymentStatus;
    use k8s_openapi::api::apps::v1::DeploymentCondition;

    fn deployment(available: bool) -> Deployment {
        Deployment {
            status: Some(DeploymentStatus {
                conditions: Some(vec![DeploymentCondition {
                    type_: "Available".to_string(),
                    status: if available { "True" } else { "False" }.to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    // =========================================================================
    // Deployment Observation Stories
    // =========================================================================

    /// Story: availability counts only Deployments whose Available condition is True
    #[test]
    fn story_deployment_summary_counts_available() {
        let deployments = vec![deployment(true), deployment(false), deployment(true)];
        assert_eq!(deployment_summary(&deployments), (3, 2));
    }

    /// Story: a Deployment without status is not available
    #[test]
    fn story_statusless_deployment_is_unavailable() {
        assert!(!deployment_available(&Deployment::default()));
    }

    /// Story: a fully rolled out component becomes Ready
    #[test]
    fn story_all_available_marks_ready() {
        let mut conditions = ConditionSet::default();
        mark_availability(&mut conditions, "Dashboard", 2, 2);

        let availability = conditions.find(CONDITION_DEPLOYMENTS_AVAILABLE).unwrap();
        assert_eq!(availability.status, ConditionStatus::True);
        assert_eq!(availability.reason, "Available");

        let ready = conditions.find(CONDITION_READY).unwrap();
        assert_eq!(ready.status, ConditionStatus::True);
        assert_eq!(ready.reason, "Available");
        assert_eq!(ready.message, "2/2 deployments available");
    }

    /// Story: a partial rollout reports the exact counts
    #[test]
    fn story_partial_rollout_is_not_ready() {
        let mut conditions = ConditionSet::default();
        mark_availability(&mut conditions, "Pipelines", 3, 1);

        let ready = conditions.find(CONDITION_READY).unwrap();
        assert_eq!(ready.status, ConditionStatus::False);
        assert_eq!(ready.reason, "DeploymentsNotReady");
        assert_eq!(ready.message, "1/3 deployments available");
    }

    /// Story: a component with no workloads yet is explicitly not ready
    #[test]
    fn story_no_deployments_is_not_ready() {
        let mut conditions = ConditionSet::default();
        mark_availability(&mut conditions, "Workbenches", 0, 0);

        let ready = conditions.find(CONDITION_READY).unwrap();
        assert_eq!(ready.status, ConditionStatus::False);
        assert_eq!(ready.reason, "NoDeployments");
    }
}

//! Gateway service handler
//!
//! Reconciles GatewayConfig resources: verifies the configured TLS
//! certificate source and maintains the Ready condition.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::runtime::Controller;
use kube::{Api, ResourceExt};
use tracing::{debug, info, instrument};

use super::ServiceHandler;
use crate::controller::{
    default_error_policy, log_reconcile_result, watcher_config, ControllerContext,
    ControllerFuture,
};
use crate::crd::{
    CertificateSpec, CertificateType, Condition, ConditionSet, ConditionStatus, FoundryInit,
    GatewayConfig, GatewayConfigStatus, ManagementState, CONDITION_READY,
};
use crate::platform::PlatformType;
use crate::registry::Named;
use crate::{Result, FIELD_MANAGER};

/// Handler for the platform ingress gateway service
pub struct GatewayService;

impl Named for GatewayService {
    fn name(&self) -> &'static str {
        "gateway"
    }
}

#[async_trait]
impl ServiceHandler for GatewayService {
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
        let gateways: Api<GatewayConfig> = Api::all(ctx.client.clone());

        info!("- GatewayConfig controller");

        Ok(Box::pin(
            Controller::new(gateways, watcher_config())
                .shutdown_on_signal()
                .run(reconcile, default_error_policy, ctx)
                .for_each(log_reconcile_result("GatewayConfig")),
        ))
    }
}

/// Reconcile one GatewayConfig
#[instrument(skip_all, fields(name = %obj.name_any()))]
async fn reconcile(obj: Arc<GatewayConfig>, ctx: Arc<ControllerContext>) -> Result<Action> {
    let name = obj.name_any();

    // Certificate readiness: a provided certificate must exist as a Secret in
    // the operator namespace; the cluster default needs no verification.
    let ready = match &obj.spec.certificate {
        None | Some(CertificateSpec {
            cert_type: CertificateType::ClusterDefault,
            ..
        }) => Condition::new(
            CONDITION_READY,
            ConditionStatus::True,
            "Available",
            "gateway uses the cluster default certificate",
        ),
        Some(CertificateSpec {
            cert_type: CertificateType::Provided,
            secret_name,
        }) => match secret_name.as_deref() {
            None => Condition::new(
                CONDITION_READY,
                ConditionStatus::False,
                "SecretNotConfigured",
                "certificate type is Provided but no secretName is set",
            ),
            Some(secret_name) => {
                let secrets: Api<Secret> =
                    Api::namespaced(ctx.client.clone(), &ctx.operator_namespace);
                if secrets.get_opt(secret_name).await?.is_some() {
                    Condition::new(
                        CONDITION_READY,
                        ConditionStatus::True,
                        "Available",
                        format!("certificate secret {secret_name} found"),
                    )
                } else {
                    Condition::new(
                        CONDITION_READY,
                        ConditionStatus::False,
                        "SecretNotFound",
                        format!(
                            "certificate secret {secret_name} not found in {}",
                            ctx.operator_namespace
                        ),
                    )
                }
            }
        },
    };

    let mut conditions = ConditionSet::from_existing(
        obj.status
            .as_ref()
            .map(|s| s.conditions.clone())
            .unwrap_or_default(),
    );
    conditions.set(ready);

    let status = GatewayConfigStatus {
        conditions: conditions.into_vec(),
    };

    if obj.status.as_ref() != Some(&status) {
        let api: Api<GatewayConfig> = Api::all(ctx.client.clone());
        api.patch_status(
            &name,
            &PatchParams::apply(FIELD_MANAGER),
            &Patch::Merge(&serde_json::json!({ "status": status })),
        )
        .await?;
        debug!("gateway status updated");
    }

    Ok(Action::requeue(Duration::from_secs(120)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Story: the gateway service is managed on every platform flavor
    #[test]
    fn story_gateway_is_always_managed() {
        let service = GatewayService;
        for platform in PlatformType::ALL {
            assert_eq!(
                service.management_state(platform, None),
                ManagementState::Managed
            );
        }
    }
}

//! Default resource creation, driven by the per-variant policy table
//!
//! Whether each default resource (FoundryInit, FoundryPlatform, GatewayConfig)
//! is created, and whether a creation failure blocks startup, is declared in
//! one place: [`DefaultResources`] on the [`Variant`](super::Variant). The
//! managed variant requires everything; non-managed variants create the
//! initialization default best-effort while the gateway default remains
//! blocking.

use kube::api::PostParams;
use kube::{Api, Client};
use tracing::{error, info};

use super::Variant;
use crate::crd::{
    CertificateSpec, CertificateType, ComponentsSpec, DashboardSelector, FoundryInit,
    FoundryInitSpec, FoundryPlatform, FoundryPlatformSpec, GatewayConfig, GatewayConfigSpec,
    ManagementState, ModelServingSelector, MonitoringSpec, PipelinesSelector, WorkbenchesSelector,
};
use crate::{Result, DEFAULT_GATEWAY_NAME, DEFAULT_INIT_NAME, DEFAULT_PLATFORM_NAME};

/// How a default resource is created for a variant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreatePolicy {
    /// Creation failure blocks the startup task
    Require,
    /// Creation failure is logged and ignored; honors the disable toggle
    BestEffort,
    /// The resource is not created at all
    Skip,
}

/// Declarative default-resource policy table, one per variant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefaultResources {
    /// Policy for the default FoundryInit
    pub init: CreatePolicy,
    /// Policy for the default FoundryPlatform
    pub platform: CreatePolicy,
    /// Policy for the default GatewayConfig
    pub gateway: CreatePolicy,
}

/// Apply the disable toggle to a policy.
///
/// Only best-effort creation can be disabled: a variant that requires a
/// default resource gets it regardless of the toggle.
fn effective_policy(policy: CreatePolicy, disabled: bool) -> CreatePolicy {
    match (policy, disabled) {
        (CreatePolicy::BestEffort, true) => CreatePolicy::Skip,
        (policy, _) => policy,
    }
}

/// Translate a creation outcome according to the policy
fn apply_policy(policy: CreatePolicy, resource: &str, outcome: Result<()>) -> Result<()> {
    match (policy, outcome) {
        (_, Ok(())) => Ok(()),
        (CreatePolicy::Require, Err(err)) => {
            error!(resource = resource, error = %err, "unable to create required default resource");
            Err(err)
        }
        (CreatePolicy::BestEffort, Err(err)) => {
            error!(resource = resource, error = %err, "unable to create default resource, continuing");
            Ok(())
        }
        // Skip is filtered out before creation runs
        (CreatePolicy::Skip, Err(_)) => Ok(()),
    }
}

/// One-shot startup task: ensure the variant's default resources exist.
///
/// Runs after the controllers are registered. Resources are created
/// get-then-create: existing instances are never modified.
pub async fn ensure_default_resources(
    client: &Client,
    variant: &Variant,
    init_disabled: bool,
) -> Result<()> {
    let init_policy = effective_policy(variant.defaults.init, init_disabled);
    if init_policy != CreatePolicy::Skip {
        info!("Creating default FoundryInit");
        apply_policy(
            init_policy,
            "FoundryInit",
            create_default_init(client, variant).await,
        )?;
    }

    if variant.defaults.platform != CreatePolicy::Skip {
        info!("Creating default FoundryPlatform");
        apply_policy(
            variant.defaults.platform,
            "FoundryPlatform",
            create_default_platform(client).await,
        )?;
    }

    if variant.defaults.gateway != CreatePolicy::Skip {
        info!("Creating default GatewayConfig");
        apply_policy(
            variant.defaults.gateway,
            "GatewayConfig",
            create_default_gateway(client).await,
        )?;
    }

    Ok(())
}

/// Create the default FoundryInit if absent
async fn create_default_init(client: &Client, variant: &Variant) -> Result<()> {
    let api: Api<FoundryInit> = Api::all(client.clone());
    if api.get_opt(DEFAULT_INIT_NAME).await?.is_some() {
        info!(name = DEFAULT_INIT_NAME, "Default FoundryInit already exists");
        return Ok(());
    }

    let init = FoundryInit::new(
        DEFAULT_INIT_NAME,
        FoundryInitSpec {
            application_namespace: None,
            monitoring: MonitoringSpec {
                management_state: Some(variant.monitoring_default),
            },
            trusted_ca_bundle: None,
            dev_flags: None,
        },
    );

    api.create(&PostParams::default(), &init).await?;
    info!(name = DEFAULT_INIT_NAME, "Created default FoundryInit");
    Ok(())
}

/// Create the default FoundryPlatform if absent, with every component managed
async fn create_default_platform(client: &Client) -> Result<()> {
    let api: Api<FoundryPlatform> = Api::all(client.clone());
    if api.get_opt(DEFAULT_PLATFORM_NAME).await?.is_some() {
        info!(
            name = DEFAULT_PLATFORM_NAME,
            "Default FoundryPlatform already exists"
        );
        return Ok(());
    }

    let platform = FoundryPlatform::new(
        DEFAULT_PLATFORM_NAME,
        FoundryPlatformSpec {
            components: ComponentsSpec {
                dashboard: DashboardSelector {
                    management_state: Some(ManagementState::Managed),
                    title: None,
                },
                pipelines: PipelinesSelector {
                    management_state: Some(ManagementState::Managed),
                    artifact_bucket: None,
                },
                model_serving: ModelServingSelector {
                    management_state: Some(ManagementState::Managed),
                    default_runtime: None,
                },
                workbenches: WorkbenchesSelector {
                    management_state: Some(ManagementState::Managed),
                    notebook_namespace: None,
                },
            },
        },
    );

    api.create(&PostParams::default(), &platform).await?;
    info!(
        name = DEFAULT_PLATFORM_NAME,
        "Created default FoundryPlatform"
    );
    Ok(())
}

/// Create the default GatewayConfig if absent
async fn create_default_gateway(client: &Client) -> Result<()> {
    let api: Api<GatewayConfig> = Api::all(client.clone());
    if api.get_opt(DEFAULT_GATEWAY_NAME).await?.is_some() {
        info!(
            name = DEFAULT_GATEWAY_NAME,
            "Default GatewayConfig already exists"
        );
        return Ok(());
    }

    let gateway = GatewayConfig::new(
        DEFAULT_GATEWAY_NAME,
        GatewayConfigSpec {
            certificate: Some(CertificateSpec {
                cert_type: CertificateType::ClusterDefault,
                secret_name: Some("default-gateway-tls".to_string()),
            }),
        },
    );

    api.create(&PostParams::default(), &gateway).await?;
    info!(name = DEFAULT_GATEWAY_NAME, "Created default GatewayConfig");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::variant::{COMMUNITY, MANAGED, SELF_MANAGED, VANILLA};
    use crate::Error;

    fn creation_failure() -> Result<()> {
        Err(Error::validation("simulated creation failure"))
    }

    // =========================================================================
    // Policy Table Stories
    // =========================================================================

    /// Story: a required default resource blocks startup when creation fails
    ///
    /// For the managed variant the platform must converge without human
    /// action, so a failed default-resource creation must fail the startup
    /// task (the process never becomes ready).
    #[test]
    fn story_required_creation_failure_blocks() {
        let result = apply_policy(CreatePolicy::Require, "FoundryInit", creation_failure());
        assert!(result.is_err());
    }

    /// Story: best-effort creation failure is logged but swallowed
    ///
    /// Non-managed variants tolerate a failed FoundryInit creation; the user
    /// can create it later. The startup task still succeeds for that step.
    #[test]
    fn story_best_effort_creation_failure_is_swallowed() {
        let result = apply_policy(CreatePolicy::BestEffort, "FoundryInit", creation_failure());
        assert!(result.is_ok());
    }

    /// Story: success is success under any policy
    #[test]
    fn story_successful_creation_passes_through() {
        assert!(apply_policy(CreatePolicy::Require, "GatewayConfig", Ok(())).is_ok());
        assert!(apply_policy(CreatePolicy::BestEffort, "FoundryInit", Ok(())).is_ok());
    }

    /// Story: the disable toggle only affects best-effort creation
    ///
    /// `FOUNDRY_DISABLE_DEFAULT_INIT=true` skips the initialization default on
    /// non-managed variants. The managed variant ignores the toggle entirely.
    #[test]
    fn story_disable_toggle_respects_policy() {
        assert_eq!(
            effective_policy(CreatePolicy::BestEffort, true),
            CreatePolicy::Skip
        );
        assert_eq!(
            effective_policy(CreatePolicy::BestEffort, false),
            CreatePolicy::BestEffort
        );
        assert_eq!(
            effective_policy(CreatePolicy::Require, true),
            CreatePolicy::Require
        );
        assert_eq!(effective_policy(CreatePolicy::Skip, true), CreatePolicy::Skip);
    }

    /// Story: the gateway default stays blocking for non-managed variants
    ///
    /// The asymmetry is init-only: even where FoundryInit creation is
    /// best-effort, a failed GatewayConfig creation must fail the task.
    #[test]
    fn story_gateway_remains_blocking_for_non_managed() {
        for variant in [&SELF_MANAGED, &COMMUNITY] {
            assert_eq!(variant.defaults.gateway, CreatePolicy::Require);
            let result = apply_policy(
                variant.defaults.gateway,
                "GatewayConfig",
                creation_failure(),
            );
            assert!(result.is_err());
        }
    }

    /// Story: managed blocks on init failure, non-managed does not
    #[test]
    fn story_init_asymmetry_across_variants() {
        assert!(apply_policy(MANAGED.defaults.init, "FoundryInit", creation_failure()).is_err());
        assert!(
            apply_policy(SELF_MANAGED.defaults.init, "FoundryInit", creation_failure()).is_ok()
        );
        assert_eq!(VANILLA.defaults.init, CreatePolicy::Skip);
    }
}

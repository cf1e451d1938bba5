//! The platform instance and its four-phase lifecycle
//!
//! A [`PlatformInstance`] composes the resolved variant with the component and
//! service registries bound to it, plus the cluster metadata discovered during
//! Init. The lifecycle is an explicit state machine with single-direction
//! transitions:
//!
//! ```text
//! NotStarted --init--> Initialized --upgrade--> Upgraded --run--> Running
//! ```
//!
//! Init and Upgrade failures are fatal startup failures. Run blocks for the
//! process lifetime, owning the controller futures, the webhook and health
//! servers, and the one-shot default-resources startup task; cancellation
//! arrives via the controllers' signal handling.

use std::sync::Arc;

use futures::future;
use kube::Client;
use tracing::{error, info, warn};

use super::defaults::ensure_default_resources;
use super::variant::Variant;
use super::{meta, Meta, PlatformType};
use crate::components::{
    ComponentHandler, DashboardHandler, ModelServingHandler, PipelinesHandler, WorkbenchesHandler,
};
use crate::config::{self, OperatorConfig};
use crate::controller::{
    init_controller, platform_controller, ControllerContext, ControllerFuture,
};
use crate::registry::Registry;
use crate::services::{GatewayService, ServiceHandler, SetupService};
use crate::webhook::{serve_health, serve_webhook, webhook_router, WebhookState};
use crate::{startup, upgrade, Error, Result};

/// Lifecycle phases of a platform instance, in order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Constructed, nothing discovered yet
    NotStarted,
    /// Init complete: metadata discovered, handlers initialized
    Initialized,
    /// Upgrade cleanup complete
    Upgraded,
    /// The blocking event loop owns the process
    Running,
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NotStarted"),
            Self::Initialized => write!(f, "Initialized"),
            Self::Upgraded => write!(f, "Upgraded"),
            Self::Running => write!(f, "Running"),
        }
    }
}

/// Check a single-direction lifecycle transition
fn check_transition(current: LifecyclePhase, expected: LifecyclePhase, action: &str) -> Result<()> {
    if current == expected {
        Ok(())
    } else {
        Err(Error::lifecycle(format!(
            "{action} requires phase {expected}, but the instance is {current}"
        )))
    }
}

/// Build the component and service registries for a platform flavor.
///
/// Handlers are assembled here in explicit constructor lists - this is the
/// only place registries are mutated, before any controller starts.
fn build_registries(
    platform: PlatformType,
) -> (
    Registry<Box<dyn ComponentHandler>>,
    Registry<Box<dyn ServiceHandler>>,
) {
    let components: Vec<Box<dyn ComponentHandler>> = match platform {
        // Vanilla runs the reduced component set: model serving only
        PlatformType::Vanilla => vec![Box::new(ModelServingHandler)],
        _ => vec![
            Box::new(DashboardHandler),
            Box::new(PipelinesHandler),
            Box::new(ModelServingHandler),
            Box::new(WorkbenchesHandler),
        ],
    };

    let services: Vec<Box<dyn ServiceHandler>> = match platform {
        PlatformType::Vanilla => vec![Box::new(SetupService)],
        _ => vec![Box::new(GatewayService), Box::new(SetupService)],
    };

    (Registry::new(components), Registry::new(services))
}

/// The runtime composition of variant, registries, cluster metadata, and
/// configuration. Constructed once at startup, mutated only by `init`
/// (which populates the metadata), and consumed by `run`.
pub struct PlatformInstance {
    client: Client,
    config: OperatorConfig,
    variant: &'static Variant,
    components: Registry<Box<dyn ComponentHandler>>,
    services: Registry<Box<dyn ServiceHandler>>,
    meta: Option<Meta>,
    phase: LifecyclePhase,
}

impl PlatformInstance {
    /// Create a platform instance for the resolved platform type
    pub fn new(client: Client, config: OperatorConfig, platform: PlatformType) -> Self {
        let variant = Variant::for_platform(platform);
        let (components, services) = build_registries(platform);

        info!(
            platform = %platform,
            variant = variant.name,
            components = components.len(),
            services = services.len(),
            "Platform instance created"
        );

        Self {
            client,
            config,
            variant,
            components,
            services,
            meta: None,
            phase: LifecyclePhase::NotStarted,
        }
    }

    /// The active variant
    pub fn variant(&self) -> &'static Variant {
        self.variant
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Cluster metadata, available after Init
    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    /// Init phase: discover cluster metadata and initialize every registered
    /// handler. Any failure is fatal to startup; handler failures are
    /// aggregated so none are masked.
    pub async fn init(&mut self) -> Result<()> {
        check_transition(self.phase, LifecyclePhase::NotStarted, "init")?;

        let discovered = meta::discover(&self.client, self.variant.platform).await?;
        self.meta = Some(discovered);

        let platform = self.variant.platform;

        if let Err(err) = self.services.for_each(|handler| handler.init(platform)) {
            error!(error = %err, "unable to init services");
            return Err(err);
        }

        if let Err(err) = self.components.for_each(|handler| handler.init(platform)) {
            error!(error = %err, "unable to init components");
            return Err(err);
        }

        self.phase = LifecyclePhase::Initialized;
        Ok(())
    }

    /// Upgrade phase: clean up resources obsoleted by the version delta
    /// between the previously deployed release and the running operator.
    /// No-op on fresh installs.
    pub async fn upgrade(&mut self) -> Result<()> {
        check_transition(self.phase, LifecyclePhase::Initialized, "upgrade")?;

        upgrade::run(&self.client, self.variant).await?;

        self.phase = LifecyclePhase::Upgraded;
        Ok(())
    }

    /// Run phase: install CRDs, start the webhook and health servers, build
    /// one controller per handler, spawn the default-resources startup task,
    /// and block until shutdown.
    ///
    /// Unlike Init's aggregated fan-out, a single reconciler construction
    /// failure aborts the whole Run: a missing reconciler would break the
    /// declared API surface.
    pub async fn run(mut self) -> Result<()> {
        check_transition(self.phase, LifecyclePhase::Upgraded, "run")?;
        self.phase = LifecyclePhase::Running;

        let meta = self
            .meta
            .clone()
            .ok_or_else(|| Error::lifecycle("run reached without discovered metadata"))?;

        startup::ensure_crds_installed(&self.client).await?;

        let ctx = Arc::new(ControllerContext::new(
            self.client.clone(),
            self.variant,
            meta,
            self.config.operator_namespace.clone(),
        ));
        let components = Arc::new(self.components);

        // Build all controller futures up front (fail-fast on any error)
        let mut controllers: Vec<ControllerFuture> = Vec::new();

        if config::init_controller_disabled() {
            warn!("FoundryInit controller disabled by configuration");
        } else {
            controllers.push(init_controller(ctx.clone()));
        }

        if config::platform_controller_disabled() {
            warn!("FoundryPlatform controller disabled by configuration");
        } else {
            controllers.push(platform_controller(ctx.clone(), components.clone()));
        }

        for handler in self.services.iter() {
            controllers.push(handler.new_reconciler(ctx.clone())?);
        }

        for handler in components.iter() {
            controllers.push(handler.new_reconciler(ctx.clone())?);
        }

        // Health probes
        let health_addr = self.config.health_addr;
        tokio::spawn(async move {
            if let Err(err) = serve_health(health_addr).await {
                error!(error = %err, "health server exited");
            }
        });

        // Admission webhook, when TLS material is mounted
        match (&self.config.webhook_tls_cert, &self.config.webhook_tls_key) {
            (Some(cert), Some(key)) => {
                let state = Arc::new(WebhookState::new((self.variant.validator)()));
                let router = webhook_router(state);
                let addr = self.config.webhook_addr;
                let (cert, key) = (cert.clone(), key.clone());
                tokio::spawn(async move {
                    if let Err(err) = serve_webhook(router, addr, &cert, &key).await {
                        error!(error = %err, "webhook server exited");
                    }
                });
            }
            _ => warn!("webhook TLS material not configured, admission webhook disabled"),
        }

        // One-shot startup task: ensure default resources per the variant's
        // policy table. A Require-policy failure fails the whole Run.
        let defaults_client = self.client.clone();
        let variant = self.variant;
        let defaults = tokio::spawn(async move {
            ensure_default_resources(&defaults_client, variant, config::default_init_disabled())
                .await
        });

        info!(
            platform = %variant.platform,
            variant = variant.name,
            "Starting Foundry controllers..."
        );

        let mut run_all = future::join_all(controllers);
        tokio::select! {
            joined = defaults => {
                match joined {
                    Ok(result) => result?,
                    Err(err) => {
                        return Err(Error::lifecycle(format!(
                            "default resources task panicked: {err}"
                        )))
                    }
                }
                (&mut run_all).await;
            }
            _ = &mut run_all => {}
        }

        info!("Foundry controllers stopped, shutting down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Named;

    // =========================================================================
    // Lifecycle State Machine Stories
    // =========================================================================

    /// Story: phases only move forward, one step at a time
    #[test]
    fn story_transitions_are_single_direction() {
        // init requires NotStarted
        assert!(check_transition(LifecyclePhase::NotStarted, LifecyclePhase::NotStarted, "init").is_ok());

        // upgrade before init is rejected with a descriptive error
        let err =
            check_transition(LifecyclePhase::NotStarted, LifecyclePhase::Initialized, "upgrade")
                .unwrap_err();
        assert!(err.to_string().contains("upgrade requires phase Initialized"));
        assert!(err.to_string().contains("NotStarted"));

        // run after upgrade is allowed
        assert!(check_transition(LifecyclePhase::Upgraded, LifecyclePhase::Upgraded, "run").is_ok());

        // a second init is rejected
        assert!(
            check_transition(LifecyclePhase::Initialized, LifecyclePhase::NotStarted, "init")
                .is_err()
        );
    }

    // =========================================================================
    // Registry Composition Stories
    // =========================================================================

    /// Story: vanilla runs the reduced handler set
    #[test]
    fn story_vanilla_registries_are_reduced() {
        let (components, services) = build_registries(PlatformType::Vanilla);
        assert_eq!(components.len(), 1);
        assert_eq!(services.len(), 1);

        let names: Vec<&str> = components.iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["model-serving"]);
    }

    /// Story: full variants register every component and service
    #[test]
    fn story_full_registries_for_other_variants() {
        for platform in [
            PlatformType::Managed,
            PlatformType::SelfManaged,
            PlatformType::Community,
        ] {
            let (components, services) = build_registries(platform);
            assert_eq!(components.len(), 4, "components for {platform}");
            assert_eq!(services.len(), 2, "services for {platform}");

            let names: Vec<&str> = components.iter().map(|h| h.name()).collect();
            assert_eq!(
                names,
                vec!["dashboard", "pipelines", "model-serving", "workbenches"]
            );
        }
    }
}

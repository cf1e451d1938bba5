//! Service handlers
//!
//! Services are platform-internal units (gateway, setup) that participate in
//! the same registry lifecycle as components but do not surface per-component
//! status on the FoundryPlatform resource.

mod gateway;
mod setup;

pub use gateway::GatewayService;
pub use setup::{run_uninstall, ClusterUninstall, SetupService, UninstallOps};

use std::sync::Arc;

use async_trait::async_trait;

use crate::controller::{ControllerContext, ControllerFuture};
use crate::crd::{FoundryInit, ManagementState};
use crate::platform::PlatformType;
use crate::registry::Named;
use crate::Result;

/// A self-contained unit managing one platform service
#[async_trait]
pub trait ServiceHandler: Named + Send + Sync {
    /// One-time initialization during the platform Init phase
    fn init(&self, platform: PlatformType) -> Result<()>;

    /// Management state of this service for the given platform and
    /// initialization resource
    fn management_state(
        &self,
        platform: PlatformType,
        init: Option<&FoundryInit>,
    ) -> ManagementState;

    /// Build the service's controller future for the Run phase
    fn new_reconciler(&self, ctx: Arc<ControllerContext>) -> Result<ControllerFuture>;
}

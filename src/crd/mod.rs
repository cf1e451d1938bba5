//! Custom Resource Definitions for Foundry
//!
//! This module contains all CRD definitions used by the Foundry operator.

mod components;
mod gateway;
mod init;
mod platform;
mod types;

pub use components::{
    ready_condition_type, ComponentCr, ComponentCrStatus, Dashboard, DashboardSpec, ModelServing,
    ModelServingSpec, Pipelines, PipelinesSpec, Workbenches, WorkbenchesSpec,
    MANAGEMENT_STATE_ANNOTATION,
};
pub use gateway::{
    CertificateSpec, CertificateType, GatewayConfig, GatewayConfigSpec, GatewayConfigStatus,
};
pub use init::{
    DevFlags, FoundryInit, FoundryInitSpec, FoundryInitStatus, MonitoringSpec, TrustedCaBundleSpec,
};
pub use platform::{
    ComponentStatusEntry, ComponentsSpec, ComponentsStatus, DashboardSelector, FoundryPlatform,
    FoundryPlatformSpec, FoundryPlatformStatus, ModelServingSelector, PipelinesSelector,
    WorkbenchesSelector,
};
pub use types::{
    find_condition, ComponentReleaseStatus, Condition, ConditionSet, ConditionSeverity,
    ConditionStatus, ManagementState, ReleaseInfo, CONDITION_DEPLOYMENTS_AVAILABLE,
    CONDITION_READY,
};

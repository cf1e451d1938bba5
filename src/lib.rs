//! Foundry - Kubernetes operator for a multi-component ML platform
//!
//! Foundry installs, configures, and reconciles a machine-learning platform
//! across several deployment flavors (managed SaaS, self-managed, community,
//! vanilla Kubernetes). It watches two cluster-scoped singleton custom
//! resources - [`crd::FoundryInit`] and [`crd::FoundryPlatform`] - and drives
//! cluster state toward the declared spec while tracking per-component
//! readiness in status conditions.
//!
//! # Architecture
//!
//! At startup the operator resolves the platform flavor (explicit override or
//! cluster probes), selects the matching immutable [`platform::Variant`], and
//! composes a [`platform::PlatformInstance`] holding the component and service
//! handler registries bound to that variant. The instance then runs a strict
//! four-phase lifecycle: initialize, upgrade, run (blocking controller loop),
//! with per-variant admission validation as a cross-cutting concern.
//!
//! # Modules
//!
//! - [`crd`] - Custom Resource Definitions (FoundryInit, FoundryPlatform, component CRs)
//! - [`registry`] - Ordered handler registries with aggregated fan-out
//! - [`platform`] - Platform variants, detection, metadata, and the lifecycle instance
//! - [`components`] - Component handlers (dashboard, pipelines, model serving, workbenches)
//! - [`services`] - Service handlers (gateway, setup)
//! - [`controller`] - Kubernetes controller reconciliation logic
//! - [`status`] - Per-component status aggregation
//! - [`upgrade`] - Version-delta cleanup of obsoleted resources
//! - [`webhook`] - Admission webhook and health probe servers
//! - [`startup`] - CRD installation on startup
//! - [`config`] - Operator configuration and feature toggles
//! - [`error`] - Error types for the operator

#![deny(missing_docs)]

pub mod components;
pub mod config;
pub mod controller;
pub mod crd;
pub mod error;
pub mod platform;
pub mod registry;
pub mod services;
pub mod startup;
pub mod status;
pub mod upgrade;
pub mod webhook;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================
// These constants define the fixed names used throughout Foundry. Centralizing
// them here ensures consistency across CRD defaults, controllers, and test
// fixtures.

/// API group for all Foundry custom resources
pub const API_GROUP: &str = "foundry.dev";

/// Field manager name used for server-side apply
pub const FIELD_MANAGER: &str = "foundry-operator";

/// Fixed name of the singleton cluster-initialization resource
pub const DEFAULT_INIT_NAME: &str = "default-init";

/// Fixed name of the singleton platform-components resource
pub const DEFAULT_PLATFORM_NAME: &str = "default-foundry";

/// Fixed name of the default gateway configuration resource
pub const DEFAULT_GATEWAY_NAME: &str = "default-gateway";

/// Label applied to workload Deployments that belong to a platform component
pub const PART_OF_LABEL: &str = "platform.foundry.dev/part-of";

/// Label that marks a ConfigMap as an uninstall trigger for the setup service
pub const UNINSTALL_LABEL: &str = "foundry.dev/uninstall";

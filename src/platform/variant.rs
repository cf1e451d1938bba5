//! Frozen per-platform variant configuration
//!
//! Exactly one [`Variant`] is active per running process, selected at startup
//! from the resolved [`PlatformType`]. The mapping is compiled in and total:
//! every platform type has a fully populated record, so resolution can never
//! succeed while variant lookup fails.

use super::defaults::{CreatePolicy, DefaultResources};
use super::PlatformType;
use crate::crd::ManagementState;
use crate::webhook::validate::{standard_validator, vanilla_validator, PlatformValidator};

/// Immutable configuration for one platform flavor.
///
/// Variant identity determines which default namespaces and groups are created
/// and referenced for the lifetime of the process, which default resources are
/// created with which blocking policy, and which admission validator guards
/// the top-level custom resources.
pub struct Variant {
    /// Platform type this variant serves
    pub platform: PlatformType,

    /// Internal variant name (used as the release name in status)
    pub name: &'static str,

    /// Human-readable variant name
    pub display_name: &'static str,

    /// Namespace where platform applications are deployed by default
    pub application_namespace: &'static str,

    /// Namespace where monitoring resources are deployed
    pub monitoring_namespace: &'static str,

    /// Namespace for console link resources. Empty for non-managed variants.
    pub console_namespace: &'static str,

    /// Default admin group granted platform administration
    pub admin_group: &'static str,

    /// Operator subscription deleted on uninstall. Empty means the
    /// subscription is owned externally and must be left alone.
    pub subscription_name: &'static str,

    /// Default management state for monitoring in the generated FoundryInit
    pub monitoring_default: ManagementState,

    /// Default-resource creation policy table
    pub defaults: DefaultResources,

    /// Admission validator for the top-level custom resources
    pub validator: fn() -> Box<dyn PlatformValidator>,
}

impl Variant {
    /// Look up the frozen variant record for a platform type.
    ///
    /// The mapping is total; this can never fail.
    pub fn for_platform(platform: PlatformType) -> &'static Variant {
        match platform {
            PlatformType::Managed => &MANAGED,
            PlatformType::SelfManaged => &SELF_MANAGED,
            PlatformType::Community => &COMMUNITY,
            PlatformType::Vanilla => &VANILLA,
        }
    }

    /// Returns true if this variant maintains console link resources
    pub fn has_console_namespace(&self) -> bool {
        !self.console_namespace.is_empty()
    }

    /// Returns true if uninstall must leave the operator subscription alone
    pub fn skip_subscription_delete(&self) -> bool {
        self.subscription_name.is_empty()
    }
}

/// Managed SaaS variant. Default resources are mandatory: the platform is
/// operated by the vendor and must converge without human action.
pub static MANAGED: Variant = Variant {
    platform: PlatformType::Managed,
    name: "managed-foundry",
    display_name: "Foundry Cloud Service",
    application_namespace: "foundry-applications",
    monitoring_namespace: "foundry-monitoring",
    console_namespace: "foundry-console",
    admin_group: "dedicated-admins",
    subscription_name: "",
    monitoring_default: ManagementState::Managed,
    defaults: DefaultResources {
        init: CreatePolicy::Require,
        platform: CreatePolicy::Require,
        gateway: CreatePolicy::Require,
    },
    validator: standard_validator,
};

/// Self-managed enterprise variant
pub static SELF_MANAGED: Variant = Variant {
    platform: PlatformType::SelfManaged,
    name: "selfmanaged-foundry",
    display_name: "Foundry Enterprise",
    application_namespace: "foundry-applications",
    monitoring_namespace: "foundry-monitoring",
    console_namespace: "",
    admin_group: "foundry-admins",
    subscription_name: "foundry-enterprise-operator",
    monitoring_default: ManagementState::Managed,
    defaults: DefaultResources {
        init: CreatePolicy::BestEffort,
        platform: CreatePolicy::Skip,
        gateway: CreatePolicy::Require,
    },
    validator: standard_validator,
};

/// Community variant
pub static COMMUNITY: Variant = Variant {
    platform: PlatformType::Community,
    name: "community-foundry",
    display_name: "Foundry Community",
    application_namespace: "foundry",
    monitoring_namespace: "foundry",
    console_namespace: "",
    admin_group: "foundry-community-admins",
    subscription_name: "foundry-operator",
    monitoring_default: ManagementState::Removed,
    defaults: DefaultResources {
        init: CreatePolicy::BestEffort,
        platform: CreatePolicy::Skip,
        gateway: CreatePolicy::Require,
    },
    validator: standard_validator,
};

/// Vanilla Kubernetes variant. Runs a reduced component set and creates no
/// default resources; users opt in explicitly.
pub static VANILLA: Variant = Variant {
    platform: PlatformType::Vanilla,
    name: "vanilla-foundry",
    display_name: "Foundry on Kubernetes",
    application_namespace: "foundry",
    monitoring_namespace: "foundry",
    console_namespace: "",
    admin_group: "foundry-admins",
    subscription_name: "",
    monitoring_default: ManagementState::Removed,
    defaults: DefaultResources {
        init: CreatePolicy::Skip,
        platform: CreatePolicy::Skip,
        gateway: CreatePolicy::Skip,
    },
    validator: vanilla_validator,
};

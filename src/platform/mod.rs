//! Platform variants, detection, metadata, and the lifecycle instance
//!
//! A running operator serves exactly one platform flavor. The flavor is
//! resolved once at startup ([`detect`]), mapped to a frozen [`Variant`]
//! record, and bound into a [`PlatformInstance`] that drives the
//! init/upgrade/run lifecycle.

pub mod defaults;
pub mod detect;
pub mod instance;
pub mod meta;
pub mod variant;

pub use defaults::{ensure_default_resources, CreatePolicy, DefaultResources};
pub use detect::{resolve_platform, ClusterMarkerProbe, MarkerProbe};
pub use instance::{LifecyclePhase, PlatformInstance};
pub use meta::Meta;
pub use variant::Variant;

use crate::Error;

/// The closed set of platform flavors Foundry can run as
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlatformType {
    /// Managed SaaS deployment operated by the vendor
    Managed,
    /// Self-managed enterprise deployment
    SelfManaged,
    /// Community deployment
    Community,
    /// Vanilla Kubernetes deployment with a reduced component set
    Vanilla,
}

impl PlatformType {
    /// All supported platform types, in detection-preference order
    pub const ALL: [PlatformType; 4] = [
        PlatformType::Managed,
        PlatformType::SelfManaged,
        PlatformType::Community,
        PlatformType::Vanilla,
    ];
}

impl std::fmt::Display for PlatformType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Managed => write!(f, "Managed"),
            Self::SelfManaged => write!(f, "SelfManaged"),
            Self::Community => write!(f, "Community"),
            Self::Vanilla => write!(f, "Vanilla"),
        }
    }
}

impl std::str::FromStr for PlatformType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Managed" => Ok(Self::Managed),
            "SelfManaged" => Ok(Self::SelfManaged),
            "Community" => Ok(Self::Community),
            "Vanilla" => Ok(Self::Vanilla),
            other => Err(Error::detection(format!(
                "unknown platform type '{other}' (valid types: Managed, SelfManaged, Community, Vanilla)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Story: every supported platform name round-trips through parsing
    #[test]
    fn story_platform_type_round_trips() {
        for platform in PlatformType::ALL {
            let parsed: PlatformType = platform.to_string().parse().unwrap();
            assert_eq!(parsed, platform);
        }
    }

    /// Story: an unsupported platform value fails with the valid set listed
    ///
    /// Operators setting FOUNDRY_PLATFORM_TYPE to a typo must get an error
    /// naming every accepted value, not a silent fallback.
    #[test]
    fn story_unknown_platform_lists_valid_set() {
        let err = "OpenShift".parse::<PlatformType>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown platform type 'OpenShift'"));
        assert!(msg.contains("Managed"));
        assert!(msg.contains("SelfManaged"));
        assert!(msg.contains("Community"));
        assert!(msg.contains("Vanilla"));
    }
}

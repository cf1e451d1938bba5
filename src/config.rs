//! Operator configuration and feature toggles
//!
//! Structured configuration comes from CLI flags with environment variable
//! fallbacks. A handful of boolean feature toggles are read directly from the
//! environment, matching how deployment manifests inject them.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;

/// Environment variable that forces a specific platform type, bypassing probes
pub const PLATFORM_TYPE_ENV: &str = "FOUNDRY_PLATFORM_TYPE";

/// Environment variable that reports the running operator version
pub const OPERATOR_VERSION_ENV: &str = "FOUNDRY_OPERATOR_VERSION";

/// Environment variable that disables creation of the default FoundryInit
pub const DISABLE_DEFAULT_INIT_ENV: &str = "FOUNDRY_DISABLE_DEFAULT_INIT";

/// Environment variable that disables the FoundryPlatform controller
pub const DISABLE_PLATFORM_CONTROLLER_ENV: &str = "FOUNDRY_DISABLE_PLATFORM_CONTROLLER";

/// Environment variable that disables the FoundryInit controller
pub const DISABLE_INIT_CONTROLLER_ENV: &str = "FOUNDRY_DISABLE_INIT_CONTROLLER";

/// Environment variable indicating CI/test mode
pub const CI_ENV: &str = "CI";

/// Operator manager configuration
///
/// All fields can be set via CLI flag or environment variable. Parse failures
/// are fatal at startup.
#[derive(Args, Debug, Clone)]
pub struct OperatorConfig {
    /// Namespace the operator runs in (probes and uninstall triggers are scoped here)
    #[arg(
        long,
        env = "FOUNDRY_OPERATOR_NAMESPACE",
        default_value = "foundry-operator-system"
    )]
    pub operator_namespace: String,

    /// Bind address for the admission webhook HTTPS server
    #[arg(long, env = "FOUNDRY_WEBHOOK_ADDR", default_value = "0.0.0.0:9443")]
    pub webhook_addr: SocketAddr,

    /// Path to the webhook TLS certificate (PEM). Webhook serving is skipped when unset.
    #[arg(long, env = "FOUNDRY_WEBHOOK_TLS_CERT")]
    pub webhook_tls_cert: Option<PathBuf>,

    /// Path to the webhook TLS private key (PEM)
    #[arg(long, env = "FOUNDRY_WEBHOOK_TLS_KEY")]
    pub webhook_tls_key: Option<PathBuf>,

    /// Bind address for the health/readiness probe HTTP server
    #[arg(long, env = "FOUNDRY_HEALTH_ADDR", default_value = "0.0.0.0:8081")]
    pub health_addr: SocketAddr,
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).as_deref() == Ok("true")
}

/// Explicit platform type override, if configured
pub fn platform_type_override() -> Option<String> {
    std::env::var(PLATFORM_TYPE_ENV)
        .ok()
        .filter(|v| !v.is_empty())
}

/// Running operator version, defaulting to `0.0.0` when unset
pub fn operator_version() -> String {
    std::env::var(OPERATOR_VERSION_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "0.0.0".to_string())
}

/// True when default FoundryInit creation is disabled
pub fn default_init_disabled() -> bool {
    env_flag(DISABLE_DEFAULT_INIT_ENV)
}

/// True when the FoundryPlatform controller is disabled
pub fn platform_controller_disabled() -> bool {
    env_flag(DISABLE_PLATFORM_CONTROLLER_ENV)
}

/// True when the FoundryInit controller is disabled
pub fn init_controller_disabled() -> bool {
    env_flag(DISABLE_INIT_CONTROLLER_ENV)
}

/// True in CI/test mode, which short-circuits cluster discovery
pub fn ci_mode() -> bool {
    env_flag(CI_ENV)
}

//! Foundry Operator - Kubernetes operator for a multi-component ML platform

use clap::{Parser, Subcommand};
use kube::Client;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use foundry::config::{self, OperatorConfig};
use foundry::platform::{resolve_platform, ClusterMarkerProbe, PlatformInstance};
use foundry::startup;

/// Foundry - operator for installing and reconciling the ML platform
#[derive(Parser, Debug)]
#[command(name = "foundry", version, about, long_about = None)]
struct Cli {
    /// Generate CRD manifests and exit
    #[arg(long)]
    crd: bool,

    #[command(flatten)]
    config: OperatorConfig,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as operator (default mode)
    ///
    /// Resolves the platform flavor, builds the platform instance, and drives
    /// the init -> upgrade -> run lifecycle. Run blocks until shutdown.
    Operator,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install crypto provider for the webhook TLS server.
    // Failure here indicates a serious system configuration issue.
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!(
            "CRITICAL: Failed to install crypto provider: {:?}. \
             The webhook server cannot terminate TLS without a working crypto \
             provider; this usually indicates a conflicting provider was \
             installed first.",
            e
        );
        std::process::exit(1);
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.crd {
        // Generate CRD YAML for all operator-owned resources
        print!("{}", startup::render_crds_yaml()?);
        return Ok(());
    }

    match cli.command {
        Some(Commands::Operator) | None => run_operator(cli.config).await,
    }
}

/// Resolve the platform, build the instance, and drive the lifecycle phases.
/// Each phase failure is a fatal startup failure.
async fn run_operator(operator_config: OperatorConfig) -> anyhow::Result<()> {
    tracing::info!("Foundry operator starting...");

    let client = Client::try_default()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Kubernetes client: {}", e))?;

    // Resolve platform flavor: explicit override wins, then cluster probes
    let probe = ClusterMarkerProbe::new(client.clone(), &operator_config.operator_namespace);
    let platform_override = config::platform_type_override();
    let platform = resolve_platform(platform_override.as_deref(), &probe)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to resolve platform type: {}", e))?;

    let mut instance = PlatformInstance::new(client, operator_config, platform);
    tracing::info!(
        platform = %platform,
        variant = instance.variant().display_name,
        "Platform resolved"
    );

    instance
        .init()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize platform: {}", e))?;

    instance
        .upgrade()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to upgrade platform: {}", e))?;

    tracing::info!("Starting platform runtime");
    instance
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Problem running platform: {}", e))?;

    tracing::info!("Foundry operator shutting down");
    Ok(())
}

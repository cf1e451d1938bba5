//! CRD installation on startup
//!
//! The operator installs its own CRDs using server-side apply, so the CRD
//! versions always match the operator version.

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, CustomResourceExt};
use tracing::info;

use crate::crd::{
    Dashboard, FoundryInit, FoundryPlatform, GatewayConfig, ModelServing, Pipelines, Workbenches,
};
use crate::{Result, FIELD_MANAGER};

/// CRD definition with name and resource
struct CrdDef {
    name: &'static str,
    crd: CustomResourceDefinition,
}

/// All CRDs owned by the operator
fn operator_crds() -> Vec<CrdDef> {
    vec![
        CrdDef {
            name: "foundryinits.foundry.dev",
            crd: FoundryInit::crd(),
        },
        CrdDef {
            name: "foundryplatforms.foundry.dev",
            crd: FoundryPlatform::crd(),
        },
        CrdDef {
            name: "dashboards.foundry.dev",
            crd: Dashboard::crd(),
        },
        CrdDef {
            name: "pipelineses.foundry.dev",
            crd: Pipelines::crd(),
        },
        CrdDef {
            name: "modelservings.foundry.dev",
            crd: ModelServing::crd(),
        },
        CrdDef {
            name: "workbencheses.foundry.dev",
            crd: Workbenches::crd(),
        },
        CrdDef {
            name: "gatewayconfigs.foundry.dev",
            crd: GatewayConfig::crd(),
        },
    ]
}

/// Ensure all operator CRDs are installed using server-side apply
pub async fn ensure_crds_installed(client: &Client) -> Result<()> {
    let crds: Api<CustomResourceDefinition> = Api::all(client.clone());
    let params = PatchParams::apply(FIELD_MANAGER).force();

    for def in operator_crds() {
        info!("Installing {} CRD...", def.name);
        crds.patch(def.name, &params, &Patch::Apply(&def.crd)).await?;
    }

    info!("All Foundry CRDs installed/updated");
    Ok(())
}

/// Render every operator CRD as a multi-document YAML string (for `--crd`)
pub fn render_crds_yaml() -> Result<String> {
    let mut out = String::new();
    for def in operator_crds() {
        let doc = serde_yaml::to_string(&def.crd)
            .map_err(|err| crate::Error::serialization(err.to_string()))?;
        out.push_str("---\n");
        out.push_str(&doc);
    }
    Ok(out)
}

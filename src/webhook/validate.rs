//! Admission validators for the top-level custom resources
//!
//! Each platform variant supplies a [`PlatformValidator`] deciding whether a
//! proposed FoundryInit or FoundryPlatform write is allowed. Delete operations
//! are allowed unconditionally for every variant; decode failures become
//! Bad-Request style responses, never a crash.

use kube::api::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse};
use serde::de::DeserializeOwned;

use crate::crd::{FoundryInit, FoundryPlatform, ManagementState};

/// Per-variant admission validator for the top-level custom resources
pub trait PlatformValidator: Send + Sync {
    /// Validate a FoundryInit write
    fn validate_init(&self, req: &AdmissionRequest<DynamicObject>) -> AdmissionResponse;

    /// Validate a FoundryPlatform write
    fn validate_platform(&self, req: &AdmissionRequest<DynamicObject>) -> AdmissionResponse;
}

/// Validator constructor for the managed, self-managed, and community variants
pub fn standard_validator() -> Box<dyn PlatformValidator> {
    Box::new(StandardValidator)
}

/// Validator constructor for the vanilla Kubernetes variant
pub fn vanilla_validator() -> Box<dyn PlatformValidator> {
    Box::new(VanillaValidator)
}

/// Decode the request object into a typed custom resource.
///
/// Returns a Bad-Request style response when the object is absent or does not
/// decode.
fn decode<T: DeserializeOwned>(
    req: &AdmissionRequest<DynamicObject>,
) -> Result<T, AdmissionResponse> {
    let Some(obj) = &req.object else {
        return Err(AdmissionResponse::invalid("request has no object"));
    };

    let value = serde_json::to_value(obj)
        .map_err(|err| AdmissionResponse::invalid(format!("object is not serializable: {err}")))?;
    serde_json::from_value(value)
        .map_err(|err| AdmissionResponse::invalid(format!("object does not decode: {err}")))
}

fn is_enabled(state: Option<ManagementState>) -> bool {
    ManagementState::normalize(state).is_managed()
}

/// Allow-all validator used by OpenShift-style variants.
///
/// Platform-specific rules for these variants live in CRD schema validation;
/// the admission layer only needs to exist so future rules have a seam.
struct StandardValidator;

impl PlatformValidator for StandardValidator {
    fn validate_init(&self, req: &AdmissionRequest<DynamicObject>) -> AdmissionResponse {
        AdmissionResponse::from(req)
    }

    fn validate_platform(&self, req: &AdmissionRequest<DynamicObject>) -> AdmissionResponse {
        AdmissionResponse::from(req)
    }
}

/// Restrictive validator for vanilla Kubernetes deployments.
///
/// Only model serving may be enabled; monitoring and dev flags are rejected.
struct VanillaValidator;

impl PlatformValidator for VanillaValidator {
    fn validate_init(&self, req: &AdmissionRequest<DynamicObject>) -> AdmissionResponse {
        let init: FoundryInit = match decode(req) {
            Ok(init) => init,
            Err(response) => return response,
        };

        if init.spec.monitoring.is_enabled() {
            return AdmissionResponse::from(req).deny(
                "spec.monitoring cannot be enabled for vanilla Kubernetes deployments \
                 (must be unset or Removed)",
            );
        }

        if init.spec.dev_flags.is_some() {
            return AdmissionResponse::from(req)
                .deny("spec.devFlags cannot be set for vanilla Kubernetes deployments");
        }

        AdmissionResponse::from(req)
    }

    fn validate_platform(&self, req: &AdmissionRequest<DynamicObject>) -> AdmissionResponse {
        let platform: FoundryPlatform = match decode(req) {
            Ok(platform) => platform,
            Err(response) => return response,
        };

        let components = &platform.spec.components;
        let violations = [
            (
                "spec.components.dashboard",
                is_enabled(components.dashboard.management_state),
            ),
            (
                "spec.components.pipelines",
                is_enabled(components.pipelines.management_state),
            ),
            (
                "spec.components.workbenches",
                is_enabled(components.workbenches.management_state),
            ),
        ];

        for (field, enabled) in violations {
            if enabled {
                return AdmissionResponse::from(req).deny(format!(
                    "{field} cannot be enabled for vanilla Kubernetes deployments \
                     (must be unset or Removed)"
                ));
            }
        }

        AdmissionResponse::from(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::admission::AdmissionReview;

    fn review(object: serde_json::Value) -> AdmissionRequest<DynamicObject> {
        let review: AdmissionReview<DynamicObject> = serde_json::from_value(serde_json::json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
                "kind": {"group": "foundry.dev", "version": "v1alpha1", "kind": "FoundryPlatform"},
                "resource": {"group": "foundry.dev", "version": "v1alpha1", "resource": "foundryplatforms"},
                "operation": "CREATE",
                "userInfo": {"username": "admin"},
                "object": object,
            }
        }))
        .unwrap();
        review.try_into().unwrap()
    }

    fn platform_object(components: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "apiVersion": "foundry.dev/v1alpha1",
            "kind": "FoundryPlatform",
            "metadata": {"name": "default-foundry"},
            "spec": {"components": components}
        })
    }

    fn init_object(spec: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "apiVersion": "foundry.dev/v1alpha1",
            "kind": "FoundryInit",
            "metadata": {"name": "default-init"},
            "spec": spec
        })
    }

    // =========================================================================
    // Vanilla Validation Stories
    // =========================================================================

    /// Story: vanilla rejects enabling the dashboard
    #[test]
    fn story_vanilla_denies_dashboard() {
        let validator = vanilla_validator();
        let req = review(platform_object(serde_json::json!({
            "dashboard": {"managementState": "Managed"}
        })));

        let response = validator.validate_platform(&req);
        assert!(!response.allowed);
        let message = response.result.message;
        assert!(message.contains("spec.components.dashboard"));
    }

    /// Story: vanilla allows a platform with only model serving enabled
    #[test]
    fn story_vanilla_allows_model_serving_only() {
        let validator = vanilla_validator();
        let req = review(platform_object(serde_json::json!({
            "modelServing": {"managementState": "Managed"},
            "workbenches": {"managementState": "Removed"}
        })));

        let response = validator.validate_platform(&req);
        assert!(response.allowed);
    }

    /// Story: vanilla rejects enabling monitoring on FoundryInit
    #[test]
    fn story_vanilla_denies_monitoring() {
        let validator = vanilla_validator();
        let req = review(init_object(serde_json::json!({
            "monitoring": {"managementState": "Managed"}
        })));

        let response = validator.validate_init(&req);
        assert!(!response.allowed);
        assert!(response.result.message.contains("spec.monitoring"));
    }

    /// Story: vanilla rejects dev flags on FoundryInit
    #[test]
    fn story_vanilla_denies_dev_flags() {
        let validator = vanilla_validator();
        let req = review(init_object(serde_json::json!({
            "devFlags": {"logLevel": "debug"}
        })));

        let response = validator.validate_init(&req);
        assert!(!response.allowed);
        assert!(response.result.message.contains("spec.devFlags"));
    }

    /// Story: an undecodable object yields a structured invalid response
    ///
    /// A garbage write must surface as a Bad-Request style denial to the
    /// caller, not crash the webhook.
    #[test]
    fn story_undecodable_object_is_invalid_not_a_crash() {
        let validator = vanilla_validator();
        let req = review(serde_json::json!({
            "apiVersion": "foundry.dev/v1alpha1",
            "kind": "FoundryInit",
            "metadata": {"name": "default-init"},
            "spec": {"monitoring": {"managementState": "NotARealState"}}
        }));

        let response = validator.validate_init(&req);
        assert!(!response.allowed);
        assert!(response.result.message.contains("does not decode"));
    }

    // =========================================================================
    // Standard Validation Stories
    // =========================================================================

    /// Story: standard variants allow everything the schema allows
    #[test]
    fn story_standard_allows_full_platform() {
        let validator = standard_validator();
        let req = review(platform_object(serde_json::json!({
            "dashboard": {"managementState": "Managed"},
            "pipelines": {"managementState": "Managed"},
            "modelServing": {"managementState": "Managed"},
            "workbenches": {"managementState": "Managed"}
        })));

        assert!(validator.validate_platform(&req).allowed);
    }
}

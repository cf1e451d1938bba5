//! Admission webhook and health probe servers
//!
//! The webhook server terminates TLS with certificates mounted into the
//! operator pod and exposes one validation endpoint per top-level custom
//! resource. Delete operations are allowed unconditionally; everything else is
//! dispatched to the active variant's [`validate::PlatformValidator`].

pub mod validate;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_server::tls_rustls::RustlsConfig;
use kube::api::DynamicObject;
use kube::core::admission::{
    AdmissionRequest, AdmissionResponse, AdmissionReview, ConvertAdmissionReviewError, Operation,
};
use tracing::{error, info};

use validate::PlatformValidator;

use crate::{Error, Result};

/// Shared state for webhook handlers
pub struct WebhookState {
    /// The active variant's validator
    pub validator: Box<dyn PlatformValidator>,
}

impl WebhookState {
    /// Create webhook state around a variant validator
    pub fn new(validator: Box<dyn PlatformValidator>) -> Self {
        Self { validator }
    }
}

/// Create the webhook router with all validation endpoints
///
/// - POST /validate/foundryinits - validate FoundryInit writes
/// - POST /validate/foundryplatforms - validate FoundryPlatform writes
pub fn webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/validate/foundryinits", post(validate_init_handler))
        .route("/validate/foundryplatforms", post(validate_platform_handler))
        .with_state(state)
}

/// Create the health/readiness probe router
pub fn health_router() -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(|| async { "ok" }))
}

/// Serve the webhook router over TLS. Blocks until the server exits.
pub async fn serve_webhook(
    router: Router,
    addr: SocketAddr,
    cert_path: &Path,
    key_path: &Path,
) -> Result<()> {
    let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(|err| Error::webhook(format!("failed to load webhook TLS config: {err}")))?;

    info!(addr = %addr, "Starting admission webhook HTTPS server");
    axum_server::bind_rustls(addr, tls_config)
        .serve(router.into_make_service())
        .await
        .map_err(|err| Error::webhook(format!("webhook server error: {err}")))
}

/// Serve the health router over plain HTTP. Blocks until the server exits.
pub async fn serve_health(addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| Error::webhook(format!("failed to bind health server: {err}")))?;

    info!(addr = %addr, "Starting health probe server");
    axum::serve(listener, health_router())
        .await
        .map_err(|err| Error::webhook(format!("health server error: {err}")))
}

/// Convert an incoming review into a request, short-circuiting malformed
/// payloads into invalid responses
fn into_request(
    review: AdmissionReview<DynamicObject>,
) -> std::result::Result<AdmissionRequest<DynamicObject>, AdmissionResponse> {
    review.try_into().map_err(|err: ConvertAdmissionReviewError| {
        error!(error = %err, "Failed to parse admission request");
        AdmissionResponse::invalid(err.to_string())
    })
}

async fn validate_init_handler(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<DynamicObject>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let req = match into_request(review) {
        Ok(req) => req,
        Err(response) => return Json(response.into_review()),
    };

    // Delete operations are always allowed for every variant
    if req.operation == Operation::Delete {
        return Json(AdmissionResponse::from(&req).into_review());
    }

    Json(state.validator.validate_init(&req).into_review())
}

async fn validate_platform_handler(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<DynamicObject>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let req = match into_request(review) {
        Ok(req) => req,
        Err(response) => return Json(response.into_review()),
    };

    if req.operation == Operation::Delete {
        return Json(AdmissionResponse::from(&req).into_review());
    }

    Json(state.validator.validate_platform(&req).into_review())
}

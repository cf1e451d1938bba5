//! Controller implementations for Foundry CRDs
//!
//! Controllers are built as boxed futures (one per custom resource) that the
//! Run phase joins for the process lifetime. Each `*_controller` constructor
//! is pure: it wires an API, a watcher config, and a reconcile function, and
//! returns the future without starting it.

pub mod component;
pub mod init;
pub mod platform;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use kube::runtime::controller::Action;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::Client;

use crate::platform::{Meta, Variant};
use crate::Error;

pub use init::init_controller;
pub use platform::{platform_controller, PlatformContext};

/// A controller future ready to be joined by the Run phase
pub type ControllerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Watcher timeout (seconds) - must be less than the client read timeout (30s)
/// so the API server closes idle watches before the client times out.
pub const WATCH_TIMEOUT_SECS: u32 = 25;

/// Default watcher configuration shared by all controllers
pub fn watcher_config() -> WatcherConfig {
    WatcherConfig::default().timeout(WATCH_TIMEOUT_SECS)
}

/// Shared context handed to every reconciler.
///
/// `meta` is the instance-owned cluster metadata discovered during Init,
/// injected here instead of being exposed through a process-global.
pub struct ControllerContext {
    /// Kubernetes client
    pub client: Client,
    /// Active platform variant
    pub variant: &'static Variant,
    /// Cluster metadata discovered during Init
    pub meta: Meta,
    /// Namespace the operator runs in
    pub operator_namespace: String,
}

impl ControllerContext {
    /// Create a new controller context
    pub fn new(
        client: Client,
        variant: &'static Variant,
        meta: Meta,
        operator_namespace: impl Into<String>,
    ) -> Self {
        Self {
            client,
            variant,
            meta,
            operator_namespace: operator_namespace.into(),
        }
    }
}

/// Default error policy: log and retry with a fixed backoff
pub fn default_error_policy<K, C>(_obj: Arc<K>, error: &Error, _ctx: Arc<C>) -> Action {
    tracing::warn!(error = %error, "reconciliation failed, requeueing");
    Action::requeue(Duration::from_secs(30))
}

/// Creates a closure for logging reconciliation results.
pub fn log_reconcile_result<T: std::fmt::Debug, E: std::fmt::Debug>(
    controller_name: &'static str,
) -> impl Fn(Result<T, E>) -> std::future::Ready<()> {
    move |result| {
        match result {
            Ok(action) => {
                tracing::debug!(?action, "{} reconciliation completed", controller_name)
            }
            Err(e) => tracing::error!(error = ?e, "{} reconciliation error", controller_name),
        }
        std::future::ready(())
    }
}

/// Returns true if a Kubernetes error is a 404
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(e) if e.code == 404)
}

//! Error types for the Foundry operator

use thiserror::Error;

/// Main error type for Foundry operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Platform type detection error
    #[error("platform detection error: {0}")]
    Detection(String),

    /// Lifecycle phase ordering violation
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// Validation error for CRD specs
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Upgrade/cleanup error
    #[error("upgrade error: {0}")]
    Upgrade(String),

    /// Webhook server error
    #[error("webhook error: {0}")]
    Webhook(String),

    /// Multiple handler failures collected during registry fan-out
    #[error("{0}")]
    Aggregate(AggregateError),
}

impl Error {
    /// Create a detection error with the given message
    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection(msg.into())
    }

    /// Create a lifecycle error with the given message
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create an upgrade error with the given message
    pub fn upgrade(msg: impl Into<String>) -> Self {
        Self::Upgrade(msg.into())
    }

    /// Create a webhook error with the given message
    pub fn webhook(msg: impl Into<String>) -> Self {
        Self::Webhook(msg.into())
    }
}

/// Collected failures from a registry fan-out.
///
/// Every failing handler contributes an entry; none are dropped, so one
/// misbehaving handler cannot mask a sibling's failure. The caller decides
/// whether the aggregate is fatal.
#[derive(Debug, Default)]
pub struct AggregateError {
    failures: Vec<(String, Error)>,
}

impl AggregateError {
    /// Create an empty aggregate
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a handler failure
    pub fn push(&mut self, handler: impl Into<String>, err: Error) {
        self.failures.push((handler.into(), err));
    }

    /// Returns true if no failures were recorded
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of recorded failures
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// The recorded failures, in handler registration order
    pub fn failures(&self) -> &[(String, Error)] {
        &self.failures
    }

    /// Convert into `Ok(())` when empty, or the aggregate error otherwise
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Aggregate(self))
        }
    }
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} handler(s) failed: ", self.failures.len())?;
        for (i, (name, err)) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{name}: {err}")?;
        }
        Ok(())
    }
}

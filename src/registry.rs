//! Ordered handler registries with aggregated fan-out
//!
//! A registry decouples "what handlers exist" from "who invokes them". The
//! component and service registries are assembled once during single-threaded
//! startup composition in [`crate::platform::PlatformInstance`] and frozen
//! behind `Arc` before the controller workers start; mutation is therefore
//! impossible once the manager runs, by construction rather than by locking.

use crate::error::AggregateError;
use crate::Result;

/// A handler that can identify itself for diagnostics
pub trait Named {
    /// Unique handler name within its registry
    fn name(&self) -> &'static str;
}

impl<T: Named + ?Sized> Named for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Ordered collection of handlers.
///
/// Handlers are visited in registration order. Fan-out never short-circuits:
/// every handler runs, and all failures are aggregated so one misbehaving
/// handler cannot mask a sibling's failure.
pub struct Registry<H> {
    handlers: Vec<H>,
}

impl<H: Named> Registry<H> {
    /// Create a registry from an ordered handler list
    pub fn new(handlers: Vec<H>) -> Self {
        Self { handlers }
    }

    /// Append a handler. Only valid during single-threaded startup composition.
    pub fn add(&mut self, handler: H) {
        self.handlers.push(handler);
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handlers are registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Iterate over handlers in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, H> {
        self.handlers.iter()
    }

    /// Invoke `f` for every handler in registration order, collecting every
    /// returned error into one aggregate.
    ///
    /// Returns `Ok(())` only if all handlers succeeded. The caller decides
    /// whether a non-empty aggregate is fatal.
    pub fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&H) -> Result<()>,
    {
        let mut errors = AggregateError::new();
        for handler in &self.handlers {
            if let Err(err) = f(handler) {
                errors.push(handler.name(), err);
            }
        }
        errors.into_result()
    }
}

impl<H: Named> Default for Registry<H> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

//! # Handler registry.
//!
//! Pure mapping from event kind to an ordered list of handlers. Registration
//! happens only while the engine is being built (single-threaded); lookup
//! happens only from the single dispatch loop — so the registry needs no
//! locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::events::EventKind;
use crate::handlers::Handle;

/// Ordered kind → handlers mapping.
#[derive(Default)]
pub struct HandlerRegistry {
    map: HashMap<EventKind, Vec<Arc<dyn Handle>>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`.
    ///
    /// Appends: registering for a kind already in use never replaces existing
    /// subscribers; registration order is the dispatch order.
    pub fn on(&mut self, kind: EventKind, handler: Arc<dyn Handle>) {
        self.map.entry(kind).or_default().push(handler);
    }

    /// Returns the handlers registered for `kind`, in registration order.
    ///
    /// An unknown kind yields an empty slice, not an error.
    pub fn lookup(&self, kind: EventKind) -> &[Arc<dyn Handle>] {
        self.map.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct kinds with at least one handler.
    pub fn kinds(&self) -> usize {
        self.map.len()
    }
}

/// A pluggable unit contributing a fixed set of (kind, handler) pairs.
///
/// Replaces runtime introspection with explicit registration: the engine
/// builder calls [`Module::attach`] once, before any producer starts.
pub trait Module: Send + Sync {
    /// Registers this module's handlers.
    fn attach(self: Arc<Self>, registry: &mut HandlerRegistry);
}

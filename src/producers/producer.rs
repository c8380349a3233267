//! # The producer abstraction.
//!
//! A producer is a unit of concurrent work that repeatedly performs a blocking
//! external operation and turns each result into zero or more events pushed
//! onto the delivery path. Producers run independently, never invoke each other
//! or any handler, and may terminate permanently on unrecoverable failure.
//!
//! [`Produce`] is object-safe; [`ProducerFn`] adapts a closure, producing a
//! fresh future per spawn so no shared mutable state leaks between runs.
//!
//! ## Termination contract
//! - `Ok(())` after cancellation, or [`ProduceError::Canceled`]: cooperative
//!   stop, nothing more to do.
//! - `Ok(())` while the engine is still running: silent exhaustion; the engine
//!   detects it and shuts down with the generic internal code.
//! - [`ProduceError::Fatal`]: the engine stops with the carried code.

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::ProduceError;
use crate::events::{BusSender, Event};

/// Boxed producer body future.
pub type BoxProduceFuture = Pin<Box<dyn Future<Output = Result<(), ProduceError>> + Send>>;

/// Shared handle to a producer.
pub type ProducerRef = Arc<dyn Produce>;

/// Execution context handed to a producer body: its emit handle plus the
/// cancellation token shutdown is signalled through.
#[derive(Clone)]
pub struct ProducerCtx {
    tx: BusSender,
    token: CancellationToken,
}

impl ProducerCtx {
    pub(crate) fn new(tx: BusSender, token: CancellationToken) -> Self {
        Self { tx, token }
    }

    /// Pushes an event onto the delivery path.
    pub fn emit(&self, ev: Event) {
        self.tx.emit(ev);
    }

    /// True once shutdown has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once shutdown has been requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

/// A unit of concurrent event production.
pub trait Produce: Send + Sync + 'static {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Creates the producer body. Called once per engine run.
    fn spawn(&self, ctx: ProducerCtx) -> BoxProduceFuture;
}

/// Function-backed producer.
///
/// Wraps a closure that *creates* a new future per spawn.
pub struct ProducerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ProducerFn<F> {
    /// Creates a function-backed producer.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the producer and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Produce for ProducerFn<F>
where
    F: Fn(ProducerCtx) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ProduceError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, ctx: ProducerCtx) -> BoxProduceFuture {
        Box::pin((self.f)(ctx))
    }
}

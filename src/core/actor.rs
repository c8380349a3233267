//! # Producer actor: runs one producer body and translates its termination.
//!
//! The engine spawns one actor per registered producer. The actor turns the
//! body's outcome into the shutdown contract:
//!
//! ```text
//! body returns Ok(())    + cancelled     → cooperative stop, nothing emitted
//! body returns Ok(())    + still running → silent exhaustion → Stop(Internal)
//! body returns Canceled                  → cooperative stop, nothing emitted
//! body returns Fatal{code}               → Stop(code) with the diagnostic
//! ```
//!
//! This makes "producer execution context ended" and "explicit stop event
//! received" equivalent triggers for shutdown evaluation: a producer can never
//! end without the dispatcher noticing.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ProduceError;
use crate::events::{BusSender, Event};
use crate::exit::ExitCode;
use crate::producers::{ProducerCtx, ProducerRef};

pub(crate) struct ProducerActor {
    pub producer: ProducerRef,
    pub tx: BusSender,
    pub token: CancellationToken,
}

impl ProducerActor {
    pub(crate) async fn run(self) {
        let name = self.producer.name().to_string();
        debug!(producer = %name, "producer starting");

        let ctx = ProducerCtx::new(self.tx.clone(), self.token.clone());
        match self.producer.spawn(ctx).await {
            Ok(()) if self.token.is_cancelled() => {
                debug!(producer = %name, "producer stopped");
            }
            Ok(()) => {
                warn!(producer = %name, "producer ended without a stop event");
                self.tx.emit(
                    Event::stop(ExitCode::Internal)
                        .with_content(format!("producer '{name}' ended silently")),
                );
            }
            Err(ProduceError::Canceled) => {
                debug!(producer = %name, "producer cancelled");
            }
            Err(ProduceError::Fatal { code, reason }) => {
                warn!(producer = %name, code = code.code(), %reason, "producer failed");
                self.tx.emit(Event::stop(code).with_content(reason));
            }
        }
    }
}

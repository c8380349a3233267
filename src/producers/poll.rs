//! # Poll loop producer.
//!
//! Repeatedly runs the session's blocking long-poll and emits one
//! `PollComplete` event per result. The poll is raced against cancellation so
//! shutdown is observed between operations.
//!
//! ## Fault translation
//! - session/auth loss → fatal with [`ExitCode::SessionFault`]
//! - any other poll failure → fatal with [`ExitCode::PollFault`]

use crate::error::ProduceError;
use crate::events::Event;
use crate::exit::ExitCode;
use crate::producers::{BoxProduceFuture, Produce, ProducerCtx};
use crate::session::SessionRef;

/// Producer wrapping [`Session::poll`](crate::Session::poll).
pub struct PollProducer {
    session: SessionRef,
}

impl PollProducer {
    /// Creates the poll producer over a session handle.
    pub fn new(session: SessionRef) -> Self {
        Self { session }
    }
}

impl Produce for PollProducer {
    fn name(&self) -> &str {
        "poll"
    }

    fn spawn(&self, ctx: ProducerCtx) -> BoxProduceFuture {
        let session = self.session.clone();
        Box::pin(async move {
            loop {
                tokio::select! {
                    _ = ctx.cancelled() => return Ok(()),
                    res = session.poll() => match res {
                        Ok(outcome) => ctx.emit(Event::poll_complete(outcome)),
                        Err(e) => {
                            let code = if e.is_auth() {
                                ExitCode::SessionFault
                            } else {
                                ExitCode::PollFault
                            };
                            return Err(ProduceError::fatal(code, e));
                        }
                    },
                }
            }
        })
    }
}

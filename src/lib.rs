//! # relaybot
//!
//! A concurrent event-dispatch engine for a long-running messaging agent, plus
//! the process-level supervisor that keeps it alive across restarts.
//!
//! ## Architecture
//! ```text
//! ┌──────────────────────────── child process ────────────────────────────┐
//! │                                                                       │
//! │  PollProducer ──┐                                                     │
//! │  FetchProducer ─┼──► Bus ──► dispatch loop ──► HandlerRegistry        │
//! │  TermProducer ──┘  (mpsc)    (single task)     (kind → handlers)      │
//! │                                   │                                   │
//! │                                   ▼                                   │
//! │                       StopHandle (first code wins)                    │
//! │                                   │                                   │
//! └───────────────────────── exit(code) ─┼───────────────────────────────┘
//!                                        ▼
//!                        Supervisor: decide(code) → exit / relaunch
//! ```
//!
//! Producers run as independent tasks and push [`Event`]s onto one unbounded
//! delivery path. A single dispatch loop pops events and invokes the handlers
//! registered for each event's kind, sequentially and in registration order;
//! handlers never run concurrently with each other. Any handler, producer, or
//! OS signal can request shutdown with an [`ExitCode`]; the first recorded
//! code becomes the process exit code, which the [`supervisor`] maps onto a
//! relaunch decision.
//!
//! ## Quick start
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use relaybot::{
//!     BotConfig, Contact, ContactKind, Contacts, Engine, Event, PollOutcome, Session,
//!     SessionError,
//! };
//!
//! struct EchoSession;
//!
//! #[async_trait]
//! impl Session for EchoSession {
//!     async fn poll(&self) -> Result<PollOutcome, SessionError> {
//!         tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!         Ok(PollOutcome::Timeout)
//!     }
//!
//!     async fn fetch(&self) -> Result<Vec<Event>, SessionError> {
//!         Ok(Vec::new())
//!     }
//!
//!     async fn send_one(&self, contact: &Contact, chunk: &str) -> Result<(), SessionError> {
//!         println!("-> {contact}: {chunk}");
//!         Ok(())
//!     }
//! }
//!
//! struct NoContacts;
//!
//! impl Contacts for NoContacts {
//!     fn get(&self, _: ContactKind, _: &str) -> Vec<Contact> {
//!         Vec::new()
//!     }
//!
//!     fn list(&self, _: ContactKind) -> Vec<Contact> {
//!         Vec::new()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = Engine::standard(
//!         BotConfig::default(),
//!         Arc::new(EchoSession),
//!         Arc::new(NoContacts),
//!     )
//!     .build();
//!     std::process::exit(engine.run().await.code());
//! }
//! ```
//!
//! ## Guarantees
//! - Delivery never drops an event before shutdown; per-producer FIFO holds.
//! - Exactly one dispatch loop; handler side effects need no synchronization
//!   against other handlers.
//! - The first `stop(code)` wins; `run` returns exactly once with that code.
//! - Shutdown discards queued events, cancels producers, and bounds the wait
//!   with a grace period.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod exit;
pub mod handlers;
pub mod outbound;
pub mod producers;
pub mod session;
pub mod supervisor;

pub use cli::Cli;
pub use config::BotConfig;
pub use crate::core::{BotCtx, Engine, EngineBuilder, Phase, StopHandle};
pub use error::{HandlerError, ProduceError, SessionError, SupervisorError};
pub use events::{Bus, BusSender, ChatReply, Event, EventKind, ReplyHandle, ReplySink};
pub use exit::ExitCode;
pub use handlers::{CommandSet, EventLogger, Handle, HandlerRegistry, Module, PollTranslator};
pub use outbound::{split_utf8, Outbound, SendResult};
pub use producers::{
    FetchProducer, PollProducer, Produce, ProducerCtx, ProducerFn, ProducerRef, TermProducer,
};
pub use session::{
    Contact, ContactKind, Contacts, ContactsRef, InboundMessage, PollOutcome, Session, SessionRef,
};
pub use supervisor::{decide, LaunchPlan, Relaunch, Supervisor};

//! # Engine: producers, the delivery path, and the dispatch loop.
//!
//! The [`Engine`] owns the set of producers, the single ordered delivery path
//! from all producers to one dispatch loop, the handler registry, and the
//! process-lifetime state (phase + exit code).
//!
//! ## Architecture
//! ```text
//! Producers (one task each):            Dispatch loop (one task):
//!   poll  ──┐
//!   fetch ──┼──────► Bus ─────────────► recv() ──► registry.lookup(kind)
//!   term  ──┘   (mpsc, unbounded)                    │
//!                                                    ▼
//!                                      handlers, sequentially, in
//!                                      registration order, on the
//!                                      dispatch loop's own task
//! ```
//!
//! ## Shutdown path
//! ```text
//! handler ctx.stop(code) ─┐
//! producer Stop event ────┼─► StopHandle (first code wins) ─► token.cancel()
//! OS signal ──────────────┘                                     │
//!                                                               ▼
//!                              dispatch loop exits after the current event;
//!                              remaining queued events are discarded;
//!                              producers joined within the grace period
//! ```
//!
//! ## Rules
//! - Handlers never run concurrently with each other.
//! - A handler error (or panic) is logged; dispatch continues.
//! - Per-producer FIFO; no ordering guarantee across producers.
//! - `run` returns exactly once, with the recorded exit code.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

use crate::config::BotConfig;
use crate::core::actor::ProducerActor;
use crate::core::ctx::BotCtx;
use crate::core::shutdown;
use crate::core::stop::{Phase, StopHandle};
use crate::events::{Bus, Event, EventKind};
use crate::exit::ExitCode;
use crate::handlers::{
    CommandSet, EventLogger, Handle, HandlerRegistry, Module, PollTranslator,
};
use crate::outbound::Outbound;
use crate::producers::{FetchProducer, PollProducer, ProducerRef, TermProducer};
use crate::session::{ContactsRef, SessionRef};

/// Builder for [`Engine`]; all registration happens here, before `run`.
pub struct EngineBuilder {
    config: BotConfig,
    contacts: ContactsRef,
    session: SessionRef,
    producers: Vec<ProducerRef>,
    registry: HandlerRegistry,
}

impl EngineBuilder {
    /// Registers a producer to be started by `run`. No upper bound; producers
    /// are independent and any subset may fail on its own.
    pub fn producer(mut self, producer: ProducerRef) -> Self {
        self.producers.push(producer);
        self
    }

    /// Registers `handler` for `kind`, after any handlers already registered
    /// for that kind.
    pub fn on(mut self, kind: EventKind, handler: Arc<dyn Handle>) -> Self {
        self.registry.on(kind, handler);
        self
    }

    /// Attaches a pluggable module (a fixed set of kind/handler pairs).
    pub fn module(mut self, module: Arc<dyn Module>) -> Self {
        module.attach(&mut self.registry);
        self
    }

    /// Finalizes the engine.
    pub fn build(self) -> Engine {
        let bus = Bus::new();
        let stop = StopHandle::new(CancellationToken::new());
        let outbound = Outbound::new(
            self.session,
            self.contacts.clone(),
            self.config.chunk_limit,
        );
        let ctx = BotCtx::new(
            outbound,
            self.contacts,
            stop.clone(),
            bus.sender(),
            self.config.clone(),
        );
        Engine {
            config: self.config,
            registry: self.registry,
            producers: self.producers,
            bus,
            stop,
            ctx,
        }
    }
}

/// The concurrent event-dispatch engine.
pub struct Engine {
    config: BotConfig,
    registry: HandlerRegistry,
    producers: Vec<ProducerRef>,
    bus: Bus,
    stop: StopHandle,
    ctx: BotCtx,
}

impl Engine {
    /// Starts an empty builder over the given collaborators.
    pub fn builder(config: BotConfig, session: SessionRef, contacts: ContactsRef) -> EngineBuilder {
        EngineBuilder {
            config,
            contacts,
            session,
            producers: Vec::new(),
            registry: HandlerRegistry::new(),
        }
    }

    /// Builder pre-wired with the standard producers (poll, fetch, control
    /// channel) and built-in handlers (poll translation, command set,
    /// lifecycle logging).
    pub fn standard(config: BotConfig, session: SessionRef, contacts: ContactsRef) -> EngineBuilder {
        let fetch_interval = config.fetch_interval;
        let term_port = config.term_port;
        Engine::builder(config, session.clone(), contacts)
            .producer(Arc::new(PollProducer::new(session.clone())))
            .producer(Arc::new(FetchProducer::new(session, fetch_interval)))
            .producer(Arc::new(TermProducer::new(term_port)))
            .on(EventKind::PollComplete, Arc::new(PollTranslator))
            .module(Arc::new(CommandSet::new()))
            .module(Arc::new(EventLogger))
    }

    /// Cloneable handle for observing the phase or stopping from outside.
    pub fn handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.stop.phase()
    }

    /// Runs the engine until shutdown and returns the recorded exit code.
    ///
    /// Starts every producer concurrently, then dispatches events until a stop
    /// is requested (handler call, producer stop event, delivery-path closure,
    /// or OS signal). Shutdown discards events still queued, cancels all
    /// producers, and joins them within the configured grace period; producers
    /// stuck past the grace are aborted.
    pub async fn run(self) -> ExitCode {
        let Engine {
            config,
            registry,
            producers,
            mut bus,
            stop,
            ctx,
        } = self;

        stop.set_phase(Phase::Running);
        let mut set = JoinSet::new();
        for producer in producers {
            let actor = ProducerActor {
                producer,
                tx: bus.sender(),
                token: stop.token().child_token(),
            };
            set.spawn(actor.run());
        }

        let signal = shutdown::wait_for_shutdown_signal();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                _ = stop.token().cancelled() => break,
                res = &mut signal => {
                    if let Err(e) = res {
                        warn!(error = %e, "signal registration failed");
                    } else {
                        info!("termination signal received");
                    }
                    stop.stop(ExitCode::Clean);
                    break;
                }
                maybe = bus.recv() => {
                    let Some(ev) = maybe else {
                        // Cannot happen while ctx holds a sender; treat as fault.
                        stop.stop(ExitCode::Internal);
                        break;
                    };
                    dispatch(&registry, &ctx, &ev).await;
                    if ev.kind == EventKind::Stop {
                        stop.stop(ev.code.unwrap_or(ExitCode::Internal));
                    }
                    if stop.token().is_cancelled() {
                        break;
                    }
                }
            }
        }

        // Idempotent: guarantees cancellation reaches producers on every path.
        stop.stop(ExitCode::Clean);

        let drained = async { while set.join_next().await.is_some() {} };
        if tokio::time::timeout(config.grace, drained).await.is_err() {
            warn!(
                grace_ms = config.grace.as_millis() as u64,
                "producers did not stop within grace period, aborting"
            );
            set.abort_all();
            while set.join_next().await.is_some() {}
        }

        stop.set_phase(Phase::Stopped);
        let code = stop.code();
        info!(code = code.code(), cause = code.describe(), "engine stopped");
        code
    }
}

/// Invokes every handler registered for the event's kind, in order.
///
/// Errors and panics are logged and never abort the loop.
async fn dispatch(registry: &HandlerRegistry, ctx: &BotCtx, ev: &Event) {
    let handlers = registry.lookup(ev.kind);
    if handlers.is_empty() {
        trace!(kind = ?ev.kind, "no handlers registered");
        return;
    }
    for handler in handlers {
        let fut = handler.on_event(ctx, ev);
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(handler = handler.name(), kind = ?ev.kind, error = %e, "handler failed");
            }
            Err(panic) => {
                warn!(handler = handler.name(), kind = ?ev.kind, "handler panicked: {panic:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::error::{HandlerError, SessionError};
    use crate::producers::{ProducerCtx, ProducerFn};
    use crate::session::{
        Contact, ContactKind, Contacts, InboundMessage, PollOutcome, Session,
    };

    /// Routes dispatch-loop logs through the test harness; safe to call from
    /// every test, only the first init sticks.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[derive(Default)]
    struct TestSession {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Session for TestSession {
        async fn poll(&self) -> Result<PollOutcome, SessionError> {
            std::future::pending().await
        }

        async fn fetch(&self) -> Result<Vec<Event>, SessionError> {
            Ok(Vec::new())
        }

        async fn send_one(&self, contact: &Contact, chunk: &str) -> Result<(), SessionError> {
            self.sent
                .lock()
                .unwrap()
                .push((contact.uin.clone(), chunk.to_string()));
            Ok(())
        }
    }

    struct NoContacts;

    impl Contacts for NoContacts {
        fn get(&self, _: ContactKind, _: &str) -> Vec<Contact> {
            Vec::new()
        }

        fn list(&self, _: ContactKind) -> Vec<Contact> {
            Vec::new()
        }
    }

    fn test_config() -> BotConfig {
        BotConfig {
            grace: Duration::from_secs(2),
            reply_delay: (Duration::ZERO, Duration::ZERO),
            ..BotConfig::default()
        }
    }

    fn builder_with(session: Arc<TestSession>) -> EngineBuilder {
        Engine::builder(test_config(), session, Arc::new(NoContacts))
    }

    /// Producer that emits its events then waits for cancellation.
    fn emitter(name: &'static str, events: Vec<Event>) -> ProducerRef {
        ProducerFn::arc(name, move |ctx: ProducerCtx| {
            let events = events.clone();
            async move {
                for ev in events {
                    ctx.emit(ev);
                }
                ctx.cancelled().await;
                Ok(())
            }
        })
    }

    struct Recorder {
        seen: Arc<Mutex<Vec<String>>>,
        stop_at: usize,
    }

    #[async_trait]
    impl Handle for Recorder {
        async fn on_event(&self, ctx: &BotCtx, ev: &Event) -> Result<(), HandlerError> {
            let mut seen = self.seen.lock().unwrap();
            if let Some(content) = ev.content.as_deref() {
                seen.push(content.to_string());
            }
            if seen.len() >= self.stop_at {
                ctx.stop(ExitCode::Clean);
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    fn tagged(tag: &str, n: usize) -> Vec<Event> {
        (0..n)
            .map(|i| Event::new(EventKind::ContactAdded).with_content(format!("{tag}{i}")))
            .collect()
    }

    #[tokio::test]
    async fn per_producer_fifo_is_preserved() {
        init_tracing();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let engine = builder_with(Arc::new(TestSession::default()))
            .producer(emitter("a", tagged("a", 50)))
            .producer(emitter("b", tagged("b", 50)))
            .on(
                EventKind::ContactAdded,
                Arc::new(Recorder {
                    seen: seen.clone(),
                    stop_at: 100,
                }),
            )
            .build();

        let code = engine.run().await;
        assert_eq!(code, ExitCode::Clean);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 100);
        for tag in ["a", "b"] {
            let order: Vec<&String> = seen.iter().filter(|s| s.starts_with(tag)).collect();
            let expected: Vec<String> = (0..50).map(|i| format!("{tag}{i}")).collect();
            assert_eq!(order.len(), 50, "all of {tag}'s events delivered");
            for (got, want) in order.iter().zip(&expected) {
                assert_eq!(*got, want, "{tag}'s events in emission order");
            }
        }
    }

    #[tokio::test]
    async fn events_without_handlers_dispatch_silently() {
        let engine = builder_with(Arc::new(TestSession::default()))
            .producer(emitter(
                "orphan",
                vec![
                    Event::new(EventKind::PollTimeout),
                    Event::stop(ExitCode::Clean),
                ],
            ))
            .build();
        assert_eq!(engine.run().await, ExitCode::Clean);
    }

    struct Flaky {
        order: Arc<Mutex<Vec<&'static str>>>,
        label: &'static str,
        mode: &'static str,
    }

    #[async_trait]
    impl Handle for Flaky {
        async fn on_event(&self, _: &BotCtx, _: &Event) -> Result<(), HandlerError> {
            self.order.lock().unwrap().push(self.label);
            match self.mode {
                "err" => Err(HandlerError::msg("deliberate failure")),
                "panic" => panic!("deliberate panic"),
                _ => Ok(()),
            }
        }

        fn name(&self) -> &'static str {
            self.label
        }
    }

    #[tokio::test]
    async fn handler_failure_does_not_skip_later_handlers() {
        init_tracing();
        let order = Arc::new(Mutex::new(Vec::new()));
        let mk = |label, mode| {
            Arc::new(Flaky {
                order: order.clone(),
                label,
                mode,
            })
        };
        let engine = builder_with(Arc::new(TestSession::default()))
            .producer(emitter(
                "events",
                vec![
                    Event::new(EventKind::ContactLost),
                    Event::stop(ExitCode::Clean),
                ],
            ))
            .on(EventKind::ContactLost, mk("h1", "err"))
            .on(EventKind::ContactLost, mk("h2", "panic"))
            .on(EventKind::ContactLost, mk("h3", "ok"))
            .build();

        assert_eq!(engine.run().await, ExitCode::Clean);
        assert_eq!(*order.lock().unwrap(), vec!["h1", "h2", "h3"]);
    }

    struct DoubleStopper;

    #[async_trait]
    impl Handle for DoubleStopper {
        async fn on_event(&self, ctx: &BotCtx, _: &Event) -> Result<(), HandlerError> {
            ctx.stop(ExitCode::Other(7));
            ctx.stop(ExitCode::Other(9));
            Ok(())
        }
    }

    #[tokio::test]
    async fn first_stop_code_wins() {
        let engine = builder_with(Arc::new(TestSession::default()))
            .producer(emitter("one", vec![Event::new(EventKind::ContactAdded)]))
            .on(EventKind::ContactAdded, Arc::new(DoubleStopper))
            .build();
        assert_eq!(engine.run().await, ExitCode::Other(7));
    }

    #[tokio::test]
    async fn producer_stop_event_sets_the_exit_code() {
        let engine = builder_with(Arc::new(TestSession::default()))
            .producer(emitter("stopper", vec![Event::stop(ExitCode::from_code(42))]))
            .build();
        let code = engine.run().await;
        assert_eq!(code.code(), 42);
    }

    #[tokio::test]
    async fn silent_producer_end_stops_the_engine_with_internal() {
        let quitter = ProducerFn::arc("quitter", |_ctx: ProducerCtx| async { Ok(()) });
        let engine = builder_with(Arc::new(TestSession::default()))
            .producer(quitter)
            .build();
        assert_eq!(engine.run().await, ExitCode::Internal);
    }

    #[tokio::test]
    async fn blocked_producer_is_cancelled_within_grace() {
        let observed_cancel = Arc::new(AtomicBool::new(false));
        let flag = observed_cancel.clone();
        let sleeper = ProducerFn::arc("sleeper", move |ctx: ProducerCtx| {
            let flag = flag.clone();
            async move {
                ctx.cancelled().await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        });
        let engine = builder_with(Arc::new(TestSession::default()))
            .producer(sleeper)
            .producer(emitter("stopper", vec![Event::stop(ExitCode::Clean)]))
            .build();

        let code = tokio::time::timeout(Duration::from_secs(5), engine.run())
            .await
            .expect("engine must not leak the blocked producer");
        assert_eq!(code, ExitCode::Clean);
        assert!(observed_cancel.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn phase_transitions_are_observable() {
        let engine = builder_with(Arc::new(TestSession::default()))
            .producer(emitter("stopper", vec![Event::stop(ExitCode::Clean)]))
            .build();
        let handle = engine.handle();
        assert_eq!(handle.phase(), Phase::Initializing);
        engine.run().await;
        assert_eq!(handle.phase(), Phase::Stopped);
    }

    struct ReplyHello;

    #[async_trait]
    impl Handle for ReplyHello {
        async fn on_event(&self, ctx: &BotCtx, ev: &Event) -> Result<(), HandlerError> {
            ev.reply("hello").await?;
            ctx.stop(ExitCode::Clean);
            Ok(())
        }
    }

    #[tokio::test]
    async fn inbound_message_gets_translated_and_replied_to() {
        let session = Arc::new(TestSession::default());
        let inbound = Event::poll_complete(PollOutcome::Message(InboundMessage {
            kind: ContactKind::Buddy,
            from_uin: "123".into(),
            member_uin: None,
            content: "hi".into(),
        }));
        let engine = builder_with(session.clone())
            .producer(emitter("poll", vec![inbound]))
            .on(EventKind::PollComplete, Arc::new(PollTranslator))
            .on(EventKind::ChatMessage, Arc::new(ReplyHello))
            .build();

        assert_eq!(engine.run().await, ExitCode::Clean);
        let sent = session.sent.lock().unwrap().clone();
        assert_eq!(sent, vec![("123".to_string(), "hello".to_string())]);
    }

    #[tokio::test]
    async fn command_stop_replies_then_stops_clean() {
        let session = Arc::new(TestSession::default());
        let reply = crate::events::ChatReply::handle(
            Outbound::new(session.clone(), Arc::new(NoContacts), 600),
            Contact::new(ContactKind::Buddy, "9", "ann"),
            (Duration::ZERO, Duration::ZERO),
        );
        let command = Event::new(EventKind::ChatMessage)
            .with_content("stop")
            .with_reply(reply);
        let engine = builder_with(session.clone())
            .producer(emitter("chat", vec![command]))
            .module(Arc::new(CommandSet::new()))
            .build();

        assert_eq!(engine.run().await, ExitCode::Clean);
        let sent = session.sent.lock().unwrap().clone();
        assert_eq!(sent, vec![("9".to_string(), "stopping".to_string())]);
    }

    #[tokio::test]
    async fn command_restart_requests_the_restart_code() {
        let session = Arc::new(TestSession::default());
        let command = Event::new(EventKind::TermCommand).with_content("restart");
        let engine = builder_with(session)
            .producer(emitter("term", vec![command]))
            .module(Arc::new(CommandSet::new()))
            .build();
        assert_eq!(engine.run().await, ExitCode::Restart);
    }
}

//! # Fetch loop producer.
//!
//! Sleeps a configured interval (cancellable), then asks the session for
//! accumulated contact bookkeeping events and emits each one in order. Any
//! fetch failure is fatal with [`ExitCode::FetchFault`].

use std::time::Duration;

use crate::error::ProduceError;
use crate::exit::ExitCode;
use crate::producers::{BoxProduceFuture, Produce, ProducerCtx};
use crate::session::SessionRef;

/// Producer wrapping [`Session::fetch`](crate::Session::fetch).
pub struct FetchProducer {
    session: SessionRef,
    interval: Duration,
}

impl FetchProducer {
    /// Creates the fetch producer; `interval` is the pause between runs.
    pub fn new(session: SessionRef, interval: Duration) -> Self {
        Self { session, interval }
    }
}

impl Produce for FetchProducer {
    fn name(&self) -> &str {
        "fetch"
    }

    fn spawn(&self, ctx: ProducerCtx) -> BoxProduceFuture {
        let session = self.session.clone();
        let interval = self.interval;
        Box::pin(async move {
            loop {
                tokio::select! {
                    _ = ctx.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(interval) => {}
                }
                tokio::select! {
                    _ = ctx.cancelled() => return Ok(()),
                    res = session.fetch() => match res {
                        Ok(events) => {
                            for ev in events {
                                ctx.emit(ev);
                            }
                        }
                        Err(e) => return Err(ProduceError::fatal(ExitCode::FetchFault, e)),
                    },
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    use crate::error::SessionError;
    use crate::events::{Bus, Event, EventKind};
    use crate::session::{Contact, PollOutcome, Session};

    struct CountingSession {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Session for CountingSession {
        async fn poll(&self) -> Result<PollOutcome, SessionError> {
            std::future::pending().await
        }

        async fn fetch(&self) -> Result<Vec<Event>, SessionError> {
            match self.calls.fetch_add(1, Ordering::SeqCst) {
                0 => Ok(vec![
                    Event::new(EventKind::ContactAdded),
                    Event::new(EventKind::ContactLost),
                ]),
                _ => Err(SessionError::protocol("feed gone")),
            }
        }

        async fn send_one(&self, _: &Contact, _: &str) -> Result<(), SessionError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn emits_fetched_events_then_fails_with_fetch_fault() {
        let session = Arc::new(CountingSession {
            calls: AtomicUsize::new(0),
        });
        let mut bus = Bus::new();
        let token = CancellationToken::new();
        let ctx = ProducerCtx::new(bus.sender(), token.clone());

        let producer = FetchProducer::new(session, Duration::from_millis(1));
        let err = producer.spawn(ctx).await.unwrap_err();
        assert_eq!(err.code(), Some(ExitCode::FetchFault));

        assert_eq!(bus.recv().await.unwrap().kind, EventKind::ContactAdded);
        assert_eq!(bus.recv().await.unwrap().kind, EventKind::ContactLost);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_elapses_before_the_first_fetch() {
        let session = Arc::new(CountingSession {
            calls: AtomicUsize::new(0),
        });
        let bus = Bus::new();
        let token = CancellationToken::new();
        let ctx = ProducerCtx::new(bus.sender(), token.clone());

        let producer = FetchProducer::new(session.clone(), Duration::from_secs(60));
        let run = tokio::spawn(producer.spawn(ctx));
        tokio::task::yield_now().await; // let the producer register its sleep

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(session.calls.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(session.calls.load(Ordering::SeqCst), 1);

        token.cancel();
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_interval_sleep() {
        let session = Arc::new(CountingSession {
            calls: AtomicUsize::new(0),
        });
        let bus = Bus::new();
        let token = CancellationToken::new();
        let ctx = ProducerCtx::new(bus.sender(), token.clone());

        let producer = FetchProducer::new(session, Duration::from_secs(3600));
        let run = tokio::spawn(producer.spawn(ctx));
        token.cancel();
        let res = tokio::time::timeout(std::time::Duration::from_secs(1), run)
            .await
            .expect("producer must unblock on cancel")
            .unwrap();
        assert!(res.is_ok());
    }
}

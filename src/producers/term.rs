//! # Control-channel producer.
//!
//! Listens on a local TCP port, reads one command line per connection, and
//! emits a `TermCommand` event whose reply capability writes the handler's
//! answer back on the same connection.
//!
//! A connection that sends nothing within the read deadline is dropped without
//! producing an event. Accept errors are logged and the loop continues; only a
//! failed bind is fatal.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::error::{ProduceError, SessionError};
use crate::events::{Event, EventKind, ReplyHandle, ReplySink};
use crate::exit::ExitCode;
use crate::producers::{BoxProduceFuture, Produce, ProducerCtx};

const READ_DEADLINE: Duration = Duration::from_secs(5);

/// Producer accepting commands on a local control port.
pub struct TermProducer {
    addr: SocketAddr,
    // Present only when a listener was injected (tests bind to port 0 first).
    listener: Mutex<Option<TcpListener>>,
}

impl TermProducer {
    /// Creates a producer that will bind `127.0.0.1:port` when started.
    pub fn new(port: u16) -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], port)),
            listener: Mutex::new(None),
        }
    }

    /// Creates a producer over an already-bound listener.
    pub fn with_listener(listener: TcpListener) -> Self {
        let addr = listener
            .local_addr()
            .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 0)));
        Self {
            addr,
            listener: Mutex::new(Some(listener)),
        }
    }
}

impl Produce for TermProducer {
    fn name(&self) -> &str {
        "term"
    }

    fn spawn(&self, ctx: ProducerCtx) -> BoxProduceFuture {
        let addr = self.addr;
        let injected = self.listener.lock().ok().and_then(|mut g| g.take());
        Box::pin(async move {
            let listener = match injected {
                Some(l) => l,
                None => TcpListener::bind(addr).await.map_err(|e| {
                    ProduceError::fatal(
                        ExitCode::Internal,
                        format!("control channel bind {addr}: {e}"),
                    )
                })?,
            };
            info!(%addr, "control channel listening");

            loop {
                tokio::select! {
                    _ = ctx.cancelled() => return Ok(()),
                    res = listener.accept() => match res {
                        Ok((stream, peer)) => {
                            if let Err(e) = serve_connection(stream, &ctx).await {
                                debug!(%peer, error = %e, "control connection dropped");
                            }
                        }
                        Err(e) => warn!(error = %e, "control channel accept failed"),
                    },
                }
            }
        })
    }
}

/// Reads one command line and emits it; the write half becomes the reply path.
async fn serve_connection(stream: TcpStream, ctx: &ProducerCtx) -> std::io::Result<()> {
    let (read_half, write_half) = stream.into_split();
    let mut line = String::new();
    let mut reader = BufReader::new(read_half);

    match tokio::time::timeout(READ_DEADLINE, reader.read_line(&mut line)).await {
        Ok(res) => {
            res?;
        }
        Err(_) => return Ok(()), // silent caller, drop the connection
    }

    let command = line.trim();
    if command.is_empty() {
        return Ok(());
    }
    ctx.emit(
        Event::new(EventKind::TermCommand)
            .with_content(command)
            .with_reply(TermReply::handle(write_half)),
    );
    Ok(())
}

/// Reply path writing back on the originating connection; usable once.
struct TermReply {
    writer: tokio::sync::Mutex<Option<OwnedWriteHalf>>,
}

impl TermReply {
    fn handle(writer: OwnedWriteHalf) -> ReplyHandle {
        ReplyHandle::new(Arc::new(Self {
            writer: tokio::sync::Mutex::new(Some(writer)),
        }))
    }
}

#[async_trait]
impl ReplySink for TermReply {
    async fn deliver(&self, content: &str) -> Result<(), SessionError> {
        let Some(mut writer) = self.writer.lock().await.take() else {
            return Ok(()); // already answered
        };
        writer.write_all(content.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio_util::sync::CancellationToken;

    use crate::events::Bus;

    #[tokio::test]
    async fn command_round_trip_over_the_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let producer = TermProducer::with_listener(listener);

        let mut bus = Bus::new();
        let token = CancellationToken::new();
        let ctx = ProducerCtx::new(bus.sender(), token.clone());
        let run = tokio::spawn(producer.spawn(ctx));

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"ping\n").await.unwrap();

        let ev = bus.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::TermCommand);
        assert_eq!(ev.content.as_deref(), Some("ping"));
        assert!(ev.can_reply());

        ev.reply("pong").await.unwrap();
        let mut answer = String::new();
        client.read_to_string(&mut answer).await.unwrap();
        assert_eq!(answer, "pong\n");

        token.cancel();
        assert!(run.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn empty_line_produces_no_event() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let producer = TermProducer::with_listener(listener);

        let mut bus = Bus::new();
        let token = CancellationToken::new();
        let ctx = ProducerCtx::new(bus.sender(), token.clone());
        let run = tokio::spawn(producer.spawn(ctx));

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"\n").await.unwrap();
        drop(client);

        // Follow up with a real command; if the empty line had produced an
        // event we would see it first.
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"status\n").await.unwrap();
        let ev = bus.recv().await.unwrap();
        assert_eq!(ev.content.as_deref(), Some("status"));

        token.cancel();
        assert!(run.await.unwrap().is_ok());
    }
}

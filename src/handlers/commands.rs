//! # Built-in command set.
//!
//! [`CommandSet`] subscribes to both `ChatMessage` and `TermCommand` events and
//! routes on the first whitespace-separated token, first match wins:
//!
//! ```text
//! help
//! list buddy|group|discuss
//! get buddy|group|discuss <query>
//! member group|discuss <query>
//! send buddy|group|discuss <query> <message...>
//! stop
//! restart
//! ```
//!
//! Unrecognized input is ignored (no reply), so the module can coexist with
//! other subscribers on the same kinds. `stop` and `restart` answer first and
//! then request engine shutdown with the matching exit code.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::core::BotCtx;
use crate::error::HandlerError;
use crate::events::{Event, EventKind};
use crate::handlers::{Handle, HandlerRegistry, Module};
use crate::outbound::SendResult;
use crate::session::{Contact, ContactKind};
use crate::exit::ExitCode;

const USAGE: &str = "commands:
  help
  list buddy|group|discuss
  get buddy|group|discuss <query>
  member group|discuss <query>
  send buddy|group|discuss <query> <message>
  stop
  restart";

// Chat callers also get the version probe; terminal callers don't.
fn usage_for(kind: EventKind) -> String {
    match kind {
        EventKind::ChatMessage => format!("{USAGE}\n  --version"),
        _ => USAGE.to_string(),
    }
}

/// Built-in command routing over chat and control-channel input.
#[derive(Default)]
pub struct CommandSet;

impl CommandSet {
    /// Creates the command set.
    pub fn new() -> Self {
        Self
    }

    fn render_contacts(contacts: &[Contact]) -> String {
        if contacts.is_empty() {
            "no contacts".to_string()
        } else {
            contacts
                .iter()
                .map(Contact::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        }
    }

    fn render_send(results: &[SendResult]) -> String {
        if results.is_empty() {
            return "no matching recipient".to_string();
        }
        results
            .iter()
            .map(|(contact, outcome)| match outcome {
                Ok(chunks) => format!("sent {chunks} chunk(s) to {contact}"),
                Err(e) => format!("failed to send to {contact}: {e}"),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn member_listing(ctx: &BotCtx, kind: ContactKind, query: &str) -> String {
        let owners = ctx.get(kind, query);
        if owners.is_empty() {
            return "no contacts".to_string();
        }
        let mut lines = Vec::new();
        for owner in owners {
            lines.push(owner.to_string());
            for member in ctx.members(&owner) {
                lines.push(format!("  {member}"));
            }
        }
        lines.join("\n")
    }
}

#[async_trait]
impl Handle for CommandSet {
    async fn on_event(&self, ctx: &BotCtx, ev: &Event) -> Result<(), HandlerError> {
        let Some(content) = ev.content.as_deref() else {
            return Ok(());
        };

        if ev.kind == EventKind::ChatMessage && content.trim() == "--version" {
            ev.reply(concat!("relaybot-", env!("CARGO_PKG_VERSION"))).await?;
            return Ok(());
        }

        let argv: Vec<&str> = content.split_whitespace().collect();
        let Some((&cmd, args)) = argv.split_first() else {
            return Ok(());
        };

        let response = match cmd {
            "help" if args.is_empty() => Some(usage_for(ev.kind)),
            "list" => match args {
                [kind] => ContactKind::parse(kind).map(|k| Self::render_contacts(&ctx.list(k))),
                _ => None,
            },
            "get" => match args {
                [kind, query] => {
                    ContactKind::parse(kind).map(|k| Self::render_contacts(&ctx.get(k, query)))
                }
                _ => None,
            },
            "member" => match args {
                [kind, query] => match ContactKind::parse(kind) {
                    Some(k @ (ContactKind::Group | ContactKind::Discuss)) => {
                        Some(Self::member_listing(ctx, k, query))
                    }
                    _ => None,
                },
                _ => None,
            },
            "send" if args.len() >= 3 => match ContactKind::parse(args[0]) {
                Some(kind) => {
                    let message = args[2..].join(" ");
                    let results = ctx.send(kind, args[1], &message).await;
                    Some(Self::render_send(&results))
                }
                None => None,
            },
            "stop" if args.is_empty() => {
                info!("stop command received, shutting down");
                ev.reply("stopping").await?;
                ctx.stop(ExitCode::Clean);
                return Ok(());
            }
            "restart" if args.is_empty() => {
                info!("restart command received, shutting down for relaunch");
                ev.reply("restarting").await?;
                ctx.stop(ExitCode::Restart);
                return Ok(());
            }
            _ => None,
        };

        if let Some(text) = response {
            ev.reply(&text).await?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "commands"
    }
}

impl Module for CommandSet {
    fn attach(self: Arc<Self>, registry: &mut HandlerRegistry) {
        registry.on(EventKind::ChatMessage, self.clone());
        registry.on(EventKind::TermCommand, self);
    }
}

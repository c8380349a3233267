//! # Poll-result translation.
//!
//! [`PollTranslator`] is the built-in handler for `PollComplete` events. It
//! turns raw poll results into dispatchable events:
//!
//! - a timeout marker becomes a `PollTimeout` event;
//! - an inbound message gets its contact (and member, for group traffic)
//!   resolved — falling back to a `##UNKNOWN` placeholder — and becomes a
//!   `ChatMessage` event carrying a chat reply capability.
//!
//! Emission goes back through the delivery path, so the new event is dispatched
//! after the current one finishes, preserving loop-local ordering.

use async_trait::async_trait;
use tracing::info;

use crate::core::BotCtx;
use crate::error::HandlerError;
use crate::events::{ChatReply, Event, EventKind};
use crate::handlers::Handle;
use crate::session::{Contact, ContactKind, PollOutcome};

/// Built-in `PollComplete` handler.
pub struct PollTranslator;

#[async_trait]
impl Handle for PollTranslator {
    async fn on_event(&self, ctx: &BotCtx, ev: &Event) -> Result<(), HandlerError> {
        let Some(outcome) = &ev.poll else {
            return Ok(());
        };
        let msg = match outcome {
            PollOutcome::Timeout => {
                ctx.emit(Event::new(EventKind::PollTimeout));
                return Ok(());
            }
            PollOutcome::Message(msg) => msg,
        };

        let contact = ctx
            .get(msg.kind, &msg.from_uin)
            .into_iter()
            .next()
            .unwrap_or_else(|| Contact::unknown(msg.kind, &msg.from_uin));

        let member = msg.member_uin.as_ref().map(|uin| {
            ctx.member(&contact, uin)
                .unwrap_or_else(|| Contact::unknown(ContactKind::Member, uin))
        });

        match &member {
            Some(m) => info!(from = %contact, member = %m, "message: {:?}", msg.content),
            None => info!(from = %contact, "message: {:?}", msg.content),
        }

        let reply = ChatReply::handle(
            ctx.outbound().clone(),
            contact.clone(),
            ctx.config().reply_delay,
        );
        let mut chat = Event::new(EventKind::ChatMessage)
            .with_contact(contact)
            .with_content(msg.content.as_str())
            .with_reply(reply);
        if let Some(m) = member {
            chat = chat.with_member(m);
        }
        ctx.emit(chat);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "poll-translator"
    }
}

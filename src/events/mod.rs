//! Events, the delivery path, and reply capabilities.

mod bus;
mod event;
mod reply;

pub use bus::{Bus, BusSender};
pub use event::{Event, EventKind};
pub use reply::{ChatReply, ReplyHandle, ReplySink};

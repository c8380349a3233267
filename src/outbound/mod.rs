//! Outbound content delivery: target resolution, chunking, per-chunk sending.

mod chunk;
mod sender;

pub use chunk::split_utf8;
pub use sender::{Outbound, SendResult};

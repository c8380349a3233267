//! Producers: concurrent loops turning external blocking operations into
//! events on the delivery path.

mod fetch;
mod poll;
mod producer;
mod term;

pub use fetch::FetchProducer;
pub use poll::PollProducer;
pub use producer::{BoxProduceFuture, Produce, ProducerCtx, ProducerFn, ProducerRef};
pub use term::TermProducer;

//! Engine internals: dispatch loop, producer actors, shutdown state.

mod actor;
mod ctx;
mod engine;
mod shutdown;
mod stop;

pub use ctx::BotCtx;
pub use engine::{Engine, EngineBuilder};
pub use stop::{Phase, StopHandle};

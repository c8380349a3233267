//! Handlers: the callback trait, the registry, and the built-in modules.

mod commands;
mod handler;
mod log;
mod poll;
mod registry;

pub use commands::CommandSet;
pub use handler::Handle;
pub use log::EventLogger;
pub use poll::PollTranslator;
pub use registry::{HandlerRegistry, Module};

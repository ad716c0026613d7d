//! Domain traits - Abstractions for platform adapters and extensions

pub mod bot;
pub mod extension;
pub mod handler;

pub use bot::{Bot, BotInfo};
pub use extension::Extension;
pub use handler::{BotEvent, CommandHandler, EventKind, EventListener, Listener, TaskCallback};

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::context::CommandContext;
use crate::application::errors::{BotError, CommandError};
use crate::application::state::BotState;
use crate::domain::entities::{Message, Reply};

/// Executes a command once its context has been resolved
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, ctx: &CommandContext) -> Result<Reply, CommandError>;

    /// Handle a button press on a reply this command produced
    async fn on_component(&self, ctx: &CommandContext, action: &[String]) -> Result<Reply, CommandError> {
        let _ = action;
        Err(CommandError::NotFound(format!("{} has no components", ctx.command_name().unwrap_or("?"))))
    }
}

/// Callback of a scheduled task
#[async_trait]
pub trait TaskCallback: Send + Sync {
    async fn run(&self, state: Arc<BotState>) -> Result<(), BotError>;
}

/// Gateway events forwarded to extension listeners
#[derive(Debug, Clone)]
pub enum BotEvent {
    Ready { user_id: u64, name: String },
    Message(Message),
    GuildCreate { guild_id: u64, name: String },
}

impl BotEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BotEvent::Ready { .. } => EventKind::Ready,
            BotEvent::Message(_) => EventKind::Message,
            BotEvent::GuildCreate { .. } => EventKind::GuildCreate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    Message,
    GuildCreate,
}

#[async_trait]
pub trait EventListener: Send + Sync {
    async fn handle(&self, state: Arc<BotState>, event: &BotEvent) -> Result<(), BotError>;
}

/// A listener registered by an extension for one kind of event
#[derive(Clone)]
pub struct Listener {
    pub id: String,
    pub kind: EventKind,
    pub handler: Arc<dyn EventListener>,
}

impl Listener {
    pub fn new<L: EventListener + 'static>(id: impl Into<String>, kind: EventKind, handler: L) -> Self {
        Self {
            id: id.into(),
            kind,
            handler: Arc::new(handler),
        }
    }
}

//! Command dispatcher - routes parsed commands, button presses and events to extensions

use std::sync::Arc;

use super::parser::MessageParser;
use crate::application::context::CommandContext;
use crate::application::errors::{BotError, CommandError};
use crate::application::state::BotState;
use crate::domain::entities::{Command, ComponentId, Content, Message, Reply};
use crate::domain::traits::{Bot, BotEvent, EventKind, EventListener};

pub struct CommandDispatcher {
    state: Arc<BotState>,
    parser: MessageParser,
}

impl CommandDispatcher {
    pub fn new(state: Arc<BotState>) -> Self {
        let parser = MessageParser::new(state.prefix());
        Self { state, parser }
    }

    pub fn state(&self) -> &Arc<BotState> {
        &self.state
    }

    pub fn parser(&self) -> &MessageParser {
        &self.parser
    }

    /// Parses an incoming message and runs the command in it, if any
    pub async fn dispatch_message(&self, bot: Arc<dyn Bot>, message: Message) -> Result<Option<Reply>, BotError> {
        let message = self.parser.parse(message, bot.bot_info().id);
        let Content::Command { name, args } = message.content.clone() else {
            return Ok(None);
        };

        let ctx = CommandContext::new(self.state.clone(), bot, message.author.clone(), message.channel_id)
            .with_message(message)
            .with_args(args);
        self.dispatch(ctx, &name).await
    }

    /// Runs command `name` (a name or any localized alias) in `ctx`
    pub async fn dispatch(&self, ctx: CommandContext, name: &str) -> Result<Option<Reply>, BotError> {
        let Some(command) = self.state.command(name)? else {
            tracing::debug!(target: "commands", "Unknown command `{}` from {}", name, ctx.author.id);
            return Ok(None);
        };

        let ctx = ctx.with_command(command.clone());
        let reply = self.execute(&ctx, &command).await;
        Ok(Some(if ctx.interaction { reply.ephemeral(true) } else { reply }))
    }

    async fn execute(&self, ctx: &CommandContext, command: &Command) -> Reply {
        if command.owners_only && !ctx.is_developer() {
            return ctx.error_reply(Some("owners_only"), None, &[]);
        }

        let Some(handler) = command.handler.clone() else {
            tracing::error!(target: "commands", "Command `{}` has no handler", command.name);
            return ctx.error_reply(Some("internal"), None, &[]);
        };

        tracing::debug!(target: "commands", "{} invoked `{}`", ctx.author.id, command.name);
        match handler.execute(ctx).await {
            Ok(reply) => reply,
            Err(e) => self.error_reply(ctx, &command.name, e),
        }
    }

    /// Routes a button press to the command that produced the button.
    /// The pressing user's own message is edited in place; anyone else gets
    /// a new ephemeral message.
    pub async fn dispatch_component(&self, ctx: CommandContext, custom_id: &str) -> Result<Option<Reply>, BotError> {
        let Some(id) = ComponentId::parse(custom_id) else {
            tracing::debug!(target: "commands", "Ignoring component `{}`", custom_id);
            return Ok(None);
        };

        let Some(command) = self.state.command(&id.command)? else {
            tracing::debug!(target: "commands", "Component `{}` points at an unknown command", custom_id);
            return Ok(None);
        };
        let Some(handler) = command.handler.clone() else {
            return Ok(None);
        };

        let ctx = ctx.with_command(command.clone());
        let own = ctx.author.id == id.author_id;
        let reply = match handler.on_component(&ctx, &id.action).await {
            Ok(reply) => reply,
            Err(e) => self.error_reply(&ctx, &command.name, e),
        };

        Ok(Some(if own { reply.edit(true) } else { reply.ephemeral(true) }))
    }

    fn error_reply(&self, ctx: &CommandContext, command: &str, error: CommandError) -> Reply {
        match error {
            CommandError::InvalidArgs(reason) => {
                ctx.error_reply(Some("invalid_args"), None, &[("reason", reason.as_str())])
            }
            CommandError::PermissionDenied => ctx.error_reply(Some("owners_only"), None, &[]),
            e => {
                tracing::error!(target: "commands", "Command `{}` failed: {}", command, e);
                ctx.error_reply(Some("internal"), None, &[])
            }
        }
    }

    /// Passes `event` to every listener registered for its kind
    pub async fn dispatch_event(&self, event: BotEvent) {
        for listener in self.listeners(event.kind()) {
            if let Err(e) = listener.handle(self.state.clone(), &event).await {
                tracing::error!(target: "listeners", "Listener for {:?} failed: {}", event.kind(), e);
            }
        }
    }

    fn listeners(&self, kind: EventKind) -> Vec<Arc<dyn EventListener>> {
        match self.state.loader() {
            Ok(loader) => loader.listeners_for(kind),
            Err(e) => {
                tracing::error!(target: "listeners", "{}", e);
                Vec::new()
            }
        }
    }
}

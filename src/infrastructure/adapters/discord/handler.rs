use serenity::all::{
    CommandInteraction, ComponentInteraction, Context, CreateInteractionResponse, EventHandler, Guild, Interaction,
    Message as DiscordMessage, Ready,
};
use serenity::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::context::CommandContext;
use crate::application::messaging::CommandDispatcher;
use crate::application::state::BotState;
use crate::domain::entities::Reply;
use crate::domain::traits::{Bot, BotEvent, BotInfo};
use super::{convert, render, sync, DiscordAdapter};

/// Gateway event handler
pub struct Handler {
    dispatcher: CommandDispatcher,
}

impl Handler {
    pub fn new(state: Arc<BotState>) -> Self {
        Self {
            dispatcher: CommandDispatcher::new(state),
        }
    }

    fn state(&self) -> &Arc<BotState> {
        self.dispatcher.state()
    }

    /// The bot, once `ready` has been received
    fn bot(&self) -> Option<Arc<dyn Bot>> {
        self.state().bot()
    }

    async fn on_command(&self, ctx: &Context, interaction: CommandInteraction) {
        let Some(bot) = self.bot() else {
            return;
        };

        let options: HashMap<String, String> = interaction
            .data
            .options
            .iter()
            .filter_map(|o| o.value.as_str().map(|value| (o.name.clone(), value.to_string())))
            .collect();

        let command_ctx = CommandContext::new(
            self.state().clone(),
            bot,
            convert::user(&interaction.user),
            interaction.channel_id.get(),
        )
        .with_guild(interaction.guild_id.map(|id| id.get()))
        .with_locale(interaction.locale.clone())
        .with_options(options)
        .as_interaction();

        let reply = match self.dispatcher.dispatch(command_ctx, &interaction.data.name).await {
            Ok(Some(reply)) => reply,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(target: "discord", "Failed to run /{}: {}", interaction.data.name, e);
                return;
            }
        };

        let response = CreateInteractionResponse::Message(self.response(&reply));
        if let Err(e) = interaction.create_response(&ctx.http, response).await {
            tracing::error!(target: "discord", "Failed to answer /{}: {}", interaction.data.name, e);
        }
    }

    async fn on_component(&self, ctx: &Context, interaction: ComponentInteraction) {
        let Some(bot) = self.bot() else {
            return;
        };

        let command_ctx = CommandContext::new(
            self.state().clone(),
            bot,
            convert::user(&interaction.user),
            interaction.channel_id.get(),
        )
        .with_guild(interaction.guild_id.map(|id| id.get()))
        .with_locale(interaction.locale.clone())
        .as_interaction();

        let custom_id = interaction.data.custom_id.as_str();
        let reply = match self.dispatcher.dispatch_component(command_ctx, custom_id).await {
            Ok(Some(reply)) => reply,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(target: "discord", "Failed to handle component `{}`: {}", custom_id, e);
                return;
            }
        };

        let message = self.response(&reply);
        let response = if reply.edit {
            CreateInteractionResponse::UpdateMessage(message)
        } else {
            CreateInteractionResponse::Message(message)
        };
        if let Err(e) = interaction.create_response(&ctx.http, response).await {
            tracing::error!(target: "discord", "Failed to answer component `{}`: {}", custom_id, e);
        }
    }

    fn response(&self, reply: &Reply) -> serenity::all::CreateInteractionResponseMessage {
        render::render(reply).interaction(self.state().config.allowed_mentions(), reply.ephemeral)
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        let user = &ready.user;
        tracing::info!(target: "discord", "Logged in as {} ({})", user.name, user.id);

        let info = BotInfo::new(user.id.get(), user.name.clone());
        let adapter = DiscordAdapter::new(ctx.http.clone(), info, self.state().config.allowed_mentions().clone());
        if let Err(e) = self.state().set_bot(Arc::new(adapter)) {
            tracing::error!(target: "discord", "{}", e);
        }

        let state = self.state().clone();
        let http = ctx.http.clone();
        tokio::spawn(async move {
            if let Err(e) = sync::sync_commands(&http, &state).await {
                tracing::error!(target: "discord", "Failed to sync application commands: {}", e);
            }
        });

        self.dispatcher
            .dispatch_event(BotEvent::Ready {
                user_id: user.id.get(),
                name: user.name.clone(),
            })
            .await;
    }

    async fn message(&self, _ctx: Context, message: DiscordMessage) {
        let Some(bot) = self.bot() else {
            return;
        };

        let converted = convert::message(&message);
        self.dispatcher.dispatch_event(BotEvent::Message(converted.clone())).await;

        match self.dispatcher.dispatch_message(bot.clone(), converted).await {
            Ok(Some(reply)) if !reply.is_empty() => {
                if let Err(e) = bot.send_reply(message.channel_id.get(), &reply, Some(message.id.get())).await {
                    tracing::error!(target: "discord", "Failed to send reply: {}", e);
                }
            }
            Ok(_) => {}
            Err(e) => tracing::error!(target: "discord", "Failed to handle message {}: {}", message.id, e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => self.on_command(&ctx, command).await,
            Interaction::Component(component) => self.on_component(&ctx, component).await,
            _ => {}
        }
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        tracing::debug!(target: "discord", "Guild available: {} ({})", guild.name, guild.id);
        self.dispatcher
            .dispatch_event(BotEvent::GuildCreate {
                guild_id: guild.id.get(),
                name: guild.name.clone(),
            })
            .await;
    }
}

//! Discord adapter built on serenity

pub mod convert;
pub mod handler;
pub mod presence;
pub mod render;
pub mod sync;

use async_trait::async_trait;
use serenity::all::{ChannelId, Client, GatewayIntents, Http, MessageId};
use serenity::cache::Settings as CacheSettings;
use serenity::gateway::GatewayError;
use std::sync::Arc;

use crate::application::errors::BotError;
use crate::application::state::BotState;
use crate::domain::entities::{Message, Reply};
use crate::domain::traits::{Bot, BotInfo};
use crate::infrastructure::config::AllowedMentionsConfig;

pub use handler::Handler;

/// [`Bot`] over serenity's REST client
pub struct DiscordAdapter {
    http: Arc<Http>,
    info: BotInfo,
    mentions: AllowedMentionsConfig,
}

impl DiscordAdapter {
    pub fn new(http: Arc<Http>, info: BotInfo, mentions: AllowedMentionsConfig) -> Self {
        Self { http, info, mentions }
    }
}

fn channel(id: u64) -> Result<ChannelId, BotError> {
    if id == 0 {
        return Err(BotError::Parse("channel id must not be 0".to_string()));
    }
    Ok(ChannelId::new(id))
}

#[async_trait]
impl Bot for DiscordAdapter {
    async fn send_reply(&self, channel_id: u64, reply: &Reply, reference: Option<u64>) -> Result<u64, BotError> {
        let channel_id = channel(channel_id)?;
        let mut message = render::render(reply).message(&self.mentions);
        if let Some(reference) = reference.filter(|id| *id != 0) {
            message = message.reference_message((channel_id, MessageId::new(reference)));
        }

        let sent = channel_id
            .send_message(&self.http, message)
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;
        Ok(sent.id.get())
    }

    async fn fetch_message(&self, channel_id: u64, message_id: u64) -> Result<Message, BotError> {
        if message_id == 0 {
            return Err(BotError::NotFound(format!("message {}", message_id)));
        }

        let message = channel(channel_id)?
            .message(&self.http, MessageId::new(message_id))
            .await
            .map_err(|e| BotError::NotFound(format!("message {}: {}", message_id, e)))?;
        Ok(convert::message(&message))
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

/// Connects to Discord and runs until the gateway closes or Ctrl-C is pressed
pub async fn start(token: &str, state: Arc<BotState>) -> Result<(), BotError> {
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    let mut cache = CacheSettings::default();
    cache.max_messages = state.config.cache.max_messages;

    let presence = state.config.presence();
    let mut builder = Client::builder(token, intents)
        .event_handler(Handler::new(state.clone()))
        .cache_settings(cache);
    if let Some(status) = presence.status {
        builder = builder.status(presence::online_status(status));
    }
    if let Some(activity) = presence.activity.as_ref().and_then(presence::activity) {
        builder = builder.activity(activity);
    }

    let mut client = builder.await.map_err(client_error)?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(target: "launcher", "The bot was stopped manually");
            shard_manager.shutdown_all().await;
        }
    });

    tracing::info!(target: "discord", "Connecting to Discord...");
    client.start().await.map_err(client_error)
}

fn client_error(error: serenity::Error) -> BotError {
    match error {
        serenity::Error::Gateway(GatewayError::InvalidAuthentication) => {
            BotError::Auth("Discord rejected the bot token".to_string())
        }
        e => BotError::Network(e.to_string()),
    }
}

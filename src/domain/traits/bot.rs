use async_trait::async_trait;
use crate::domain::entities::{Message, Reply};
use crate::application::errors::BotError;

/// Bot trait - abstraction for messaging platform adapters
#[async_trait]
pub trait Bot: Send + Sync {
    /// Send a reply to a channel, optionally as an answer to a message.
    /// Returns the id of the sent message.
    async fn send_reply(&self, channel_id: u64, reply: &Reply, reference: Option<u64>) -> Result<u64, BotError>;

    /// Fetch a message by channel and message id
    async fn fetch_message(&self, channel_id: u64, message_id: u64) -> Result<Message, BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotInfo {
    pub id: u64,
    pub name: String,
}

impl BotInfo {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

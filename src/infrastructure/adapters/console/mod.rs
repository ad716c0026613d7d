//! Console adapter for development/testing
//!
//! Every stdin line is a message from a developer in one fake channel;
//! replies are printed as plain text.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::application::errors::BotError;
use crate::application::messaging::CommandDispatcher;
use crate::application::state::{BotState, NAME};
use crate::domain::entities::{Message, Reply, User};
use crate::domain::traits::{Bot, BotInfo};

pub const CONSOLE_CHANNEL: u64 = 1;
const CONSOLE_BOT_ID: u64 = 2;
const CONSOLE_USER_ID: u64 = 3;

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    last_id: AtomicU64,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            info: BotInfo::new(CONSOLE_BOT_ID, NAME),
            last_id: AtomicU64::new(0),
        }
    }

    fn next_id(&self) -> u64 {
        self.last_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Dispatches every line of `input` until it ends or `exit` is typed.
    /// Returns how many replies were printed.
    pub async fn run<R>(self: Arc<Self>, state: Arc<BotState>, input: R) -> Result<usize, BotError>
    where
        R: AsyncBufRead + Unpin,
    {
        state.set_bot(self.clone())?;
        let dispatcher = CommandDispatcher::new(state.clone());
        let author_id = state.config.developers.first().copied().unwrap_or(CONSOLE_USER_ID);
        let author = User::new(author_id, "console");

        tracing::info!(target: "launcher", "Console mode, type `{}help` or `exit`", state.prefix());

        let mut lines = input.lines();
        let mut replies = 0;
        while let Some(line) = lines.next_line().await.map_err(|e| BotError::Internal(e.to_string()))? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "exit" || line == "quit" {
                break;
            }

            let message = Message::new(self.next_id(), CONSOLE_CHANNEL, author.clone(), line);
            let message_id = message.id;
            match dispatcher.dispatch_message(self.clone(), message).await {
                Ok(Some(reply)) if !reply.is_empty() => {
                    self.send_reply(CONSOLE_CHANNEL, &reply, Some(message_id)).await?;
                    replies += 1;
                }
                Ok(_) => {}
                Err(e) => tracing::error!(target: "commands", "{}", e),
            }
        }

        Ok(replies)
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn send_reply(&self, _channel_id: u64, reply: &Reply, _reference: Option<u64>) -> Result<u64, BotError> {
        for line in reply.plain_text().lines() {
            println!("[{}] {}", NAME, line);
        }
        Ok(self.next_id())
    }

    async fn fetch_message(&self, _channel_id: u64, message_id: u64) -> Result<Message, BotError> {
        Err(BotError::NotFound(format!("message {}", message_id)))
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::{Config, Design};
    use crate::infrastructure::i18n::LocalizationProvider;

    fn state() -> Arc<BotState> {
        let state = Arc::new(BotState::new(Config::default(), Design::default(), LocalizationProvider::new()));
        for extension in crate::extensions::builtin() {
            state.loader_mut().unwrap().register(extension, false);
        }
        state.load_extensions().unwrap();
        state
    }

    #[tokio::test]
    async fn test_console_replies_to_commands_only() {
        let input: &[u8] = b"hello\nb!help\n\nb!unknown\nexit\nb!help\n";
        let adapter = Arc::new(ConsoleAdapter::new());

        let replies = adapter.clone().run(state(), input).await.unwrap();
        assert_eq!(replies, 1);
    }

    #[tokio::test]
    async fn test_console_cannot_fetch_messages() {
        let adapter = ConsoleAdapter::new();
        assert!(adapter.fetch_message(CONSOLE_CHANNEL, 10).await.is_err());
        assert_eq!(adapter.bot_info().id, CONSOLE_BOT_ID);
    }
}

//! Message parser - recognizes prefix and mention commands

use crate::domain::entities::{Content, Message};

/// Turns raw message text into [`Content::Command`] when it starts with the
/// prefix or a mention of the bot
pub struct MessageParser {
    prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parse `message`, setting its content. Messages written by bots are
    /// never treated as commands.
    pub fn parse(&self, message: Message, bot_id: u64) -> Message {
        if message.author.is_bot {
            return message;
        }

        match self.parse_text(&message.text, bot_id) {
            Some(content) => message.with_content(content),
            None => message,
        }
    }

    /// The command in `text`, if it is one
    pub fn parse_text(&self, text: &str, bot_id: u64) -> Option<Content> {
        let rest = self.strip_prefix(text.trim_start(), bot_id)?;

        let mut parts = rest.split_whitespace();
        let name = parts.next()?.to_string();
        let args = parts.map(str::to_string).collect();

        Some(Content::Command { name, args })
    }

    fn strip_prefix<'a>(&self, text: &'a str, bot_id: u64) -> Option<&'a str> {
        let mentions = [format!("<@{}>", bot_id), format!("<@!{}>", bot_id)];
        mentions
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.prefix.as_str()))
            .filter(|p| !p.is_empty())
            .find_map(|p| text.strip_prefix(p))
    }
}

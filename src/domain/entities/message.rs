use super::User;
use chrono::{DateTime, Utc};

/// Message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command { name: String, args: Vec<String> },
    Empty,
}

impl Content {
    pub fn text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Content::Command { .. })
    }
}

/// A file attached to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
    pub content_type: Option<String>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
            content_type: None,
        }
    }
}

/// Points at the message another message replies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageReference {
    pub channel_id: u64,
    pub message_id: u64,
}

/// Represents an incoming or fetched message
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub author: User,
    /// Raw text as typed by the author
    pub text: String,
    pub content: Content,
    pub attachments: Vec<Attachment>,
    pub reference: Option<MessageReference>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(id: u64, channel_id: u64, author: User, text: impl Into<String>) -> Self {
        let text = text.into();
        let content = if text.is_empty() {
            Content::Empty
        } else {
            Content::Text(text.clone())
        };

        Self {
            id,
            channel_id,
            guild_id: None,
            author,
            text,
            content,
            attachments: Vec::new(),
            reference: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_guild(mut self, guild_id: u64) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_reference(mut self, channel_id: u64, message_id: u64) -> Self {
        self.reference = Some(MessageReference {
            channel_id,
            message_id,
        });
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = content;
        self
    }

    pub fn first_attachment_url(&self) -> Option<&str> {
        self.attachments.first().map(|a| a.url.as_str())
    }
}

//! serenity models to domain entities

use serenity::all::{Message as DiscordMessage, User as DiscordUser};

use crate::domain::entities::{Attachment, Message, User};

pub fn user(user: &DiscordUser) -> User {
    let mut converted = User::new(user.id.get(), user.name.clone());
    if let Some(global_name) = &user.global_name {
        converted = converted.with_global_name(global_name.clone());
    }
    if user.bot {
        converted = converted.as_bot();
    }
    converted
}

pub fn message(message: &DiscordMessage) -> Message {
    let mut converted = Message::new(
        message.id.get(),
        message.channel_id.get(),
        user(&message.author),
        message.content.clone(),
    );

    if let Some(guild_id) = message.guild_id {
        converted = converted.with_guild(guild_id.get());
    }

    for attachment in &message.attachments {
        let mut file = Attachment::new(attachment.filename.clone(), attachment.url.clone());
        file.content_type = attachment.content_type.clone();
        converted = converted.with_attachment(file);
    }

    if let Some(reference) = &message.message_reference {
        if let Some(message_id) = reference.message_id {
            converted = converted.with_reference(reference.channel_id.get(), message_id.get());
        }
    }

    converted.timestamp = message.timestamp.to_utc();
    converted
}

//! Drawing [`Reply`] values as Discord messages
//!
//! Containers become embeds: text and section bodies are joined into the
//! description, separators into blank lines, and the first gallery image
//! becomes the embed image. Loose text outside a container is the message
//! content. Every button ends up in action rows of at most five.

use serenity::all::{
    ButtonStyle as DiscordButtonStyle, CreateActionRow, CreateAllowedMentions, CreateButton, CreateEmbed,
    CreateInteractionResponseMessage, CreateMessage, ReactionType,
};

use crate::domain::entities::{Block, Button, ButtonStyle, Container, Reply};
use crate::infrastructure::config::AllowedMentionsConfig;

const BUTTONS_PER_ROW: usize = 5;

/// Platform-neutral parts of a rendered reply
#[derive(Debug, Default, PartialEq)]
pub struct Rendered {
    pub content: Option<String>,
    pub embeds: Vec<EmbedParts>,
    pub rows: Vec<Vec<Button>>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct EmbedParts {
    pub description: String,
    pub image: Option<String>,
    pub color: Option<u32>,
}

pub fn render(reply: &Reply) -> Rendered {
    let mut content: Vec<String> = reply.content.iter().cloned().collect();
    let mut embeds = Vec::new();

    for block in &reply.blocks {
        match block {
            Block::Container(container) => embeds.push(embed(container)),
            Block::Text(text) => content.push(text.clone()),
            Block::Section { texts, .. } => content.extend(texts.iter().cloned()),
            Block::Gallery(urls) => content.extend(urls.iter().cloned()),
            Block::Separator | Block::ActionRow(_) => {}
        }
    }

    let buttons: Vec<Button> = reply.buttons().into_iter().cloned().collect();
    let rows = buttons.chunks(BUTTONS_PER_ROW).map(<[Button]>::to_vec).collect();

    Rendered {
        content: (!content.is_empty()).then(|| content.join("\n")),
        embeds,
        rows,
    }
}

fn embed(container: &Container) -> EmbedParts {
    let mut parts: Vec<String> = Vec::new();
    let mut image = None;

    for block in &container.children {
        match block {
            Block::Text(text) => parts.push(text.clone()),
            Block::Section { texts, .. } => parts.push(texts.join("\n")),
            Block::Separator => parts.push(String::new()),
            Block::Gallery(urls) => {
                if image.is_none() {
                    image = urls.first().cloned();
                }
            }
            Block::Container(inner) => parts.push(embed(inner).description),
            Block::ActionRow(_) => {}
        }
    }

    let mut description = parts.join("\n");
    if container.spoiler {
        description = format!("||{}||", description);
    }

    EmbedParts {
        description,
        image,
        color: container.color,
    }
}

impl Rendered {
    pub fn message(self, mentions: &AllowedMentionsConfig) -> CreateMessage {
        let mut message = CreateMessage::new()
            .embeds(self.embeds.iter().map(EmbedParts::build).collect())
            .components(self.components())
            .allowed_mentions(allowed_mentions(mentions));
        if let Some(content) = self.content {
            message = message.content(content);
        }
        message
    }

    pub fn interaction(self, mentions: &AllowedMentionsConfig, ephemeral: bool) -> CreateInteractionResponseMessage {
        let mut message = CreateInteractionResponseMessage::new()
            .embeds(self.embeds.iter().map(EmbedParts::build).collect())
            .components(self.components())
            .allowed_mentions(allowed_mentions(mentions))
            .ephemeral(ephemeral);
        if let Some(content) = self.content {
            message = message.content(content);
        }
        message
    }

    fn components(&self) -> Vec<CreateActionRow> {
        self.rows
            .iter()
            .map(|row| CreateActionRow::Buttons(row.iter().map(button).collect()))
            .collect()
    }
}

impl EmbedParts {
    fn build(&self) -> CreateEmbed {
        let mut embed = CreateEmbed::new().description(&self.description);
        if let Some(color) = self.color {
            embed = embed.color(color);
        }
        if let Some(image) = &self.image {
            embed = embed.image(image);
        }
        embed
    }
}

fn button(button: &Button) -> CreateButton {
    let mut created = match (&button.url, &button.custom_id) {
        (Some(url), _) => CreateButton::new_link(url),
        (None, Some(id)) => CreateButton::new(id).style(style(button.style)),
        (None, None) => CreateButton::new("none").disabled(true),
    };

    if let Some(label) = &button.label {
        created = created.label(label);
    }
    if let Some(emoji) = button.emoji.as_deref().filter(|e| !e.is_empty()) {
        match ReactionType::try_from(emoji) {
            Ok(emoji) => created = created.emoji(emoji),
            Err(e) => tracing::warn!(target: "discord", "Invalid button emoji `{}`: {}", emoji, e),
        }
    }
    created
}

fn style(style: ButtonStyle) -> DiscordButtonStyle {
    match style {
        ButtonStyle::Primary => DiscordButtonStyle::Primary,
        ButtonStyle::Secondary | ButtonStyle::Link => DiscordButtonStyle::Secondary,
        ButtonStyle::Success => DiscordButtonStyle::Success,
        ButtonStyle::Danger => DiscordButtonStyle::Danger,
    }
}

pub fn allowed_mentions(config: &AllowedMentionsConfig) -> CreateAllowedMentions {
    CreateAllowedMentions::new()
        .everyone(config.everyone)
        .all_users(config.users)
        .all_roles(config.roles)
        .replied_user(config.replied_user)
}

//! Platform-neutral outgoing message model
//!
//! Commands build a [`Reply`] out of blocks (text, separators, sections,
//! galleries, button rows), usually grouped into an accented [`Container`].
//! Adapters decide how the blocks are drawn.

/// Visual style of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonStyle {
    Primary,
    #[default]
    Secondary,
    Success,
    Danger,
    Link,
}

/// Button attached to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: Option<String>,
    pub emoji: Option<String>,
    pub style: ButtonStyle,
    pub custom_id: Option<String>,
    pub url: Option<String>,
}

impl Button {
    /// Interactive button routed back to the bot by its custom id
    pub fn new(label: impl Into<String>, custom_id: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            emoji: None,
            style: ButtonStyle::Secondary,
            custom_id: Some(custom_id.into()),
            url: None,
        }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            emoji: None,
            style: ButtonStyle::Link,
            custom_id: None,
            url: Some(url.into()),
        }
    }

    pub fn with_style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(String),
    Separator,
    Section { texts: Vec<String>, accessory: Button },
    Gallery(Vec<String>),
    ActionRow(Vec<Button>),
    Container(Container),
}

/// Group of blocks drawn together with an accent colour
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    pub color: Option<u32>,
    pub spoiler: bool,
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reply {
    pub content: Option<String>,
    pub blocks: Vec<Block>,
    /// Only visible to the invoking user (interactions only)
    pub ephemeral: bool,
    /// Replace the message the interaction came from instead of sending a new one
    pub edit: bool,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    pub fn edit(mut self, edit: bool) -> Self {
        self.edit = edit;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.as_deref().map_or(true, str::is_empty) && self.blocks.is_empty()
    }

    /// Every button in the reply, in display order
    pub fn buttons(&self) -> Vec<&Button> {
        fn collect<'a>(blocks: &'a [Block], out: &mut Vec<&'a Button>) {
            for block in blocks {
                match block {
                    Block::Section { accessory, .. } => out.push(accessory),
                    Block::ActionRow(buttons) => out.extend(buttons.iter()),
                    Block::Container(container) => collect(&container.children, out),
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.blocks, &mut out);
        out
    }

    /// Renders the reply as plain text, one block per line
    pub fn plain_text(&self) -> String {
        fn render(blocks: &[Block], lines: &mut Vec<String>) {
            for block in blocks {
                match block {
                    Block::Text(text) => lines.push(text.clone()),
                    Block::Separator => lines.push("---".to_string()),
                    Block::Section { texts, accessory } => {
                        lines.extend(texts.iter().cloned());
                        if let Some(label) = &accessory.label {
                            lines.push(format!("[{}]", label));
                        }
                    }
                    Block::Gallery(urls) => lines.extend(urls.iter().cloned()),
                    Block::ActionRow(buttons) => {
                        let labels: Vec<String> = buttons
                            .iter()
                            .filter_map(|b| b.label.as_ref().map(|l| format!("[{}]", l)))
                            .collect();
                        lines.push(labels.join(" | "));
                    }
                    Block::Container(container) => render(&container.children, lines),
                }
            }
        }

        let mut lines = Vec::new();
        if let Some(content) = &self.content {
            lines.push(content.clone());
        }
        render(&self.blocks, &mut lines);
        lines.join("\n")
    }
}

/// Shared block-building methods of messages and containers
pub trait ViewBuilder: Sized {
    fn children_mut(&mut self) -> &mut Vec<Block>;

    fn text(mut self, content: impl Into<String>) -> Self {
        self.children_mut().push(Block::Text(content.into()));
        self
    }

    fn separator(mut self) -> Self {
        self.children_mut().push(Block::Separator);
        self
    }

    fn action_row(mut self, buttons: Vec<Button>) -> Self {
        self.children_mut().push(Block::ActionRow(buttons));
        self
    }

    fn section(mut self, texts: Vec<String>, accessory: Button) -> Self {
        self.children_mut().push(Block::Section { texts, accessory });
        self
    }

    fn gallery(mut self, urls: Vec<String>) -> Self {
        self.children_mut().push(Block::Gallery(urls));
        self
    }
}

#[derive(Debug, Default)]
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    pub fn new(color: Option<u32>) -> Self {
        Self {
            container: Container {
                color,
                ..Container::default()
            },
        }
    }

    pub fn spoiler(mut self) -> Self {
        self.container.spoiler = true;
        self
    }

    pub fn build(self) -> Container {
        self.container
    }
}

impl ViewBuilder for ContainerBuilder {
    fn children_mut(&mut self) -> &mut Vec<Block> {
        &mut self.container.children
    }
}

#[derive(Debug, Default)]
pub struct MessageBuilder {
    reply: Reply,
}

impl MessageBuilder {
    pub fn new(content: Option<String>) -> Self {
        Self {
            reply: Reply {
                content,
                ..Reply::default()
            },
        }
    }

    pub fn container(mut self, container: impl Into<Container>) -> Self {
        self.reply.blocks.push(Block::Container(container.into()));
        self
    }

    pub fn build(self) -> Reply {
        self.reply
    }
}

impl ViewBuilder for MessageBuilder {
    fn children_mut(&mut self) -> &mut Vec<Block> {
        &mut self.reply.blocks
    }
}

impl From<ContainerBuilder> for Container {
    fn from(builder: ContainerBuilder) -> Self {
        builder.build()
    }
}

pub fn container(color: Option<u32>) -> ContainerBuilder {
    ContainerBuilder::new(color)
}

pub fn message() -> MessageBuilder {
    MessageBuilder::new(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_nest_container_into_message() {
        let reply = message()
            .container(
                container(Some(0xff0000))
                    .text("### Title")
                    .separator()
                    .section(vec!["body".to_string()], Button::new("More", "help:1:home")),
            )
            .build();

        let Block::Container(container) = &reply.blocks[0] else {
            panic!("expected a container");
        };
        assert_eq!(container.color, Some(0xff0000));
        assert_eq!(container.children.len(), 3);
        assert_eq!(reply.buttons().len(), 1);
        assert_eq!(reply.plain_text(), "### Title\n---\nbody\n[More]");
    }

    #[test]
    fn test_empty_reply() {
        assert!(Reply::default().is_empty());
        assert!(Reply::text("").is_empty());
        assert!(!Reply::text("hi").is_empty());
    }
}

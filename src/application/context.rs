//! Per-invocation command context

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::state::BotState;
use crate::domain::entities::reply::{container, message, ViewBuilder};
use crate::domain::entities::{Command, Message, Reply, User};
use crate::domain::traits::Bot;
use crate::infrastructure::i18n::{ContextLocalization, FALLBACK_LOCALE};

/// Everything a command handler knows about the invocation
#[derive(Clone)]
pub struct CommandContext {
    pub state: Arc<BotState>,
    pub bot: Arc<dyn Bot>,
    pub author: User,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    /// The message that invoked the command (prefix commands and components)
    pub message: Option<Message>,
    pub locale: String,
    pub command: Option<Arc<Command>>,
    /// Positional arguments of a prefix command
    pub args: Vec<String>,
    /// Named options of a slash command
    pub options: HashMap<String, String>,
    pub interaction: bool,
}

impl CommandContext {
    pub fn new(state: Arc<BotState>, bot: Arc<dyn Bot>, author: User, channel_id: u64) -> Self {
        Self {
            state,
            bot,
            author,
            channel_id,
            guild_id: None,
            message: None,
            locale: FALLBACK_LOCALE.to_string(),
            command: None,
            args: Vec::new(),
            options: HashMap::new(),
            interaction: false,
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.guild_id = message.guild_id;
        self.message = Some(message);
        self
    }

    pub fn with_guild(mut self, guild_id: Option<u64>) -> Self {
        self.guild_id = guild_id;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_command(mut self, command: Arc<Command>) -> Self {
        self.command = Some(command);
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_options(mut self, options: HashMap<String, String>) -> Self {
        self.options = options;
        self
    }

    /// Marks the context as coming from an interaction; replies become ephemeral
    pub fn as_interaction(mut self) -> Self {
        self.interaction = true;
        self
    }

    pub fn command_name(&self) -> Option<&str> {
        self.command.as_deref().map(|c| c.name.as_str())
    }

    pub fn prefix(&self) -> &str {
        self.state.prefix()
    }

    pub fn i18n(&self) -> ContextLocalization<'_> {
        self.state.localization(&self.locale, self.command_name())
    }

    /// Shortcut for `i18n().get(key, args)`
    pub fn i(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.i18n().get(key, args)
    }

    pub fn is_developer(&self) -> bool {
        self.state.config.is_developer(self.author.id)
    }

    /// Value of argument `name`: the slash option, else the positional argument
    /// in the same place among the command's options. The last option takes
    /// the rest of the arguments.
    pub fn arg(&self, name: &str) -> Option<String> {
        if let Some(value) = self.options.get(name) {
            return Some(value.clone());
        }

        let options = &self.command.as_ref()?.options;
        let index = options.iter().position(|o| o.name == name)?;
        if index + 1 == options.len() {
            let rest = self.args.get(index..)?;
            if rest.is_empty() {
                return None;
            }
            return Some(rest.join(" "));
        }

        self.args.get(index).cloned()
    }

    /// Error message in the design's `error` colour. `text` wins over the
    /// localized `errors.<kind>` string.
    pub fn error_reply(&self, kind: Option<&str>, text: Option<&str>, args: &[(&str, &str)]) -> Reply {
        let design = &self.state.design;
        let text = match (text, kind) {
            (Some(text), _) => text.to_string(),
            (None, Some(kind)) => self.i18n().get_text(&format!("errors.{kind}"), None, args),
            (None, None) => String::new(),
        };

        let emoji = kind
            .map(|k| design.emoji(&format!("error_{k}")))
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| design.emoji("error"));
        let line = if emoji.is_empty() {
            text
        } else {
            format!("{} {}", emoji, text)
        };

        message()
            .container(container(Some(design.color("error"))).text(line))
            .build()
            .ephemeral(self.interaction)
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("author", &self.author)
            .field("channel_id", &self.channel_id)
            .field("command", &self.command_name())
            .field("locale", &self.locale)
            .field("interaction", &self.interaction)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::BotError;
    use crate::domain::entities::{Block, CommandOption};
    use crate::domain::traits::BotInfo;
    use crate::infrastructure::config::{Config, Design, YamlMapping};
    use crate::infrastructure::i18n::{LocalizationPackage, LocalizationProvider};
    use async_trait::async_trait;

    struct Silent;

    #[async_trait]
    impl Bot for Silent {
        async fn send_reply(&self, _channel_id: u64, _reply: &Reply, _reference: Option<u64>) -> Result<u64, BotError> {
            Ok(1)
        }

        async fn fetch_message(&self, _channel_id: u64, message_id: u64) -> Result<Message, BotError> {
            Err(BotError::NotFound(message_id.to_string()))
        }

        fn bot_info(&self) -> BotInfo {
            BotInfo::new(1, "befri")
        }
    }

    fn state() -> Arc<BotState> {
        let mut config = Config::default();
        config.developers = vec![7];

        let design = Design::new(YamlMapping::parse(r#"
colors:
  error: "ff0000"
emojis:
  error: "(x)"
  error_owners_only: "(lock)"
"#).unwrap());

        let data = YamlMapping::parse(r#"
natural_name: English
discord_locale: en-US
authors: [{name: tester}]
errors:
  owners_only: Only for developers
  no_image: "No image, {user}"
commands:
  sauce:
    title: Sauce
"#).unwrap();
        let mut i18n = LocalizationProvider::new();
        i18n.insert(LocalizationPackage::from_mapping("english.yml", data).unwrap());

        Arc::new(BotState::new(config, design, i18n))
    }

    fn ctx(author: u64) -> CommandContext {
        let command = Command::new("sauce")
            .with_option(CommandOption::new("mode", "Search mode"))
            .with_option(CommandOption::new("query", "Image link"));
        CommandContext::new(state(), Arc::new(Silent), User::new(author, "ann"), 10)
            .with_command(Arc::new(command))
    }

    #[test]
    fn test_positional_args_follow_options() {
        let ctx = ctx(1).with_args(vec!["fast".into(), "a".into(), "b".into()]);
        assert_eq!(ctx.arg("mode").as_deref(), Some("fast"));
        assert_eq!(ctx.arg("query").as_deref(), Some("a b"));
        assert_eq!(ctx.arg("other"), None);

        let ctx = ctx.with_args(vec!["fast".into()]);
        assert_eq!(ctx.arg("query"), None);
    }

    #[test]
    fn test_slash_options_win() {
        let ctx = ctx(1)
            .with_args(vec!["fast".into()])
            .with_options(HashMap::from([("mode".to_string(), "slow".to_string())]));
        assert_eq!(ctx.arg("mode").as_deref(), Some("slow"));
    }

    #[test]
    fn test_localization_and_developers() {
        let ctx = ctx(7).with_locale("fr");
        assert_eq!(ctx.i("title", &[]), "Sauce");
        assert_eq!(ctx.command_name(), Some("sauce"));
        assert!(ctx.is_developer());
        assert!(!self::ctx(8).is_developer());
    }

    #[test]
    fn test_error_reply() {
        let ctx = ctx(1).as_interaction();

        let reply = ctx.error_reply(Some("owners_only"), None, &[]);
        assert!(reply.ephemeral);
        match &reply.blocks[0] {
            Block::Container(c) => {
                assert_eq!(c.color, Some(0xFF0000));
                assert_eq!(c.children, vec![Block::Text("(lock) Only for developers".to_string())]);
            }
            other => panic!("unexpected block {:?}", other),
        }

        let reply = ctx.error_reply(Some("no_image"), None, &[("user", "ann")]);
        assert_eq!(reply.plain_text(), "(x) No image, ann");

        let reply = ctx.error_reply(None, Some("Boom"), &[]);
        assert_eq!(reply.plain_text(), "(x) Boom");
    }
}

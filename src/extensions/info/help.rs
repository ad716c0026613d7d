//! `/help [command] [category]`: reference for commands and categories
//!
//! Without arguments the home page lists every loaded category with its
//! commands. A category shows each command with its usage and description,
//! and a command shows its description, aliases, usage and examples. Every
//! page carries buttons leading to the others.

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::context::CommandContext;
use crate::application::errors::CommandError;
use crate::domain::entities::reply::{container, message, ViewBuilder};
use crate::domain::entities::{Button, Command, CommandOption, ComponentId, OptionChoice, Reply};
use crate::domain::traits::{CommandHandler, Extension};

pub const NAME: &str = "help";

pub fn command() -> Command {
    Command::new(NAME)
        .with_description("Reference for bot commands and command categories")
        .with_usage("[command | category]")
        .with_option(CommandOption::new("command", "Name of bot command"))
        .with_option(
            CommandOption::new("category", "Name of commands category")
                .with_choice(OptionChoice::new("Information", "info").with_key("categories.info.name"))
                .with_choice(OptionChoice::new("Miscellaneous", "misc").with_key("categories.misc.name")),
        )
        .with_handler(Help)
}

pub struct Help;

#[async_trait]
impl CommandHandler for Help {
    async fn execute(&self, ctx: &CommandContext) -> Result<Reply, CommandError> {
        if let Some(category) = ctx.arg("category") {
            return match extension(ctx, &category)? {
                Some(extension) => category_page(ctx, extension.as_ref()),
                None => Ok(unknown_target(ctx, &category)),
            };
        }

        let Some(target) = ctx.arg("command") else {
            return home_page(ctx);
        };

        if let Some(extension) = extension(ctx, &target)? {
            return category_page(ctx, extension.as_ref());
        }

        match ctx.state.command(&target)? {
            Some(command) if can_run(ctx, &command) => command_page(ctx, &command),
            _ => Ok(unknown_target(ctx, &target)),
        }
    }

    async fn on_component(&self, ctx: &CommandContext, action: &[String]) -> Result<Reply, CommandError> {
        let action: Vec<&str> = action.iter().map(String::as_str).collect();
        match action.as_slice() {
            ["home"] => home_page(ctx),
            ["category", id] => match extension(ctx, id)? {
                Some(extension) => category_page(ctx, extension.as_ref()),
                None => Ok(unknown_target(ctx, id)),
            },
            ["command", name] => match ctx.state.command(name)? {
                Some(command) if can_run(ctx, &command) => command_page(ctx, &command),
                _ => Ok(unknown_target(ctx, name)),
            },
            _ => Err(CommandError::NotFound(format!("help action {:?}", action))),
        }
    }
}

fn extension(ctx: &CommandContext, id: &str) -> Result<Option<Arc<dyn Extension>>, CommandError> {
    Ok(ctx.state.loader()?.extension(id))
}

fn can_run(ctx: &CommandContext, command: &Command) -> bool {
    !command.owners_only || ctx.is_developer()
}

/// Commands of `extension` the author may run
fn runnable(ctx: &CommandContext, extension: &str) -> Result<Vec<Arc<Command>>, CommandError> {
    Ok(ctx
        .state
        .loader()?
        .commands_of(extension)
        .into_iter()
        .filter(|c| can_run(ctx, c))
        .collect())
}

fn button(ctx: &CommandContext, label: String, action: &[&str]) -> Button {
    Button::new(label, ComponentId::new(NAME, ctx.author.id, action).to_string())
}

fn unknown_target(ctx: &CommandContext, target: &str) -> Reply {
    ctx.error_reply(Some("unknown_help_target"), None, &[("target", target)])
}

/// `prefix name usage`, without the usage when the command has none
fn prefix_invocation(ctx: &CommandContext, command: &Command) -> String {
    match usage(ctx, command) {
        Some(usage) => format!("{}{} {}", ctx.prefix(), command.name, usage),
        None => format!("{}{}", ctx.prefix(), command.name),
    }
}

fn usage(ctx: &CommandContext, command: &Command) -> Option<String> {
    ctx.i18n()
        .find_text(&format!("commands.{}.usage", command.name), &[])
        .or_else(|| command.usage.clone())
        .filter(|u| !u.is_empty())
}

fn description(ctx: &CommandContext, command: &Command) -> String {
    ctx.i18n().get_text(
        &format!("commands.{}.description", command.name),
        command.description.as_deref(),
        &[],
    )
}

fn home_page(ctx: &CommandContext) -> Result<Reply, CommandError> {
    let i18n = ctx.i18n();
    let design = &ctx.state.design;
    let extensions = ctx.state.loader()?.extensions();

    let mut page = container(None).text(format!(
        "### {}\n{}",
        ctx.i("response_home.title", &[]),
        ctx.i("response_home.comment", &[])
    ));

    for extension in extensions {
        let id = extension.id();
        let commands: Vec<String> = runnable(ctx, id)?
            .iter()
            .map(|c| {
                ctx.state
                    .command_mention(&c.name)
                    .unwrap_or_else(|| format!("`{}{}`", ctx.prefix(), c.name))
            })
            .collect();

        let name = i18n.get_text(&format!("categories.{id}.name"), Some(id), &[]);
        page = page.separator().section(
            vec![
                format!("### {} {}", design.emoji(extension.icon()), name),
                commands.join(" "),
            ],
            button(ctx, ctx.i("response_home.detail_button_name", &[]), &["category", id]),
        );
    }

    let page = page
        .separator()
        .text(format!("-# {}", i18n.get_text("common.footer", None, &[])));
    Ok(message().container(page).build())
}

fn category_page(ctx: &CommandContext, extension: &dyn Extension) -> Result<Reply, CommandError> {
    let i18n = ctx.i18n();
    let id = extension.id();
    let name = i18n.get_text(&format!("categories.{id}.name"), Some(id), &[]);
    let about = i18n.get_text(&format!("categories.{id}.description"), Some(""), &[]);

    let mut page = container(None)
        .section(
            vec![
                format!("### {}", ctx.i("response_category.title", &[("name", name.as_str())])),
                about,
            ],
            button(ctx, ctx.i("response_category.back_button_name", &[]), &["home"]),
        )
        .separator();

    let mut buttons = Vec::new();
    for (i, command) in runnable(ctx, id)?.iter().enumerate() {
        let invocation = prefix_invocation(ctx, command);
        let line = match ctx.state.command_mention(&command.name) {
            Some(mention) => format!("{}  (`{}`)", mention, invocation),
            None => format!("`{}`", invocation),
        };
        let gap = if i == 0 { "" } else { "\n" };

        page = page.text(format!("{}{}\n> {}", gap, line, description(ctx, command)));
        buttons.push(button(ctx, command.name.clone(), &["command", command.name.as_str()]));
    }

    if !buttons.is_empty() {
        page = page.action_row(buttons);
    }

    let page = page
        .separator()
        .text(format!("-# {}", ctx.i("response_command.footer", &[])));
    Ok(message().container(page).build())
}

fn command_page(ctx: &CommandContext, command: &Command) -> Result<Reply, CommandError> {
    let i18n = ctx.i18n();
    let name = format!("{}{}", ctx.prefix(), command.name);
    let title = match ctx.state.command_mention(&command.name) {
        Some(mention) => format!("{}  (`{}`)", mention, name),
        None => format!("`{}`", name),
    };

    let back = match &command.extension {
        Some(extension) => button(ctx, ctx.i("response_command.back_button_name", &[]), &["category", extension.as_str()]),
        None => button(ctx, ctx.i("response_command.back_button_name", &[]), &["home"]),
    };

    let mut page = container(None)
        .section(
            vec![
                format!("### {}", ctx.i("response_command.title", &[("name", title.as_str())])),
                description(ctx, command),
            ],
            back,
        )
        .separator();

    if !command.aliases.is_empty() {
        let aliases: Vec<String> = command.aliases.iter().map(|a| format!("`{}`", a)).collect();
        page = page.text(format!("{}\n{}", ctx.i("response_command.aliases", &[]), aliases.join(", ")));
    }

    page = page.text(format!(
        "{}\n`{}`",
        ctx.i("response_command.usage", &[]),
        prefix_invocation(ctx, command)
    ));

    let examples = i18n.get_list(&format!("commands.{}.examples", command.name), &[("prefix", ctx.prefix())]);
    if !examples.is_empty() {
        let examples: Vec<String> = examples.iter().map(|e| format!("- `{}`", e)).collect();
        page = page.text(format!("{}\n{}", ctx.i("response_command.examples", &[]), examples.join("\n")));
    }

    let page = page
        .separator()
        .text(format!("-# {}", ctx.i("response_command.footer", &[])));
    Ok(message().container(page).build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::BotError;
    use crate::application::loader::ExtensionLoader;
    use crate::application::state::BotState;
    use crate::domain::entities::{Block, Message, User};
    use crate::domain::traits::{Bot, BotInfo};
    use crate::infrastructure::config::{Config, Design, YamlMapping};
    use crate::infrastructure::i18n::{LocalizationPackage, LocalizationProvider};
    use std::collections::HashMap;

    struct TestBot;

    #[async_trait]
    impl Bot for TestBot {
        async fn send_reply(&self, _channel_id: u64, _reply: &Reply, _reference: Option<u64>) -> Result<u64, BotError> {
            Ok(1)
        }

        async fn fetch_message(&self, _channel_id: u64, message_id: u64) -> Result<Message, BotError> {
            Err(BotError::NotFound(message_id.to_string()))
        }

        fn bot_info(&self) -> BotInfo {
            BotInfo::new(99, "befri")
        }
    }

    struct Info;

    impl Extension for Info {
        fn id(&self) -> &str {
            "info"
        }

        fn icon(&self) -> &str {
            "info"
        }

        fn commands(&self) -> Vec<Command> {
            vec![command(), Command::new("reload").owners_only().with_handler(Help)]
        }
    }

    const ENGLISH: &str = r#"
natural_name: English
discord_locale: en-US
authors: [{name: tester}]
common:
  footer: Made with love
categories:
  info:
    name: Information
    description: Commands that provide information
errors:
  unknown_help_target: "Nothing called `{target}`"
commands:
  help:
    description: Command reference
    usage: "[command]"
    aliases: [h]
    examples: ["{prefix}help", "{prefix}help info"]
    response_home:
      title: Help
      comment: Pick a category
      detail_button_name: Details
    response_category:
      title: "Category: {name}"
      back_button_name: Back
    response_command:
      title: "Command {name}"
      back_button_name: Back
      aliases: "Aliases:"
      usage: "Usage:"
      examples: "Examples:"
      footer: "[] optional, <> required"
"#;

    fn state(developers: Vec<u64>) -> Arc<BotState> {
        let mut i18n = LocalizationProvider::new();
        i18n.insert(LocalizationPackage::from_mapping("english.yml", YamlMapping::parse(ENGLISH).unwrap()).unwrap());

        let mut loader = ExtensionLoader::new();
        loader.register(Arc::new(Info), false);
        loader.load_all(&i18n);

        let design = Design::new(YamlMapping::parse("emojis:\n  info: \"(i)\"\n").unwrap());
        let mut config = Config::default();
        config.developers = developers;
        Arc::new(BotState::new(config, design, i18n).with_loader(loader))
    }

    fn ctx(state: Arc<BotState>, args: &[&str]) -> CommandContext {
        let command = state.command(NAME).unwrap().unwrap();
        CommandContext::new(state, Arc::new(TestBot), User::new(5, "ann"), 1)
            .with_command(command)
            .with_args(args.iter().map(|a| a.to_string()).collect())
    }

    fn texts(reply: &Reply) -> String {
        reply.plain_text()
    }

    #[tokio::test]
    async fn test_home_page_lists_runnable_commands() {
        let reply = Help.execute(&ctx(state(vec![]), &[])).await.unwrap();
        let text = texts(&reply);

        assert!(text.starts_with("### Help\nPick a category"));
        assert!(text.contains("### (i) Information"));
        assert!(text.contains("`b!help`"));
        assert!(!text.contains("reload"));
        assert!(text.ends_with("-# Made with love"));

        let buttons = reply.buttons();
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].custom_id.as_deref(), Some("help:5:category:info"));
    }

    #[tokio::test]
    async fn test_home_page_uses_slash_mentions_and_developer_commands() {
        let state = state(vec![5]);
        state
            .set_app_commands(HashMap::from([("help".to_string(), 77)]))
            .unwrap();

        let text = texts(&Help.execute(&ctx(state, &[])).await.unwrap());
        assert!(text.contains("</help:77> `b!reload`"));
    }

    #[tokio::test]
    async fn test_category_page() {
        let reply = Help.execute(&ctx(state(vec![]), &["info"])).await.unwrap();
        let text = texts(&reply);

        assert!(text.contains("### Category: Information"));
        assert!(text.contains("`b!help [command]`\n> Command reference"));
        assert_eq!(reply.buttons()[0].custom_id.as_deref(), Some("help:5:home"));
        assert_eq!(reply.buttons()[1].custom_id.as_deref(), Some("help:5:command:help"));
    }

    #[tokio::test]
    async fn test_command_page() {
        let reply = Help.execute(&ctx(state(vec![]), &["h"])).await.unwrap();
        let text = texts(&reply);

        assert!(text.contains("### Command `b!help`"));
        assert!(text.contains("Aliases:\n`h`"));
        assert!(text.contains("Usage:\n`b!help [command]`"));
        assert!(text.contains("Examples:\n- `b!help`\n- `b!help info`"));
        assert_eq!(reply.buttons()[0].custom_id.as_deref(), Some("help:5:category:info"));
    }

    #[tokio::test]
    async fn test_unknown_target() {
        let reply = Help.execute(&ctx(state(vec![]), &["dance"])).await.unwrap();
        assert_eq!(texts(&reply), "Nothing called `dance`");

        let reply = Help.execute(&ctx(state(vec![]), &["reload"])).await.unwrap();
        assert_eq!(texts(&reply), "Nothing called `reload`");
    }

    #[tokio::test]
    async fn test_component_actions() {
        let state = state(vec![]);
        let ctx = ctx(state, &[]);

        let home = Help.on_component(&ctx, &["home".to_string()]).await.unwrap();
        assert!(texts(&home).starts_with("### Help"));

        let category = Help
            .on_component(&ctx, &["category".to_string(), "info".to_string()])
            .await
            .unwrap();
        assert!(texts(&category).contains("Category: Information"));

        assert!(Help.on_component(&ctx, &["dance".to_string()]).await.is_err());
        assert!(matches!(home.blocks[0], Block::Container(_)));
    }

    #[tokio::test]
    async fn test_command_button_hides_owner_commands() {
        let action = ["command".to_string(), "reload".to_string()];

        let reply = Help.on_component(&ctx(state(vec![]), &[]), &action).await.unwrap();
        assert_eq!(texts(&reply), "Nothing called `reload`");

        let reply = Help.on_component(&ctx(state(vec![5]), &[]), &action).await.unwrap();
        assert!(texts(&reply).contains("### Command `b!reload`"));
    }
}

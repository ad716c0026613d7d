use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::traits::CommandHandler;

/// A fixed value a slash command option can take
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionChoice {
    pub name: String,
    pub value: String,
    /// Localization key for the choice name
    pub key: Option<String>,
}

impl OptionChoice {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// A string argument of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOption {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub choices: Vec<OptionChoice>,
}

impl CommandOption {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
            choices: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_choice(mut self, choice: OptionChoice) -> Self {
        self.choices.push(choice);
        self
    }
}

/// Represents a bot command, invokable both by prefix and as a slash command
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub usage: Option<String>,
    pub options: Vec<CommandOption>,
    pub owners_only: bool,
    /// Id of the extension that registered the command
    pub extension: Option<String>,
    pub handler: Option<Arc<dyn CommandHandler>>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            aliases: Vec::new(),
            usage: None,
            options: Vec::new(),
            owners_only: false,
            extension: None,
            handler: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn owners_only(mut self) -> Self {
        self.owners_only = true;
        self
    }

    pub fn with_handler<H: CommandHandler + 'static>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn matches(&self, input: &str) -> bool {
        let input_lower = input.to_lowercase();
        self.name.to_lowercase() == input_lower ||
            self.aliases.iter().any(|a| a.to_lowercase() == input_lower)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("extension", &self.extension)
            .field("owners_only", &self.owners_only)
            .finish_non_exhaustive()
    }
}

/// Command registry for managing available commands
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) {
        self.commands.insert(command.name.clone(), Arc::new(command));
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<Command>> {
        self.commands.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Command>> {
        self.commands.get(name).cloned()
    }

    /// Finds a command by name first, then by alias
    pub fn find(&self, input: &str) -> Option<Arc<Command>> {
        self.get(input)
            .or_else(|| self.commands.values().find(|c| c.matches(input)).cloned())
    }

    pub fn all(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

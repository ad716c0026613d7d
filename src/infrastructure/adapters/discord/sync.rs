//! Slash command registration

use std::collections::HashMap;
use std::time::Instant;

use serenity::all::{Command as ApplicationCommand, CommandOptionType, CreateCommand, CreateCommandOption, Http};

use crate::application::errors::BotError;
use crate::application::state::BotState;
use crate::domain::entities::{Command, CommandOption};
use crate::infrastructure::i18n::TranslationTarget;

/// Replaces the global slash commands with every loaded command and stores
/// their ids for `</name:id>` mentions. Returns how many were registered.
pub async fn sync_commands(http: &Http, state: &BotState) -> Result<usize, BotError> {
    let started = Instant::now();
    let commands = build_commands(state)?;

    let registered = ApplicationCommand::set_global_commands(http, commands)
        .await
        .map_err(|e| BotError::Network(e.to_string()))?;

    let ids: HashMap<String, u64> = registered.iter().map(|c| (c.name.clone(), c.id.get())).collect();
    state.set_app_commands(ids)?;

    tracing::info!(
        target: "discord",
        "Synced {} application commands in {:.2}s",
        registered.len(),
        started.elapsed().as_secs_f64()
    );
    Ok(registered.len())
}

pub fn build_commands(state: &BotState) -> Result<Vec<CreateCommand>, BotError> {
    let commands = state.loader()?.commands();
    Ok(commands.iter().map(|command| build_command(state, command)).collect())
}

fn build_command(state: &BotState, command: &Command) -> CreateCommand {
    let name = command.name.as_str();
    let description = command.description.as_deref().unwrap_or(name);

    let mut created = CreateCommand::new(name).description(description);
    for (locale, text) in localizations(state, &TranslationTarget::CommandName { command: name }, name) {
        created = created.name_localized(locale, text.to_lowercase());
    }
    for (locale, text) in localizations(state, &TranslationTarget::CommandDescription { command: name }, description) {
        created = created.description_localized(locale, text);
    }

    for option in &command.options {
        created = created.add_option(build_option(state, name, option));
    }
    created
}

fn build_option(state: &BotState, command: &str, option: &CommandOption) -> CreateCommandOption {
    let parameter = option.name.as_str();
    let mut created = CreateCommandOption::new(CommandOptionType::String, parameter, &option.description)
        .required(option.required);

    let target = TranslationTarget::ParameterName { command, parameter };
    for (locale, text) in localizations(state, &target, parameter) {
        created = created.name_localized(locale, text.to_lowercase());
    }
    let target = TranslationTarget::ParameterDescription { command, parameter };
    for (locale, text) in localizations(state, &target, &option.description) {
        created = created.description_localized(locale, text);
    }

    for choice in &option.choices {
        let target = TranslationTarget::ChoiceName { key: choice.key.as_deref() };
        let locales = localizations(state, &target, &choice.name);
        created = created.add_string_choice_localized(&choice.name, &choice.value, locales);
    }
    created
}

/// The translation of `target` for every loaded package, sorted by locale
pub fn localizations(state: &BotState, target: &TranslationTarget<'_>, default: &str) -> Vec<(String, String)> {
    let mut translations: Vec<(String, String)> = state
        .i18n
        .packages()
        .keys()
        .filter_map(|locale| {
            state
                .i18n
                .translate(locale, target, default, &state.design)
                .map(|text| (locale.clone(), text))
        })
        .collect();
    translations.sort();
    translations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::{Config, Design, YamlMapping};
    use crate::infrastructure::i18n::{LocalizationPackage, LocalizationProvider};

    fn package(filename: &str, content: &str) -> LocalizationPackage {
        LocalizationPackage::from_mapping(filename, YamlMapping::parse(content).unwrap()).unwrap()
    }

    fn state() -> BotState {
        let mut i18n = LocalizationProvider::new();
        i18n.insert(package(
            "english.yml",
            "natural_name: English\ndiscord_locale: en-US\nauthors: [{name: a}]\ncommands:\n  help:\n    description: Shows help\n",
        ));
        i18n.insert(package(
            "russian.yml",
            "natural_name: Русский\ndiscord_locale: ru\nauthors: [{name: b}]\ncommands:\n  help:\n    name: помощь\n    description: Показывает помощь\n",
        ));
        BotState::new(Config::default(), Design::default(), i18n)
    }

    #[test]
    fn test_localizations_per_package() {
        let state = state();

        let names = localizations(&state, &TranslationTarget::CommandName { command: "help" }, "help");
        assert_eq!(
            names,
            vec![("en-US".to_string(), "help".to_string()), ("ru".to_string(), "помощь".to_string())]
        );

        let descriptions = localizations(&state, &TranslationTarget::CommandDescription { command: "help" }, "-");
        assert_eq!(descriptions[0].1, "Shows help");
        assert_eq!(descriptions[1].1, "Показывает помощь");
    }

    #[test]
    fn test_choice_without_key_keeps_name() {
        let state = state();
        let choices = localizations(&state, &TranslationTarget::ChoiceName { key: None }, "info");
        assert!(choices.iter().all(|(_, name)| name == "info"));
    }

    #[test]
    fn test_build_commands_for_loaded_extensions() {
        let state = state();
        for extension in crate::extensions::builtin() {
            state.loader_mut().unwrap().register(extension, false);
        }
        state.load_extensions().unwrap();

        assert_eq!(build_commands(&state).unwrap().len(), 2);
    }
}

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::application::errors::LocalizationError;
use crate::infrastructure::config::Design;
use super::format::format_text;
use super::package::LocalizationPackage;

pub const FALLBACK_LOCALE: &str = "en-US";

/// Which slash command string is being translated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationTarget<'a> {
    CommandName { command: &'a str },
    CommandDescription { command: &'a str },
    ParameterName { command: &'a str, parameter: &'a str },
    ParameterDescription { command: &'a str, parameter: &'a str },
    /// Choice names are only translated when the choice carries a key
    ChoiceName { key: Option<&'a str> },
}

impl TranslationTarget<'_> {
    fn key(&self) -> Option<String> {
        match self {
            TranslationTarget::CommandName { command } => Some(format!("commands.{command}.name")),
            TranslationTarget::CommandDescription { command } => Some(format!("commands.{command}.description")),
            TranslationTarget::ParameterName { command, parameter } => {
                Some(format!("commands.{command}.arguments.{parameter}.name"))
            }
            TranslationTarget::ParameterDescription { command, parameter } => {
                Some(format!("commands.{command}.arguments.{parameter}.description"))
            }
            TranslationTarget::ChoiceName { key } => key.map(str::to_string),
        }
    }
}

/// Registry of loaded localization packages, keyed by Discord locale
#[derive(Debug, Default)]
pub struct LocalizationProvider {
    packages: HashMap<String, LocalizationPackage>,
}

impl LocalizationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `.yml`/`.yaml` package in `dir`. Invalid packages are logged and skipped.
    pub fn scan(&mut self, dir: impl AsRef<Path>) -> Result<usize, LocalizationError> {
        let mut loaded = 0;
        let mut entries: Vec<_> = std::fs::read_dir(dir.as_ref())?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| matches!(p.extension().and_then(|e| e.to_str()), Some("yml" | "yaml")))
            .collect();
        entries.sort();

        for path in entries {
            match LocalizationPackage::load(&path) {
                Ok(package) => {
                    tracing::debug!(
                        target: "i18n",
                        "Loaded `{}` localization package by `{}`",
                        package.natural_name,
                        package.author_names()
                    );
                    self.insert(package);
                    loaded += 1;
                }
                Err(e) => tracing::error!(target: "i18n", "{}", e),
            }
        }

        Ok(loaded)
    }

    pub fn insert(&mut self, package: LocalizationPackage) {
        self.packages.insert(package.discord_locale.clone(), package);
    }

    pub fn packages(&self) -> &HashMap<String, LocalizationPackage> {
        &self.packages
    }

    /// The package for `locale`, else the fallback package
    pub fn get(&self, locale: &str) -> Option<&LocalizationPackage> {
        self.packages.get(locale).or_else(|| self.packages.get(FALLBACK_LOCALE))
    }

    pub fn unload(&mut self) {
        self.packages.clear();
    }

    /// Translates a slash command string. `None` when `locale` has no package.
    pub fn translate(&self, locale: &str, target: &TranslationTarget<'_>, default: &str, design: &Design) -> Option<String> {
        let package = self.packages.get(locale)?;
        let Some(key) = target.key() else {
            return Some(default.to_string());
        };

        let text = package.data.get_str(&key).unwrap_or(default);
        Some(format_text(text, design, &[]))
    }

    /// Every localized name and alias of `command`, except the command's own name
    pub fn command_aliases(&self, command: &str) -> Vec<String> {
        let mut aliases = BTreeSet::new();
        for package in self.packages.values() {
            if let Some(name) = package.data.get_str(&format!("commands.{command}.name")) {
                aliases.insert(name.to_string());
            }
            if let Some(list) = package.data.get_as::<Vec<String>>(&format!("commands.{command}.aliases")) {
                aliases.extend(list);
            }
        }

        aliases.remove(command);
        aliases.into_iter().collect()
    }
}

/// Localization bound to a package and the command being run.
/// Without a package every lookup falls back to its default or key.
#[derive(Debug, Clone, Copy)]
pub struct ContextLocalization<'a> {
    package: Option<&'a LocalizationPackage>,
    design: &'a Design,
    command: Option<&'a str>,
}

impl<'a> ContextLocalization<'a> {
    pub fn new(package: Option<&'a LocalizationPackage>, design: &'a Design, command: Option<&'a str>) -> Self {
        Self { package, design, command }
    }

    pub fn package(&self) -> Option<&'a LocalizationPackage> {
        self.package
    }

    pub fn locale(&self) -> &'a str {
        self.package.map_or(FALLBACK_LOCALE, |p| p.discord_locale.as_str())
    }

    fn raw(&self, key: &str) -> Option<&'a str> {
        self.package?.data.get_str(key)
    }

    /// `commands.<command>.<key>`; the bare key outside of a command
    pub fn get(&self, key: &str, args: &[(&str, &str)]) -> String {
        match self.command {
            Some(command) => self.get_text(&format!("commands.{command}.{key}"), None, args),
            None => key.to_string(),
        }
    }

    /// The text under `key`, else `default`, else the key itself
    pub fn get_text(&self, key: &str, default: Option<&str>, args: &[(&str, &str)]) -> String {
        let text = self.raw(key).or(default).unwrap_or(key);
        format_text(text, self.design, args)
    }

    /// The text under `key`, if there is one
    pub fn find_text(&self, key: &str, args: &[(&str, &str)]) -> Option<String> {
        self.raw(key).map(|text| format_text(text, self.design, args))
    }

    /// Scalar items of the list under `key`; empty when missing
    pub fn get_list(&self, key: &str, args: &[(&str, &str)]) -> Vec<String> {
        let Some(items) = self.package.and_then(|p| p.data.get_list(key)) else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| match item {
                serde_yaml::Value::String(s) => Some(format_text(s, self.design, args)),
                serde_yaml::Value::Number(n) => Some(n.to_string()),
                serde_yaml::Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn get_bool(&self, value: bool) -> String {
        self.get_text(if value { "boolean.yes" } else { "boolean.no" }, None, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::YamlMapping;
    use std::fs;
    use tempfile::tempdir;

    const ENGLISH: &str = r#"
natural_name: English
discord_locale: en-US
authors:
  - name: stngularity
boolean:
  "yes": "Yes"
  "no": "No"
commands:
  help:
    description: "{e.info} Reference for bot commands"
    aliases: [h, commands]
    title: "Hello, {name}"
    examples: ["b!help", "b!help sauce"]
    arguments:
      command:
        name: command
        description: Command to look up
"#;

    const RUSSIAN: &str = r#"
natural_name: Русский
discord_locale: ru
authors:
  - name: stngularity
commands:
  help:
    name: помощь
    description: Справка по командам
"#;

    fn provider() -> LocalizationProvider {
        let mut provider = LocalizationProvider::new();
        for (file, text) in [("english.yml", ENGLISH), ("russian.yml", RUSSIAN)] {
            let data = YamlMapping::parse(text).unwrap();
            provider.insert(LocalizationPackage::from_mapping(file, data).unwrap());
        }
        provider
    }

    fn design() -> Design {
        Design::new(YamlMapping::parse("emojis:\n  info: \"(i)\"\n").unwrap())
    }

    #[test]
    fn test_scan_skips_invalid_and_foreign_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("english.yml"), ENGLISH).unwrap();
        fs::write(dir.path().join("russian.yaml"), RUSSIAN).unwrap();
        fs::write(dir.path().join("broken.yml"), "natural_name: Broken\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "natural_name: Notes\n").unwrap();

        let mut provider = LocalizationProvider::new();
        assert_eq!(provider.scan(dir.path()).unwrap(), 2);
        assert!(provider.packages().contains_key("en-US"));
        assert!(provider.packages().contains_key("ru"));

        provider.unload();
        assert!(provider.packages().is_empty());
    }

    #[test]
    fn test_scan_missing_directory_is_error() {
        let mut provider = LocalizationProvider::new();
        assert!(provider.scan("/definitely/not/a/languages/dir").is_err());
    }

    #[test]
    fn test_get_falls_back_to_english() {
        let provider = provider();
        assert_eq!(provider.get("ru").unwrap().natural_name, "Русский");
        assert_eq!(provider.get("de").unwrap().discord_locale, "en-US");
    }

    #[test]
    fn test_translate() {
        let provider = provider();
        let design = design();
        let description = TranslationTarget::CommandDescription { command: "help" };

        assert_eq!(
            provider.translate("en-US", &description, "Help", &design).as_deref(),
            Some("(i) Reference for bot commands")
        );
        assert_eq!(provider.translate("de", &description, "Help", &design), None);

        let name = TranslationTarget::CommandName { command: "help" };
        assert_eq!(provider.translate("en-US", &name, "help", &design).as_deref(), Some("help"));
        assert_eq!(provider.translate("ru", &name, "help", &design).as_deref(), Some("помощь"));

        let choice = TranslationTarget::ChoiceName { key: None };
        assert_eq!(provider.translate("ru", &choice, "info", &design).as_deref(), Some("info"));
    }

    #[test]
    fn test_command_aliases_union() {
        let provider = provider();
        assert_eq!(provider.command_aliases("help"), vec!["commands", "h", "помощь"]);
        assert!(provider.command_aliases("sauce").is_empty());
    }

    #[test]
    fn test_context_localization() {
        let provider = provider();
        let design = design();
        let package = provider.get("en-US").unwrap();

        let i18n = ContextLocalization::new(Some(package), &design, Some("help"));
        assert_eq!(i18n.get("title", &[("name", "Ann")]), "Hello, Ann");
        assert_eq!(i18n.get("missing", &[]), "commands.help.missing");
        assert_eq!(i18n.get_list("commands.help.examples", &[]), vec!["b!help", "b!help sauce"]);
        assert!(i18n.get_list("commands.help.nothing", &[]).is_empty());
        assert_eq!(i18n.get_bool(true), "Yes");
        assert_eq!(i18n.find_text("commands.help.usage", &[]), None);
        assert_eq!(i18n.get_text("errors.gone", Some("Gone"), &[]), "Gone");

        let outside = ContextLocalization::new(Some(package), &design, None);
        assert_eq!(outside.get("title", &[]), "title");

        let empty = ContextLocalization::new(None, &design, Some("help"));
        assert_eq!(empty.get("title", &[]), "commands.help.title");
        assert_eq!(empty.get_text("errors.gone", Some("{e.info} Gone"), &[]), "(i) Gone");
        assert_eq!(empty.locale(), "en-US");
    }
}

use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::application::errors::LocalizationError;
use crate::infrastructure::config::YamlMapping;

const REQUIRED_KEYS: [&str; 3] = ["natural_name", "discord_locale", "authors"];

/// Author of a localization package
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub discord: Option<u64>,
    #[serde(default)]
    pub github: Option<String>,
}

impl Author {
    pub fn github_url(&self) -> Option<String> {
        self.github.as_ref().map(|name| format!("https://github.com/{name}"))
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One `languages/*.yml` file
#[derive(Debug, Clone)]
pub struct LocalizationPackage {
    pub filename: String,
    pub natural_name: String,
    pub discord_locale: String,
    pub authors: Vec<Author>,
    pub data: YamlMapping,
}

impl LocalizationPackage {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LocalizationError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let data = YamlMapping::load(path).map_err(|e| LocalizationError::InvalidPackage {
            file: filename.clone(),
            reason: e.to_string(),
        })?;

        Self::from_mapping(filename, data)
    }

    pub fn from_mapping(filename: impl Into<String>, data: YamlMapping) -> Result<Self, LocalizationError> {
        let filename = filename.into();
        let invalid = |reason: &str| LocalizationError::InvalidPackage {
            file: filename.clone(),
            reason: reason.to_string(),
        };

        if !data.contains(&REQUIRED_KEYS) {
            return Err(invalid("one of the required keys is missing"));
        }

        let natural_name = data
            .get_as::<String>("natural_name")
            .ok_or_else(|| invalid("`natural_name` must be a string"))?;
        let discord_locale = data
            .get_as::<String>("discord_locale")
            .ok_or_else(|| invalid("`discord_locale` must be a string"))?;
        let authors = data
            .get_as::<Vec<Author>>("authors")
            .ok_or_else(|| invalid("`authors` must be a list of authors with names"))?;

        Ok(Self {
            filename,
            natural_name,
            discord_locale,
            authors,
            data,
        })
    }

    /// Comma-separated author names
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for LocalizationPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] ({})", self.natural_name, self.discord_locale, self.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_from_mapping() {
        let data = YamlMapping::parse(r#"
natural_name: English
discord_locale: en-US
authors:
  - name: stngularity
    github: stngularity
    discord: 813065322453925940
  - name: helper
"#).unwrap();
        let package = LocalizationPackage::from_mapping("english.yml", data).unwrap();

        assert_eq!(package.discord_locale, "en-US");
        assert_eq!(package.author_names(), "stngularity, helper");
        assert_eq!(package.authors[0].github_url().as_deref(), Some("https://github.com/stngularity"));
        assert_eq!(package.authors[1].github_url(), None);
        assert_eq!(package.to_string(), "English [en-US] (english.yml)");
    }

    #[test]
    fn test_missing_keys_are_rejected() {
        let data = YamlMapping::parse("natural_name: English\ndiscord_locale: en-US\n").unwrap();
        let err = LocalizationPackage::from_mapping("broken.yml", data).unwrap_err();
        assert!(err.to_string().contains("broken.yml"));
    }
}

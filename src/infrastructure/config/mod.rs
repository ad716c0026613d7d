//! Configuration management

pub mod design;
pub mod env;
pub mod yaml;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::path::Path;
use crate::application::errors::ConfigError;

pub use design::Design;
pub use yaml::YamlMapping;

pub const DEFAULT_PREFIX: &str = "b!";
pub const DEFAULT_LOG_FILENAME: &str = "logs/%d.%m.%Y.log";
pub const DEFAULT_SAUCE_ENDPOINT: &str = "https://api.trace.moe/search?cutBorders&anilistInfo&url={url}";

/// Bot configuration (`config.yml`)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub prefix: String,
    pub developers: Vec<u64>,
    pub cache: CacheConfig,
    pub allowed_mentions: AllowedMentionsConfig,
    pub presence: PresenceConfig,
    pub logger: LoggerConfig,
    pub extensions: ExtensionsConfig,
    pub sauce: SauceConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_messages: usize,
}

/// Mentions the bot is allowed to ping in its messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AllowedMentionsConfig {
    #[serde(deserialize_with = "lenient_bool")]
    pub everyone: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub users: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub roles: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub replied_user: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PresenceConfig {
    pub status: Option<String>,
    pub activity: ActivityConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ActivityConfig {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub file: FileLoggerConfig,
    pub console: ConsoleLoggerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FileLoggerConfig {
    pub level: Option<String>,
    pub filename: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleLoggerConfig {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtensionsConfig {
    /// Extensions that are registered but never loaded
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SauceConfig {
    pub endpoint: String,
    pub min_similarity: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            developers: Vec::new(),
            cache: CacheConfig::default(),
            allowed_mentions: AllowedMentionsConfig::default(),
            presence: PresenceConfig::default(),
            logger: LoggerConfig::default(),
            extensions: ExtensionsConfig::default(),
            sauce: SauceConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_messages: 1000 }
    }
}

impl Default for FileLoggerConfig {
    fn default() -> Self {
        Self {
            level: None,
            filename: DEFAULT_LOG_FILENAME.to_string(),
        }
    }
}

impl Default for SauceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SAUCE_ENDPOINT.to_string(),
            min_similarity: 0.25,
        }
    }
}

/// Online status shown for the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Online,
    Idle,
    DoNotDisturb,
    Invisible,
    Offline,
}

impl Status {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "online" => Some(Status::Online),
            "idle" => Some(Status::Idle),
            "dnd" | "do_not_disturb" => Some(Status::DoNotDisturb),
            "invisible" => Some(Status::Invisible),
            "offline" => Some(Status::Offline),
            _ => None,
        }
    }
}

/// Activity shown under the bot's name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Playing(String),
    Listening(String),
    Watching(String),
    Competing(String),
    Streaming { name: String, url: String },
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Presence {
    pub status: Option<Status>,
    pub activity: Option<Activity>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let value = yaml::read_value(path)?;
        if value.is_null() {
            return Ok(Config::default());
        }

        serde_yaml::from_value(value).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn is_developer(&self, user_id: u64) -> bool {
        self.developers.contains(&user_id)
    }

    pub fn is_extension_disabled(&self, id: &str) -> bool {
        self.extensions.disabled.iter().any(|d| d == id)
    }

    pub fn allowed_mentions(&self) -> &AllowedMentionsConfig {
        &self.allowed_mentions
    }

    pub fn presence(&self) -> Presence {
        Presence {
            status: self.presence.status.as_deref().and_then(Status::parse),
            activity: self.activity(),
        }
    }

    fn activity(&self) -> Option<Activity> {
        let activity = &self.presence.activity;
        let name = activity.name.clone().unwrap_or_default();

        match activity.kind.as_deref()? {
            "game" => Some(Activity::Playing(name)),
            "listen" => Some(Activity::Listening(name)),
            "watch" => Some(Activity::Watching(name)),
            "compete" => Some(Activity::Competing(name)),
            "stream" => activity.url.clone().map(|url| Activity::Streaming { name, url }),
            "custom" => Some(Activity::Custom(name)),
            _ => None,
        }
    }

    /// Default config as YAML, used by `init-config`
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}

/// Anything but a literal `true` reads as `false`
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

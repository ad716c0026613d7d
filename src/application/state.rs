//! Shared bot state

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::application::errors::BotError;
use crate::application::loader::ExtensionLoader;
use crate::domain::entities::Command;
use crate::domain::traits::{Bot, BotInfo};
use crate::infrastructure::config::{Config, Design};
use crate::infrastructure::i18n::{ContextLocalization, LocalizationProvider};

pub const NAME: &str = "Befri";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upper bound for a whole outgoing HTTP request
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// `canary` for pre-release versions, `stable` otherwise
pub fn release_channel(version: &str) -> &'static str {
    if version.contains('-') {
        "canary"
    } else {
        "stable"
    }
}

/// HTTP client whose requests fail after `timeout`
pub fn http_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder()
        .user_agent(format!("{}/{}", NAME, VERSION))
        .timeout(timeout)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(target: "launcher", "Failed to build the HTTP client, requests have no timeout: {}", e);
            reqwest::Client::new()
        }
    }
}

/// Everything handlers, listeners and tasks share
pub struct BotState {
    pub config: Config,
    pub design: Design,
    pub i18n: LocalizationProvider,
    loader: RwLock<ExtensionLoader>,
    app_commands: RwLock<HashMap<String, u64>>,
    bot: RwLock<Option<Arc<dyn Bot>>>,
    http: reqwest::Client,
}

impl BotState {
    pub fn new(config: Config, design: Design, i18n: LocalizationProvider) -> Self {
        Self {
            config,
            design,
            i18n,
            loader: RwLock::new(ExtensionLoader::new()),
            app_commands: RwLock::new(HashMap::new()),
            bot: RwLock::new(None),
            http: http_client(HTTP_TIMEOUT),
        }
    }

    pub fn with_loader(mut self, loader: ExtensionLoader) -> Self {
        self.loader = RwLock::new(loader);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn loader(&self) -> Result<RwLockReadGuard<'_, ExtensionLoader>, BotError> {
        self.loader
            .read()
            .map_err(|e| BotError::Internal(format!("Extension loader lock poisoned: {}", e)))
    }

    pub fn loader_mut(&self) -> Result<RwLockWriteGuard<'_, ExtensionLoader>, BotError> {
        self.loader
            .write()
            .map_err(|e| BotError::Internal(format!("Extension loader lock poisoned: {}", e)))
    }

    /// Finds a loaded command by name or alias
    pub fn command(&self, name: &str) -> Result<Option<Arc<Command>>, BotError> {
        Ok(self.loader()?.command(name))
    }

    /// Loads every extension that isn't disabled; returns how many were loaded
    pub fn load_extensions(&self) -> Result<usize, BotError> {
        Ok(self.loader_mut()?.load_all(&self.i18n))
    }

    pub fn set_app_commands(&self, ids: HashMap<String, u64>) -> Result<(), BotError> {
        let mut app_commands = self
            .app_commands
            .write()
            .map_err(|e| BotError::Internal(format!("App commands lock poisoned: {}", e)))?;
        *app_commands = ids;
        Ok(())
    }

    pub fn app_command_id(&self, name: &str) -> Option<u64> {
        self.app_commands.read().ok()?.get(name).copied()
    }

    /// `</name:id>` once slash commands have been synced
    pub fn command_mention(&self, name: &str) -> Option<String> {
        self.app_command_id(name).map(|id| format!("</{}:{}>", name, id))
    }

    pub fn set_bot(&self, bot: Arc<dyn Bot>) -> Result<(), BotError> {
        let mut slot = self
            .bot
            .write()
            .map_err(|e| BotError::Internal(format!("Bot lock poisoned: {}", e)))?;
        *slot = Some(bot);
        Ok(())
    }

    pub fn bot(&self) -> Option<Arc<dyn Bot>> {
        self.bot.read().ok()?.clone()
    }

    pub fn bot_info(&self) -> Option<BotInfo> {
        self.bot().map(|bot| bot.bot_info())
    }

    /// Localization for `locale` (falling back to English) within `command`
    pub fn localization<'a>(&'a self, locale: &str, command: Option<&'a str>) -> ContextLocalization<'a> {
        ContextLocalization::new(self.i18n.get(locale), &self.design, command)
    }
}

impl std::fmt::Debug for BotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotState")
            .field("prefix", &self.config.prefix)
            .field("packages", &self.i18n.packages().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_channel() {
        assert_eq!(release_channel("0.0.1-alpha.1"), "canary");
        assert_eq!(release_channel("1.2.0"), "stable");
    }

    #[test]
    fn test_command_mentions() {
        let state = BotState::new(Config::default(), Design::default(), LocalizationProvider::new());
        assert_eq!(state.command_mention("help"), None);

        state
            .set_app_commands(HashMap::from([("help".to_string(), 42)]))
            .unwrap();
        assert_eq!(state.command_mention("help").as_deref(), Some("</help:42>"));
        assert_eq!(state.prefix(), "b!");
        assert!(state.bot().is_none());
    }

    #[tokio::test]
    async fn test_http_client_gives_up_on_stalled_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let error = http_client(Duration::from_millis(200))
            .get(format!("http://{}/search", address))
            .send()
            .await
            .unwrap_err();
        assert!(error.is_timeout());
    }
}

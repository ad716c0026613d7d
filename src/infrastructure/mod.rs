//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: `config.yml`, `design.yml`, `.env` and the bot token
//! - I18n: localization packages
//! - Logging: console and file sinks
//! - Adapters: platform integrations (Discord, console)

pub mod adapters;
pub mod config;
pub mod i18n;
pub mod logging;

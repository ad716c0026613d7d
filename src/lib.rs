//! Befri: a multifunctional Discord bot
//!
//! Layered like this:
//! - `domain`: entities and the traits adapters and extensions implement
//! - `application`: state, dispatching, extension loading, task scheduling
//! - `infrastructure`: config, localization, logging, Discord and console adapters
//! - `extensions`: the built-in command categories

pub mod application;
pub mod domain;
pub mod extensions;
pub mod infrastructure;

//! Built-in extensions

pub mod info;
pub mod misc;

use std::sync::Arc;

use crate::domain::traits::Extension;

/// Every extension compiled into the bot, in help order
pub fn builtin() -> Vec<Arc<dyn Extension>> {
    vec![Arc::new(info::Info), Arc::new(misc::Misc)]
}

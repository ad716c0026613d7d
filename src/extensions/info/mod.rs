//! Information extension: commands that tell users about the bot

pub mod help;

use crate::domain::entities::Command;
use crate::domain::traits::Extension;

pub struct Info;

impl Extension for Info {
    fn id(&self) -> &str {
        "info"
    }

    fn icon(&self) -> &str {
        "info"
    }

    fn commands(&self) -> Vec<Command> {
        vec![help::command()]
    }
}

//! Miscellaneous commands

pub mod sauce;

use crate::domain::entities::Command;
use crate::domain::traits::Extension;

pub struct Misc;

impl Extension for Misc {
    fn id(&self) -> &str {
        "misc"
    }

    fn icon(&self) -> &str {
        "misc"
    }

    fn commands(&self) -> Vec<Command> {
        vec![sauce::command()]
    }
}

use crate::domain::entities::{Command, ScheduledTask};
use super::Listener;

/// A category of bot functionality: commands, event listeners and scheduled tasks
pub trait Extension: Send + Sync {
    /// Unique identifier, also used for localization keys (`categories.<id>.*`)
    fn id(&self) -> &str;

    /// Name of the design emoji shown next to the category
    fn icon(&self) -> &str {
        "unknown"
    }

    fn commands(&self) -> Vec<Command>;

    fn listeners(&self) -> Vec<Listener> {
        Vec::new()
    }

    fn tasks(&self) -> Vec<ScheduledTask> {
        Vec::new()
    }
}

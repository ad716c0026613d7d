//! Domain entities - Core bot objects shared by every layer

pub mod command;
pub mod component;
pub mod message;
pub mod reply;
pub mod task;
pub mod user;

pub use command::{Command, CommandOption, CommandRegistry, OptionChoice};
pub use component::ComponentId;
pub use message::{Attachment, Content, Message, MessageReference};
pub use reply::{Block, Button, ButtonStyle, Container, Reply};
pub use task::ScheduledTask;
pub use user::User;

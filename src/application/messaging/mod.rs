//! Message handling - parsing incoming messages and dispatching commands

pub mod dispatcher;
pub mod parser;

pub use dispatcher::CommandDispatcher;
pub use parser::MessageParser;

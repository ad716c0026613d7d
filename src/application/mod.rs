//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - State: configuration, localization and extensions shared by every handler
//! - Context: what a command knows about its invocation
//! - Messaging: message parsing and command dispatching
//! - Loader and scheduler: extension bookkeeping and task runs
//! - Errors: Domain-specific errors

pub mod context;
pub mod errors;
pub mod loader;
pub mod messaging;
pub mod scheduler;
pub mod state;

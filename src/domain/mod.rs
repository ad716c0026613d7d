//! Domain layer - Core bot model with no platform dependencies
//! 
//! This layer contains:
//! - Entities: Core objects (User, Message, Command, Reply, ScheduledTask)
//! - Traits: Seams implemented by adapters and extensions (Bot, CommandHandler, Extension)

pub mod entities;
pub mod traits;

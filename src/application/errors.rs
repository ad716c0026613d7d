//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Extension error: {0}")]
    Extension(#[from] ExtensionError),

    #[error("Localization error: {0}")]
    Localization(#[from] LocalizationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Permission denied")]
    PermissionDenied,
}

impl From<BotError> for CommandError {
    fn from(error: BotError) -> Self {
        CommandError::ExecutionFailed(error.to_string())
    }
}

/// Extension loader errors
#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("There is no extension with the `{0}` identifier")]
    NotFound(String),

    #[error("The specified extension ({0}) has already been loaded")]
    AlreadyLoaded(String),
}

/// Localization package errors
#[derive(Error, Debug)]
pub enum LocalizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load {file} localization package: {reason}")]
    InvalidPackage { file: String, reason: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("The token isn't specified. Specify the token before launching the bot")]
    MissingToken,

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

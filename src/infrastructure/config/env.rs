//! Environment: `.env` loading and the bot token

use std::path::Path;

use crate::application::errors::ConfigError;

pub const TOKEN_VAR: &str = "BOT_TOKEN";

/// Loads `KEY=VALUE` pairs from `path` into the process environment.
/// Variables that are already set keep their values. A missing file is fine.
pub fn load_dotenv(path: impl AsRef<Path>) -> Result<bool, ConfigError> {
    let path = path.as_ref();
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

/// The token from the CLI override, else from `BOT_TOKEN`
pub fn bot_token(token_override: Option<String>) -> Result<String, ConfigError> {
    token_override
        .or_else(|| std::env::var(TOKEN_VAR).ok())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ConfigError::MissingToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_override_wins() {
        assert_eq!(bot_token(Some(" abc.def ".to_string())).unwrap(), "abc.def");
    }

    #[test]
    fn test_blank_override_is_missing() {
        assert!(matches!(bot_token(Some("  ".to_string())), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_dotenv_file_sets_variables() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "BEFRI_TEST_DOTENV=from-file").unwrap();

        assert!(load_dotenv(file.path()).unwrap());
        assert_eq!(std::env::var("BEFRI_TEST_DOTENV").unwrap(), "from-file");
    }

    #[test]
    fn test_missing_dotenv_is_not_an_error() {
        assert!(!load_dotenv("/definitely/not/here/.env").unwrap());
    }
}

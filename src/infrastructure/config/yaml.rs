//! Untyped YAML documents with dotted-key lookups
//!
//! Localization packages and the design file have open-ended keys, so they are
//! kept as [`serde_yaml::Value`] trees and read with keys such as
//! `commands.help.description`.

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

use crate::application::errors::ConfigError;

/// Tag concatenating the items of a sequence: `!join [a, b, c]`
const JOIN_TAG: &str = "join";

#[derive(Debug, Clone, Default)]
pub struct YamlMapping {
    path: Option<PathBuf>,
    data: Value,
}

impl YamlMapping {
    pub fn new(data: Value) -> Self {
        Self {
            path: None,
            data: resolve_tags(data),
        }
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(parse_value(content, "<inline>")?))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        Ok(Self {
            path: Some(path.to_path_buf()),
            data: read_value(path)?,
        })
    }

    /// Re-reads the file the mapping was loaded from
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            self.data = read_value(path)?;
        }
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Walks nested mappings by a `.`-separated key. Null values count as missing.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut current = &self.data;
        for part in key.split('.') {
            current = current.get(part)?;
        }

        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    pub fn get_list(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key)?.as_sequence()
    }

    /// Typed lookup; a value of the wrong shape reads as missing
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        serde_yaml::from_value(self.get(key)?.clone()).ok()
    }

    /// Whether all `keys` are present at the top level
    pub fn contains(&self, keys: &[&str]) -> bool {
        keys.iter().all(|k| self.data.get(*k).is_some())
    }

    pub fn len(&self) -> usize {
        self.data.as_mapping().map_or(0, |m| m.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) fn read_value(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_value(&content, &path.display().to_string()).map(resolve_tags)
}

fn parse_value(content: &str, origin: &str) -> Result<Value, ConfigError> {
    serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        path: origin.to_string(),
        reason: e.to_string(),
    })
}

/// Replaces custom tags with their values
pub(crate) fn resolve_tags(value: Value) -> Value {
    match value {
        Value::Tagged(tagged) => {
            let tagged = *tagged;
            let inner = resolve_tags(tagged.value);
            match inner {
                Value::Sequence(items) if tagged.tag == JOIN_TAG => {
                    Value::String(items.iter().map(scalar_to_string).collect())
                }
                other => other,
            }
        }
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(resolve_tags).collect()),
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .into_iter()
                .map(|(k, v)| (k, resolve_tags(v)))
                .collect(),
        ),
        other => other,
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

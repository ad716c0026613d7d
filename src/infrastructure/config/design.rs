//! Design file (`design.yml`): colours, emojis and icons used in replies

use serde_yaml::Value;
use std::path::Path;

use super::YamlMapping;
use crate::application::errors::ConfigError;

#[derive(Debug, Clone, Default)]
pub struct Design {
    data: YamlMapping,
}

impl Design {
    pub fn new(data: YamlMapping) -> Self {
        Self { data }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self::new(YamlMapping::load(path)?))
    }

    pub fn reload(&mut self) -> Result<(), ConfigError> {
        self.data.reload()
    }

    /// Colour by name; 0 when missing or not six hex digits
    pub fn color(&self, name: &str) -> u32 {
        // unquoted digits such as `000000` parse as YAML numbers
        match self.data.get(&format!("colors.{name}")) {
            Some(Value::String(hex)) => hex_to_number(hex),
            Some(Value::Number(n)) => hex_to_number(&format!("{:0>6}", n.to_string())),
            _ => 0,
        }
    }

    pub fn emoji(&self, name: &str) -> &str {
        self.data.get_str(&format!("emojis.{name}")).unwrap_or("")
    }

    pub fn icon(&self, name: &str) -> &str {
        self.data.get_str(&format!("icons.{name}")).unwrap_or("")
    }
}

fn hex_to_number(hex: &str) -> u32 {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return 0;
    }

    u32::from_str_radix(hex, 16).unwrap_or(0)
}

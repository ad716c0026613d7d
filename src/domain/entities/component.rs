use std::fmt;

/// Custom id carried by interactive buttons: `<command>:<author id>:<action...>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentId {
    pub command: String,
    /// User who invoked the command that produced the button
    pub author_id: u64,
    pub action: Vec<String>,
}

impl ComponentId {
    pub fn new(command: impl Into<String>, author_id: u64, action: &[&str]) -> Self {
        Self {
            command: command.into(),
            author_id,
            action: action.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn parse(custom_id: &str) -> Option<Self> {
        let mut parts = custom_id.split(':');
        let command = parts.next().filter(|c| !c.is_empty())?.to_string();
        let author_id = parts.next()?.parse().ok()?;

        Some(Self {
            command,
            author_id,
            action: parts.map(str::to_string).collect(),
        })
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.command, self.author_id)?;
        for part in &self.action {
            write!(f, ":{}", part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_component_id() {
        let id = ComponentId::parse("help:813065322453925940:category:info").unwrap();
        assert_eq!(id.command, "help");
        assert_eq!(id.author_id, 813065322453925940);
        assert_eq!(id.action, vec!["category", "info"]);
        assert_eq!(id.to_string(), "help:813065322453925940:category:info");
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        assert!(ComponentId::parse("help").is_none());
        assert!(ComponentId::parse("help:abc:home").is_none());
        assert!(ComponentId::parse(":1:home").is_none());
    }
}
